//! Error types for Quizcast.

use thiserror::Error;

/// Library-level error type for Quizcast operations.
#[derive(Error, Debug)]
pub enum QuizcastError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0}. Add it to your .env file as {0}=your_key_here")]
    MissingCredential(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse model response: {0}")]
    InvalidResponse(String),

    #[error("Invalid question record: {0}")]
    InvalidQuestion(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Video download failed: {0}")]
    Download(String),

    #[error("Invalid duration value: {0}")]
    ProbeParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl QuizcastError {
    /// Whether a retry of the same call could plausibly succeed.
    ///
    /// Transport failures and non-success API statuses are transient; parse
    /// and validation failures are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, QuizcastError::Http(_) | QuizcastError::Api { .. })
    }
}

/// Result type alias for Quizcast operations.
pub type Result<T> = std::result::Result<T, QuizcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let api = QuizcastError::Api {
            status: 529,
            message: "overloaded".into(),
        };
        assert!(api.is_transient());
        assert!(!QuizcastError::InvalidResponse("bad".into()).is_transient());
        assert!(!QuizcastError::InvalidQuestion("bad".into()).is_transient());
    }
}
