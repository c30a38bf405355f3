//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and credentials are available before
//! starting a stage that would otherwise fail midway.

use crate::config::Credentials;
use crate::error::{QuizcastError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Question generation needs the completion key.
    Generate,
    /// Narration needs the speech key.
    Narrate,
    /// Video assembly needs all three media tools.
    Assemble,
    /// The full pipeline needs everything.
    Run,
}

impl Operation {
    fn tools(self) -> &'static [&'static str] {
        match self {
            Operation::Generate | Operation::Narrate => &[],
            Operation::Assemble | Operation::Run => &["yt-dlp", "ffmpeg", "ffprobe"],
        }
    }
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, credentials: &Credentials) -> Result<()> {
    if matches!(operation, Operation::Generate | Operation::Run) {
        credentials.require_anthropic()?;
    }
    if matches!(operation, Operation::Narrate | Operation::Run) {
        credentials.require_elevenlabs()?;
    }
    for tool in operation.tools() {
        check_tool(tool)?;
    }
    Ok(())
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(QuizcastError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(QuizcastError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(QuizcastError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_needs_completion_key() {
        let err = check(Operation::Generate, &Credentials::default()).unwrap_err();
        assert!(matches!(err, QuizcastError::MissingCredential(ref k) if k == "ANTHROPIC_API_KEY"));

        let creds = Credentials {
            anthropic_api_key: Some("sk-ant".into()),
            elevenlabs_api_key: None,
        };
        assert!(check(Operation::Generate, &creds).is_ok());
    }

    #[test]
    fn test_narrate_needs_speech_key() {
        let creds = Credentials {
            anthropic_api_key: Some("sk-ant".into()),
            elevenlabs_api_key: None,
        };
        let err = check(Operation::Narrate, &creds).unwrap_err();
        assert!(matches!(err, QuizcastError::MissingCredential(ref k) if k == "ELEVENLABS_API_KEY"));
    }

    #[test]
    fn test_missing_tool() {
        assert!(matches!(
            check_tool("quizcast-no-such-tool"),
            Err(QuizcastError::ToolNotFound(_))
        ));
    }
}
