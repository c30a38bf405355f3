//! Chapter text extraction from PDF files.

use crate::error::{QuizcastError, Result};
use std::path::Path;
use tracing::{debug, instrument};

/// Plain text of one chapter, ready to be embedded in a prompt.
#[derive(Debug, Clone)]
pub struct Chapter {
    /// Human-readable label derived from the file name.
    pub name: String,
    pub text: String,
}

impl Chapter {
    /// Load a chapter from a PDF file.
    ///
    /// Fails when the file cannot be parsed or contains no extractable text
    /// (scanned or image-only documents).
    #[instrument(fields(path = %path.display()))]
    pub async fn from_pdf(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QuizcastError::InvalidInput(format!(
                "PDF not found: {}",
                path.display()
            )));
        }

        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
            .await
            .map_err(|e| QuizcastError::Pdf(format!("extraction task failed: {}", e)))?
            .map_err(|e| QuizcastError::Pdf(format!("{} ({})", e, path.display())))?;

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(QuizcastError::Pdf(format!(
                "No text extracted from {}",
                path.display()
            )));
        }

        let chapter = Self {
            name: chapter_name(path),
            text,
        };
        debug!("Extracted {} words from {}", chapter.word_count(), chapter.name);
        Ok(chapter)
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Derive a chapter label from a file name: `chapters/chapter_1.pdf` -> `chapter 1`.
pub fn chapter_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("chapter")
        .replace(".pdf", "")
        .replace('_', " ")
}
