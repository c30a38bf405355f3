//! Trivia questions: the data model, generation, and the on-disk question set.
//!
//! The question set is the only state persisted between pipeline stages: a
//! pretty-printed JSON array of [`Question`] records, overwritten on every run.

mod generator;
mod models;

pub use generator::{parse_questions, GeneratorConfig, QuestionGenerator};
pub use models::{AnswerKey, Difficulty, DifficultyDistribution, Options, Question};

use crate::error::{QuizcastError, Result};
use std::path::Path;
use tracing::debug;

/// Load a question set. Every record is validated on the way in.
pub fn load_questions(path: &Path) -> Result<Vec<Question>> {
    if !path.exists() {
        return Err(QuizcastError::InvalidInput(format!(
            "Questions file {} not found",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let questions: Vec<Question> = serde_json::from_str(&content)?;
    debug!("Loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

/// Write a question set, replacing any existing file.
pub fn save_questions(path: &Path, questions: &[Question]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(questions)?;
    std::fs::write(path, content)?;
    Ok(())
}
