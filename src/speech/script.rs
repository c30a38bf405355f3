//! Narration scripts and audio file naming.

use crate::config::NarrationPrompts;
use crate::questions::{Difficulty, Question};
use std::path::{Path, PathBuf};

/// A pause marker understood by the speech provider.
fn pause(duration: &str) -> String {
    format!("<break time=\"{}\"/>", duration)
}

/// Intro line for a difficulty level.
pub fn intro_for<'a>(difficulty: &Difficulty, intros: &'a NarrationPrompts) -> &'a str {
    match difficulty {
        Difficulty::Easy => &intros.easy,
        Difficulty::Medium => &intros.medium,
        Difficulty::Hard => &intros.hard,
        Difficulty::Intense => &intros.intense,
        Difficulty::Other(_) => &intros.fallback,
    }
}

/// Render the spoken script for one question.
///
/// Intro, question, the four options, a five second thinking pause, the
/// answer reveal, then the explanation, with pause markers in between.
pub fn render_script(question: &Question, intros: &NarrationPrompts) -> String {
    let mut lines = vec![
        intro_for(&question.difficulty, intros).to_string(),
        pause("500ms"),
        question.question.clone(),
        pause("800ms"),
        "Let's look at your options:".to_string(),
        pause("500ms"),
    ];

    let options: Vec<String> = question
        .options
        .iter()
        .map(|(key, text)| format!("{}) {}", key, text))
        .collect();
    lines.push(options.join(&format!("\n{}\n", pause("400ms"))));

    lines.extend([
        pause("5s"),
        "Time's up!".to_string(),
        pause("500ms"),
        format!("The correct answer is {}.", question.correct_answer),
        pause("500ms"),
        "Here's why this is correct:".to_string(),
        pause("300ms"),
        question.explanation.clone(),
    ]);

    lines.join("\n")
}

/// Difficulty label made safe for a file name. Path separators and other
/// reserved characters become `-`, and leading dots are dropped.
fn file_label(difficulty: &Difficulty) -> String {
    let replaced: String = difficulty
        .as_str()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();

    let label = replaced.trim_start_matches('.').trim();
    if label.is_empty() {
        "Unknown".to_string()
    } else {
        label.to_string()
    }
}

/// File name for a question's narration: `Question {index} - {difficulty}.mp3`.
pub fn audio_file_name(index: usize, difficulty: &Difficulty) -> String {
    format!("Question {} - {}.mp3", index, file_label(difficulty))
}

/// Full output path for a question's narration.
pub fn audio_path(output_dir: &Path, index: usize, difficulty: &Difficulty) -> PathBuf {
    output_dir.join(audio_file_name(index, difficulty))
}
