//! Narrate command - one MP3 per saved question.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the narrate command.
pub async fn run_narrate(
    questions: Option<String>,
    output_dir: Option<String>,
    voice: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(path) = questions {
        settings.generation.questions_file = path;
    }
    if let Some(dir) = output_dir {
        settings.narration.output_dir = dir;
    }
    if let Some(voice) = voice {
        settings.narration.voice_id = voice;
    }

    let credentials = Credentials::load(&settings.env_file())?;
    preflight::check(Operation::Narrate, &credentials)?;

    let orchestrator = Orchestrator::with_credentials(settings, &credentials)?;
    let report = orchestrator.narrate().await?;

    for failure in report.failures() {
        if let Err(e) = &failure.result {
            Output::error(&format!("Question {} ({}): {}", failure.index, failure.difficulty, e));
        }
    }

    let written = report.written_paths();
    if written.is_empty() {
        anyhow::bail!("no audio files were generated");
    }

    Output::header("Generated audio files");
    for path in &written {
        Output::list_item(&path.display().to_string());
    }
    Output::success(&format!("Narrated {}/{} questions", written.len(), report.total()));

    Ok(())
}
