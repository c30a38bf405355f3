//! Run command - the whole pipeline in one go.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::Path;

/// Run the full pipeline.
pub async fn run_pipeline(pdf: &str, video_url: &str, settings: Settings) -> Result<()> {
    let credentials = Credentials::load(&settings.env_file())?;
    preflight::check(Operation::Run, &credentials)?;

    let orchestrator = Orchestrator::with_credentials(settings, &credentials)?;

    Output::header("Quizcast Pipeline");
    Output::info(&format!("Chapter: {}", pdf));

    let result = orchestrator.run_all(Path::new(pdf), video_url).await?;

    println!();
    Output::success("Pipeline complete");
    Output::kv("Questions", &result.questions.to_string());
    Output::kv("Audio files", &result.audio_files.len().to_string());
    Output::kv("Video", &result.video.display().to_string());

    Ok(())
}
