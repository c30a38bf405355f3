//! Assemble command - captioned video from narration and a background video.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the assemble command.
pub async fn run_assemble(video_url: &str, settings: Settings) -> Result<()> {
    // Assembly needs no API keys
    let credentials = Credentials::default();
    preflight::check(Operation::Assemble, &credentials)?;

    let orchestrator = Orchestrator::with_credentials(settings, &credentials)?;

    Output::header("Video Processing");
    match orchestrator.assemble(video_url).await {
        Ok(path) => {
            Output::success(&format!("Video created at {}", path.display()));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Video processing failed: {}", e));
            Err(e.into())
        }
    }
}
