//! Durations command - total playback length of the narration files.

use crate::cli::output::format_duration;
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the durations command.
pub async fn run_durations(dir: Option<String>, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::with_credentials(settings, &Credentials::default())?;
    let dir = dir.map(|d| Settings::expand_path(&d));
    let target = dir.clone().unwrap_or_else(|| orchestrator.settings().audio_dir());

    Output::info(&format!("Scanning {}", target.display()));
    let report = orchestrator.durations(dir.as_deref()).await;

    if report.files_listed == 0 {
        Output::warning("No audio files were processed");
        return Ok(());
    }

    Output::header("Audio Durations");
    for (name, seconds) in &report.durations {
        Output::kv(name, &format!("{:.2}s", seconds));
    }

    println!();
    Output::kv(
        "Files processed",
        &format!("{}/{}", report.durations.len(), report.files_listed),
    );
    Output::kv("Failed", &report.failed().to_string());
    Output::kv(
        "Total",
        &format!(
            "{:.2} seconds ({:.2} minutes, {})",
            report.total_seconds,
            report.total_minutes(),
            format_duration(report.total_seconds)
        ),
    );
    Output::kv("Elapsed", &format!("{:.2?}", report.elapsed));

    Ok(())
}
