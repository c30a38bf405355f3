//! Voices command - list the speech voices available to the account and
//! check synthesis with the configured voice.

use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::speech::ElevenLabsClient;
use anyhow::Result;
use std::time::Duration;

const TEST_AUDIO_FILE: &str = "test_audio.mp3";

/// Run the voices command.
pub async fn run_voices(settings: Settings) -> Result<()> {
    let credentials = Credentials::load(&settings.env_file())?;
    let narration = &settings.narration;

    let client = ElevenLabsClient::with_config(
        credentials.require_elevenlabs()?,
        &narration.voice_id,
        &narration.model_id,
        &narration.elevenlabs_base_url,
        Duration::from_secs(narration.timeout_secs),
    )?;

    let spinner = Output::spinner("Fetching voices...");
    let voices = client.list_voices().await;
    spinner.finish_and_clear();
    let voices = voices?;

    if voices.is_empty() {
        Output::warning("No voices available for this account.");
    } else {
        Output::header(&format!("Voices ({})", voices.len()));
        for voice in &voices {
            let marker = if voice.voice_id == narration.voice_id {
                " (configured)"
            } else {
                ""
            };
            Output::list_item(&format!("{} - {}{}", voice.name, voice.voice_id, marker));
        }
    }

    Output::header("Connection test");
    let test_path = settings.working_dir().join(TEST_AUDIO_FILE);
    let spinner = Output::spinner("Synthesizing test audio...");
    let written = client.connection_test(&test_path).await;
    spinner.finish_and_clear();
    let written = written?;

    Output::success(&format!(
        "Wrote {} bytes to {}",
        written,
        test_path.display()
    ));

    Ok(())
}
