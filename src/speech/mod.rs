//! Speech synthesis for question narration.
//!
//! - `script` renders each question into a spoken script with pause markers.
//! - `elevenlabs` is the HTTP synthesis client.
//! - `narrator` fans synthesis out across a question set.

mod elevenlabs;
mod narrator;
mod script;

pub use elevenlabs::{ElevenLabsClient, Voice, CONNECTION_TEST_TEXT};
pub use narrator::{NarrationOutcome, NarrationReport, Narrator};
pub use script::{audio_file_name, audio_path, intro_for, render_script};

use crate::error::Result;
use async_trait::async_trait;

/// Trait for speech synthesis services.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return the encoded audio (MP3).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
