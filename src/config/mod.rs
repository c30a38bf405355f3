//! Configuration module for Quizcast.
//!
//! Handles loading application settings, API credentials and prompt templates.

mod credentials;
mod prompts;
mod settings;

pub use credentials::{
    Credentials, EnvReport, KeyStatus, ANTHROPIC_API_KEY, ELEVENLABS_API_KEY, REQUIRED_KEYS,
};
pub use prompts::{NarrationPrompts, Prompts, QuestionPrompts};
pub use settings::{
    GeneralSettings, GenerationSettings, NarrationSettings, PromptSettings, RetrySettings,
    Settings, VideoSettings,
};
