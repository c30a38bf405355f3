//! Configuration settings for Quizcast.

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub generation: GenerationSettings,
    pub narration: NarrationSettings,
    pub video: VideoSettings,
    pub retry: RetrySettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Path to the key=value file holding API credentials.
    pub env_file: String,
    /// Directory that relative pipeline paths are resolved against.
    pub working_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            env_file: ".env".to_string(),
            working_dir: ".".to_string(),
        }
    }
}

/// Question generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Completion model to use.
    pub model: String,
    /// Upper bound on response length.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Number of questions requested per chapter.
    pub num_questions: usize,
    /// Where the generated question set is written.
    pub questions_file: String,
    /// Base URL of the Messages API.
    pub anthropic_base_url: String,
    /// HTTP request timeout.
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            num_questions: 7,
            questions_file: "chapter1_questions.json".to_string(),
            anthropic_base_url: "https://api.anthropic.com".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationSettings {
    /// Voice used for every question.
    pub voice_id: String,
    /// Synthesis model.
    pub model_id: String,
    /// Directory for per-question MP3 files.
    pub output_dir: String,
    /// Maximum concurrent synthesis calls (0 = one task per question, no limit).
    pub max_concurrent: usize,
    /// Base URL of the speech API.
    pub elevenlabs_base_url: String,
    /// HTTP request timeout.
    pub timeout_secs: u64,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            model_id: "eleven_monolingual_v1".to_string(),
            output_dir: "audio_output".to_string(),
            max_concurrent: 0,
            elevenlabs_base_url: "https://api.elevenlabs.io".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Video assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Directory for the final composite.
    pub output_dir: String,
    /// Scratch directory, removed after every run.
    pub temp_dir: String,
    /// File name of the final composite.
    pub final_name: String,
    /// Seconds between the start of consecutive question captions.
    pub slot_seconds: f64,
    /// Seconds each caption stays on screen.
    pub display_seconds: f64,
    /// Font for caption text. None lets ffmpeg pick its default.
    pub font_file: Option<String>,
    /// Caption line width in characters.
    pub wrap_width: usize,
    /// Vertical position of the options caption, in pixels.
    pub options_y: u32,
    /// Output frame rate.
    pub fps: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            output_dir: "processed_output".to_string(),
            temp_dir: "temp".to_string(),
            final_name: "final_video.mp4".to_string(),
            slot_seconds: 39.0,
            display_seconds: 38.0,
            font_file: None,
            wrap_width: 42,
            options_y: 250,
            fps: 30,
        }
    }
}

/// Retry settings for completion requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each subsequent one.
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetrySettings {
    /// Build the runtime retry policy.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Default for PromptSettings {
    fn default() -> Self {
        let mut variables = std::collections::HashMap::new();
        variables.insert("subject".to_string(), "CSCS".to_string());
        Self {
            custom_dir: None,
            variables,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::QuizcastError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizcast")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Resolve a configured path against the working directory.
    fn resolve(&self, path: &str) -> PathBuf {
        let expanded = Self::expand_path(path);
        if expanded.is_absolute() {
            expanded
        } else {
            self.working_dir().join(expanded)
        }
    }

    /// Get the expanded working directory.
    pub fn working_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.working_dir)
    }

    /// Get the credentials file path.
    pub fn env_file(&self) -> PathBuf {
        self.resolve(&self.general.env_file)
    }

    /// Get the question set file path.
    pub fn questions_file(&self) -> PathBuf {
        self.resolve(&self.generation.questions_file)
    }

    /// Get the narration output directory.
    pub fn audio_dir(&self) -> PathBuf {
        self.resolve(&self.narration.output_dir)
    }

    /// Get the video output directory.
    pub fn video_output_dir(&self) -> PathBuf {
        self.resolve(&self.video.output_dir)
    }

    /// Get the video scratch directory.
    pub fn temp_dir(&self) -> PathBuf {
        self.resolve(&self.video.temp_dir)
    }
}
