//! Media duration probing via ffprobe.

use crate::error::{QuizcastError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Trait for tools that can report the playback length of a media file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Whether the underlying tool can be run at all.
    async fn is_available(&self) -> bool;

    /// Duration of the media file in seconds.
    async fn duration(&self, path: &Path) -> Result<f64>;
}

/// `ffprobe`-backed [`MediaProbe`].
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: String,
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self {
            program: "ffprobe".to_string(),
        }
    }
}

impl Ffprobe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific ffprobe binary instead of the one on `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl MediaProbe for Ffprobe {
    async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn duration(&self, path: &Path) -> Result<f64> {
        let result = Command::new(&self.program)
            .arg("-i").arg(path)
            .arg("-show_entries").arg("format=duration")
            .arg("-v").arg("quiet")
            .arg("-of").arg("csv=p=0")
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(QuizcastError::ToolNotFound(self.program.clone()));
            }
            Err(e) => {
                return Err(QuizcastError::ToolFailed(format!("{} execution failed: {e}", self.program)));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(QuizcastError::ToolFailed(format!(
                "{} exited with {} for {}: {}",
                self.program,
                output.status,
                path.display(),
                stderr.trim()
            )));
        }

        let seconds = parse_duration(&String::from_utf8_lossy(&output.stdout))?;
        debug!("{}: {:.2}s", path.display(), seconds);
        Ok(seconds)
    }
}

/// Parse ffprobe's `csv=p=0` duration output.
pub fn parse_duration(stdout: &str) -> Result<f64> {
    let trimmed = stdout.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .ok_or_else(|| QuizcastError::ProbeParse(format!("{:?}", trimmed)))
}
