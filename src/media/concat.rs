//! Merging narration files with the ffmpeg concat demuxer.

use crate::error::{QuizcastError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, instrument};

/// Quote a path for a concat manifest line.
fn quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// Render the concat manifest: one `file '<path>'` line per input.
pub fn manifest(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|f| format!("file {}\n", quote(f)))
        .collect()
}

/// Write a concat manifest with absolute paths.
pub fn write_manifest(files: &[PathBuf], manifest_path: &Path) -> Result<()> {
    let absolute = files
        .iter()
        .map(std::path::absolute)
        .collect::<std::io::Result<Vec<_>>>()?;
    std::fs::write(manifest_path, manifest(&absolute))?;
    Ok(())
}

/// Concatenate `files` into `output` without re-encoding.
#[instrument(skip(files), fields(count = files.len(), output = %output.display()))]
pub async fn concat_audio(files: &[PathBuf], manifest_path: &Path, output: &Path) -> Result<()> {
    if files.is_empty() {
        return Err(QuizcastError::InvalidInput("No audio files to merge".into()));
    }

    write_manifest(files, manifest_path)?;
    info!("Merging {} audio files", files.len());

    let result = Command::new("ffmpeg")
        .arg("-f").arg("concat")
        .arg("-safe").arg("0")
        .arg("-i").arg(manifest_path)
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(output)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(QuizcastError::ToolFailed(format!("ffmpeg concat failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(QuizcastError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(QuizcastError::ToolFailed(format!("ffmpeg error: {e}"))),
    }
}
