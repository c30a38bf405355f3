//! Background video download via yt-dlp.

use crate::error::{QuizcastError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, instrument};
use url::Url;

fn progress_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%").expect("valid regex"))
}

/// Percentage from a yt-dlp `--newline` progress line.
pub fn parse_progress(line: &str) -> Option<f64> {
    progress_pattern()
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Lines of yt-dlp stderr kept for the error message.
const STDERR_TAIL_LINES: usize = 20;

/// Read `reader` to the end, keeping only the last `keep` lines.
async fn read_tail<R: AsyncBufRead + Unpin>(reader: R, keep: usize) -> std::io::Result<String> {
    let mut tail = VecDeque::with_capacity(keep);
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if tail.len() == keep {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Ok(Vec::from(tail).join("\n"))
}

/// Check that `video_url` is an absolute http(s) URL.
pub fn validate_url(video_url: &str) -> Result<Url> {
    let url = Url::parse(video_url)
        .map_err(|e| QuizcastError::InvalidInput(format!("Invalid video URL '{}': {}", video_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(QuizcastError::InvalidInput(format!(
            "Unsupported URL scheme '{}' in {}",
            other, video_url
        ))),
    }
}

/// Downloads a video to `target` with `yt-dlp -f best`, showing a progress bar.
#[instrument(skip(target), fields(target = %target.display()))]
pub async fn download_video(video_url: &str, target: &Path) -> Result<PathBuf> {
    let url = validate_url(video_url)?;

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    info!("Downloading video from {}", url);

    let spawned = Command::new("yt-dlp")
        .arg("-f").arg("best")
        .arg("-o").arg(target)
        .arg("--newline")
        .arg(url.as_str())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(QuizcastError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(QuizcastError::Download(format!("yt-dlp execution failed: {e}")));
        }
    };

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.green} Download  [{bar:30.cyan/blue}] {pos}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    // Drain stderr on its own task; a full pipe would stall yt-dlp.
    let stderr_task = child
        .stderr
        .take()
        .map(|stderr| tokio::spawn(read_tail(BufReader::new(stderr), STDERR_TAIL_LINES)));

    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_progress(&line) {
                Some(pct) => pb.set_position(pct.clamp(0.0, 100.0) as u64),
                None => debug!("yt-dlp: {}", line),
            }
        }
    }

    let status = child.wait().await?;
    pb.finish_and_clear();

    let stderr = match stderr_task {
        Some(task) => task.await.ok().and_then(|r| r.ok()).unwrap_or_default(),
        None => String::new(),
    };

    if !status.success() {
        return Err(QuizcastError::Download(format!("yt-dlp failed: {}", stderr.trim())));
    }

    if !target.exists() {
        return Err(QuizcastError::Download(
            "Video file not found after download".into(),
        ));
    }

    info!("Video downloaded successfully");
    Ok(target.to_path_buf())
}
