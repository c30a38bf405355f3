//! External media tooling: probing, downloading and merging.
//!
//! All work is delegated to `ffprobe`, `ffmpeg` and `yt-dlp`, which must be
//! on `PATH`.

mod concat;
mod downloader;
mod durations;
mod probe;

pub use concat::{concat_audio, manifest, write_manifest};
pub use downloader::{download_video, parse_progress, validate_url};
pub use durations::{AudioDurationAnalyzer, DurationReport};
pub use probe::{parse_duration, Ffprobe, MediaProbe};

use crate::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum NameChunk {
    Number(u64),
    Text(String),
}

/// Digit runs and text runs of a file name; numbers compare by value.
fn natural_key(name: &str) -> Vec<NameChunk> {
    let mut chunks = Vec::new();
    let mut rest = name;
    while let Some(first) = rest.chars().next() {
        let is_digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        chunks.push(match run.parse() {
            Ok(n) if is_digit => NameChunk::Number(n),
            _ => NameChunk::Text(run.to_string()),
        });
        rest = tail;
    }
    chunks
}

/// `.mp3` files directly inside `dir`, in natural file-name order.
pub fn list_mp3s(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
        })
        .collect();

    files.sort_by_cached_key(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (natural_key(&name), name)
    });
    Ok(files)
}
