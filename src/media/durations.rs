//! Total playback length of a directory of narration files.

use super::{list_mp3s, MediaProbe};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Outcome of one duration scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DurationReport {
    pub total_seconds: f64,
    /// Duration per successfully probed file, keyed by file name.
    pub durations: BTreeMap<String, f64>,
    pub files_listed: usize,
    /// Successful probes over the analyzer's lifetime.
    pub files_probed: usize,
    pub elapsed: Duration,
}

impl DurationReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn total_minutes(&self) -> f64 {
        self.total_seconds / 60.0
    }

    /// Listed files that contributed no duration.
    pub fn failed(&self) -> usize {
        self.files_listed.saturating_sub(self.durations.len())
    }
}

/// Sums the durations of every `.mp3` in a directory.
pub struct AudioDurationAnalyzer {
    probe: Arc<dyn MediaProbe>,
    files_probed: AtomicUsize,
}

impl AudioDurationAnalyzer {
    pub fn new(probe: Arc<dyn MediaProbe>) -> Self {
        Self {
            probe,
            files_probed: AtomicUsize::new(0),
        }
    }

    pub fn files_probed(&self) -> usize {
        self.files_probed.load(Ordering::Relaxed)
    }

    /// Scan `dir` and total the durations of its MP3 files.
    ///
    /// Never fails. Missing preconditions yield an empty report; files that
    /// are missing, empty or unreadable by the probe are skipped.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn analyze(&self, dir: &Path) -> DurationReport {
        let started = Instant::now();

        if !self.probe.is_available().await {
            error!("ffprobe is not available. Please install ffmpeg.");
            return DurationReport::empty();
        }

        if !dir.is_dir() {
            error!("Directory '{}' not found", dir.display());
            return DurationReport::empty();
        }

        let files = match list_mp3s(dir) {
            Ok(files) => files,
            Err(e) => {
                error!("Cannot list {}: {}", dir.display(), e);
                return DurationReport::empty();
            }
        };

        if files.is_empty() {
            warn!("No MP3 files found in {}", dir.display());
            return DurationReport::empty();
        }

        info!("Found {} MP3 files", files.len());

        let mut durations = BTreeMap::new();
        for path in &files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match std::fs::metadata(path) {
                Err(_) => {
                    warn!("File {} not found, skipping", name);
                    continue;
                }
                Ok(meta) if meta.len() == 0 => {
                    warn!("File {} is empty, skipping", name);
                    continue;
                }
                Ok(_) => {}
            }

            match self.probe.duration(path).await {
                Ok(seconds) => {
                    self.files_probed.fetch_add(1, Ordering::Relaxed);
                    info!("{}: {:.2} seconds", name, seconds);
                    durations.insert(name, seconds);
                }
                Err(e) => error!("Error processing {}: {}", name, e),
            }
        }

        DurationReport {
            total_seconds: durations.values().sum(),
            durations,
            files_listed: files.len(),
            files_probed: self.files_probed(),
            elapsed: started.elapsed(),
        }
    }
}
