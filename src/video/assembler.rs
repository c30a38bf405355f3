//! End-to-end video assembly: download, merge, caption, render.

use super::captions::{build_timeline, CaptionLayout, CaptionSchedule};
use super::compositor::{composite, CaptionFile, CompositeJob};
use crate::error::{QuizcastError, Result};
use crate::media::{concat_audio, download_video, list_mp3s, MediaProbe};
use crate::questions::Question;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

const DOWNLOADED_VIDEO: &str = "downloaded_video.mp4";
const MERGED_AUDIO: &str = "merged_audio.mp3";
const AUDIO_LIST: &str = "audio_list.txt";

/// Where the assembler writes and how captions look.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub final_name: String,
    pub schedule: CaptionSchedule,
    pub layout: CaptionLayout,
    pub font_file: Option<PathBuf>,
    pub fps: u32,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("processed_output"),
            temp_dir: PathBuf::from("temp"),
            final_name: "final_video.mp4".to_string(),
            schedule: CaptionSchedule::default(),
            layout: CaptionLayout::default(),
            font_file: None,
            fps: 30,
        }
    }
}

pub struct VideoAssembler {
    probe: Arc<dyn MediaProbe>,
    config: AssemblerConfig,
}

impl VideoAssembler {
    pub fn new(probe: Arc<dyn MediaProbe>, config: AssemblerConfig) -> Self {
        Self { probe, config }
    }

    pub fn final_path(&self) -> PathBuf {
        self.config.output_dir.join(&self.config.final_name)
    }

    /// Produce the captioned trivia video.
    ///
    /// The temp directory is removed afterwards whether or not assembly
    /// succeeded.
    #[instrument(skip(self, questions), fields(questions = questions.len()))]
    pub async fn assemble(
        &self,
        video_url: &str,
        audio_dir: &Path,
        questions: &[Question],
    ) -> Result<PathBuf> {
        let result = self.run_steps(video_url, audio_dir, questions).await;
        self.cleanup();
        result
    }

    async fn run_steps(
        &self,
        video_url: &str,
        audio_dir: &Path,
        questions: &[Question],
    ) -> Result<PathBuf> {
        let temp = &self.config.temp_dir;
        std::fs::create_dir_all(&self.config.output_dir)?;
        std::fs::create_dir_all(temp)?;
        debug!("Processing directories created");

        let video = download_video(video_url, &temp.join(DOWNLOADED_VIDEO)).await?;

        let audio_files = list_mp3s(audio_dir).map_err(|e| {
            QuizcastError::InvalidInput(format!("Cannot read {}: {}", audio_dir.display(), e))
        })?;
        if audio_files.is_empty() {
            return Err(QuizcastError::InvalidInput(format!(
                "No MP3 files found in {}",
                audio_dir.display()
            )));
        }

        let merged = temp.join(MERGED_AUDIO);
        concat_audio(&audio_files, &temp.join(AUDIO_LIST), &merged).await?;
        info!("Audio files merged successfully");

        let duration = self.probe.duration(&merged).await?;
        info!("Merged audio runs {:.1}s", duration);

        let captions = self.write_captions(questions)?;

        let output = self.final_path();
        composite(&CompositeJob {
            video,
            audio: merged,
            captions,
            duration,
            font_file: self.config.font_file.clone(),
            fps: self.config.fps,
            output: output.clone(),
        })
        .await?;

        info!("Video created at {}", output.display());
        Ok(output)
    }

    /// Build the caption timeline and write each caption's text to a file.
    fn write_captions(&self, questions: &[Question]) -> Result<Vec<CaptionFile>> {
        build_timeline(questions, &self.config.schedule, &self.config.layout)
            .into_iter()
            .enumerate()
            .map(|(n, caption)| -> Result<CaptionFile> {
                let text_file = std::path::absolute(
                    self.config.temp_dir.join(format!("caption_{}.txt", n)),
                )?;
                std::fs::write(&text_file, &caption.text)?;
                Ok(CaptionFile { caption, text_file })
            })
            .collect()
    }

    /// Best-effort removal of the temp directory and its files.
    fn cleanup(&self) {
        let temp = &self.config.temp_dir;
        if let Ok(entries) = std::fs::read_dir(temp) {
            for entry in entries.flatten() {
                if let Err(e) = std::fs::remove_file(entry.path()) {
                    debug!("Could not remove {}: {}", entry.path().display(), e);
                }
            }
        }
        if let Err(e) = std::fs::remove_dir(temp) {
            debug!("Could not remove {}: {}", temp.display(), e);
        }
    }
}
