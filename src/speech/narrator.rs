//! Concurrent narration of a question set.

use super::{audio_path, render_script, SpeechSynthesizer};
use crate::config::NarrationPrompts;
use crate::error::Result;
use crate::questions::{Difficulty, Question};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Result of narrating one question.
#[derive(Debug)]
pub struct NarrationOutcome {
    /// 1-based position in the question set.
    pub index: usize,
    pub difficulty: Difficulty,
    pub result: Result<PathBuf>,
}

/// Per-question outcomes of a narration run, in question order.
#[derive(Debug, Default)]
pub struct NarrationReport {
    pub outcomes: Vec<NarrationOutcome>,
}

impl NarrationReport {
    /// Paths of the audio files that were written.
    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().cloned())
            .collect()
    }

    /// Questions whose narration failed.
    pub fn failures(&self) -> impl Iterator<Item = &NarrationOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Synthesizes one audio file per question, all requests in flight at once
/// unless a concurrency limit is set.
pub struct Narrator {
    synth: Arc<dyn SpeechSynthesizer>,
    intros: NarrationPrompts,
    output_dir: PathBuf,
    max_concurrent: usize,
}

impl Narrator {
    pub fn new(synth: Arc<dyn SpeechSynthesizer>, intros: NarrationPrompts, output_dir: PathBuf) -> Self {
        Self {
            synth,
            intros,
            output_dir,
            max_concurrent: 0,
        }
    }

    /// Cap the number of in-flight synthesis requests. 0 means no cap.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Narrate every question.
    ///
    /// Requests complete in any order; the report is sorted back into
    /// question order. A failed question is logged and recorded in the report; it never
    /// cancels the others. Only failing to create the output directory is
    /// an error.
    #[instrument(skip_all, fields(count = questions.len()))]
    pub async fn narrate_all(&self, questions: &[Question]) -> Result<NarrationReport> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        if questions.is_empty() {
            return Ok(NarrationReport::default());
        }

        let limit = match self.max_concurrent {
            0 => questions.len(),
            n => n,
        };

        let pb = ProgressBar::new(questions.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Narrating [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        let mut outcomes: Vec<NarrationOutcome> = stream::iter(questions.iter().enumerate())
            .map(|(i, question)| {
                let index = i + 1;
                async move {
                    let result = self.narrate_one(index, question).await;
                    NarrationOutcome {
                        index,
                        difficulty: question.difficulty.clone(),
                        result,
                    }
                }
            })
            .buffer_unordered(limit)
            .inspect(|outcome| {
                pb.inc(1);
                match &outcome.result {
                    Ok(path) => info!("Generated audio for Question {}: {}", outcome.index, path.display()),
                    Err(e) => error!("Error generating audio for Question {}: {}", outcome.index, e),
                }
            })
            .collect()
            .await;

        pb.finish_and_clear();
        outcomes.sort_by_key(|o| o.index);

        Ok(NarrationReport { outcomes })
    }

    async fn narrate_one(&self, index: usize, question: &Question) -> Result<PathBuf> {
        let script = render_script(question, &self.intros);
        let audio = self.synth.synthesize(&script).await?;

        let path = audio_path(&self.output_dir, index, &question.difficulty);
        tokio::fs::write(&path, audio).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizcastError;
    use crate::questions::{AnswerKey, Options};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails for any script containing `fail_marker`; tracks peak concurrency.
    struct FakeSynth {
        fail_marker: Option<String>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeSynth {
        fn new(fail_marker: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                fail_marker: fail_marker.map(String::from),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSynth {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match &self.fail_marker {
                Some(marker) if text.contains(marker.as_str()) => {
                    Err(QuizcastError::Synthesis("quota exceeded".into()))
                }
                _ => Ok(b"mp3".to_vec()),
            }
        }
    }

    fn questions(n: usize) -> Vec<Question> {
        let levels = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Intense];
        (1..=n)
            .map(|i| Question {
                difficulty: levels[(i - 1) % levels.len()].clone(),
                question: format!("Question number {}?", i),
                options: Options {
                    a: "a".into(),
                    b: "b".into(),
                    c: "c".into(),
                    d: "d".into(),
                },
                correct_answer: AnswerKey::B,
                explanation: "e".into(),
                chapter: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_narrate_all_writes_one_file_per_question() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("audio_output");
        let narrator = Narrator::new(FakeSynth::new(None), NarrationPrompts::default(), out.clone());

        let report = narrator.narrate_all(&questions(7)).await.unwrap();
        let paths = report.written_paths();

        assert_eq!(paths.len(), 7);
        assert_eq!(paths[0], out.join("Question 1 - Easy.mp3"));
        assert_eq!(paths[6], out.join("Question 7 - Hard.mp3"));
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_cancel_others() {
        let dir = tempfile::tempdir().unwrap();
        let synth = FakeSynth::new(Some("Question number 3?"));
        let narrator = Narrator::new(synth, NarrationPrompts::default(), dir.path().to_path_buf());

        let report = narrator.narrate_all(&questions(5)).await.unwrap();
        let paths = report.written_paths();

        assert_eq!(report.total(), 5);
        assert_eq!(paths.len(), 4);
        assert!(!paths.iter().any(|p| p.ends_with("Question 3 - Hard.mp3")));
        assert!(!dir.path().join("Question 3 - Hard.mp3").exists());

        let failed: Vec<usize> = report.failures().map(|o| o.index).collect();
        assert_eq!(failed, vec![3]);
    }

    #[tokio::test]
    async fn test_requests_run_concurrently_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let synth = FakeSynth::new(None);
        let narrator = Narrator::new(synth.clone(), NarrationPrompts::default(), dir.path().to_path_buf());

        narrator.narrate_all(&questions(4)).await.unwrap();
        assert_eq!(synth.peak.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_concurrency_cap() {
        let dir = tempfile::tempdir().unwrap();
        let synth = FakeSynth::new(None);
        let narrator = Narrator::new(synth.clone(), NarrationPrompts::default(), dir.path().to_path_buf())
            .with_max_concurrent(2);

        narrator.narrate_all(&questions(6)).await.unwrap();
        assert!(synth.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_report_is_in_question_order() {
        let dir = tempfile::tempdir().unwrap();
        let narrator = Narrator::new(FakeSynth::new(None), NarrationPrompts::default(), dir.path().to_path_buf());

        let report = narrator.narrate_all(&questions(12)).await.unwrap();
        let indices: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indices, (1..=12).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_slash_in_difficulty_stays_in_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = questions(1);
        set[0].difficulty = Difficulty::Other("Easy/Medium".into());
        let narrator = Narrator::new(FakeSynth::new(None), NarrationPrompts::default(), dir.path().to_path_buf());

        let report = narrator.narrate_all(&set).await.unwrap();

        assert_eq!(report.failures().count(), 0);
        assert_eq!(report.written_paths(), vec![dir.path().join("Question 1 - Easy-Medium.mp3")]);
    }

    #[tokio::test]
    async fn test_empty_set_creates_directory_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("audio");
        let narrator = Narrator::new(FakeSynth::new(None), NarrationPrompts::default(), out.clone());

        let report = narrator.narrate_all(&[]).await.unwrap();
        assert_eq!(report.total(), 0);
        assert!(out.is_dir());
    }
}
