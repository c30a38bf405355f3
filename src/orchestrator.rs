//! Pipeline orchestrator for Quizcast.
//!
//! Wires settings, credentials and prompts into the pipeline stages and runs
//! them one at a time or end to end.

use crate::completion::{AnthropicClient, CompletionClient};
use crate::config::{Credentials, Prompts, Settings, ANTHROPIC_API_KEY, ELEVENLABS_API_KEY};
use crate::error::{QuizcastError, Result};
use crate::media::{AudioDurationAnalyzer, DurationReport, Ffprobe, MediaProbe};
use crate::questions::{
    load_questions, save_questions, GeneratorConfig, Question, QuestionGenerator,
};
use crate::speech::{ElevenLabsClient, NarrationReport, Narrator, SpeechSynthesizer};
use crate::video::{AssemblerConfig, CaptionLayout, CaptionSchedule, VideoAssembler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// The main orchestrator for the Quizcast pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    completion: Option<Arc<dyn CompletionClient>>,
    synth: Option<Arc<dyn SpeechSynthesizer>>,
    probe: Arc<dyn MediaProbe>,
}

impl Orchestrator {
    /// Create an orchestrator from settings, reading credentials from the
    /// configured `.env` file.
    pub fn new(settings: Settings) -> Result<Self> {
        let credentials = Credentials::load(&settings.env_file())?;
        Self::with_credentials(settings, &credentials)
    }

    /// Create an orchestrator with explicit credentials.
    ///
    /// A missing key only fails the stages that need it.
    pub fn with_credentials(settings: Settings, credentials: &Credentials) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let completion: Option<Arc<dyn CompletionClient>> = match &credentials.anthropic_api_key {
            Some(key) => Some(Arc::new(AnthropicClient::with_config(
                key,
                &settings.generation.model,
                &settings.generation.anthropic_base_url,
                Duration::from_secs(settings.generation.timeout_secs),
            )?)),
            None => None,
        };

        let synth: Option<Arc<dyn SpeechSynthesizer>> = match &credentials.elevenlabs_api_key {
            Some(key) => Some(Arc::new(ElevenLabsClient::with_config(
                key,
                &settings.narration.voice_id,
                &settings.narration.model_id,
                &settings.narration.elevenlabs_base_url,
                Duration::from_secs(settings.narration.timeout_secs),
            )?)),
            None => None,
        };

        Ok(Self {
            settings,
            prompts,
            completion,
            synth,
            probe: Arc::new(Ffprobe::new()),
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        completion: Option<Arc<dyn CompletionClient>>,
        synth: Option<Arc<dyn SpeechSynthesizer>>,
        probe: Arc<dyn MediaProbe>,
    ) -> Self {
        Self {
            settings,
            prompts,
            completion,
            synth,
            probe,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    /// Question generator backed by the completion client.
    pub fn question_generator(&self) -> Result<QuestionGenerator> {
        let client = self
            .completion
            .clone()
            .ok_or_else(|| QuizcastError::MissingCredential(ANTHROPIC_API_KEY.to_string()))?;

        let generation = &self.settings.generation;
        let config = GeneratorConfig {
            num_questions: generation.num_questions,
            max_tokens: generation.max_tokens,
            temperature: generation.temperature,
            retry: self.settings.retry.policy(),
            ..Default::default()
        };

        Ok(QuestionGenerator::new(client, self.prompts.clone(), config))
    }

    /// Narrator writing to the configured audio directory.
    pub fn narrator(&self) -> Result<Narrator> {
        let synth = self
            .synth
            .clone()
            .ok_or_else(|| QuizcastError::MissingCredential(ELEVENLABS_API_KEY.to_string()))?;

        Ok(
            Narrator::new(synth, self.prompts.narration_intros(), self.settings.audio_dir())
                .with_max_concurrent(self.settings.narration.max_concurrent),
        )
    }

    pub fn duration_analyzer(&self) -> AudioDurationAnalyzer {
        AudioDurationAnalyzer::new(self.probe.clone())
    }

    pub fn video_assembler(&self) -> VideoAssembler {
        let video = &self.settings.video;
        let config = AssemblerConfig {
            output_dir: self.settings.video_output_dir(),
            temp_dir: self.settings.temp_dir(),
            final_name: video.final_name.clone(),
            schedule: CaptionSchedule {
                slot_seconds: video.slot_seconds,
                display_seconds: video.display_seconds,
            },
            layout: CaptionLayout {
                wrap_width: video.wrap_width,
                options_y: video.options_y,
            },
            font_file: video.font_file.as_deref().map(Settings::expand_path),
            fps: video.fps,
        };
        VideoAssembler::new(self.probe.clone(), config)
    }

    /// Generate questions for one chapter and save them to the question file.
    ///
    /// Nothing is written when no questions come back.
    #[instrument(skip(self), fields(pdf = %pdf_path.display()))]
    pub async fn generate(&self, pdf_path: &Path) -> Result<Vec<Question>> {
        let generator = self.question_generator()?;
        let questions = generator.process_chapter(pdf_path).await;

        if !questions.is_empty() {
            let output = self.settings.questions_file();
            save_questions(&output, &questions)?;
            info!("Saved {} questions to {}", questions.len(), output.display());
        }

        Ok(questions)
    }

    /// Narrate the saved question set.
    #[instrument(skip(self))]
    pub async fn narrate(&self) -> Result<NarrationReport> {
        let narrator = self.narrator()?;
        let questions = load_questions(&self.settings.questions_file())?;
        if questions.is_empty() {
            return Err(QuizcastError::InvalidInput(
                "Question file contains no questions".into(),
            ));
        }
        narrator.narrate_all(&questions).await
    }

    /// Total duration of the narration files in `dir`, or the configured audio directory.
    pub async fn durations(&self, dir: Option<&Path>) -> DurationReport {
        let dir = dir.map(Path::to_path_buf).unwrap_or_else(|| self.settings.audio_dir());
        self.duration_analyzer().analyze(&dir).await
    }

    /// Assemble the final video from the saved questions and narration.
    #[instrument(skip(self))]
    pub async fn assemble(&self, video_url: &str) -> Result<PathBuf> {
        let questions = load_questions(&self.settings.questions_file())?;
        self.video_assembler()
            .assemble(video_url, &self.settings.audio_dir(), &questions)
            .await
    }

    /// PDF to questions to audio to video.
    #[instrument(skip(self), fields(pdf = %pdf_path.display()))]
    pub async fn run_all(&self, pdf_path: &Path, video_url: &str) -> Result<PipelineResult> {
        // Fail on missing keys before spending any API calls
        let narrator = self.narrator()?;

        eprintln!("  Generating questions...");
        let questions = self.generate(pdf_path).await?;
        if questions.is_empty() {
            return Err(QuizcastError::InvalidResponse(
                "No questions were generated".into(),
            ));
        }
        eprintln!("  Generated {} questions", questions.len());

        eprintln!("  Narrating questions...");
        let narration = narrator.narrate_all(&questions).await?;
        let audio_files = narration.written_paths();
        if audio_files.is_empty() {
            return Err(QuizcastError::Synthesis(
                "No audio files were generated".into(),
            ));
        }
        eprintln!("  Narrated {}/{} questions", audio_files.len(), narration.total());

        eprintln!("  Assembling video...");
        let video = self
            .video_assembler()
            .assemble(video_url, &self.settings.audio_dir(), &questions)
            .await?;

        Ok(PipelineResult {
            questions: questions.len(),
            audio_files,
            video,
        })
    }
}

/// Result of a full pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    /// Number of questions generated.
    pub questions: usize,
    /// Narration files written.
    pub audio_files: Vec<PathBuf>,
    /// Path of the final video.
    pub video: PathBuf,
}
