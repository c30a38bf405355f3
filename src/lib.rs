//! Quizcast - narrated trivia videos from textbook chapters
//!
//! A CLI pipeline that turns a PDF chapter into a short trivia video.
//!
//! # Overview
//!
//! Quizcast:
//! - Extracts the text of a chapter PDF
//! - Asks an LLM for multiple-choice questions across a difficulty mix
//! - Narrates each question with a text-to-speech voice
//! - Overlays the questions on a background video with the merged narration
//!
//! # Architecture
//!
//! - `config` - Settings, credentials and prompt templates
//! - `chapter` - PDF text extraction
//! - `completion` - LLM completion client
//! - `retry` - Bounded exponential backoff
//! - `questions` - Question model, generation and persistence
//! - `speech` - Narration scripts and speech synthesis
//! - `media` - ffprobe, ffmpeg and yt-dlp wrappers
//! - `video` - Caption timeline and video assembly
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use quizcast::config::Settings;
//! use quizcast::orchestrator::Orchestrator;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator
//!         .run_all(Path::new("chapters/chapter_1.pdf"), "https://www.youtube.com/watch?v=...")
//!         .await?;
//!     println!("Video written to {}", result.video.display());
//!
//!     Ok(())
//! }
//! ```

pub mod chapter;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod media;
pub mod orchestrator;
pub mod questions;
pub mod retry;
pub mod speech;
pub mod video;

pub use error::{QuizcastError, Result};
