//! CLI module for Quizcast.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Quizcast - narrated trivia videos from textbook chapters
///
/// Generates multiple-choice questions from a PDF chapter, narrates them,
/// and overlays them on a background video.
#[derive(Parser, Debug)]
#[command(name = "quizcast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Report which API keys are configured (values are masked)
    EnvCheck,

    /// List the voices available to the ElevenLabs account
    Voices,

    /// Generate trivia questions from a PDF chapter
    Generate {
        /// Path to the chapter PDF
        pdf: String,

        /// Number of questions to request
        #[arg(short, long)]
        num_questions: Option<usize>,

        /// Where to write the question set (overrides config)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Narrate the saved question set to MP3 files
    Narrate {
        /// Question set to narrate (overrides config)
        #[arg(short, long)]
        questions: Option<String>,

        /// Output directory for audio (overrides config)
        #[arg(short, long)]
        output_dir: Option<String>,

        /// ElevenLabs voice ID (overrides config)
        #[arg(long)]
        voice: Option<String>,
    },

    /// Sum the durations of the MP3 files in a directory
    Durations {
        /// Directory to scan (defaults to the narration output directory)
        dir: Option<String>,
    },

    /// Build the final video from narration and a background video
    Assemble {
        /// Background video URL
        #[arg(long, env = "QUIZCAST_VIDEO_URL")]
        video_url: String,
    },

    /// Run the whole pipeline: PDF to questions, audio and video
    Run {
        /// Path to the chapter PDF
        pdf: String,

        /// Background video URL
        #[arg(long, env = "QUIZCAST_VIDEO_URL")]
        video_url: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file if none exists
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
