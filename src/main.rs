//! Quizcast CLI entry point.

use anyhow::Result;
use clap::Parser;
use quizcast::cli::{commands, Cli, Commands};
use quizcast::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("quizcast={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli.config.as_deref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Execute command
    match cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::EnvCheck => {
            commands::run_env_check(&settings)?;
        }

        Commands::Voices => {
            commands::run_voices(settings).await?;
        }

        Commands::Generate {
            pdf,
            num_questions,
            output,
        } => {
            commands::run_generate(&pdf, num_questions, output, settings).await?;
        }

        Commands::Narrate {
            questions,
            output_dir,
            voice,
        } => {
            commands::run_narrate(questions, output_dir, voice, settings).await?;
        }

        Commands::Durations { dir } => {
            commands::run_durations(dir, settings).await?;
        }

        Commands::Assemble { video_url } => {
            commands::run_assemble(&video_url, settings).await?;
        }

        Commands::Run { pdf, video_url } => {
            commands::run_pipeline(&pdf, &video_url, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, config_path, settings)?;
        }
    }

    Ok(())
}
