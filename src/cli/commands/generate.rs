//! Generate command - trivia questions from a chapter PDF.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::Path;

/// Run the generate command.
pub async fn run_generate(
    pdf: &str,
    num_questions: Option<usize>,
    output: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(n) = num_questions {
        settings.generation.num_questions = n;
    }
    if let Some(path) = output {
        settings.generation.questions_file = path;
    }

    let credentials = Credentials::load(&settings.env_file())?;
    preflight::check(Operation::Generate, &credentials)?;

    let orchestrator = Orchestrator::with_credentials(settings, &credentials)?;

    Output::info(&format!("Processing {}", pdf));
    let spinner = Output::spinner("Generating questions...");
    let questions = orchestrator.generate(Path::new(pdf)).await;
    spinner.finish_and_clear();
    let questions = questions?;

    let Some(sample) = questions.first() else {
        Output::error("No questions were generated");
        anyhow::bail!("no questions were generated from {}", pdf);
    };

    Output::success(&format!(
        "Saved {} questions to {}",
        questions.len(),
        orchestrator.settings().questions_file().display()
    ));

    Output::header("Sample Question");
    Output::question(sample);

    Ok(())
}
