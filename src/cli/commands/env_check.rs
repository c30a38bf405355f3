//! Env-check command - report configured API keys without revealing them.

use crate::cli::Output;
use crate::config::{Credentials, EnvReport, Settings};
use anyhow::Result;

/// Run the env-check command.
pub fn run_env_check(settings: &Settings) -> Result<()> {
    let env_file = settings.env_file();
    let credentials = Credentials::load(&env_file)?;
    let report = EnvReport::inspect(&env_file, &credentials);

    Output::header("Environment Check");
    Output::kv("Env file", &report.env_file.display().to_string());

    if report.file_found {
        Output::info(".env file contents (values masked):");
        for line in &report.masked_lines {
            Output::list_item(line);
        }
    } else {
        Output::warning(&format!("{} not found", report.env_file.display()));
    }

    println!();
    for key in &report.keys {
        match (&key.length, &key.preview) {
            (Some(len), Some(preview)) => {
                Output::success(&format!("{} is set", key.name));
                Output::kv("Length", &len.to_string());
                Output::kv("Starts with", preview);
            }
            _ => Output::error(&format!("{} is not set", key.name)),
        }
    }

    if !report.all_present() {
        anyhow::bail!("one or more API keys are missing");
    }

    Ok(())
}
