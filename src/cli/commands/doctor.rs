//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{Credentials, EnvReport, Settings};
use crate::media::list_mp3s;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Quizcast Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    let tools = vec![
        check_tool("yt-dlp", "--version", install_hint_ytdlp()),
        check_tool("ffmpeg", "-version", install_hint_ffmpeg()),
        check_tool("ffprobe", "-version", install_hint_ffmpeg()),
    ];
    print_section("External Tools", &tools);
    checks.extend(tools);

    let credentials = Credentials::load(&settings.env_file())?;
    let keys = check_api_keys(&EnvReport::inspect(&settings.env_file(), &credentials));
    print_section("API Configuration", &keys);
    checks.extend(keys);

    let files = check_files(settings);
    print_section("Pipeline Files", &files);
    checks.extend(files);

    let config = vec![check_config_file()];
    print_section("Configuration", &config);
    checks.extend(config);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Quizcast.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Quizcast is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_arg: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// One check per credential, without revealing more than the preview.
fn check_api_keys(report: &EnvReport) -> Vec<CheckResult> {
    let mut results: Vec<CheckResult> = report
        .keys
        .iter()
        .map(|key| match (&key.length, &key.preview) {
            (Some(len), Some(preview)) => CheckResult::ok(
                &key.name,
                &format!("configured ({}..., {} chars)", preview, len),
            ),
            _ => CheckResult::error(
                &key.name,
                "not set",
                &format!("Add {}=your_key_here to {}", key.name, report.env_file.display()),
            ),
        })
        .collect();

    if !report.file_found {
        results.push(CheckResult::warning(
            ".env file",
            &format!("{} not found", report.env_file.display()),
            "Keys are read from the process environment only",
        ));
    }

    results
}

/// Check the files the stages hand to each other.
fn check_files(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let questions = settings.questions_file();
    if questions.exists() {
        results.push(CheckResult::ok("Question set", &questions.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Question set",
            &format!("{} (not created yet)", questions.display()),
            "Create with: quizcast generate <chapter.pdf>",
        ));
    }

    let audio_dir = settings.audio_dir();
    match list_mp3s(&audio_dir) {
        Ok(files) if !files.is_empty() => results.push(CheckResult::ok(
            "Narration",
            &format!("{} ({} MP3 files)", audio_dir.display(), files.len()),
        )),
        _ => results.push(CheckResult::warning(
            "Narration",
            &format!("{} (no audio yet)", audio_dir.display()),
            "Create with: quizcast narrate",
        )),
    }

    if let Some(font) = &settings.video.font_file {
        let path = Settings::expand_path(font);
        if path.exists() {
            results.push(CheckResult::ok("Caption font", &path.display().to_string()));
        } else {
            results.push(CheckResult::error(
                "Caption font",
                &format!("{} not found", path.display()),
                "Fix video.font_file in the config, or remove it to use ffmpeg's default font",
            ));
        }
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: quizcast config init",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}
