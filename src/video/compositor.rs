//! ffmpeg `drawtext` compositing of captions over the background video.

use super::captions::{Caption, Placement};
use crate::error::{QuizcastError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

const FONT_SIZE: u32 = 48;

/// A caption whose text has been written to `text_file`.
#[derive(Debug, Clone)]
pub struct CaptionFile {
    pub caption: Caption,
    pub text_file: PathBuf,
}

/// Everything ffmpeg needs for the final render.
#[derive(Debug, Clone)]
pub struct CompositeJob {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub captions: Vec<CaptionFile>,
    /// Output length in seconds (the merged audio's duration).
    pub duration: f64,
    pub font_file: Option<PathBuf>,
    pub fps: u32,
    pub output: PathBuf,
}

/// Escape a value for use inside a filter option (`key=value`).
fn escape_option(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '\'' | ':') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escape an already option-escaped value for the filtergraph parser.
fn escape_graph(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '\'' | '[' | ']' | ',' | ';') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Both escaping levels for a free-form value embedded in a filtergraph.
pub fn escape_filter_value(value: &str) -> String {
    escape_graph(&escape_option(value))
}

fn drawtext(entry: &CaptionFile, font_file: Option<&Path>) -> String {
    let caption = &entry.caption;
    let y = match caption.placement {
        Placement::Center => "(h-text_h)/2".to_string(),
        Placement::Top(y) => y.to_string(),
    };

    let mut parts = vec![format!(
        "drawtext=textfile={}",
        escape_filter_value(&entry.text_file.to_string_lossy())
    )];
    if let Some(font) = font_file {
        parts.push(format!("fontfile={}", escape_filter_value(&font.to_string_lossy())));
    }
    // Caption text is literal; `%` must not start an expansion sequence.
    parts.extend([
        "expansion=none".to_string(),
        format!("fontsize={}", FONT_SIZE),
        "fontcolor=white".to_string(),
        "borderw=2".to_string(),
        "bordercolor=black".to_string(),
        "line_spacing=8".to_string(),
        "x=(w-text_w)/2".to_string(),
        format!("y={}", y),
        format!("enable='between(t,{},{})'", caption.start, caption.end()),
    ]);
    parts.join(":")
}

/// The `-filter_complex` graph: one chained `drawtext` per caption.
pub fn build_filter(captions: &[CaptionFile], font_file: Option<&Path>) -> String {
    if captions.is_empty() {
        return "[0:v]null[v]".to_string();
    }

    let chain: Vec<String> = captions.iter().map(|c| drawtext(c, font_file)).collect();
    format!("[0:v]{}[v]", chain.join(","))
}

/// Full ffmpeg argument list for a job.
pub fn build_args(job: &CompositeJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |a: &str| args.push(a.into());

    push("-y");
    push("-loglevel");
    push("error");
    push("-stream_loop");
    push("-1");
    push("-i");
    args.push(job.video.clone().into_os_string());
    args.push("-i".into());
    args.push(job.audio.clone().into_os_string());

    for a in [
        "-filter_complex".to_string(),
        build_filter(&job.captions, job.font_file.as_deref()),
        "-map".to_string(),
        "[v]".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-r".to_string(),
        job.fps.to_string(),
        "-t".to_string(),
        format!("{:.3}", job.duration),
    ] {
        args.push(a.into());
    }

    args.push(job.output.clone().into_os_string());
    args
}

/// Render the final video.
#[instrument(skip(job), fields(output = %job.output.display(), captions = job.captions.len()))]
pub async fn composite(job: &CompositeJob) -> Result<()> {
    let args = build_args(job);
    debug!("ffmpeg {:?}", args);
    info!("Rendering {:.1}s of video", job.duration);

    let result = Command::new("ffmpeg")
        .args(&args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(QuizcastError::ToolFailed(format!("ffmpeg render failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(QuizcastError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(QuizcastError::ToolFailed(format!("ffmpeg error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::captions::CaptionKind;

    fn caption_file(placement: Placement, start: f64, file: &str) -> CaptionFile {
        CaptionFile {
            caption: Caption {
                kind: CaptionKind::Question,
                text: "ignored".into(),
                placement,
                start,
                duration: 38.0,
            },
            text_file: PathBuf::from(file),
        }
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(
            escape_filter_value("this is a 'string': may contain one, or more, special characters"),
            r"this is a \\\'string\\\'\\: may contain one\, or more\, special characters"
        );
        assert_eq!(escape_filter_value("/tmp/caption_0.txt"), "/tmp/caption_0.txt");
    }

    #[test]
    fn test_build_filter_chains_captions() {
        let captions = vec![
            caption_file(Placement::Center, 0.0, "/t/caption_0.txt"),
            caption_file(Placement::Top(250), 39.0, "/t/caption_1.txt"),
        ];
        let filter = build_filter(&captions, None);

        assert!(filter.starts_with("[0:v]drawtext=textfile=/t/caption_0.txt:"));
        assert!(filter.ends_with("[v]"));
        assert!(filter.contains("y=(h-text_h)/2:enable='between(t,0,38)'"));
        assert!(filter.contains(",drawtext=textfile=/t/caption_1.txt:"));
        assert!(filter.contains("y=250:enable='between(t,39,77)'"));
        assert!(filter.contains("fontcolor=white:borderw=2:bordercolor=black"));
        assert!(!filter.contains("fontfile"));
    }

    #[test]
    fn test_caption_text_is_not_expanded() {
        let mut entry = caption_file(Placement::Center, 0.0, "/t/caption_0.txt");
        entry.caption.text = "What load is 80% of 1RM for a 100 kg lifter?".into();
        let filter = build_filter(&[entry.clone(), entry], None);

        assert_eq!(filter.matches(":expansion=none:").count(), 2);
        assert!(!filter.contains("80%"));
    }

    #[test]
    fn test_build_filter_with_font() {
        let captions = vec![caption_file(Placement::Center, 0.0, "/t/c.txt")];
        let filter = build_filter(&captions, Some(Path::new("/fonts/Arial Bold.ttf")));
        assert!(filter.contains(":fontfile=/fonts/Arial Bold.ttf:"));
    }

    #[test]
    fn test_build_args_loops_video_and_trims_to_audio() {
        let job = CompositeJob {
            video: "temp/downloaded_video.mp4".into(),
            audio: "temp/merged_audio.mp3".into(),
            captions: vec![caption_file(Placement::Center, 0.0, "temp/caption_0.txt")],
            duration: 95.5,
            font_file: None,
            fps: 30,
            output: "processed_output/final_video.mp4".into(),
        };
        let args: Vec<String> = build_args(&job)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-stream_loop") + 1], "-1");
        assert_eq!(args[pos("-stream_loop") + 3], "temp/downloaded_video.mp4");
        assert_eq!(args[pos("-c:v") + 1], "libx264");
        assert_eq!(args[pos("-c:a") + 1], "aac");
        assert_eq!(args[pos("-r") + 1], "30");
        assert_eq!(args[pos("-t") + 1], "95.500");
        assert_eq!(args.last().unwrap(), "processed_output/final_video.mp4");
    }
}
