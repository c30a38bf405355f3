//! Caption timeline for the trivia video.

use crate::questions::Question;

/// Fixed per-question time slots.
///
/// Question `i` (0-based) is captioned from `i * slot_seconds` for
/// `display_seconds`, regardless of how long its narration runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionSchedule {
    pub slot_seconds: f64,
    pub display_seconds: f64,
}

impl Default for CaptionSchedule {
    fn default() -> Self {
        Self {
            slot_seconds: 39.0,
            display_seconds: 38.0,
        }
    }
}

impl CaptionSchedule {
    pub fn start_of(&self, index: usize) -> f64 {
        index as f64 * self.slot_seconds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionKind {
    Question,
    Options,
}

/// Vertical placement. Captions are always centred horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Center,
    Top(u32),
}

/// One timed text overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub kind: CaptionKind,
    pub text: String,
    pub placement: Placement,
    pub start: f64,
    pub duration: f64,
}

impl Caption {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Layout knobs for caption text.
#[derive(Debug, Clone, Copy)]
pub struct CaptionLayout {
    pub wrap_width: usize,
    pub options_y: u32,
}

impl Default for CaptionLayout {
    fn default() -> Self {
        Self {
            wrap_width: 42,
            options_y: 250,
        }
    }
}

/// Two captions per question: the numbered question text, then the options.
pub fn build_timeline(
    questions: &[Question],
    schedule: &CaptionSchedule,
    layout: &CaptionLayout,
) -> Vec<Caption> {
    questions
        .iter()
        .enumerate()
        .flat_map(|(i, q)| {
            let start = schedule.start_of(i);
            let question_text = format!("Question {}:\n{}", i + 1, q.question);

            [
                Caption {
                    kind: CaptionKind::Question,
                    text: wrap_block(&question_text, layout.wrap_width),
                    placement: Placement::Center,
                    start,
                    duration: schedule.display_seconds,
                },
                Caption {
                    kind: CaptionKind::Options,
                    text: wrap_block(&q.options_text(), layout.wrap_width),
                    placement: Placement::Top(layout.options_y),
                    start,
                    duration: schedule.display_seconds,
                },
            ]
        })
        .collect()
}

/// Wrap each line of `text` independently, keeping existing line breaks.
fn wrap_block(text: &str, width: usize) -> String {
    text.lines()
        .flat_map(|line| {
            let wrapped = wrap_text(line, width);
            if wrapped.is_empty() {
                vec![String::new()]
            } else {
                wrapped
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
