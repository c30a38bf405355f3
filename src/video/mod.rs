//! Trivia video assembly.
//!
//! `captions` lays out the fixed caption schedule, `compositor` turns it into
//! an ffmpeg filter graph, and `assembler` runs the whole sequence.

mod assembler;
mod captions;
mod compositor;

pub use assembler::{AssemblerConfig, VideoAssembler};
pub use captions::{
    build_timeline, wrap_text, Caption, CaptionKind, CaptionLayout, CaptionSchedule, Placement,
};
pub use compositor::{build_args, build_filter, composite, escape_filter_value, CaptionFile, CompositeJob};
