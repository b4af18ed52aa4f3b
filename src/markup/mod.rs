//! Subtitle markup: styles, placement, and script serialization.
//!
//! The ASS emitter consumes laid-out cues plus a [`StyleSpec`] and produces a
//! complete script for ffmpeg's `ass` filter. Unknown style values fall back
//! to defaults (bottom anchor, no highlight, white for bad colors).

mod ass;
mod color;
mod format;
mod position;
mod style;
mod text;

pub use ass::{ass_timestamp, emit, emit_with_events, FALLBACK_CANVAS};
pub use color::{hex_to_ass_color, AssColor};
pub use format::{format_cues, CueDocument, CueFormat};
pub use position::{Anchor, Margins, Placement, PositionMode};
pub use style::StyleSpec;
pub use text::{escape_ass_text, TextTransform};
