//! Subtitle layout: turning recognized speech into screen-ready cues.
//!
//! Everything in this module is pure and infallible. Degenerate inputs fall
//! back to fixed defaults instead of returning errors, so the functions can
//! be called from any thread without coordination.
//!
//! # Example
//!
//! ```rust
//! use subburn::layout::{segment, LayoutConfig, RecognizedSpan};
//!
//! let cfg = LayoutConfig::new(2, 0.7, 24, 1280, 720);
//! let spans = vec![RecognizedSpan::new(0.0, 2.5, "Hello there, general audience.")];
//! let cues = segment(&spans, &cfg);
//! assert_eq!(cues.len(), 1);
//! ```

mod segment;
mod types;
mod width;
mod wrap;

pub use segment::{segment, TIMING_EPSILON};
pub use types::{DisplayCue, LayoutConfig, RecognizedSpan, WordTiming};
pub use width::{max_chars_per_line, scale_font_size, DEFAULT_CHARS_PER_LINE, MIN_CHARS_PER_LINE};
pub use wrap::wrap_lines;
