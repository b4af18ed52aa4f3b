//! Media probing and transcoding through the ffmpeg command-line tools.

mod ffmpeg;
mod probe;

pub use ffmpeg::{burn_subtitles, extract_audio, split_audio};
pub use probe::{probe_dimensions, probe_duration, VideoDimensions};
