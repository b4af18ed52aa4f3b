//! Subburn - Subtitle generation and burn-in
//!
//! Turns the speech in a video into styled subtitles and renders a copy of
//! the video with those subtitles burned into the picture.
//!
//! # Overview
//!
//! Subburn allows you to:
//! - Transcribe local video or audio files with Whisper (API or local CLI)
//! - Lay out recognized speech as screen-ready cues sized to the video
//! - Highlight the spoken word karaoke-style
//! - Export cues as JSON, SRT, WebVTT or ASS, or burn them in with ffmpeg
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `layout` - Line-width estimation, wrapping and cue segmentation
//! - `highlight` - Active-word highlight scheduling
//! - `markup` - ASS script emission and other cue formats
//! - `transcription` - Speech-to-text transcription
//! - `media` - ffprobe/ffmpeg wrappers
//! - `jobs` - Progress tracking for long-running work
//! - `orchestrator` - Pipeline coordination
//! - `config` - Configuration management
//!
//! # Example
//!
//! ```rust,no_run
//! use subburn::config::Settings;
//! use subburn::markup::StyleSpec;
//! use subburn::orchestrator::{LayoutOverrides, Orchestrator};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!     let overrides = LayoutOverrides::default();
//!
//!     let video = Path::new("talk.mp4");
//!     let document = orchestrator
//!         .transcribe_media(video, &overrides, None, None, None)
//!         .await?;
//!     println!("{} cues", document.cues.len());
//!
//!     orchestrator
//!         .render_video(
//!             video,
//!             &document.spans,
//!             &StyleSpec::default(),
//!             &overrides,
//!             Path::new("talk_subtitled.mp4"),
//!             None,
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod highlight;
pub mod jobs;
pub mod layout;
pub mod markup;
pub mod media;
pub mod openai;
pub mod orchestrator;
pub mod transcription;

pub use error::{Result, SubburnError};
