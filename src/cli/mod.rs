//! CLI module for Subburn.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_duration, Output};

use crate::orchestrator::LayoutOverrides;
use clap::{Args, Parser, Subcommand};

/// Subburn - Subtitle generation and burn-in
///
/// Transcribes speech in a video, lays the words out as screen-ready cues
/// and burns them into the picture with optional word highlighting.
#[derive(Parser, Debug)]
#[command(name = "subburn")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Layout parameters shared by the commands that produce cues.
#[derive(Args, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// Maximum lines per cue
    #[arg(long)]
    pub max_lines: Option<usize>,

    /// Maximum line width as a fraction (0.7) or percentage (70) of the video width
    #[arg(long)]
    pub max_width: Option<f64>,

    /// Base font size in pixels
    #[arg(long)]
    pub font_size: Option<u32>,
}

impl LayoutArgs {
    pub fn overrides(&self) -> LayoutOverrides {
        LayoutOverrides {
            max_lines: self.max_lines,
            max_width_percent: self.max_width,
            font_size: self.font_size,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Subburn and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Transcribe a video or audio file into subtitle cues
    Transcribe {
        /// Local video or audio file
        input: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, srt, vtt, ass)
        #[arg(long, default_value = "json")]
        format: String,

        /// Language hint for the recognizer (e.g. "en", "no")
        #[arg(short, long)]
        language: Option<String>,

        /// Transcription model to use
        #[arg(short, long)]
        model: Option<String>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Lay out previously recognized spans without touching any media
    Layout {
        /// JSON file with spans, or a document written by `transcribe`
        spans: String,

        /// Target video width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Target video height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, srt, vtt, ass)
        #[arg(long, default_value = "json")]
        format: String,

        /// Style file (TOML or JSON) used for ASS output
        #[arg(long)]
        style: Option<String>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Burn subtitles into a video
    Render {
        /// Source video file
        input: String,

        /// JSON file with spans, or a document written by `transcribe`
        #[arg(short, long)]
        subtitles: String,

        /// Output video (defaults to <input>_subtitled.<ext>)
        #[arg(short, long)]
        output: Option<String>,

        /// Style file (TOML or JSON); defaults to the [style] config section
        #[arg(long)]
        style: Option<String>,

        /// Word highlight mode (none, color, karaoke)
        #[arg(long)]
        highlight: Option<String>,

        /// Named position (bottom, top, middle, top-left, ...)
        #[arg(long)]
        position: Option<String>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Start HTTP API server for the web frontend
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "layout.max_lines")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
