//! Error types for Subburn.
//!
//! The layout, highlight and markup modules never fail; everything here
//! comes from configuration, external tools, or the transcription backends.

use thiserror::Error;

/// Library-level error type for Subburn operations.
#[derive(Error, Debug)]
pub enum SubburnError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Media processing failed: {0}")]
    Media(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Subburn operations.
pub type Result<T> = std::result::Result<T, SubburnError>;
