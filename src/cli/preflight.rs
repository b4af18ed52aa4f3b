//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::{Settings, TranscriptionProvider};
use crate::error::{Result, SubburnError};
use crate::openai::is_api_key_configured;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Transcription needs ffmpeg, ffprobe and a recognizer.
    Transcribe,
    /// Burn-in needs ffmpeg and ffprobe.
    Render,
    /// Layout of existing spans is pure.
    Layout,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Transcribe => {
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
            match settings.transcription.provider {
                TranscriptionProvider::OpenAI => check_api_key()?,
                TranscriptionProvider::Local => {
                    check_tool(&settings.transcription.local_command)?
                }
            }
        }
        Operation::Render => {
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
        Operation::Layout => {
            // No external requirements for layout
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        Ok(())
    } else {
        Err(SubburnError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --help
    let probe_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--help",
    };
    match Command::new(name).arg(probe_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(SubburnError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SubburnError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(SubburnError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
