//! Media inspection with ffprobe.

use crate::error::{Result, SubburnError};
use serde::Serialize;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Pixel size of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

/// Probe the width and height of the first video stream.
///
/// Fails for audio-only files; callers fall back to a fixed canvas.
#[instrument(fields(path = %path.display()))]
pub async fn probe_dimensions(path: &Path) -> Result<VideoDimensions> {
    let parsed = run_ffprobe(path, &["-select_streams", "v:0", "-show_streams"]).await?;
    let dimensions = parse_dimensions(&parsed)
        .ok_or_else(|| SubburnError::Media(format!("No video stream in {}", path.display())))?;

    debug!("Probed {}x{}", dimensions.width, dimensions.height);
    Ok(dimensions)
}

/// Queries the duration of a media file in seconds.
#[instrument(fields(path = %path.display()))]
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let parsed = run_ffprobe(path, &["-show_format"]).await?;
    parse_duration(&parsed)
        .ok_or_else(|| SubburnError::Media("Could not determine media duration".into()))
}

async fn run_ffprobe(path: &Path, args: &[&str]) -> Result<serde_json::Value> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .args(args)
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SubburnError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(SubburnError::ToolFailed(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(SubburnError::Media(format!(
            "ffprobe could not read {}",
            path.display()
        )));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|_| SubburnError::Media("Invalid ffprobe output".into()))
}

fn parse_dimensions(parsed: &serde_json::Value) -> Option<VideoDimensions> {
    let stream = parsed["streams"]
        .as_array()?
        .iter()
        .find(|s| s["codec_type"].as_str().map_or(true, |t| t == "video"))?;

    let width = stream["width"].as_u64()? as u32;
    let height = stream["height"].as_u64()? as u32;
    (width > 0 && height > 0).then_some(VideoDimensions { width, height })
}

fn parse_duration(parsed: &serde_json::Value) -> Option<f64> {
    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
}
