//! Cue output formatting (JSON, SRT, VTT, ASS).

use serde::{Deserialize, Serialize};

use super::ass;
use super::style::StyleSpec;
use crate::layout::{DisplayCue, LayoutConfig, RecognizedSpan};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CueFormat {
    Json,
    Srt,
    Vtt,
    Ass,
}

impl std::str::FromStr for CueFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(CueFormat::Json),
            "srt" => Ok(CueFormat::Srt),
            "vtt" | "webvtt" => Ok(CueFormat::Vtt),
            "ass" | "ssa" => Ok(CueFormat::Ass),
            _ => Err(format!("Unknown format: {}. Use json, srt, vtt, or ass.", s)),
        }
    }
}

impl CueFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            CueFormat::Json => "json",
            CueFormat::Srt => "srt",
            CueFormat::Vtt => "vtt",
            CueFormat::Ass => "ass",
        }
    }
}

/// Layout result for one media file: the recognizer output and the cues
/// derived from it. This is also the JSON export format, and it can be fed
/// back to `render`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueDocument {
    pub layout: LayoutConfig,
    #[serde(default)]
    pub spans: Vec<RecognizedSpan>,
    pub cues: Vec<DisplayCue>,
}

/// Format cues for output. `style` only matters for ASS, where its font
/// size is replaced by the one the cues were wrapped for.
pub fn format_cues(document: &CueDocument, format: CueFormat, style: &StyleSpec) -> String {
    match format {
        CueFormat::Json => format_json(document),
        CueFormat::Srt => format_srt(&document.cues),
        CueFormat::Vtt => format_vtt(&document.cues),
        CueFormat::Ass => {
            let style = style.clone().with_font_size(document.layout.font_size);
            ass::emit(&document.cues, &style, &document.layout)
        }
    }
}

fn format_json(document: &CueDocument) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".to_string())
}

/// Format as SRT (SubRip).
fn format_srt(cues: &[DisplayCue]) -> String {
    let mut output = String::new();

    for (i, cue) in cues.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(cue.start),
            format_srt_timestamp(cue.end)
        ));
        output.push_str(&cue.text());
        output.push_str("\n\n");
    }

    output
}

/// Format as WebVTT.
fn format_vtt(cues: &[DisplayCue]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for (i, cue) in cues.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_timestamp(cue.start),
            format_vtt_timestamp(cue.end)
        ));
        output.push_str(&cue.text());
        output.push_str("\n\n");
    }

    output
}

fn split_millis(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}

/// Format timestamp for SRT (00:00:00,000).
fn format_srt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_millis(seconds);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Format timestamp for VTT (00:00:00.000).
fn format_vtt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_millis(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}
