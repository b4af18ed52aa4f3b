//! File helpers shared by the cue-producing commands.

use crate::cli::Output;
use crate::layout::{DisplayCue, RecognizedSpan};
use crate::markup::{CueDocument, StyleSpec};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Accepted shapes for a spans file.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum SpansFile {
    /// A document written by `subburn transcribe --format json`.
    Document(CueDocument),
    /// A bare array of recognizer spans.
    Spans(Vec<RecognizedSpan>),
}

impl SpansFile {
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn into_spans(self) -> Vec<RecognizedSpan> {
        match self {
            SpansFile::Document(doc) => doc.spans,
            SpansFile::Spans(spans) => spans,
        }
    }

    /// Canvas recorded by a previous layout run.
    pub fn canvas(&self) -> Option<(u32, u32)> {
        match self {
            SpansFile::Document(doc) => Some((doc.layout.video_width, doc.layout.video_height)),
            SpansFile::Spans(_) => None,
        }
    }
}

pub fn read_spans(path: &str) -> Result<SpansFile> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    SpansFile::parse(&json).with_context(|| format!("{} is not a spans or cue document", path))
}

/// Load a style from TOML or JSON, chosen by extension.
pub fn read_style(path: &str) -> Result<StyleSpec> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&text).with_context(|| format!("Invalid style JSON in {}", path))
    } else {
        toml::from_str(&text).with_context(|| format!("Invalid style TOML in {}", path))
    }
}

/// Write to `output`, or print to stdout when none is given.
pub fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, content).with_context(|| format!("Failed to write {}", path))?;
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Show the first few cues after writing them to a file.
pub fn preview(cues: &[DisplayCue]) {
    const SHOWN: usize = 3;

    if cues.is_empty() {
        Output::warning("No cues were produced.");
        return;
    }
    Output::header("Preview");
    for cue in cues.iter().take(SHOWN) {
        Output::cue(cue);
    }
    if cues.len() > SHOWN {
        Output::list_item(&format!("... and {} more", cues.len() - SHOWN));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_spans() {
        let file = SpansFile::parse(
            r#"[{"start": 0.0, "end": 1.5, "text": "hello there",
                 "words": [{"word": "hello", "start": 0.0, "end": 0.6},
                           {"word": "there", "start": 0.7, "end": 1.5}]}]"#,
        )
        .unwrap();
        assert!(file.canvas().is_none());
        let spans = file.into_spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].words.len(), 2);
    }

    #[test]
    fn test_parse_document_keeps_canvas() {
        let file = SpansFile::parse(
            r#"{"layout": {"maxLines": 2, "maxWidthPercent": 0.7, "fontSize": 24,
                           "videoWidth": 1920, "videoHeight": 1080},
                "spans": [{"start": 0.0, "end": 1.0, "text": "hi"}],
                "cues": []}"#,
        )
        .unwrap();
        assert_eq!(file.canvas(), Some((1920, 1080)));
        assert_eq!(file.into_spans()[0].text, "hi");
    }

    #[test]
    fn test_read_style_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("style.toml");
        std::fs::write(&toml_path, "font_size = 40\nposition = \"top\"\n").unwrap();
        let style = read_style(toml_path.to_str().unwrap()).unwrap();
        assert_eq!(style.font_size, 40);

        let json_path = dir.path().join("style.json");
        std::fs::write(&json_path, r#"{"fontSize": 30, "glow": true}"#).unwrap();
        let style = read_style(json_path.to_str().unwrap()).unwrap();
        assert_eq!(style.font_size, 30);
        assert!(style.glow);
    }
}
