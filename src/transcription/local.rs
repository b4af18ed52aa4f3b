//! Local `whisper` command backend.

use super::Transcriber;
use crate::error::{Result, SubburnError};
use crate::layout::{RecognizedSpan, WordTiming};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Transcriber that shells out to a locally installed whisper CLI.
pub struct LocalWhisperTranscriber {
    command: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
    #[serde(default)]
    words: Vec<WordTiming>,
}

impl LocalWhisperTranscriber {
    pub fn new(command: &str, model: &str) -> Self {
        Self {
            command: command.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Transcriber for LocalWhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display(), model = %self.model))]
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<RecognizedSpan>> {
        let out_dir = tempfile::tempdir()?;
        info!("Running {} with model {}", self.command, self.model);

        let mut command = Command::new(&self.command);
        command
            .arg(audio_path)
            .arg("--model").arg(&self.model)
            .arg("--output_format").arg("json")
            .arg("--output_dir").arg(out_dir.path())
            .arg("--word_timestamps").arg("True")
            .arg("--fp16").arg("False")
            .arg("--verbose").arg("False");
        if let Some(lang) = language {
            command.arg("--language").arg(lang);
        }

        let result = command
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() => {}
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                return Err(SubburnError::ToolFailed(format!(
                    "{} failed: {}",
                    self.command,
                    err.trim()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SubburnError::ToolNotFound(self.command.clone()));
            }
            Err(e) => {
                return Err(SubburnError::ToolFailed(format!("{} error: {e}", self.command)));
            }
        }

        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        let json_path = out_dir.path().join(format!("{}.json", stem));
        let content = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            SubburnError::Transcription(format!("Missing output {:?}: {}", json_path, e))
        })?;

        let spans = parse_output(&content)?;
        debug!("Transcribed {} spans", spans.len());
        Ok(spans)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn parse_output(content: &str) -> Result<Vec<RecognizedSpan>> {
    let output: WhisperOutput = serde_json::from_str(content)?;

    Ok(output
        .segments
        .into_iter()
        .filter_map(|segment| {
            let text = segment.text.trim();
            if text.is_empty() {
                return None;
            }
            let words = segment
                .words
                .into_iter()
                .filter_map(|mut w| {
                    let trimmed = w.text.trim();
                    if trimmed.is_empty() {
                        return None;
                    }
                    w.text = trimmed.to_string();
                    Some(w)
                })
                .collect();
            Some(RecognizedSpan::new(segment.start, segment.end, text).with_words(words))
        })
        .collect())
}
