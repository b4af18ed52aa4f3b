//! OpenAI transcription API backend.

use super::{attach_words, offset_spans, Transcriber};
use crate::error::{Result, SubburnError};
use crate::layout::{RecognizedSpan, WordTiming};
use crate::media::split_audio;
use crate::openai::create_client;
use async_openai::types::{
    AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs, TimestampGranularity,
};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Transcriber backed by the hosted Whisper API.
pub struct OpenAITranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    chunk_duration_seconds: u32,
    max_concurrent_chunks: usize,
}

impl OpenAITranscriber {
    /// Create a transcriber with default chunking.
    pub fn new(model: &str) -> Result<Self> {
        Self::with_config(model, 600, 3)
    }

    /// Create a transcriber with custom chunking.
    pub fn with_config(
        model: &str,
        chunk_duration_seconds: u32,
        max_concurrent_chunks: usize,
    ) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            chunk_duration_seconds,
            max_concurrent_chunks: max_concurrent_chunks.max(1),
        })
    }

    /// Transcribe a single audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<RecognizedSpan>> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.wav")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson)
            .timestamp_granularities(vec![
                TimestampGranularity::Segment,
                TimestampGranularity::Word,
            ]);

        if let Some(lang) = language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| SubburnError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| SubburnError::OpenAI(format!("Whisper API error: {}", e)))?;

        let spans: Vec<RecognizedSpan> = match response.segments {
            Some(segments) => segments
                .iter()
                .map(|s| RecognizedSpan::new(s.start as f64, s.end as f64, s.text.trim()))
                .filter(|s| !s.text.is_empty())
                .collect(),
            None => {
                // Fallback: one span from the full text
                let text = response.text.trim();
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![RecognizedSpan::new(0.0, response.duration as f64, text)]
                }
            }
        };

        let words: Vec<WordTiming> = response
            .words
            .unwrap_or_else(|| {
                warn!("No word-level timestamps returned");
                Vec::new()
            })
            .into_iter()
            .map(|w| WordTiming::new(w.word, w.start as f64, w.end as f64))
            .collect();

        debug!("Transcribed {} spans, {} words", spans.len(), words.len());
        Ok(attach_words(spans, words))
    }

    /// Transcribe an audio file, splitting if necessary.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_with_splitting(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<RecognizedSpan>> {
        let temp_dir = tempfile::tempdir()?;
        let chunks = split_audio(audio_path, temp_dir.path(), self.chunk_duration_seconds).await?;

        if chunks.len() == 1 {
            return self.transcribe_single(audio_path, language).await;
        }

        let chunk_count = chunks.len();
        info!("Processing {} audio chunks with {}", chunk_count, self.model);

        let pb = ProgressBar::new(chunk_count as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("  {spinner:.green} Whisper   [{bar:30.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }

        // Process chunks in parallel with concurrency limit, fail fast on error
        let mut results: Vec<(usize, f64, Vec<RecognizedSpan>)> = Vec::with_capacity(chunk_count);

        let mut stream = stream::iter(chunks.into_iter().enumerate())
            .map(|(idx, (chunk_path, time_offset))| {
                let language = language.map(|s| s.to_string());
                async move {
                    let result = self.transcribe_single(&chunk_path, language.as_deref()).await;
                    (idx, time_offset, result)
                }
            })
            .buffer_unordered(self.max_concurrent_chunks);

        while let Some((idx, time_offset, result)) = stream.next().await {
            pb.inc(1);
            match result {
                Ok(spans) => results.push((idx, time_offset, spans)),
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(SubburnError::Transcription(format!(
                        "Chunk {} at {:.0}s failed: {}",
                        idx, time_offset, e
                    )));
                }
            }
        }

        pb.finish_and_clear();

        // Sort by chunk index and merge spans
        results.sort_by_key(|(idx, _, _)| *idx);

        let mut all_spans = Vec::new();
        for (_, time_offset, mut spans) in results {
            offset_spans(&mut spans, time_offset);
            all_spans.extend(spans);
        }

        Ok(all_spans)
    }
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<RecognizedSpan>> {
        self.transcribe_with_splitting(audio_path, language).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_config_clamps_concurrency() {
        let transcriber = OpenAITranscriber::with_config("whisper-1", 60, 0).unwrap();
        assert_eq!(transcriber.max_concurrent_chunks, 1);
        assert_eq!(transcriber.model(), "whisper-1");
    }
}
