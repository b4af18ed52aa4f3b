//! Speech-to-text backends.
//!
//! Every backend returns [`RecognizedSpan`]s with word timings attached when
//! the recognizer supplies them.
//!
//! # Providers
//!
//! - **OpenAI** (default): the hosted transcription API, with long audio split
//!   into chunks that are transcribed concurrently.
//! - **Local**: a locally installed `whisper` command with word timestamps.

mod local;
mod openai;
mod registry;

pub use local::LocalWhisperTranscriber;
pub use openai::OpenAITranscriber;
pub use registry::ModelRegistry;

use crate::error::Result;
use crate::layout::{RecognizedSpan, WordTiming};
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into timed spans. `language` is an optional
    /// ISO 639-1 hint.
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>)
        -> Result<Vec<RecognizedSpan>>;

    /// Name of the loaded model.
    fn model(&self) -> &str;
}

/// Distribute word timings over spans by start time. A word belongs to the
/// last span that starts at or before it; earlier words go to the first span.
/// Blank words are dropped and the rest are trimmed.
pub(crate) fn attach_words(
    mut spans: Vec<RecognizedSpan>,
    words: impl IntoIterator<Item = WordTiming>,
) -> Vec<RecognizedSpan> {
    if spans.is_empty() {
        return spans;
    }

    let mut idx = 0;
    for mut word in words {
        let text = word.text.trim();
        if text.is_empty() {
            continue;
        }
        word.text = text.to_string();

        while idx + 1 < spans.len() && word.start >= spans[idx + 1].start {
            idx += 1;
        }
        spans[idx].words.push(word);
    }

    spans
}

/// Shift a chunk's spans and words by the chunk offset.
pub(crate) fn offset_spans(spans: &mut [RecognizedSpan], offset: f64) {
    for span in spans {
        span.start += offset;
        span.end += offset;
        for word in &mut span.words {
            word.start += offset;
            word.end += offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_words_by_start_time() {
        let spans = vec![
            RecognizedSpan::new(0.0, 2.0, "hello there"),
            RecognizedSpan::new(2.0, 4.0, "general kenobi"),
        ];
        let words = vec![
            WordTiming::new(" hello", 0.0, 0.5),
            WordTiming::new(" there", 0.6, 1.9),
            WordTiming::new(" general", 2.0, 2.8),
            WordTiming::new(" kenobi", 2.9, 3.9),
        ];

        let spans = attach_words(spans, words);
        assert_eq!(spans[0].words.len(), 2);
        assert_eq!(spans[1].words.len(), 2);
        assert_eq!(spans[1].words[0].text, "general");
        assert!(spans.iter().all(|s| s.has_reliable_word_timings()));
    }

    #[test]
    fn test_attach_words_before_first_span() {
        let spans = vec![RecognizedSpan::new(1.0, 2.0, "late")];
        let spans = attach_words(spans, vec![WordTiming::new("late", 0.8, 1.5)]);
        assert_eq!(spans[0].words.len(), 1);
    }

    #[test]
    fn test_attach_words_skips_blank() {
        let spans = vec![RecognizedSpan::new(0.0, 1.0, "x")];
        let spans = attach_words(
            spans,
            vec![WordTiming::new("  ", 0.0, 0.1), WordTiming::new("x", 0.1, 0.5)],
        );
        assert_eq!(spans[0].words.len(), 1);
    }

    #[test]
    fn test_attach_words_no_spans() {
        assert!(attach_words(Vec::new(), vec![WordTiming::new("a", 0.0, 1.0)]).is_empty());
    }

    #[test]
    fn test_offset_spans() {
        let mut spans = vec![RecognizedSpan::new(0.0, 1.0, "a")
            .with_words(vec![WordTiming::new("a", 0.2, 0.8)])];
        offset_spans(&mut spans, 600.0);
        assert_eq!(spans[0].start, 600.0);
        assert_eq!(spans[0].words[0].end, 600.8);
    }
}
