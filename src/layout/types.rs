//! Data types shared by the layout, highlight and markup stages.

use serde::{Deserialize, Serialize};

use super::width::max_chars_per_line;

/// One recognized word with its timing, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    #[serde(alias = "word")]
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl WordTiming {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// One utterance segment as returned by a speech recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedSpan {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Word-level timings; empty when the recognizer did not supply them.
    #[serde(default)]
    pub words: Vec<WordTiming>,
}

impl RecognizedSpan {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: Vec::new(),
        }
    }

    pub fn with_words(mut self, words: Vec<WordTiming>) -> Self {
        self.words = words;
        self
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whitespace-delimited tokens of the trimmed text.
    pub fn tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    /// True when there is exactly one word timing per token.
    pub fn has_reliable_word_timings(&self) -> bool {
        !self.words.is_empty() && self.words.len() == self.text.split_whitespace().count()
    }
}

/// Parameters for one formatting run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub max_lines: usize,
    /// Fraction of the video width available to text, in (0, 1].
    pub max_width_percent: f64,
    /// Font size in pixels, already adjusted for the video resolution.
    pub font_size: u32,
    pub video_width: u32,
    pub video_height: u32,
}

impl LayoutConfig {
    /// Build a config, accepting `max_width_percent` either as a fraction
    /// (`0.7`) or as a percentage (`70`).
    pub fn new(
        max_lines: usize,
        max_width_percent: f64,
        font_size: u32,
        video_width: u32,
        video_height: u32,
    ) -> Self {
        let max_width_percent = if max_width_percent > 1.0 {
            max_width_percent / 100.0
        } else {
            max_width_percent
        };

        Self {
            max_lines: max_lines.max(1),
            max_width_percent,
            font_size,
            video_width,
            video_height,
        }
    }

    /// Characters that fit on one line.
    pub fn char_budget(&self) -> usize {
        max_chars_per_line(self.video_width, self.max_width_percent, self.font_size)
    }

    /// Characters one cue may hold across all of its lines.
    pub fn segment_capacity(&self) -> usize {
        self.char_budget().saturating_mul(self.max_lines.max(1))
    }
}

/// One timed, line-wrapped subtitle ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayCue {
    pub start: f64,
    pub end: f64,
    pub lines: Vec<String>,
    /// Word timings for exactly the words in `lines`; empty when unknown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<WordTiming>,
}

impl DisplayCue {
    pub fn new(start: f64, end: f64, lines: Vec<String>, words: Vec<WordTiming>) -> Self {
        Self {
            start,
            end,
            lines,
            words,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Lines joined with a newline.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Tokens across all lines, in reading order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().flat_map(|line| line.split_whitespace())
    }

    pub fn token_count(&self) -> usize {
        self.tokens().count()
    }

    pub fn has_word_timings(&self) -> bool {
        !self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_config_accepts_percentages() {
        let cfg = LayoutConfig::new(2, 70.0, 24, 1280, 720);
        assert!((cfg.max_width_percent - 0.7).abs() < 1e-9);

        let cfg = LayoutConfig::new(2, 0.5, 24, 1280, 720);
        assert!((cfg.max_width_percent - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_layout_config_zero_lines_becomes_one() {
        let cfg = LayoutConfig::new(0, 0.5, 24, 1280, 720);
        assert_eq!(cfg.max_lines, 1);
    }

    #[test]
    fn test_segment_capacity() {
        let cfg = LayoutConfig::new(2, 0.5, 24, 1280, 720);
        assert_eq!(cfg.char_budget(), 44);
        assert_eq!(cfg.segment_capacity(), 88);
    }

    #[test]
    fn test_segment_capacity_saturates() {
        let cfg = LayoutConfig::new(usize::MAX, 0.7, 24, 1280, 720);
        assert_eq!(cfg.segment_capacity(), usize::MAX);

        let cfg = LayoutConfig::new(2, 1e300, 24, 1280, 720);
        assert_eq!(cfg.segment_capacity(), 2 * cfg.char_budget());
    }

    #[test]
    fn test_reliable_word_timings() {
        let span = RecognizedSpan::new(0.0, 1.0, "hello world").with_words(vec![
            WordTiming::new("hello", 0.0, 0.5),
            WordTiming::new("world", 0.5, 1.0),
        ]);
        assert!(span.has_reliable_word_timings());

        let span = RecognizedSpan::new(0.0, 1.0, "hello big world")
            .with_words(vec![WordTiming::new("hello", 0.0, 0.5)]);
        assert!(!span.has_reliable_word_timings());
    }

    #[test]
    fn test_word_timing_accepts_recognizer_field_name() {
        let word: WordTiming =
            serde_json::from_str(r#"{"word": "hi", "start": 0.1, "end": 0.3}"#).unwrap();
        assert_eq!(word.text, "hi");
    }

    #[test]
    fn test_span_without_words_deserializes() {
        let span: RecognizedSpan =
            serde_json::from_str(r#"{"start": 0.0, "end": 2.0, "text": "hello"}"#).unwrap();
        assert!(span.words.is_empty());
    }

    #[test]
    fn test_cue_tokens_span_lines() {
        let cue = DisplayCue::new(
            0.0,
            1.0,
            vec!["one two".to_string(), "three".to_string()],
            Vec::new(),
        );
        assert_eq!(cue.tokens().collect::<Vec<_>>(), vec!["one", "two", "three"]);
        assert_eq!(cue.text(), "one two\nthree");
    }
}
