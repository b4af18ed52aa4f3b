//! Word-level highlight scheduling for karaoke-style rendering.
//!
//! For a cue with word timings, [`schedule`] produces one event per token so
//! a renderer can mark the word being spoken. Events tile the cue interval
//! without gaps or overlaps even when the recognizer's timings are noisy.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::DisplayCue;

/// How the active word is emphasized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HighlightMode {
    /// Plain cues, no per-word events.
    #[default]
    None,
    /// The active word changes color.
    Color,
    /// The active word changes color and grows.
    Karaoke,
}

impl HighlightMode {
    /// Parse a mode name. Unknown names fall back to [`HighlightMode::None`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "color" | "colour" | "word" => HighlightMode::Color,
            "karaoke" => HighlightMode::Karaoke,
            _ => HighlightMode::None,
        }
    }

    pub fn is_active(self) -> bool {
        self != HighlightMode::None
    }
}

impl From<String> for HighlightMode {
    fn from(value: String) -> Self {
        HighlightMode::parse(&value)
    }
}

impl From<HighlightMode> for String {
    fn from(mode: HighlightMode) -> Self {
        mode.to_string()
    }
}

impl std::fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HighlightMode::None => write!(f, "none"),
            HighlightMode::Color => write!(f, "color"),
            HighlightMode::Karaoke => write!(f, "karaoke"),
        }
    }
}

/// A sub-interval of a cue during which one word is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightEvent {
    pub start: f64,
    pub end: f64,
    /// Index into the cue's tokens, counted across lines.
    pub active_word_index: usize,
}

/// Compute highlight events for one cue.
///
/// Word timings are used when there is exactly one per token; otherwise the
/// cue duration is spread evenly. The first event starts at `cue.start`, the
/// last ends at `cue.end`, and each event ends where the next begins.
pub fn schedule(cue: &DisplayCue) -> Vec<HighlightEvent> {
    let token_count = cue.token_count();
    if token_count == 0 {
        return Vec::new();
    }

    let word_starts: Vec<f64> = if cue.words.len() == token_count {
        cue.words.iter().map(|w| w.start).collect()
    } else {
        debug!(
            "Cue at {:.2}s has {} word timings for {} tokens, estimating",
            cue.start,
            cue.words.len(),
            token_count
        );
        let step = cue.duration() / token_count as f64;
        (0..token_count)
            .map(|k| cue.start + k as f64 * step)
            .collect()
    };

    let mut events = Vec::with_capacity(token_count);
    let mut cursor = cue.start;

    for k in 0..token_count {
        let start = cursor;
        let end = if k + 1 == token_count {
            cue.end
        } else {
            word_starts[k + 1].max(start).min(cue.end)
        };

        events.push(HighlightEvent {
            start,
            end,
            active_word_index: k,
        });
        cursor = end;
    }

    events
}

/// Font size for the active word. Small fonts get a larger relative boost
/// so the absolute growth looks similar across sizes.
pub fn highlighted_font_size(base_font_size: u32) -> u32 {
    let factor = if base_font_size < 20 {
        1.25
    } else if base_font_size < 30 {
        1.20
    } else if base_font_size > 48 {
        1.10
    } else {
        1.15
    };

    (base_font_size as f64 * factor).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::WordTiming;

    fn cue_with_words(start: f64, end: f64, words: &[(&str, f64, f64)]) -> DisplayCue {
        let text = words.iter().map(|(w, _, _)| *w).collect::<Vec<_>>().join(" ");
        DisplayCue::new(
            start,
            end,
            vec![text],
            words
                .iter()
                .map(|(w, s, e)| WordTiming::new(*w, *s, *e))
                .collect(),
        )
    }

    fn assert_tiles(events: &[HighlightEvent], cue: &DisplayCue) {
        assert_eq!(events.len(), cue.token_count());
        assert_eq!(events[0].start, cue.start);
        assert_eq!(events.last().unwrap().end, cue.end);
        for pair in events.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.active_word_index, i);
            assert!(event.start <= event.end);
        }
    }

    #[test]
    fn test_schedule_tiles_cue() {
        let cue = cue_with_words(
            1.0,
            3.0,
            &[("one", 1.1, 1.5), ("two", 1.6, 2.1), ("three", 2.2, 2.8)],
        );
        let events = schedule(&cue);
        assert_tiles(&events, &cue);
        assert_eq!(events[0].end, 1.6);
        assert_eq!(events[1].end, 2.2);
    }

    #[test]
    fn test_schedule_clamps_noisy_timings() {
        // Second word starts before the cue, third after it.
        let cue = cue_with_words(
            2.0,
            4.0,
            &[("a", 1.5, 2.2), ("b", 1.9, 2.5), ("c", 4.5, 5.0)],
        );
        let events = schedule(&cue);
        assert_tiles(&events, &cue);
        assert_eq!(events[0].end, 2.0);
        assert_eq!(events[1].end, 4.0);
    }

    #[test]
    fn test_schedule_spans_multiple_lines() {
        let cue = DisplayCue::new(
            0.0,
            2.0,
            vec!["alpha beta".to_string(), "gamma".to_string()],
            vec![
                WordTiming::new("alpha", 0.0, 0.5),
                WordTiming::new("beta", 0.5, 1.0),
                WordTiming::new("gamma", 1.0, 2.0),
            ],
        );
        let events = schedule(&cue);
        assert_tiles(&events, &cue);
        assert_eq!(events[2].active_word_index, 2);
    }

    #[test]
    fn test_schedule_estimates_on_mismatch() {
        let cue = DisplayCue::new(
            0.0,
            4.0,
            vec!["one two three four".to_string()],
            vec![WordTiming::new("one", 0.0, 1.0)],
        );
        let events = schedule(&cue);
        assert_tiles(&events, &cue);
        assert_eq!(events[1].start, 1.0);
        assert_eq!(events[2].start, 2.0);
    }

    #[test]
    fn test_schedule_empty_cue() {
        let cue = DisplayCue::new(0.0, 1.0, Vec::new(), Vec::new());
        assert!(schedule(&cue).is_empty());
    }

    #[test]
    fn test_highlight_banding() {
        assert_eq!(highlighted_font_size(18), (18.0f64 * 1.25).round() as u32);
        assert_eq!(highlighted_font_size(24), (24.0f64 * 1.20).round() as u32);
        assert_eq!(highlighted_font_size(36), (36.0f64 * 1.15).round() as u32);
        assert_eq!(highlighted_font_size(60), (60.0f64 * 1.10).round() as u32);
        assert_eq!(highlighted_font_size(48), (48.0f64 * 1.15).round() as u32);
    }

    #[test]
    fn test_highlight_mode_parse() {
        assert_eq!(HighlightMode::parse("karaoke"), HighlightMode::Karaoke);
        assert_eq!(HighlightMode::parse("Color"), HighlightMode::Color);
        assert_eq!(HighlightMode::parse("sparkles"), HighlightMode::None);
        assert!(!HighlightMode::None.is_active());
    }

    #[test]
    fn test_highlight_mode_unknown_deserializes_to_none() {
        let mode: HighlightMode = serde_json::from_str("\"rainbow\"").unwrap();
        assert_eq!(mode, HighlightMode::None);
        assert_eq!(serde_json::to_string(&HighlightMode::Karaoke).unwrap(), "\"karaoke\"");
    }
}
