//! Turning recognized spans into display cues.
//!
//! A span that fits in one cue is wrapped in place. A longer span is packed
//! first-fit into cue-sized token groups by total character count, and each
//! group is timed either from its word timings or by spreading the span's
//! duration evenly over its tokens.

use std::ops::Range;

use tracing::debug;

use super::types::{DisplayCue, LayoutConfig, RecognizedSpan};
use super::wrap::wrap_lines;

/// Gap used to keep `start < end` when a computed interval collapses.
pub const TIMING_EPSILON: f64 = 0.01;

/// Lay out every span. Empty spans produce no cues.
pub fn segment(spans: &[RecognizedSpan], cfg: &LayoutConfig) -> Vec<DisplayCue> {
    let char_budget = cfg.char_budget();
    let max_lines = cfg.max_lines.max(1);
    let capacity = cfg.segment_capacity();

    let cues: Vec<DisplayCue> = spans
        .iter()
        .flat_map(|span| segment_span(span, char_budget, max_lines, capacity))
        .collect();

    debug!(
        "Laid out {} spans into {} cues (budget {} chars x {} lines)",
        spans.len(),
        cues.len(),
        char_budget,
        max_lines
    );

    cues
}

fn segment_span(
    span: &RecognizedSpan,
    char_budget: usize,
    max_lines: usize,
    capacity: usize,
) -> Vec<DisplayCue> {
    let text = span.text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if text.chars().count() <= capacity {
        let (start, end) = ordered(span.start, span.end);
        return vec![DisplayCue::new(
            start,
            end,
            wrap_lines(text, char_budget, max_lines),
            span.words.clone(),
        )];
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let timed = span.words.len() == tokens.len();
    if !timed && !span.words.is_empty() {
        debug!(
            "Span at {:.2}s has {} word timings for {} tokens, estimating",
            span.start,
            span.words.len(),
            tokens.len()
        );
    }

    let groups = pack_tokens(&tokens, capacity);
    let avg_word_duration = span.duration() / tokens.len() as f64;
    let mut cues = Vec::with_capacity(groups.len());
    let mut cursor = span.start;

    for (i, group) in groups.iter().enumerate() {
        let is_last = i + 1 == groups.len();
        let start = cursor;
        let end = if timed {
            span.words[group.end - 1].end
        } else if is_last {
            span.end
        } else {
            (start + group.len() as f64 * avg_word_duration).min(span.end)
        };
        let (start, end) = ordered(start, end);

        let words = if timed {
            span.words[group.clone()].to_vec()
        } else {
            Vec::new()
        };
        let group_text = tokens[group.clone()].join(" ");

        cues.push(DisplayCue::new(
            start,
            end,
            wrap_lines(&group_text, char_budget, max_lines),
            words,
        ));
        cursor = end;
    }

    cues
}

/// First-fit packing of tokens into groups of at most `capacity` characters,
/// counting one separating space between tokens. A token longer than the
/// capacity gets a group of its own.
fn pack_tokens(tokens: &[&str], capacity: usize) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut group_start = 0;
    let mut group_len = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let token_len = token.chars().count();
        if i == group_start {
            group_len = token_len;
            continue;
        }

        if group_len.saturating_add(1 + token_len) > capacity {
            groups.push(group_start..i);
            group_start = i;
            group_len = token_len;
        } else {
            group_len += 1 + token_len;
        }
    }

    if group_start < tokens.len() {
        groups.push(group_start..tokens.len());
    }

    groups
}

/// Nudge a collapsed interval so that `start < end`.
fn ordered(start: f64, end: f64) -> (f64, f64) {
    if end > start {
        return (start, end);
    }

    let nudged = end - TIMING_EPSILON;
    if nudged >= 0.0 {
        (nudged, end)
    } else {
        (end.max(0.0), end.max(0.0) + TIMING_EPSILON)
    }
}
