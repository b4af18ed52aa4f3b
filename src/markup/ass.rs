//! Advanced SubStation Alpha (ASS) script emission.
//!
//! The emitter never re-wraps text: cue lines are joined with `\N` and the
//! script sets `WrapStyle: 2` so the renderer keeps them as they are.

use std::fmt::Write as _;

use crate::highlight::{highlighted_font_size, schedule, HighlightEvent, HighlightMode};
use crate::layout::{DisplayCue, LayoutConfig};

use super::color::AssColor;
use super::position::Placement;
use super::style::StyleSpec;
use super::text::{escape_ass_text, TextTransform};

/// Canvas used when the layout config carries no video size.
pub const FALLBACK_CANVAS: (u32, u32) = (1280, 720);

const DEFAULT_STYLE: &str = "Default";
const CURRENT_WORD_STYLE: &str = "CurrentWord";
const GLOW_BLUR: f64 = 6.0;
const GLOW_ALPHA: &str = "&H80&";

/// Emit a full ASS script. Highlight events are scheduled for every cue with
/// word timings when the style enables highlighting.
pub fn emit(cues: &[DisplayCue], style: &StyleSpec, cfg: &LayoutConfig) -> String {
    let highlighting = style.highlight().is_active();
    let events: Vec<Option<Vec<HighlightEvent>>> = cues
        .iter()
        .map(|cue| (highlighting && cue.has_word_timings()).then(|| schedule(cue)))
        .collect();

    emit_with_events(cues, &events, style, cfg)
}

/// Emit a full ASS script from cues and precomputed highlight events.
///
/// `events[i]` belongs to `cues[i]`. A cue without events, or any cue when
/// the style has highlighting off, is written as one plain dialogue line.
pub fn emit_with_events(
    cues: &[DisplayCue],
    events: &[Option<Vec<HighlightEvent>>],
    style: &StyleSpec,
    cfg: &LayoutConfig,
) -> String {
    let writer = ScriptWriter::new(style, cfg);
    let mut out = writer.header();

    for (i, cue) in cues.iter().enumerate() {
        match events.get(i).and_then(Option::as_ref) {
            Some(cue_events) if writer.mode.is_active() && !cue_events.is_empty() => {
                for event in cue_events {
                    writer.push_highlighted(&mut out, cue, event);
                }
            }
            _ => writer.push_plain(&mut out, cue),
        }
    }

    out
}

/// Format seconds as `H:MM:SS.cc`.
pub fn ass_timestamp(seconds: f64) -> String {
    cs_to_ass(to_centiseconds(seconds))
}

fn to_centiseconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 100.0).round() as u64
    } else {
        0
    }
}

fn cs_to_ass(cs: u64) -> String {
    let h = cs / 360_000;
    let m = (cs % 360_000) / 6_000;
    let s = (cs % 6_000) / 100;
    let c = cs % 100;
    format!("{}:{:02}:{:02}.{:02}", h, m, s, c)
}

struct ScriptWriter<'a> {
    style: &'a StyleSpec,
    mode: HighlightMode,
    placement: Placement,
    transform: TextTransform,
    width: u32,
    height: u32,
}

impl<'a> ScriptWriter<'a> {
    fn new(style: &'a StyleSpec, cfg: &LayoutConfig) -> Self {
        let (width, height) = if cfg.video_width == 0 || cfg.video_height == 0 {
            FALLBACK_CANVAS
        } else {
            (cfg.video_width, cfg.video_height)
        };

        Self {
            style,
            mode: style.highlight(),
            placement: style.position_mode().resolve(width, height),
            transform: style.text_transform(),
            width,
            height,
        }
    }

    fn header(&self) -> String {
        let style = self.style;
        let primary = AssColor::parse(&style.font_color).packed();
        let outline = AssColor::parse(&style.border_color).packed();
        let word_primary = AssColor::parse(&style.current_word_color).packed();
        let word_outline = AssColor::parse(&style.current_word_border_color).packed();
        let bold = if style.bold { -1 } else { 0 };
        let word_size = match self.mode {
            HighlightMode::Karaoke => highlighted_font_size(style.font_size),
            _ => style.font_size,
        };
        let margins = self.placement.margins;

        let mut out = String::new();
        out.push_str("[Script Info]\n");
        out.push_str("ScriptType: v4.00+\n");
        let _ = writeln!(out, "PlayResX: {}", self.width);
        let _ = writeln!(out, "PlayResY: {}", self.height);
        out.push_str("WrapStyle: 2\n");
        out.push_str("ScaledBorderAndShadow: yes\n\n");

        out.push_str("[V4+ Styles]\n");
        out.push_str(
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, \
             BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
             BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
        );
        let _ = writeln!(
            out,
            "Style: {},{},{},{},{},{},&H00000000,{},0,0,0,100,100,0,0,1,{},{},{},{},{},{},1",
            DEFAULT_STYLE,
            style.font_family,
            style.font_size,
            primary,
            primary,
            outline,
            bold,
            style.border_width,
            style.shadow,
            self.placement.alignment,
            margins.left,
            margins.right,
            margins.vertical,
        );
        let _ = writeln!(
            out,
            "Style: {},{},{},{},{},{},&H00000000,-1,0,0,0,100,100,0,0,1,{},{},{},{},{},{},1",
            CURRENT_WORD_STYLE,
            style.font_family,
            word_size,
            word_primary,
            word_primary,
            word_outline,
            style.border_width,
            style.shadow,
            self.placement.alignment,
            margins.left,
            margins.right,
            margins.vertical,
        );

        out.push_str("\n[Events]\n");
        out.push_str(
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        );
        out
    }

    fn push_plain(&self, out: &mut String, cue: &DisplayCue) {
        let body = cue
            .lines
            .iter()
            .map(|line| escape_ass_text(self.transform.apply(line).trim()))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\\N");

        self.push_layers(out, cue.start, cue.end, &body, &body);
    }

    fn push_highlighted(&self, out: &mut String, cue: &DisplayCue, event: &HighlightEvent) {
        let karaoke = self.mode == HighlightMode::Karaoke;
        let grow = format!("{{\\fs{}}}", highlighted_font_size(self.style.font_size));
        let shrink = format!("{{\\fs{}}}", self.style.font_size);

        let main = self.highlighted_body(cue, event.active_word_index, |token| {
            format!("{{\\r{}}}{}{{\\r}}", CURRENT_WORD_STYLE, token)
        });
        let glow = self.highlighted_body(cue, event.active_word_index, |token| {
            if karaoke {
                format!("{}{}{}", grow, token, shrink)
            } else {
                token.to_string()
            }
        });

        self.push_layers(out, event.start, event.end, &main, &glow);
    }

    /// Cue text with the active token wrapped by `mark`. Indices count the
    /// cue's tokens, so tokens emptied by the transform still advance it.
    fn highlighted_body(
        &self,
        cue: &DisplayCue,
        active: usize,
        mark: impl Fn(&str) -> String,
    ) -> String {
        let mut index = 0;
        let mut lines = Vec::with_capacity(cue.lines.len());

        for line in &cue.lines {
            let mut tokens = Vec::new();
            for token in line.split_whitespace() {
                let text = escape_ass_text(self.transform.apply(token).trim());
                if !text.is_empty() {
                    tokens.push(if index == active { mark(&text) } else { text });
                }
                index += 1;
            }
            if !tokens.is_empty() {
                lines.push(tokens.join(" "));
            }
        }

        lines.join("\\N")
    }

    fn push_layers(&self, out: &mut String, start: f64, end: f64, main: &str, glow: &str) {
        if main.is_empty() {
            return;
        }

        let start_cs = to_centiseconds(start);
        let end_cs = to_centiseconds(end);
        if start_cs >= end_cs {
            return;
        }
        let (start, end) = (cs_to_ass(start_cs), cs_to_ass(end_cs));
        let position = self.placement.override_tags();

        if self.style.glow {
            let glow_tags = format!(
                "{{\\1a&HFF&\\bord{}\\3c&HFFFFFF&\\3a{}\\blur{}\\shad0}}",
                self.style.border_width * 2.0 + 2.0,
                GLOW_ALPHA,
                GLOW_BLUR
            );
            push_dialogue(out, 0, &start, &end, &format!("{}{}{}", position, glow_tags, glow));
            push_dialogue(out, 1, &start, &end, &format!("{}{}", position, main));
        } else {
            push_dialogue(out, 0, &start, &end, &format!("{}{}", position, main));
        }
    }
}

fn push_dialogue(out: &mut String, layer: u8, start: &str, end: &str, text: &str) {
    let _ = writeln!(
        out,
        "Dialogue: {},{},{},{},,0,0,0,,{}",
        layer, start, end, DEFAULT_STYLE, text
    );
}
