//! Caller-supplied visual configuration.

use serde::{Deserialize, Serialize};

use super::position::{Anchor, PositionMode};
use super::text::TextTransform;
use crate::highlight::HighlightMode;

/// Visual style for one rendering run.
///
/// Field names are snake_case in config files; the camelCase names used by
/// browser clients are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    #[serde(alias = "fontFamily")]
    pub font_family: String,
    #[serde(alias = "fontSize")]
    pub font_size: u32,
    #[serde(alias = "fontColor")]
    pub font_color: String,
    #[serde(alias = "borderColor")]
    pub border_color: String,
    #[serde(alias = "borderWidth")]
    pub border_width: f64,
    pub shadow: f64,
    pub glow: bool,
    pub bold: bool,

    /// Named anchor, used unless `use_custom_position` is set.
    pub position: Anchor,
    #[serde(alias = "useCustomPosition")]
    pub use_custom_position: bool,
    #[serde(alias = "customX")]
    pub custom_x: f64,
    #[serde(alias = "customY")]
    pub custom_y: f64,

    #[serde(alias = "highlightMode")]
    pub highlight_mode: HighlightMode,
    /// Legacy switch; `true` selects karaoke when no mode is given.
    #[serde(alias = "useKaraoke", skip_serializing_if = "Option::is_none")]
    pub use_karaoke: Option<bool>,
    #[serde(alias = "currentWordColor")]
    pub current_word_color: String,
    #[serde(alias = "currentWordBorderColor")]
    pub current_word_border_color: String,

    #[serde(alias = "allCaps")]
    pub all_caps: bool,
    #[serde(alias = "removePunctuation")]
    pub remove_punctuation: bool,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            font_family: "Sans".to_string(),
            font_size: 24,
            font_color: "#FFFFFF".to_string(),
            border_color: "#000000".to_string(),
            border_width: 2.0,
            shadow: 0.0,
            glow: false,
            bold: false,
            position: Anchor::Bottom,
            use_custom_position: false,
            custom_x: 50.0,
            custom_y: 90.0,
            highlight_mode: HighlightMode::None,
            use_karaoke: None,
            current_word_color: "#FFFF00".to_string(),
            current_word_border_color: "#000000".to_string(),
            all_caps: false,
            remove_punctuation: false,
        }
    }
}

impl StyleSpec {
    /// The effective highlight mode, honoring the legacy karaoke switch.
    pub fn highlight(&self) -> HighlightMode {
        match (self.highlight_mode, self.use_karaoke) {
            (HighlightMode::None, Some(true)) => HighlightMode::Karaoke,
            (mode, _) => mode,
        }
    }

    /// Exactly one of anchor or custom placement.
    pub fn position_mode(&self) -> PositionMode {
        if self.use_custom_position {
            PositionMode::Custom {
                x_percent: self.custom_x,
                y_percent: self.custom_y,
            }
        } else {
            PositionMode::Anchor(self.position)
        }
    }

    pub fn text_transform(&self) -> TextTransform {
        TextTransform {
            uppercase: self.all_caps,
            strip_punctuation: self.remove_punctuation,
        }
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_browser_client() {
        let style = StyleSpec::default();
        assert_eq!(style.font_size, 24);
        assert_eq!(style.position, Anchor::Bottom);
        assert_eq!(style.highlight(), HighlightMode::None);
    }

    #[test]
    fn test_parses_camel_case_body() {
        let style: StyleSpec = serde_json::from_str(
            r##"{
                "fontFamily": "Arial",
                "fontSize": 32,
                "fontColor": "#FF0000",
                "position": "top-left",
                "useCustomPosition": false,
                "useKaraoke": true,
                "allCaps": true
            }"##,
        )
        .unwrap();

        assert_eq!(style.font_family, "Arial");
        assert_eq!(style.font_size, 32);
        assert_eq!(style.position, Anchor::TopLeft);
        assert_eq!(style.highlight(), HighlightMode::Karaoke);
        assert!(style.all_caps);
        assert_eq!(style.border_color, "#000000");
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let style: StyleSpec =
            serde_json::from_str(r#"{"position": "sideways", "highlight_mode": "glitter"}"#)
                .unwrap();
        assert_eq!(style.position, Anchor::Bottom);
        assert_eq!(style.highlight(), HighlightMode::None);
    }

    #[test]
    fn test_explicit_mode_wins_over_legacy_switch() {
        let style = StyleSpec {
            highlight_mode: HighlightMode::Color,
            use_karaoke: Some(true),
            ..StyleSpec::default()
        };
        assert_eq!(style.highlight(), HighlightMode::Color);
    }

    #[test]
    fn test_custom_position_mode() {
        let style = StyleSpec {
            use_custom_position: true,
            custom_x: 25.0,
            custom_y: 75.0,
            ..StyleSpec::default()
        };
        assert_eq!(
            style.position_mode(),
            PositionMode::Custom {
                x_percent: 25.0,
                y_percent: 75.0
            }
        );
    }

    #[test]
    fn test_round_trips_through_toml() {
        let style = StyleSpec::default();
        let text = toml::to_string(&style).unwrap();
        let parsed: StyleSpec = toml::from_str(&text).unwrap();
        assert_eq!(parsed, style);
    }
}
