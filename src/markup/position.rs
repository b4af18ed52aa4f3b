//! Placement of subtitle text on the video canvas.
//!
//! Either a named anchor (alignment code plus margins, resolved by the
//! renderer) or an absolute point given as percentages of the canvas.

use serde::{Deserialize, Serialize};

/// Left, right and vertical margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub vertical: u32,
}

const EDGE_MARGIN: u32 = 10;

/// A named screen anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Anchor {
    Top,
    Middle,
    #[default]
    Bottom,
    TopLeft,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomRight,
}

impl Anchor {
    /// Parse an anchor name. Unknown names fall back to [`Anchor::Bottom`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "top" | "top-center" => Anchor::Top,
            "middle" | "center" | "middle-center" => Anchor::Middle,
            "top-left" => Anchor::TopLeft,
            "top-right" => Anchor::TopRight,
            "middle-left" | "left" => Anchor::MiddleLeft,
            "middle-right" | "right" => Anchor::MiddleRight,
            "bottom-left" => Anchor::BottomLeft,
            "bottom-right" => Anchor::BottomRight,
            _ => Anchor::Bottom,
        }
    }

    /// Numpad-style alignment code.
    pub fn alignment(self) -> u8 {
        match self {
            Anchor::BottomLeft => 1,
            Anchor::Bottom => 2,
            Anchor::BottomRight => 3,
            Anchor::MiddleLeft => 4,
            Anchor::Middle => 5,
            Anchor::MiddleRight => 6,
            Anchor::TopLeft => 7,
            Anchor::Top => 8,
            Anchor::TopRight => 9,
        }
    }

    pub fn margins(self) -> Margins {
        let vertical = match self {
            Anchor::Middle | Anchor::MiddleLeft | Anchor::MiddleRight => 0,
            _ => EDGE_MARGIN,
        };
        Margins {
            left: EDGE_MARGIN,
            right: EDGE_MARGIN,
            vertical,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Middle => "middle",
            Anchor::Bottom => "bottom",
            Anchor::TopLeft => "top-left",
            Anchor::TopRight => "top-right",
            Anchor::MiddleLeft => "middle-left",
            Anchor::MiddleRight => "middle-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomRight => "bottom-right",
        }
    }
}

impl From<String> for Anchor {
    fn from(value: String) -> Self {
        Anchor::parse(&value)
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.name().to_string()
    }
}

/// Where text goes for one rendering run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionMode {
    Anchor(Anchor),
    /// Text centered on a point given in percent of the canvas.
    Custom { x_percent: f64, y_percent: f64 },
}

/// A position mode resolved against a canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub alignment: u8,
    pub margins: Margins,
    /// Absolute pixel coordinates, present only in custom mode.
    pub point: Option<(f64, f64)>,
}

impl PositionMode {
    pub fn resolve(&self, width: u32, height: u32) -> Placement {
        match *self {
            PositionMode::Anchor(anchor) => Placement {
                alignment: anchor.alignment(),
                margins: anchor.margins(),
                point: None,
            },
            PositionMode::Custom {
                x_percent,
                y_percent,
            } => {
                let x = clamp_percent(x_percent) * width as f64 / 100.0;
                let y = clamp_percent(y_percent) * height as f64 / 100.0;
                Placement {
                    alignment: Anchor::Middle.alignment(),
                    margins: Margins {
                        left: 0,
                        right: 0,
                        vertical: 0,
                    },
                    point: Some((x.round(), y.round())),
                }
            }
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        50.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

impl Placement {
    /// Override tag block that pins the text, empty for anchor placements.
    pub fn override_tags(&self) -> String {
        match self.point {
            Some((x, y)) => format!("{{\\an{}\\pos({},{})}}", self.alignment, x, y),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_alignment_codes() {
        assert_eq!(Anchor::parse("top").alignment(), 8);
        assert_eq!(Anchor::parse("middle").alignment(), 5);
        assert_eq!(Anchor::parse("bottom").alignment(), 2);
        assert_eq!(Anchor::parse("top-left").alignment(), 7);
        assert_eq!(Anchor::parse("top-right").alignment(), 9);
        assert_eq!(Anchor::parse("bottom-left").alignment(), 1);
        assert_eq!(Anchor::parse("bottom-right").alignment(), 3);
        assert_eq!(Anchor::parse("middle-left").alignment(), 4);
        assert_eq!(Anchor::parse("middle-right").alignment(), 6);
    }

    #[test]
    fn test_unknown_anchor_is_bottom() {
        assert_eq!(Anchor::parse("somewhere"), Anchor::Bottom);
        assert_eq!(Anchor::parse(""), Anchor::Bottom);
    }

    #[test]
    fn test_middle_row_has_no_vertical_margin() {
        assert_eq!(Anchor::Middle.margins().vertical, 0);
        assert_eq!(Anchor::Top.margins().vertical, 10);
    }

    #[test]
    fn test_custom_position_maps_to_pixels() {
        let placement = PositionMode::Custom {
            x_percent: 50.0,
            y_percent: 90.0,
        }
        .resolve(1280, 720);
        assert_eq!(placement.point, Some((640.0, 648.0)));
        assert_eq!(placement.override_tags(), "{\\an5\\pos(640,648)}");
    }

    #[test]
    fn test_custom_position_is_clamped() {
        let placement = PositionMode::Custom {
            x_percent: 150.0,
            y_percent: -20.0,
        }
        .resolve(1920, 1080);
        assert_eq!(placement.point, Some((1920.0, 0.0)));
    }

    #[test]
    fn test_anchor_has_no_override_tags() {
        let placement = PositionMode::Anchor(Anchor::Top).resolve(1280, 720);
        assert!(placement.override_tags().is_empty());
        assert_eq!(placement.alignment, 8);
    }
}
