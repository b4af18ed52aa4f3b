//! Hex colors to ASS color values.

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AssColor {
    pub const WHITE: AssColor = AssColor {
        r: 0xFF,
        g: 0xFF,
        b: 0xFF,
    };

    /// Parse `#RRGGBB` (the `#` is optional). Anything else is white.
    pub fn parse(hex: &str) -> Self {
        Self::try_parse(hex).unwrap_or(Self::WHITE)
    }

    fn try_parse(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        Some(Self {
            r: u8::from_str_radix(&hex[0..2], 16).ok()?,
            g: u8::from_str_radix(&hex[2..4], 16).ok()?,
            b: u8::from_str_radix(&hex[4..6], 16).ok()?,
        })
    }

    /// Style-block form, `&H00BBGGRR`.
    pub fn packed(&self) -> String {
        format!("&H00{:02X}{:02X}{:02X}", self.b, self.g, self.r)
    }

    /// Override-tag form, `&HBBGGRR&`.
    pub fn inline(&self) -> String {
        format!("&H{:02X}{:02X}{:02X}&", self.b, self.g, self.r)
    }
}

/// Convert `#RRGGBB` to `&H00BBGGRR`, falling back to opaque white.
pub fn hex_to_ass_color(hex: &str) -> String {
    AssColor::parse(hex).packed()
}
