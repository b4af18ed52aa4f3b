//! Line-width estimation from font size and render width.
//!
//! No font metrics are consulted: an average glyph is assumed to be
//! `0.6 * font_size` pixels wide.

/// Returned when the inputs cannot produce a meaningful estimate.
pub const DEFAULT_CHARS_PER_LINE: usize = 30;

/// Lower bound on any estimate.
pub const MIN_CHARS_PER_LINE: usize = 10;

/// Upper bound on any estimate.
pub const MAX_CHARS_PER_LINE: usize = 10_000;

const AVG_GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Reference width at which the base font size is used unscaled.
const REFERENCE_WIDTH: f64 = 1920.0;
const MIN_FONT_SCALE: f64 = 0.75;
const MIN_SCALED_FONT_SIZE: u32 = 18;
const SMALL_VIDEO_WIDTH: u32 = 1280;
const SMALL_VIDEO_BONUS: u32 = 4;

/// Estimate how many characters fit on one subtitle line.
///
/// Never fails: zero width, zero font size, or a non-positive percentage
/// yields [`DEFAULT_CHARS_PER_LINE`]. Estimates are clamped to
/// `MIN_CHARS_PER_LINE..=MAX_CHARS_PER_LINE`.
pub fn max_chars_per_line(video_width: u32, max_width_percent: f64, font_size: u32) -> usize {
    if video_width == 0 || font_size == 0 || !(max_width_percent > 0.0) {
        return DEFAULT_CHARS_PER_LINE;
    }

    let avg_glyph_width = font_size as f64 * AVG_GLYPH_WIDTH_RATIO;
    let budget = video_width as f64 * max_width_percent;
    // Guard against 23.999... from binary fractions.
    let chars = (budget / avg_glyph_width + 1e-9).floor();

    (chars as usize).clamp(MIN_CHARS_PER_LINE, MAX_CHARS_PER_LINE)
}

/// Adjust a base font size (chosen for a 1920px wide preview) to the real
/// video width. Narrow videos get a small bonus so text stays legible.
pub fn scale_font_size(base_font_size: u32, video_width: u32) -> u32 {
    if video_width == 0 {
        return base_font_size;
    }

    let scale = (video_width as f64 / REFERENCE_WIDTH).max(MIN_FONT_SCALE);
    let bonus = if video_width < SMALL_VIDEO_WIDTH {
        SMALL_VIDEO_BONUS
    } else {
        0
    };

    let scaled = (base_font_size as f64 * scale).round() as u32 + bonus;
    scaled.max(MIN_SCALED_FONT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_budgets() {
        assert_eq!(max_chars_per_line(1280, 0.5, 24), 44);
        assert_eq!(max_chars_per_line(1920, 0.3, 40), 24);
    }

    #[test]
    fn test_floor_at_minimum() {
        assert_eq!(max_chars_per_line(100, 0.1, 200), MIN_CHARS_PER_LINE);
    }

    #[test]
    fn test_huge_width_is_capped() {
        assert_eq!(max_chars_per_line(1280, 1e300, 24), MAX_CHARS_PER_LINE);
        assert_eq!(max_chars_per_line(u32::MAX, f64::INFINITY, 1), MAX_CHARS_PER_LINE);
    }

    #[test]
    fn test_degenerate_inputs_use_default() {
        assert_eq!(max_chars_per_line(0, 0.5, 24), DEFAULT_CHARS_PER_LINE);
        assert_eq!(max_chars_per_line(1280, 0.5, 0), DEFAULT_CHARS_PER_LINE);
        assert_eq!(max_chars_per_line(1280, 0.0, 24), DEFAULT_CHARS_PER_LINE);
        assert_eq!(max_chars_per_line(1280, -0.5, 24), DEFAULT_CHARS_PER_LINE);
        assert_eq!(max_chars_per_line(1280, f64::NAN, 24), DEFAULT_CHARS_PER_LINE);
    }

    #[test]
    fn test_monotonic_in_width() {
        let mut previous = 0;
        for width in (100..4000).step_by(37) {
            let chars = max_chars_per_line(width, 0.7, 32);
            assert!(chars >= previous, "width {} gave {} < {}", width, chars, previous);
            previous = chars;
        }
    }

    #[test]
    fn test_monotonic_in_font_size() {
        let mut previous = usize::MAX;
        for font_size in 1..120 {
            let chars = max_chars_per_line(1920, 0.7, font_size);
            assert!(chars <= previous, "font {} gave {} > {}", font_size, chars, previous);
            previous = chars;
        }
    }

    #[test]
    fn test_scale_font_size() {
        assert_eq!(scale_font_size(24, 1920), 24);
        assert_eq!(scale_font_size(48, 3840), 96);
        // 0.75 floor plus the small-video bonus, then the 18px floor.
        assert_eq!(scale_font_size(24, 640), 22);
        assert_eq!(scale_font_size(16, 1280), 18);
        assert_eq!(scale_font_size(24, 0), 24);
    }
}
