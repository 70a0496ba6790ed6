//! Text measurement and drawing for the brand block.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use image_engine::composite;
use imageproc::drawing::draw_text_mut;

/// Anything that can report the advance width of a string at a pixel size.
///
/// The brand auto-fit solver only needs widths, so it is generic over this
/// rather than tied to a loaded font.
pub trait TextMeasure {
    fn text_width(&self, text: &str, px: f32) -> f32;
}

impl<F: Font> TextMeasure for F {
    fn text_width(&self, text: &str, px: f32) -> f32 {
        measure_text_width(self, PxScale::from(px), text) as f32
    }
}

/// Measure the pixel width of a string at the given font and scale.
pub fn measure_text_width<F: Font>(font: &F, scale: PxScale, text: &str) -> u32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width.ceil() as u32
}

/// Ascent above the baseline for the given font and scale.
pub fn ascent<F: Font>(font: &F, scale: PxScale) -> f32 {
    font.as_scaled(scale).ascent()
}

/// Compute the line height for the given font and scale.
pub fn line_height<F: Font>(font: &F, scale: PxScale) -> u32 {
    let scaled = font.as_scaled(scale);
    (scaled.ascent() - scaled.descent() + scaled.line_gap()).ceil() as u32
}

/// Draw `text` with its alphabetic baseline at `baseline_y`.
///
/// With `opacity < 1.0` the glyphs are rendered onto a copy of the affected
/// region and only the pixels they changed are faded back in.
pub fn draw_text_on_baseline<F: Font>(
    img: &mut RgbaImage,
    font: &F,
    px: f32,
    x: i32,
    baseline_y: f32,
    text: &str,
    color: Rgba<u8>,
    opacity: f32,
) {
    if text.is_empty() || px <= 0.0 {
        return;
    }
    let scale = PxScale::from(px);
    let top = (baseline_y - ascent(font, scale)).round() as i32;

    if opacity >= 1.0 {
        draw_text_mut(img, color, x, top, scale, font, text);
        return;
    }

    let width = measure_text_width(font, scale, text) + 2;
    let height = line_height(font, scale) + 2;
    let (rx, ry) = (x.max(0) as u32, top.max(0) as u32);
    if rx >= img.width() || ry >= img.height() {
        return;
    }
    let rw = width.min(img.width() - rx);
    let rh = height.min(img.height() - ry);

    let before = image::imageops::crop_imm(img, rx, ry, rw, rh).to_image();
    let mut region = before.clone();
    draw_text_mut(
        &mut region,
        color,
        x - rx as i32,
        top - ry as i32,
        scale,
        font,
        text,
    );
    composite::blend_changes(img, &before, &region, rx, ry, opacity);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Monospace stand-in: every char advances `ratio * px`.
    pub(crate) struct FixedAdvance(pub f32);

    impl TextMeasure for FixedAdvance {
        fn text_width(&self, text: &str, px: f32) -> f32 {
            (text.chars().count() as f32 * px * self.0).ceil()
        }
    }

    #[test]
    fn fixed_advance_scales_linearly() {
        let m = FixedAdvance(0.5);
        assert_eq!(m.text_width("abcd", 10.0), 20.0);
        assert_eq!(m.text_width("abcd", 20.0), 40.0);
        assert_eq!(m.text_width("", 20.0), 0.0);
    }
}
