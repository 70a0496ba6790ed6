//! Per-pixel photo-eligibility mask and its calibration thresholds.
//!
//! A pixel is eligible when it is near-transparent, or when it is opaque
//! and a desaturated mid-gray. Coloured decoration (icons, borders) is never
//! eligible, so a masked copy leaves it untouched.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Calibration values for slot detection.
///
/// These were tuned against specific template artwork; retune them for
/// templates that follow other conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskThresholds {
    pub transparent_alpha_max: u8,
    pub opaque_alpha_min: u8,
    pub gray_min: u8,
    pub gray_max: u8,
    pub chroma_max: u8,
    /// Fraction of a (margin-trimmed) row that must be eligible.
    pub row_coverage: f32,
    /// Margin excluded from the row scan on each side, as a width fraction.
    pub side_margin: f32,
    /// Bands shorter than this fraction of the canvas height are noise.
    pub min_band_height: f32,
    /// Spans narrower than this fraction of the canvas width are dropped.
    pub min_span_width: f32,
    /// Inward shrink per side, as a fraction of the slot's own size.
    pub inset: f32,
    pub max_slots: usize,

    // Coarse luminance detector
    pub dark_luma_max: u8,
    pub dark_ratio: f32,
    pub light_luma_min: u8,
    pub light_ratio: f32,

    // Fixed fallback layout
    pub fallback_padding: f32,
    pub fallback_gap: f32,
    pub fallback_rows: u32,
}

impl Default for MaskThresholds {
    fn default() -> Self {
        Self {
            transparent_alpha_max: 16,
            opaque_alpha_min: 240,
            gray_min: 110,
            gray_max: 190,
            chroma_max: 22,
            row_coverage: 0.5,
            side_margin: 0.08,
            min_band_height: 0.05,
            min_span_width: 0.30,
            inset: 0.01,
            max_slots: 3,
            dark_luma_max: 40,
            dark_ratio: 0.6,
            light_luma_min: 235,
            light_ratio: 0.55,
            fallback_padding: 0.06,
            fallback_gap: 0.02,
            fallback_rows: 3,
        }
    }
}

impl MaskThresholds {
    /// Whether a single template pixel may be replaced by photo content.
    pub fn is_eligible(&self, px: &Rgba<u8>) -> bool {
        let [r, g, b, a] = px.0;
        if a <= self.transparent_alpha_max {
            return true;
        }
        if a < self.opaque_alpha_min {
            return false;
        }
        let in_band = |c: u8| c >= self.gray_min && c <= self.gray_max;
        let chroma = r.max(g).max(b) - r.min(g).min(b);
        in_band(r) && in_band(g) && in_band(b) && chroma <= self.chroma_max
    }

    pub fn is_opaque(&self, px: &Rgba<u8>) -> bool {
        px[3] >= self.opaque_alpha_min
    }
}

/// Integer luma (Rec. 601 weights) in `0..=255`.
pub fn luma(px: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = px.0;
    ((299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000) as u8
}

/// Binary per-pixel map, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Build a mask by evaluating `f` on every pixel of `canvas`.
    pub fn from_fn<F>(canvas: &RgbaImage, f: F) -> Self
    where
        F: Fn(&Rgba<u8>) -> bool,
    {
        let (width, height) = canvas.dimensions();
        let bits = canvas.pixels().map(f).collect();
        Self { width, height, bits }
    }

    /// Classify every pixel of the template canvas.
    pub fn from_canvas(canvas: &RgbaImage, thresholds: &MaskThresholds) -> Self {
        Self::from_fn(canvas, |px| thresholds.is_eligible(px))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Out-of-range coordinates read as `false`.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[self.index(x, y)]
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Number of set pixels in row `y` between columns `x0..x1`.
    pub fn row_count(&self, y: u32, x0: u32, x1: u32) -> usize {
        if y >= self.height {
            return 0;
        }
        let x1 = x1.min(self.width);
        (x0..x1).filter(|x| self.bits[self.index(*x, y)]).count()
    }

    /// Number of set pixels in column `x` between rows `y0..y1`.
    pub fn column_count(&self, x: u32, y0: u32, y1: u32) -> usize {
        if x >= self.width {
            return 0;
        }
        let y1 = y1.min(self.height);
        (y0..y1).filter(|y| self.bits[self.index(x, *y)]).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_and_gray_pixels_are_eligible() {
        let th = MaskThresholds::default();
        assert!(th.is_eligible(&Rgba([255, 0, 0, 0])));
        assert!(th.is_eligible(&Rgba([10, 200, 30, 16])));
        assert!(th.is_eligible(&Rgba([150, 150, 150, 255])));
        assert!(th.is_eligible(&Rgba([140, 150, 160, 245])));
    }

    #[test]
    fn coloured_or_translucent_pixels_are_not_eligible() {
        let th = MaskThresholds::default();
        // Saturated colour.
        assert!(!th.is_eligible(&Rgba([200, 40, 40, 255])));
        // Gray, but too much chroma.
        assert!(!th.is_eligible(&Rgba([120, 150, 180, 255])));
        // Outside the gray band.
        assert!(!th.is_eligible(&Rgba([250, 250, 250, 255])));
        assert!(!th.is_eligible(&Rgba([20, 20, 20, 255])));
        // Half transparent.
        assert!(!th.is_eligible(&Rgba([150, 150, 150, 128])));
    }

    #[test]
    fn thresholds_deserialize_with_defaults() {
        let th: MaskThresholds =
            serde_json::from_str(r#"{"chroma_max": 30, "max_slots": 4}"#).unwrap();
        assert_eq!(th.chroma_max, 30);
        assert_eq!(th.max_slots, 4);
        assert_eq!(th.gray_min, 110);
        assert_eq!(th.fallback_rows, 3);
    }

    #[test]
    fn mask_from_canvas_counts_eligible_pixels() {
        let mut canvas = RgbaImage::from_pixel(4, 3, Rgba([255, 0, 0, 255]));
        canvas.put_pixel(1, 1, Rgba([0, 0, 0, 0]));
        canvas.put_pixel(2, 1, Rgba([150, 150, 150, 255]));
        let mask = Mask::from_canvas(&canvas, &MaskThresholds::default());
        assert_eq!(mask.count(), 2);
        assert!(mask.get(1, 1) && mask.get(2, 1));
        assert!(!mask.get(0, 0));
        assert!(!mask.get(10, 10));
        assert_eq!(mask.row_count(1, 0, 4), 2);
        assert_eq!(mask.column_count(1, 0, 3), 1);
    }

    #[test]
    fn luma_uses_rec601_weights() {
        assert_eq!(luma(&Rgba([255, 255, 255, 255])), 255);
        assert_eq!(luma(&Rgba([0, 0, 0, 255])), 0);
        assert_eq!(luma(&Rgba([255, 0, 0, 255])), 76);
    }
}
