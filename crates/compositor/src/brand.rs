//! Brand block: optional logo plus a two-line heading/sub text group,
//! auto-fitted inside the reserved cell.
//!
//! Font sizing is a bounded heuristic, not an exact solve: one uniform
//! shrink to the available width, then at most [`REFINE_ITERATIONS`]
//! nudges toward similar line lengths (within [`LENGTH_TOLERANCE`]), then a
//! final pass keeping the heading slightly larger than the sub line.

use ab_glyph::Font;
use image::{DynamicImage, Rgba, RgbaImage};
use image_engine::{Rect, draw_contain};
use tracing::debug;

use crate::background::hex;
use crate::text::{self, TextMeasure};

pub const REFINE_ITERATIONS: usize = 3;
pub const LENGTH_TOLERANCE: f32 = 0.06;

const MIN_SUB_PX: f32 = 16.0;
const MIN_HEADING_PX: f32 = 18.0;
const SHRINK_MIN_HEADING_PX: f32 = 12.0;
const SHRINK_MIN_SUB_PX: f32 = 11.0;
const SUB_OPACITY: f32 = 0.8;

/// Text colour on light templates.
pub const INK_LIGHT: Rgba<u8> = hex(0x0d2260);
/// Text colour on the dark template.
pub const INK_DARK: Rgba<u8> = hex(0xd1d9f2);

/// Result of the auto-fit solver, in cell-relative terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrandFit {
    pub heading_px: f32,
    pub sub_px: f32,
    pub heading_w: f32,
    pub sub_w: f32,
    pub line_gap: f32,
    pub pad_inner: f32,
    pub col_gap: f32,
    /// Width of the logo column after the text claimed its space.
    pub left_w: f32,
    /// Maximum width the text column was allowed.
    pub right_max: f32,
}

impl BrandFit {
    pub fn text_w(&self) -> f32 {
        self.heading_w.max(self.sub_w)
    }

    pub fn text_h(&self) -> f32 {
        self.heading_px + self.line_gap + self.sub_px
    }

    /// Relative length disparity between the two lines.
    pub fn disparity(&self) -> f32 {
        length_disparity(self.heading_w, self.sub_w)
    }
}

fn length_disparity(a: f32, b: f32) -> f32 {
    let avg = (a + b) / 2.0;
    if avg <= 0.0 {
        0.0
    } else {
        (a - b).abs() / avg
    }
}

struct Lines<'a, M: TextMeasure + ?Sized> {
    measure: &'a M,
    heading: &'a str,
    sub: &'a str,
    heading_px: f32,
    sub_px: f32,
    heading_w: f32,
    sub_w: f32,
}

impl<M: TextMeasure + ?Sized> Lines<'_, M> {
    fn remeasure(&mut self) {
        self.heading_w = self.measure.text_width(self.heading, self.heading_px.floor());
        self.sub_w = self.measure.text_width(self.sub, self.sub_px.floor());
    }

    fn widest(&self) -> f32 {
        self.heading_w.max(self.sub_w)
    }

    /// Scale both sizes so the widest line fits `max_w`.
    fn shrink_to(&mut self, max_w: f32, min_heading: f32, min_sub: f32) {
        let widest = self.widest();
        if widest > max_w && widest > 0.0 {
            let f = (max_w / widest).max(0.0);
            self.heading_px = (self.heading_px * f).floor().max(min_heading);
            self.sub_px = (self.sub_px * f).floor().max(min_sub);
            self.remeasure();
        }
    }
}

/// Size the heading and sub lines for a `cell_w` x `cell_h` cell.
pub fn fit_brand_text<M: TextMeasure + ?Sized>(
    measure: &M,
    heading: &str,
    sub: &str,
    cell_w: f32,
    cell_h: f32,
) -> BrandFit {
    let pad_inner = (cell_w.min(cell_h) * 0.10).round();
    let col_gap = (cell_w * 0.04).round();
    let inner_h = (cell_h - pad_inner * 2.0).max(0.0);
    let mut left_w = ((cell_w - col_gap) * 0.24).round().max(0.0);

    let sub_px = (inner_h * 0.22).round().max(MIN_SUB_PX);
    let heading_px = (sub_px * 1.10).round().max(MIN_HEADING_PX);
    let line_gap = (inner_h * 0.08).round();

    let mut lines = Lines {
        measure,
        heading,
        sub,
        heading_px,
        sub_px,
        heading_w: 0.0,
        sub_w: 0.0,
    };
    lines.remeasure();

    let right_max = (cell_w - pad_inner * 2.0 - left_w - col_gap).max(0.0);
    lines.shrink_to(right_max, SHRINK_MIN_HEADING_PX, SHRINK_MIN_SUB_PX);

    for _ in 0..REFINE_ITERATIONS {
        if length_disparity(lines.heading_w, lines.sub_w) <= LENGTH_TOLERANCE
            || lines.heading_w + lines.sub_w <= 0.0
        {
            break;
        }
        if lines.heading_w < lines.sub_w {
            lines.heading_px = (lines.heading_px + 1.0).min(lines.heading_px * 1.06);
        } else {
            lines.sub_px = (lines.sub_px + 1.0).min(lines.sub_px * 1.06);
        }
        lines.remeasure();
        lines.shrink_to(right_max, 0.0, 0.0);
    }

    if lines.heading_px < lines.sub_px * 1.04 {
        lines.heading_px = (lines.sub_px * 1.06).ceil();
        lines.remeasure();
        if lines.heading_w > right_max && lines.heading_w > 0.0 {
            let f = right_max / lines.heading_w;
            lines.heading_px = (lines.heading_px * f).floor();
            lines.sub_px = (lines.sub_px * f).floor();
        }
    }

    lines.heading_px = lines.heading_px.floor().max(0.0);
    lines.sub_px = lines.sub_px.floor().max(0.0);
    lines.remeasure();

    // Text keeps its size; the logo column gives way.
    let group_max_w = (cell_w - pad_inner * 2.0).max(0.0);
    let needed = lines.widest() + col_gap;
    if needed > group_max_w {
        left_w = 0.0;
    } else if left_w + needed > group_max_w {
        left_w = (group_max_w - needed).max(0.0);
    }

    BrandFit {
        heading_px: lines.heading_px,
        sub_px: lines.sub_px,
        heading_w: lines.heading_w,
        sub_w: lines.sub_w,
        line_gap,
        pad_inner,
        col_gap,
        left_w,
        right_max,
    }
}

/// Everything the brand block needs besides the canvas.
pub struct BrandBlock<'a, F: Font> {
    pub heading: &'a str,
    pub sub: &'a str,
    pub font: Option<&'a F>,
    pub logo: Option<&'a DynamicImage>,
}

/// Draw the brand block into `cell`, using the light ink on `dark` templates.
///
/// Without a font only the logo is drawn, contain-fit into the padded cell.
pub fn draw_brand_block<F: Font>(
    canvas: &mut RgbaImage,
    cell: Rect,
    block: &BrandBlock<'_, F>,
    dark: bool,
) {
    if cell.is_empty() {
        return;
    }
    let (cell_w, cell_h) = (cell.width as f32, cell.height as f32);

    let Some(font) = block.font else {
        if let Some(logo) = block.logo {
            let pad = (cell_w.min(cell_h) * 0.10).round() as u32;
            let inner = Rect::new(
                cell.x + pad,
                cell.y + pad,
                cell.width.saturating_sub(pad * 2),
                cell.height.saturating_sub(pad * 2),
            );
            draw_contain(canvas, logo, inner);
        }
        return;
    };

    let fit = fit_brand_text(font, block.heading, block.sub, cell_w, cell_h);
    debug!(
        heading_px = fit.heading_px,
        sub_px = fit.sub_px,
        left_w = fit.left_w,
        disparity = fit.disparity(),
        "Brand text fitted"
    );

    let inner_y = cell.y as f32 + fit.pad_inner;
    let inner_h = (cell_h - fit.pad_inner * 2.0).max(0.0);

    let content_w = fit.left_w + fit.col_gap + fit.text_w();
    let left_x = cell.x as f32 + (cell_w - content_w) / 2.0;
    let text_x = left_x + fit.left_w + fit.col_gap;

    if let Some(logo) = block.logo {
        let box_h = inner_h.min(fit.text_h().round());
        let box_y = inner_y + (inner_h - box_h) / 2.0;
        let logo_rect = Rect::new(
            left_x.max(0.0).round() as u32,
            box_y.max(0.0).round() as u32,
            fit.left_w.round() as u32,
            box_h.round() as u32,
        );
        draw_contain(canvas, logo, logo_rect);
    }

    let ink = if dark { INK_DARK } else { INK_LIGHT };
    let mut baseline = inner_y + (inner_h - fit.text_h()) / 2.0 + fit.heading_px;
    text::draw_text_on_baseline(
        canvas,
        font,
        fit.heading_px,
        text_x.round() as i32,
        baseline,
        block.heading,
        ink,
        1.0,
    );
    baseline += fit.line_gap + fit.sub_px;
    text::draw_text_on_baseline(
        canvas,
        font,
        fit.sub_px,
        text_x.round() as i32,
        baseline,
        block.sub,
        ink,
        SUB_OPACITY,
    );
}
