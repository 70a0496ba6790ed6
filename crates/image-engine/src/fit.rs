//! Fit-rectangle math and the contain/cover renderers built on it.
//!
//! Both placements preserve the source aspect ratio. Contain shows all of the
//! source inside the target; cover fills the target and crops the overflow
//! symmetrically. Degenerate inputs (any zero dimension) produce a zero-area
//! placement so callers can draw it as a no-op.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use tracing::debug;

use crate::composite;

/// Resampling filter used for every photo/logo scale.
pub const FILTER: FilterType = FilterType::Lanczos3;

/// Axis-aligned integer rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Clamp the rectangle to a `width` x `height` canvas.
    pub fn clamp_to(&self, width: u32, height: u32) -> Rect {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Rect {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }
}

/// Sub-pixel draw rectangle. May extend past the target (cover) or sit
/// inside it (contain).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    fn empty_at(rect: Rect) -> Self {
        Self {
            x: f64::from(rect.x),
            y: f64::from(rect.y),
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

fn degenerate(img_w: u32, img_h: u32, rect: Rect) -> bool {
    img_w == 0 || img_h == 0 || rect.is_empty()
}

/// Largest aspect-preserving placement that fits inside `rect`, centred.
pub fn contain_placement(img_w: u32, img_h: u32, rect: Rect) -> Placement {
    if degenerate(img_w, img_h, rect) {
        return Placement::empty_at(rect);
    }
    let (iw, ih) = (f64::from(img_w), f64::from(img_h));
    let (w, h) = (f64::from(rect.width), f64::from(rect.height));

    // Compare iw/ih against w/h without dividing.
    let (dw, dh) = if iw * h > w * ih {
        (w, w * ih / iw)
    } else {
        (h * iw / ih, h)
    };
    Placement {
        x: f64::from(rect.x) + (w - dw) / 2.0,
        y: f64::from(rect.y) + (h - dh) / 2.0,
        width: dw,
        height: dh,
    }
}

/// Smallest aspect-preserving placement that covers `rect`, centred.
pub fn cover_placement(img_w: u32, img_h: u32, rect: Rect) -> Placement {
    if degenerate(img_w, img_h, rect) {
        return Placement::empty_at(rect);
    }
    let (iw, ih) = (f64::from(img_w), f64::from(img_h));
    let (w, h) = (f64::from(rect.width), f64::from(rect.height));

    let (dw, dh) = if iw * h > w * ih {
        ((h * iw / ih).max(w), h)
    } else {
        (w, (w * ih / iw).max(h))
    };
    Placement {
        x: f64::from(rect.x) + (w - dw) / 2.0,
        y: f64::from(rect.y) + (h - dh) / 2.0,
        width: dw,
        height: dh,
    }
}

/// Render `img` cover-fit into a fresh `width` x `height` buffer.
///
/// The visible part of the source is cropped first, centred, and then scaled
/// straight to the target size, so the work is bounded by the source and the
/// buffer rather than by how extreme the source aspect ratio is. Zero-sized
/// requests or sources return an empty buffer of the requested size.
pub fn render_cover(img: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let Some(crop) = cover_source_crop(img.width(), img.height(), width, height) else {
        return RgbaImage::new(width, height);
    };
    debug!(
        src_w = img.width(),
        src_h = img.height(),
        crop_w = crop.width,
        crop_h = crop.height,
        width,
        height,
        "Rendering cover-fit buffer"
    );

    let visible = img.crop_imm(crop.x, crop.y, crop.width, crop.height).to_rgba8();
    if visible.dimensions() == (width, height) {
        return visible;
    }
    imageops::resize(&visible, width, height, FILTER)
}

/// The centred region of an `img_w` x `img_h` source that stays visible when
/// it is cover-fit into `width` x `height`, in source coordinates.
fn cover_source_crop(img_w: u32, img_h: u32, width: u32, height: u32) -> Option<Rect> {
    let placement = cover_placement(img_w, img_h, Rect::new(0, 0, width, height));
    if placement.is_empty() {
        return None;
    }
    // Visible fraction of the scaled image, mapped back onto the source.
    let visible = |src: u32, target: u32, scaled: f64| -> u32 {
        let src = f64::from(src);
        (src * f64::from(target) / scaled).round().clamp(1.0, src) as u32
    };
    let crop_w = visible(img_w, width, placement.width);
    let crop_h = visible(img_h, height, placement.height);
    Some(Rect::new(
        (img_w - crop_w) / 2,
        (img_h - crop_h) / 2,
        crop_w,
        crop_h,
    ))
}

/// Contain-fit `img` into `rect` and alpha-composite it onto `canvas`.
pub fn draw_contain(canvas: &mut RgbaImage, img: &DynamicImage, rect: Rect) {
    let placement = contain_placement(img.width(), img.height(), rect);
    if placement.is_empty() {
        return;
    }
    // Sub-pixel sides still draw a one-pixel sliver.
    let dw = (placement.width.round() as u32).max(1);
    let dh = (placement.height.round() as u32).max(1);
    let scaled = imageops::resize(&img.to_rgba8(), dw, dh, FILTER);
    composite::overlay(
        canvas,
        &scaled,
        placement.x.round() as i64,
        placement.y.round() as i64,
    );
}

/// Cover-fill `rect` with `img`, clipped to the rect and the canvas.
///
/// This is the plain rectangular fill; it overwrites every pixel in the rect.
pub fn draw_cover(canvas: &mut RgbaImage, img: &DynamicImage, rect: Rect) {
    let rect = rect.clamp_to(canvas.width(), canvas.height());
    if rect.is_empty() {
        return;
    }
    let buffer = render_cover(img, rect.width, rect.height);
    imageops::replace(canvas, &buffer, i64::from(rect.x), i64::from(rect.y));
}
