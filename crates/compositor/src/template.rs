//! Template-driven composition with a pixel-gated photo copy.
//!
//! Photos replace template pixels only where the eligibility mask is set, so
//! decoration overlapping a slot's bounding box survives untouched.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use image_engine::{Rect, copy_masked, draw_cover, render_cover};
use tracing::{debug, info, warn};

use crate::mask::{Mask, MaskThresholds};
use crate::slots;

/// Where the slots used for a composition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource {
    Mask,
    Luminance,
    Fallback,
}

impl SlotSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mask => "mask",
            Self::Luminance => "luminance",
            Self::Fallback => "fallback",
        }
    }
}

/// Output of a template composition, with the detection details kept for
/// logging and tests.
#[derive(Debug, Clone)]
pub struct TemplateRender {
    pub image: RgbaImage,
    pub slots: Vec<Rect>,
    pub source: SlotSource,
}

/// Stretch `template` to `width` x `height` and fill its slots with `photos`.
///
/// `photos[i]` goes to slot `i`; a `None` entry leaves that slot as the
/// template painted it.
pub fn compose_with_template(
    template: &DynamicImage,
    photos: &[Option<DynamicImage>],
    width: u32,
    height: u32,
    th: &MaskThresholds,
) -> RgbaImage {
    render_template(template, photos, width, height, th).image
}

/// Same as [`compose_with_template`], also reporting the detected slots.
pub fn render_template(
    template: &DynamicImage,
    photos: &[Option<DynamicImage>],
    width: u32,
    height: u32,
    th: &MaskThresholds,
) -> TemplateRender {
    let mut canvas = stretch(template, width, height);
    let mask = Mask::from_canvas(&canvas, th);

    let mut slots = slots::detect_slots(&mask, th);
    let mut gate = Some(mask);
    let mut source = SlotSource::Mask;

    if slots.is_empty() {
        match slots::detect_luminance_slots(&canvas, th) {
            Some((found, class_mask)) => {
                slots = found;
                gate = Some(class_mask);
                source = SlotSource::Luminance;
            }
            None => {
                warn!(width, height, "No slots detected in template, using fixed rows");
                slots = slots::fallback_slots(width, height, th);
                gate = None;
                source = SlotSource::Fallback;
            }
        }
    }

    info!(
        source = source.as_str(),
        slots = slots.len(),
        photos = photos.len(),
        width,
        height,
        "Template slots resolved"
    );

    for (slot, photo) in slots.iter().zip(photos) {
        let Some(photo) = photo else {
            debug!(?slot, "No photo for slot");
            continue;
        };
        match &gate {
            Some(mask) => {
                let scratch = render_cover(photo, slot.width, slot.height);
                let copied =
                    copy_masked(&mut canvas, &scratch, slot.x, slot.y, |x, y| mask.get(x, y));
                debug!(?slot, copied, "Photo copied through mask");
            }
            None => draw_cover(&mut canvas, photo, *slot),
        }
    }

    TemplateRender {
        image: canvas,
        slots,
        source,
    }
}

/// Resize without preserving aspect ratio; a same-size template is copied.
fn stretch(template: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    if template.width() == width && template.height() == height {
        return template.to_rgba8();
    }
    if template.width() == 0 || template.height() == 0 {
        return RgbaImage::new(width, height);
    }
    imageops::resize(&template.to_rgba8(), width, height, FilterType::Triangle)
}
