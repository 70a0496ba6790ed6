//! Slot detection: row-band scan, then a column scan per band.
//!
//! Detection never fails. An empty result tells the caller to try the coarse
//! luminance detector and, after that, [`fallback_slots`].

use image::RgbaImage;
use image_engine::Rect;
use tracing::{debug, trace};

use crate::mask::{Mask, MaskThresholds, luma};

/// Find photo slots in an eligibility mask, ordered top-to-bottom.
pub fn detect_slots(mask: &Mask, th: &MaskThresholds) -> Vec<Rect> {
    scan(mask, None, th.row_coverage, th)
}

/// Coarse detector for templates whose slots are flat dark or flat light
/// areas rather than transparent or gray ones.
///
/// Dark rows are tried first. The returned mask marks the pixels of the
/// class that produced the slots.
pub fn detect_luminance_slots(
    canvas: &RgbaImage,
    th: &MaskThresholds,
) -> Option<(Vec<Rect>, Mask)> {
    let opaque = Mask::from_fn(canvas, |px| th.is_opaque(px));
    if opaque.count() == 0 {
        return None;
    }

    let classes: [(&str, Mask, f32); 2] = [
        (
            "dark",
            Mask::from_fn(canvas, |px| th.is_opaque(px) && luma(px) <= th.dark_luma_max),
            th.dark_ratio,
        ),
        (
            "light",
            Mask::from_fn(canvas, |px| th.is_opaque(px) && luma(px) >= th.light_luma_min),
            th.light_ratio,
        ),
    ];

    for (class, mask, ratio) in classes {
        let slots = scan(&mask, Some(&opaque), ratio, th);
        if !slots.is_empty() {
            debug!(class, slots = slots.len(), "Luminance slots detected");
            return Some((slots, mask));
        }
    }
    None
}

/// Fixed symmetric layout of equal-height rows.
pub fn fallback_slots(width: u32, height: u32, th: &MaskThresholds) -> Vec<Rect> {
    let rows = th.fallback_rows.max(1);
    let pad_x = (width as f32 * th.fallback_padding).round();
    let pad_y = (height as f32 * th.fallback_padding).round();
    let gap = (height as f32 * th.fallback_gap).round();

    let row_w = (width as f32 - pad_x * 2.0).max(0.0);
    let row_h = ((height as f32 - pad_y * 2.0 - gap * (rows - 1) as f32) / rows as f32).max(0.0);

    (0..rows)
        .map(|i| {
            let y = pad_y + i as f32 * (row_h + gap);
            Rect::new(
                pad_x as u32,
                y.round() as u32,
                row_w.round() as u32,
                row_h.round() as u32,
            )
        })
        .collect()
}

/// Keep the `max` tallest slots, then restore top-to-bottom order.
pub fn cap_slots(mut slots: Vec<Rect>, max: usize) -> Vec<Rect> {
    if slots.len() > max {
        slots.sort_by(|a, b| b.height.cmp(&a.height).then(a.y.cmp(&b.y)));
        slots.truncate(max);
    }
    slots.sort_by(|a, b| a.y.cmp(&b.y).then(a.x.cmp(&b.x)));
    slots
}

/// Shared band/span scan. A row qualifies when the fraction of set pixels
/// (over `denominator` pixels if given, else over the trimmed width)
/// exceeds `row_ratio`.
fn scan(mask: &Mask, denominator: Option<&Mask>, row_ratio: f32, th: &MaskThresholds) -> Vec<Rect> {
    let (w, h) = (mask.width(), mask.height());
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let margin = (w as f32 * th.side_margin).round() as u32;
    let (x0, x1) = if margin * 2 < w { (margin, w - margin) } else { (0, w) };

    let row_hit = |y: u32| {
        let hits = mask.row_count(y, x0, x1);
        let total = match denominator {
            Some(d) => d.row_count(y, x0, x1),
            None => (x1 - x0) as usize,
        };
        total > 0 && hits as f32 / total as f32 > row_ratio
    };

    let min_band = h as f32 * th.min_band_height;
    let min_span = w as f32 * th.min_span_width;

    let mut slots = Vec::new();
    for (top, bottom) in runs((0..h).map(row_hit)) {
        let band_h = bottom - top;
        if (band_h as f32) < min_band {
            trace!(top, band_h, "Band too short");
            continue;
        }
        let Some((left, right)) = column_span(mask, top, bottom) else {
            continue;
        };
        if ((right - left) as f32) < min_span {
            trace!(top, left, right, "Span too narrow");
            continue;
        }
        if let Some(rect) = inset(Rect::new(left, top, right - left, band_h), th.inset) {
            slots.push(rect);
        }
    }

    let found = slots.len();
    let slots = cap_slots(slots, th.max_slots);
    debug!(found, kept = slots.len(), "Slot scan finished");
    slots
}

/// Longest run of columns where more than half the band's rows are set.
fn column_span(mask: &Mask, top: u32, bottom: u32) -> Option<(u32, u32)> {
    let band_h = (bottom - top) as usize;
    let cols = (0..mask.width()).map(|x| mask.column_count(x, top, bottom) * 2 > band_h);
    runs(cols).max_by(|a, b| (a.1 - a.0).cmp(&(b.1 - b.0)).then(b.0.cmp(&a.0)))
}

/// Half-open `[start, end)` ranges of consecutive `true` values.
fn runs(flags: impl Iterator<Item = bool>) -> impl Iterator<Item = (u32, u32)> {
    let mut out = Vec::new();
    let mut start = None;
    let mut len = 0u32;
    for (i, flag) in (0u32..).zip(flags) {
        match (flag, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                out.push((s, i));
                start = None;
            }
            _ => {}
        }
        len = i + 1;
    }
    if let Some(s) = start {
        out.push((s, len));
    }
    out.into_iter()
}

fn inset(rect: Rect, fraction: f32) -> Option<Rect> {
    let dx = (rect.width as f32 * fraction).round() as u32;
    let dy = (rect.height as f32 * fraction).round() as u32;
    let width = rect.width.checked_sub(dx * 2)?;
    let height = rect.height.checked_sub(dy * 2)?;
    let out = Rect::new(rect.x + dx, rect.y + dy, width, height);
    (!out.is_empty()).then_some(out)
}
