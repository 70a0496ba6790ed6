//! Pixel-level compositing: alpha overlay, faded edits and mask-gated copy.

use image::{Rgba, RgbaImage};

/// Overlay `top` onto `base` at a signed offset.
///
/// The `top` image is alpha-composited over the base; anything falling
/// outside the base is clipped.
pub fn overlay(base: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
    overlay_with_opacity(base, top, x, y, 1.0);
}

/// Overlay with an additional global opacity multiplier in `0.0..=1.0`.
pub fn overlay_with_opacity(
    base: &mut RgbaImage,
    top: &RgbaImage,
    x: i64,
    y: i64,
    opacity: f32,
) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    let (bw, bh) = (i64::from(base.width()), i64::from(base.height()));

    for (dx, dy, pixel) in top.enumerate_pixels() {
        let tx = x + i64::from(dx);
        let ty = y + i64::from(dy);
        if tx < 0 || ty < 0 || tx >= bw || ty >= bh {
            continue;
        }
        let alpha = f32::from(pixel[3]) / 255.0 * opacity;
        if alpha > 0.99 {
            base.put_pixel(tx as u32, ty as u32, *pixel);
        } else if alpha > 0.01 {
            let bg = base.get_pixel(tx as u32, ty as u32);
            let blended = blend_pixel(bg, pixel, alpha);
            base.put_pixel(tx as u32, ty as u32, blended);
        }
    }
}

/// Apply the edits between `before` and `after` to `base` at `(x, y)`,
/// faded to `opacity`.
///
/// `before` is the untouched copy of a `base` region and `after` the same
/// region once drawn into. Only pixels that differ are written, each as a
/// per-channel mix of its old and new value, so everything the edit did
/// not touch stays byte-identical. Returns the number of pixels written.
pub fn blend_changes(
    base: &mut RgbaImage,
    before: &RgbaImage,
    after: &RgbaImage,
    x: u32,
    y: u32,
    opacity: f32,
) -> u64 {
    let opacity = opacity.clamp(0.0, 1.0);
    let (bw, bh) = base.dimensions();
    let mut written = 0u64;
    for ((dx, dy, new), old) in after.enumerate_pixels().zip(before.pixels()) {
        if new == old {
            continue;
        }
        let (tx, ty) = (x + dx, y + dy);
        if tx >= bw || ty >= bh {
            continue;
        }
        let mix = |c: usize| {
            let (a, b) = (f32::from(old[c]), f32::from(new[c]));
            (a + (b - a) * opacity).round() as u8
        };
        base.put_pixel(tx, ty, Rgba([mix(0), mix(1), mix(2), mix(3)]));
        written += 1;
    }
    written
}

/// Copy `src` into `canvas` at `(origin_x, origin_y)`, but only where
/// `gate(x, y)` holds for the destination canvas coordinate.
///
/// Destination pixels the gate rejects keep their exact value.
pub fn copy_masked<F>(
    canvas: &mut RgbaImage,
    src: &RgbaImage,
    origin_x: u32,
    origin_y: u32,
    gate: F,
) -> u64
where
    F: Fn(u32, u32) -> bool,
{
    let (cw, ch) = canvas.dimensions();
    let mut copied = 0u64;
    for (sx, sy, pixel) in src.enumerate_pixels() {
        let x = origin_x + sx;
        let y = origin_y + sy;
        if x >= cw || y >= ch {
            continue;
        }
        if gate(x, y) {
            canvas.put_pixel(x, y, *pixel);
            copied += 1;
        }
    }
    copied
}

fn blend_pixel(bg: &Rgba<u8>, fg: &Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let inv = 1.0 - alpha;
    let out_alpha = alpha + f32::from(bg[3]) / 255.0 * inv;
    Rgba([
        (f32::from(fg[0]) * alpha + f32::from(bg[0]) * inv).round() as u8,
        (f32::from(fg[1]) * alpha + f32::from(bg[1]) * inv).round() as u8,
        (f32::from(fg[2]) * alpha + f32::from(bg[2]) * inv).round() as u8,
        (out_alpha * 255.0).round().min(255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_does_not_panic_on_out_of_bounds() {
        let mut base = RgbaImage::new(100, 100);
        let top = RgbaImage::from_pixel(50, 50, Rgba([1, 2, 3, 255]));
        overlay(&mut base, &top, 80, 80);
        overlay(&mut base, &top, -30, -30);
        assert_eq!(base.get_pixel(99, 99), &Rgba([1, 2, 3, 255]));
        assert_eq!(base.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
        assert_eq!(base.get_pixel(50, 50), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn overlay_skips_transparent_pixels() {
        let mut base = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let top = RgbaImage::new(4, 4);
        overlay(&mut base, &top, 0, 0);
        assert!(base.pixels().all(|p| *p == Rgba([9, 9, 9, 255])));
    }

    #[test]
    fn opacity_blends_towards_background() {
        let mut base = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let top = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 255]));
        overlay_with_opacity(&mut base, &top, 0, 0, 0.5);
        assert_eq!(base.get_pixel(0, 0), &Rgba([100, 50, 25, 255]));
    }

    #[test]
    fn blend_changes_leaves_untouched_pixels_identical() {
        // Semi-transparent and opaque pixels alike must survive a faded edit.
        let mut base = RgbaImage::from_fn(6, 4, |x, _| {
            if x < 3 {
                Rgba([40, 80, 120, 128])
            } else {
                Rgba([250, 250, 249, 255])
            }
        });
        let original = base.clone();
        let before = image::imageops::crop_imm(&base, 1, 1, 4, 2).to_image();

        let unchanged = before.clone();
        assert_eq!(blend_changes(&mut base, &before, &unchanged, 1, 1, 0.8), 0);
        assert_eq!(base.as_raw(), original.as_raw());

        let mut after = before.clone();
        after.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        after.put_pixel(3, 1, Rgba([0, 0, 0, 255]));
        assert_eq!(blend_changes(&mut base, &before, &after, 1, 1, 0.8), 2);
        for (x, y, px) in base.enumerate_pixels() {
            if (x, y) == (1, 1) || (x, y) == (4, 2) {
                continue;
            }
            assert_eq!(px, original.get_pixel(x, y), "pixel ({x},{y})");
        }
        // 80% of the way from the old value to the new one.
        assert_eq!(base.get_pixel(1, 1), &Rgba([8, 16, 24, 230]));
        assert_eq!(base.get_pixel(4, 2), &Rgba([50, 50, 50, 255]));
    }

    #[test]
    fn blend_changes_clips_to_base() {
        let mut base = RgbaImage::from_pixel(2, 2, Rgba([10, 10, 10, 255]));
        let before = RgbaImage::from_pixel(3, 3, Rgba([10, 10, 10, 255]));
        let after = RgbaImage::from_pixel(3, 3, Rgba([20, 20, 20, 255]));
        assert_eq!(blend_changes(&mut base, &before, &after, 1, 1, 1.0), 1);
        assert_eq!(base.get_pixel(1, 1), &Rgba([20, 20, 20, 255]));
        assert_eq!(base.get_pixel(0, 0), &Rgba([10, 10, 10, 255]));
    }

    #[test]
    fn copy_masked_respects_gate() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([1, 1, 1, 255]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([7, 7, 7, 255]));
        let copied = copy_masked(&mut canvas, &src, 0, 0, |x, _| x % 2 == 0);
        assert_eq!(copied, 8);
        assert_eq!(canvas.get_pixel(0, 3), &Rgba([7, 7, 7, 255]));
        assert_eq!(canvas.get_pixel(1, 3), &Rgba([1, 1, 1, 255]));
    }

    #[test]
    fn copy_masked_clips_to_canvas() {
        let mut canvas = RgbaImage::new(3, 3);
        let src = RgbaImage::from_pixel(5, 5, Rgba([7, 7, 7, 255]));
        let copied = copy_masked(&mut canvas, &src, 1, 1, |_, _| true);
        assert_eq!(copied, 4);
    }
}
