//! Background fill recipes selected by template identifier.

use image::{Rgba, RgbaImage};

/// A colour at a relative position (0.0 = top, 1.0 = bottom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba<u8>,
}

/// Ordered list of stops forming a vertical gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundRecipe {
    pub stops: Vec<ColorStop>,
}

impl BackgroundRecipe {
    pub fn solid(color: Rgba<u8>) -> Self {
        Self {
            stops: vec![ColorStop { offset: 0.0, color }],
        }
    }

    pub fn vertical(top: Rgba<u8>, bottom: Rgba<u8>) -> Self {
        Self {
            stops: vec![
                ColorStop {
                    offset: 0.0,
                    color: top,
                },
                ColorStop {
                    offset: 1.0,
                    color: bottom,
                },
            ],
        }
    }

    /// Colour at relative position `t` in `0.0..=1.0`.
    pub fn color_at(&self, t: f32) -> Rgba<u8> {
        let Some(first) = self.stops.first() else {
            return Rgba([255, 255, 255, 255]);
        };
        if t <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let f = if span <= f32::EPSILON {
                    1.0
                } else {
                    (t - a.offset) / span
                };
                return lerp(a.color, b.color, f);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}

/// Hex colour literal (`#rrggbb`) as opaque RGBA.
pub const fn hex(rgb: u32) -> Rgba<u8> {
    Rgba([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255])
}

/// Select the background recipe for a template identifier.
///
/// Unknown identifiers get the default recipe; this never fails.
pub fn recipe_for(template_id: &str) -> BackgroundRecipe {
    match template_id {
        "template-phone" => BackgroundRecipe::vertical(hex(0xfafaf9), hex(0xf5f5f4)),
        "template-phone-pastel" => BackgroundRecipe::vertical(hex(0xfff1f2), hex(0xe0f2fe)),
        "template-phone-dark" => BackgroundRecipe::vertical(hex(0x111827), hex(0x0b1220)),
        "2-vertical" | "3-grid" | "4-grid" => BackgroundRecipe::solid(hex(0xffffff)),
        _ => BackgroundRecipe::vertical(hex(0xf8fafc), hex(0xe2e8f0)),
    }
}

/// Paint the whole canvas with the recipe, one colour per row.
pub fn paint(canvas: &mut RgbaImage, recipe: &BackgroundRecipe) {
    let height = canvas.height();
    let denom = height.saturating_sub(1).max(1) as f32;
    for y in 0..height {
        let color = recipe.color_at(y as f32 / denom);
        for x in 0..canvas.width() {
            canvas.put_pixel(x, y, color);
        }
    }
}

fn lerp(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let mix = |i: usize| (f32::from(a[i]) + (f32::from(b[i]) - f32::from(a[i])) * t).round() as u8;
    Rgba([mix(0), mix(1), mix(2), mix(3)])
}
