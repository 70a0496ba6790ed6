//! Recipe-driven composition: gradient background, grid cells, optional
//! brand block.

use ab_glyph::Font;
use image::{DynamicImage, RgbaImage};
use image_engine::{draw_contain, draw_cover};
use tracing::debug;

use crate::background;
use crate::brand::{self, BrandBlock};
use crate::layout::{FitMode, LayoutPreset, PhoneVariant};

/// Compose `photos` onto a `width` x `height` canvas using the preset and
/// background selected by `template_id`.
///
/// `photos[i]` fills the i-th non-brand cell; extra photos are ignored, and a
/// `None` entry or a missing tail leaves the background showing.
pub fn compose_geometric<F: Font>(
    width: u32,
    height: u32,
    template_id: &str,
    photos: &[Option<DynamicImage>],
    brand_block: &BrandBlock<'_, F>,
) -> RgbaImage {
    let preset = LayoutPreset::for_template(template_id);
    let mut canvas = RgbaImage::new(width, height);
    background::paint(&mut canvas, &background::recipe_for(template_id));

    let cells = preset.cells(width, height);
    debug!(
        template_id,
        width,
        height,
        cells = cells.len(),
        photos = photos.len(),
        "Composing geometric layout"
    );

    if let Some(cell) = preset.brand_cell.and_then(|idx| cells.get(idx)) {
        let dark = preset.phone == Some(PhoneVariant::Dark);
        brand::draw_brand_block(&mut canvas, *cell, brand_block, dark);
    }

    let photo_cells = cells
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != preset.brand_cell)
        .map(|(_, cell)| *cell);

    for (cell, photo) in photo_cells.zip(photos.iter().take(preset.max_photos)) {
        let Some(photo) = photo else {
            continue;
        };
        match preset.fit {
            FitMode::Contain => draw_contain(&mut canvas, photo, cell),
            FitMode::Cover => draw_cover(&mut canvas, photo, cell),
        }
    }

    canvas
}
