//! Geometric grid presets and cell computation.
//!
//! Padding and gaps are fractions of the canvas height so a layout scales
//! proportionally with resolution.

use image_engine::Rect;

/// How a photo is placed inside its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    Contain,
    Cover,
}

/// Phone-print colour variants. All three reserve a brand cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneVariant {
    Classic,
    Pastel,
    Dark,
}

/// Resolved grid description for a template identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPreset {
    pub rows: u32,
    pub cols: u32,
    pub padding: f32,
    pub gap: f32,
    pub fit: FitMode,
    /// Cell index (row-major) reserved for the brand block.
    pub brand_cell: Option<usize>,
    /// Forced cell aspect ratio (width / height), centred in the padded area.
    pub cell_aspect: Option<f32>,
    pub max_photos: usize,
    pub phone: Option<PhoneVariant>,
}

/// Portrait 9:16 cell used by the default preset.
pub const DEFAULT_CELL_ASPECT: f32 = 9.0 / 16.0;

const PHONE_PADDING: f32 = 0.04;
const PHONE_GAP: f32 = 0.02;
// 30px / 20px on a 1800px-high print.
const PRINT_PADDING: f32 = 1.0 / 60.0;
const PRINT_GAP: f32 = 1.0 / 90.0;

impl LayoutPreset {
    /// Resolve an identifier. Unknown identifiers get the default preset.
    pub fn for_template(template_id: &str) -> Self {
        match template_id {
            "template-phone" => Self::phone(PhoneVariant::Classic),
            "template-phone-pastel" => Self::phone(PhoneVariant::Pastel),
            "template-phone-dark" => Self::phone(PhoneVariant::Dark),
            "2-vertical" => Self::print(2, 1),
            "4-grid" => Self::print(2, 2),
            "3-grid" => Self::print(1, 3),
            _ => Self::default(),
        }
    }

    fn phone(variant: PhoneVariant) -> Self {
        Self {
            rows: 4,
            cols: 1,
            padding: PHONE_PADDING,
            gap: PHONE_GAP,
            fit: FitMode::Contain,
            brand_cell: Some(3),
            cell_aspect: None,
            max_photos: 3,
            phone: Some(variant),
        }
    }

    fn print(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            padding: PRINT_PADDING,
            gap: PRINT_GAP,
            fit: FitMode::Cover,
            brand_cell: None,
            cell_aspect: None,
            max_photos: (rows * cols) as usize,
            phone: None,
        }
    }

    pub fn is_phone(&self) -> bool {
        self.phone.is_some()
    }

    pub fn cell_count(&self) -> usize {
        (self.rows * self.cols) as usize
    }

    /// Cells in row-major order for a `width` x `height` canvas.
    pub fn cells(&self, width: u32, height: u32) -> Vec<Rect> {
        let pad = (height as f32 * self.padding).round();
        let gap = (height as f32 * self.gap).round();
        let area_w = (width as f32 - pad * 2.0).max(0.0);
        let area_h = (height as f32 - pad * 2.0).max(0.0);

        let cols = self.cols.max(1) as f32;
        let rows = self.rows.max(1) as f32;
        let mut cell_w = ((area_w - gap * (cols - 1.0)) / cols).max(0.0);
        let mut cell_h = ((area_h - gap * (rows - 1.0)) / rows).max(0.0);

        let (mut origin_x, mut origin_y) = (pad, pad);
        if let Some(aspect) = self.cell_aspect {
            // Shrink whichever side overshoots the ratio and centre the grid.
            if cell_h > 0.0 && cell_w / cell_h > aspect {
                cell_w = cell_h * aspect;
            } else {
                cell_h = cell_w / aspect;
            }
            let grid_w = cell_w * cols + gap * (cols - 1.0);
            let grid_h = cell_h * rows + gap * (rows - 1.0);
            origin_x = pad + (area_w - grid_w) / 2.0;
            origin_y = pad + (area_h - grid_h) / 2.0;
        }

        let mut cells = Vec::with_capacity(self.cell_count());
        for r in 0..self.rows {
            for c in 0..self.cols {
                let x = origin_x + c as f32 * (cell_w + gap);
                let y = origin_y + r as f32 * (cell_h + gap);
                cells.push(Rect::new(
                    x.round() as u32,
                    y.round() as u32,
                    cell_w.round() as u32,
                    cell_h.round() as u32,
                ));
            }
        }
        cells
    }
}

impl Default for LayoutPreset {
    fn default() -> Self {
        Self {
            rows: 1,
            cols: 3,
            padding: PHONE_PADDING,
            gap: PHONE_GAP,
            fit: FitMode::Contain,
            brand_cell: None,
            cell_aspect: Some(DEFAULT_CELL_ASPECT),
            max_photos: 3,
            phone: None,
        }
    }
}
