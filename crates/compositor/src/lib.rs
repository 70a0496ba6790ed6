//! Photo-strip composition.
//!
//! Two renderers share one entry point ([`Composer`]):
//! - geometric: a background recipe, a grid of cells and an optional brand
//!   block, selected by template identifier;
//! - template: a pre-authored template image whose transparent or gray
//!   regions are detected as photo slots and filled through a pixel mask.
//!
//! Composition never fails. Every call returns a fully painted canvas of the
//! requested size; unknown identifiers, missing photos and undetectable
//! slots all degrade to deterministic defaults.

pub mod background;
pub mod brand;
pub mod geometric;
pub mod layout;
pub mod mask;
pub mod slots;
pub mod template;
pub mod text;

use ab_glyph::FontVec;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use brand::{BrandBlock, BrandFit, fit_brand_text};
pub use geometric::compose_geometric;
pub use layout::{FitMode, LayoutPreset};
pub use mask::{Mask, MaskThresholds};
pub use slots::{detect_luminance_slots, detect_slots, fallback_slots};
pub use template::{SlotSource, TemplateRender, compose_with_template, render_template};

pub const DEFAULT_WIDTH: u32 = 1080;
pub const DEFAULT_HEIGHT: u32 = 1920;
pub const DEFAULT_TEMPLATE_WIDTH: u32 = 1200;
pub const DEFAULT_TEMPLATE_HEIGHT: u32 = 1800;

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Invalid font data: {0}")]
    InvalidFont(String),
}

/// Two-line brand text drawn in the reserved cell of phone templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandText {
    pub heading: String,
    pub sub: String,
}

impl Default for BrandText {
    fn default() -> Self {
        Self {
            heading: "EXHIBITION DAY".to_string(),
            sub: "Photobooth @ 2025".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub width: u32,
    pub height: u32,
    pub template_width: u32,
    pub template_height: u32,
    pub thresholds: MaskThresholds,
    pub brand: BrandText,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            template_width: DEFAULT_TEMPLATE_WIDTH,
            template_height: DEFAULT_TEMPLATE_HEIGHT,
            thresholds: MaskThresholds::default(),
            brand: BrandText::default(),
        }
    }
}

/// What the photos are composed onto.
#[derive(Debug, Clone, Copy)]
pub enum Background<'a> {
    /// Built-in recipe selected by identifier.
    Recipe(&'a str),
    /// Decoded template image; `id` is informational.
    Template { id: &'a str, image: &'a DynamicImage },
}

impl Background<'_> {
    pub fn id(&self) -> &str {
        match self {
            Background::Recipe(id) => id,
            Background::Template { id, .. } => id,
        }
    }
}

/// Per-call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Output size; `None` or a zero side uses the mode's default.
    pub size: Option<(u32, u32)>,
    /// Print resolution hint. Accepted for template renders, currently unused.
    pub dpi: Option<u32>,
}

impl ComposeOptions {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }
}

/// Owned brand font parsed from TTF/OTF bytes.
pub struct BrandFont(FontVec);

impl BrandFont {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ComposeError> {
        FontVec::try_from_vec(data)
            .map(Self)
            .map_err(|e| ComposeError::InvalidFont(e.to_string()))
    }

    pub fn font(&self) -> &FontVec {
        &self.0
    }
}

impl std::fmt::Debug for BrandFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrandFont").finish_non_exhaustive()
    }
}

/// Composition entry point. Holds configuration and optional brand assets;
/// each call owns its own canvas and scratch buffers.
#[derive(Debug, Default)]
pub struct Composer {
    config: ComposerConfig,
    font: Option<BrandFont>,
    logo: Option<DynamicImage>,
}

impl Composer {
    pub fn new(config: ComposerConfig) -> Self {
        Self {
            config,
            font: None,
            logo: None,
        }
    }

    pub fn with_brand_font(mut self, font: BrandFont) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_logo(mut self, logo: DynamicImage) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose `photos` onto `background`.
    ///
    /// Entries are positional: `photos[i]` fills slot `i`, and a `None` entry
    /// leaves that slot showing the background.
    pub fn compose(
        &self,
        background: &Background<'_>,
        photos: &[Option<DynamicImage>],
        size: Option<(u32, u32)>,
    ) -> RgbaImage {
        self.compose_with(background, photos, &ComposeOptions { size, dpi: None })
    }

    pub fn compose_with(
        &self,
        background: &Background<'_>,
        photos: &[Option<DynamicImage>],
        options: &ComposeOptions,
    ) -> RgbaImage {
        let (width, height) = self.resolve_size(background, options.size);
        debug!(
            background = background.id(),
            width,
            height,
            dpi = options.dpi,
            photos = photos.len(),
            "Compose requested"
        );

        match background {
            Background::Recipe(id) => {
                let block = BrandBlock {
                    heading: &self.config.brand.heading,
                    sub: &self.config.brand.sub,
                    font: self.font.as_ref().map(BrandFont::font),
                    logo: self.logo.as_ref(),
                };
                compose_geometric(width, height, id, photos, &block)
            }
            Background::Template { image, .. } => {
                compose_with_template(image, photos, width, height, &self.config.thresholds)
            }
        }
    }

    fn resolve_size(&self, background: &Background<'_>, size: Option<(u32, u32)>) -> (u32, u32) {
        let default = match background {
            Background::Recipe(_) => (self.config.width, self.config.height),
            Background::Template { .. } => {
                (self.config.template_width, self.config.template_height)
            }
        };
        match size {
            Some((w, h)) if w > 0 && h > 0 => (w, h),
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn photo() -> Option<DynamicImage> {
        Some(DynamicImage::ImageRgba8(RgbaImage::from_pixel(30, 40, Rgba([200, 10, 10, 255]))))
    }

    #[test]
    fn recipe_uses_default_size() {
        let composer = Composer::default();
        let out = composer.compose(&Background::Recipe("template-phone"), &[photo()], None);
        assert_eq!(out.dimensions(), (1080, 1920));
    }

    #[test]
    fn zero_size_falls_back_to_mode_default() {
        let composer = Composer::new(ComposerConfig {
            width: 108,
            height: 192,
            template_width: 120,
            template_height: 180,
            ..ComposerConfig::default()
        });
        let out = composer.compose(&Background::Recipe("3-grid"), &[], Some((0, 500)));
        assert_eq!(out.dimensions(), (108, 192));

        let template =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(60, 90, Rgba([0, 0, 0, 0])));
        let bg = Background::Template {
            id: "custom",
            image: &template,
        };
        let out = composer.compose(&bg, &[photo()], Some((300, 0)));
        assert_eq!(out.dimensions(), (120, 180));
    }

    #[test]
    fn explicit_size_is_honoured() {
        let composer = Composer::default();
        let out = composer.compose_with(
            &Background::Recipe("unknown"),
            &[photo(), photo()],
            &ComposeOptions::default().with_size(200, 100).with_dpi(300),
        );
        assert_eq!(out.dimensions(), (200, 100));
    }

    #[test]
    fn config_deserializes_partial_json() {
        let cfg: ComposerConfig =
            serde_json::from_str(r#"{"width": 720, "brand": {"sub": "Booth"}}"#).unwrap();
        assert_eq!(cfg.width, 720);
        assert_eq!(cfg.height, DEFAULT_HEIGHT);
        assert_eq!(cfg.brand.heading, "EXHIBITION DAY");
        assert_eq!(cfg.brand.sub, "Booth");
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        assert!(matches!(
            BrandFont::from_bytes(vec![0, 1, 2, 3]),
            Err(ComposeError::InvalidFont(_))
        ));
    }
}
