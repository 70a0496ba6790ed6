//! Brand assets, templates and threshold overrides loaded from disk.

use std::path::{Path, PathBuf};

use compositor::{BrandFont, BrandText, Composer, ComposerConfig, MaskThresholds};
use image::DynamicImage;
use session_store::is_valid_id;
use tracing::{debug, info, warn};

use crate::config::AppConfig;

const MAX_FONT_SIZE: u64 = 50 * 1024 * 1024; // 50MB
const VALID_FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Invalid font format (only TTF/OTF supported)")]
    InvalidFormat,
    #[error("Font file too large (max 50MB)")]
    FileTooLarge,
    #[error("Font could not be parsed: {0}")]
    Font(#[from] compositor::ComposeError),
    #[error("Image could not be decoded: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid thresholds file: {0}")]
    Thresholds(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn load_brand_font(path: &Path) -> Result<BrandFont, AssetError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !VALID_FONT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AssetError::InvalidFormat);
    }
    if std::fs::metadata(path)?.len() > MAX_FONT_SIZE {
        return Err(AssetError::FileTooLarge);
    }
    let data = std::fs::read(path)?;
    Ok(BrandFont::from_bytes(data)?)
}

pub fn load_image(path: &Path) -> Result<DynamicImage, AssetError> {
    Ok(image::open(path)?)
}

pub fn load_thresholds(path: &Path) -> Result<MaskThresholds, AssetError> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Build the composer from configuration. Assets that fail to load are
/// logged and skipped; the composer still works without them.
pub fn build_composer(cfg: &AppConfig) -> Composer {
    let mut brand = BrandText::default();
    if let Some(heading) = &cfg.brand_heading {
        brand.heading = heading.clone();
    }
    if let Some(sub) = &cfg.brand_sub {
        brand.sub = sub.clone();
    }

    let thresholds = match &cfg.mask_thresholds_file {
        Some(path) => load_thresholds(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), "Using default mask thresholds: {e}");
            MaskThresholds::default()
        }),
        None => MaskThresholds::default(),
    };

    let mut composer = Composer::new(ComposerConfig {
        thresholds,
        brand,
        ..ComposerConfig::default()
    });

    if let Some(path) = &cfg.brand_font_path {
        match load_brand_font(path) {
            Ok(font) => {
                info!(path = %path.display(), "Loaded brand font");
                composer = composer.with_brand_font(font);
            }
            Err(e) => {
                warn!(path = %path.display(), "Brand font not loaded, text will be skipped: {e}")
            }
        }
    }
    if let Some(path) = &cfg.brand_logo_path {
        match load_image(path) {
            Ok(logo) => {
                info!(path = %path.display(), "Loaded brand logo");
                composer = composer.with_logo(logo);
            }
            Err(e) => warn!(path = %path.display(), "Brand logo not loaded: {e}"),
        }
    }
    composer
}

/// Template images looked up as `{dir}/{layout}.png`.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    dir: Option<PathBuf>,
}

impl TemplateLibrary {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, layout: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        if !is_valid_id(layout) {
            return None;
        }
        let path = dir.join(format!("{layout}.png"));
        path.is_file().then_some(path)
    }

    /// Decode the template for `layout`, if one exists and is readable.
    pub fn load(&self, layout: &str) -> Option<DynamicImage> {
        let path = self.path_for(layout)?;
        match load_image(&path) {
            Ok(img) => {
                debug!(layout, w = img.width(), h = img.height(), "Template loaded");
                Some(img)
            }
            Err(e) => {
                warn!(path = %path.display(), "Template unreadable, using recipe: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn font_extension_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brand.woff");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(load_brand_font(&path), Err(AssetError::InvalidFormat)));
    }

    #[test]
    fn unparseable_font_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brand.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(load_brand_font(&path), Err(AssetError::Font(_))));
    }

    #[test]
    fn template_library_resolves_existing_png() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(12, 18, Rgba([0, 0, 0, 0]))
            .save(dir.path().join("frame-a.png"))
            .unwrap();
        let lib = TemplateLibrary::new(Some(dir.path().to_path_buf()));
        assert!(lib.load("frame-a").is_some());
        assert!(lib.load("missing").is_none());
        assert!(lib.path_for("../frame-a").is_none());
        assert!(TemplateLibrary::default().load("frame-a").is_none());
    }

    #[test]
    fn thresholds_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(&path, br#"{"chroma_max": 40}"#).unwrap();
        let cfg = AppConfig {
            mask_thresholds_file: Some(path),
            brand_heading: Some("OPEN HOUSE".into()),
            ..AppConfig::default()
        };
        let composer = build_composer(&cfg);
        assert_eq!(composer.config().thresholds.chroma_max, 40);
        assert_eq!(composer.config().brand.heading, "OPEN HOUSE");
    }

    #[test]
    fn missing_assets_do_not_prevent_startup() {
        let cfg = AppConfig {
            brand_font_path: Some(PathBuf::from("/nonexistent/font.ttf")),
            brand_logo_path: Some(PathBuf::from("/nonexistent/logo.png")),
            mask_thresholds_file: Some(PathBuf::from("/nonexistent/t.json")),
            ..AppConfig::default()
        };
        let composer = build_composer(&cfg);
        assert_eq!(composer.config().thresholds, MaskThresholds::default());
    }
}
