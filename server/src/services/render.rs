//! Session rendering: photo decoding, template resolution, composition,
//! PNG encoding and publishing.

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use compositor::{Background, Composer};
use futures::future::join_all;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::Serialize;
use session_store::SessionRecord;
use tracing::{debug, info, warn};
use url::Url;

use super::assets::TemplateLibrary;
use super::upload::{CloudinaryClient, UploadError};

/// Folder used for published prints when no default folder is configured.
pub const PUBLISH_FOLDER: &str = "photobooth";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid data URL")]
    InvalidDataUrl,
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Invalid base URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Decode a `data:image/...;base64,` URL into an image.
pub fn decode_data_url(data_url: &str) -> Result<DynamicImage, RenderError> {
    let (header, payload) = data_url.split_once(',').ok_or(RenderError::InvalidDataUrl)?;
    if !header.starts_with("data:image/") || !header.ends_with(";base64") {
        return Err(RenderError::InvalidDataUrl);
    }
    let bytes = BASE64.decode(payload.trim())?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Encode bytes as a `data:image/png;base64,` URL.
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png))
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Decode all photos in parallel. The result has one entry per input
/// position; undecodable photos become `None` so later photos keep their
/// slot.
pub async fn decode_photos(photos: &[String]) -> Vec<Option<DynamicImage>> {
    let tasks = photos
        .iter()
        .cloned()
        .map(|p| tokio::task::spawn_blocking(move || decode_data_url(&p)));
    let results = join_all(tasks).await;

    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| match result {
            Ok(Ok(img)) => Some(img),
            Ok(Err(e)) => {
                warn!(index, "Skipping undecodable photo: {e}");
                None
            }
            Err(e) => {
                warn!(index, "Photo decode task failed: {e}");
                None
            }
        })
        .collect()
}

/// Share link for a session: the cloud URL when published, else the id.
pub fn share_link(
    base_url: &str,
    cloud_url: Option<&str>,
    session_id: &str,
) -> Result<String, RenderError> {
    let mut url = Url::parse(&format!("{}/photo-result", base_url.trim_end_matches('/')))?;
    {
        let mut pairs = url.query_pairs_mut();
        match cloud_url {
            Some(cloud) => pairs.append_pair("url", cloud),
            None => pairs.append_pair("id", session_id),
        };
    }
    Ok(url.into())
}

/// Link to the locally rendered QR code for `data`.
pub fn qr_link(base_url: &str, data: &str) -> Result<String, RenderError> {
    let mut url = Url::parse(&format!("{}/api/qr", base_url.trim_end_matches('/')))?;
    url.query_pairs_mut().append_pair("data", data);
    Ok(url.into())
}

/// Preview canvas for a layout: phone templates are 3:4, everything else 1:2.
pub fn preview_size(layout: &str, width: u32) -> (u32, u32) {
    let width = width.max(1);
    if layout.starts_with("template-phone") {
        (width, width * 4 / 3)
    } else {
        (width, width * 2)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub local_url: String,
    pub cloud_url: Option<String>,
    pub share_url: String,
    pub qr_url: String,
    pub uploaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct RenderService {
    composer: Arc<Composer>,
    templates: TemplateLibrary,
}

impl RenderService {
    pub fn new(composer: Composer, templates: TemplateLibrary) -> Self {
        Self {
            composer: Arc::new(composer),
            templates,
        }
    }

    /// Compose the session's photos onto its layout.
    ///
    /// Only task failures are errors; bad photos and missing templates
    /// degrade to what can be drawn.
    pub async fn render(
        &self,
        session: &SessionRecord,
        size: Option<(u32, u32)>,
    ) -> Result<RgbaImage, RenderError> {
        let photos = decode_photos(&session.photos).await;

        let templates = self.templates.clone();
        let layout = session.layout.clone();
        let composer = Arc::clone(&self.composer);

        let img = tokio::task::spawn_blocking(move || {
            let template = templates.load(&layout);
            let background = match &template {
                Some(image) => Background::Template { id: &layout, image },
                None => Background::Recipe(&layout),
            };
            composer.compose(&background, &photos, size)
        })
        .await?;

        debug!(id = %session.id, w = img.width(), h = img.height(), "Session rendered");
        Ok(img)
    }

    pub async fn render_png(
        &self,
        session: &SessionRecord,
        size: Option<(u32, u32)>,
    ) -> Result<Vec<u8>, RenderError> {
        let img = self.render(session, size).await?;
        tokio::task::spawn_blocking(move || encode_png(&img)).await?
    }

    /// Render and upload. Upload problems are reported in the outcome and
    /// the local result URL is kept.
    pub async fn publish(
        &self,
        session: &SessionRecord,
        uploader: Option<&CloudinaryClient>,
        base_url: &str,
    ) -> Result<PublishOutcome, RenderError> {
        let base = base_url.trim_end_matches('/');
        let local_url = format!("{base}/api/sessions/{}/result.png", session.id);

        let upload = match uploader {
            Some(client) => {
                let png = self.render_png(session, None).await?;
                let folder = if client.default_folder().is_empty() {
                    PUBLISH_FOLDER
                } else {
                    client.default_folder()
                };
                client.upload(&png_data_url(&png), Some(folder), None).await
            }
            None => Err(UploadError::NotConfigured),
        };

        let (cloud_url, error) = match upload {
            Ok(result) => {
                info!(id = %session.id, url = %result.secure_url, "Session published");
                (Some(result.secure_url), None)
            }
            Err(e) => {
                warn!(id = %session.id, "Upload failed, keeping local result: {e}");
                (None, Some(e.to_string()))
            }
        };

        let share_url = share_link(base, cloud_url.as_deref(), &session.id)?;
        let qr_url = qr_link(base, &share_url)?;
        Ok(PublishOutcome {
            local_url,
            uploaded: cloud_url.is_some(),
            cloud_url,
            share_url,
            qr_url,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compositor::{ComposerConfig, LayoutPreset};
    use image::Rgba;
    use session_store::TimerSetting;

    fn png_url(color: [u8; 4]) -> String {
        let img = RgbaImage::from_pixel(8, 6, Rgba(color));
        png_data_url(&encode_png(&img).unwrap())
    }

    fn session(layout: &str, photos: Vec<String>) -> SessionRecord {
        SessionRecord {
            id: "abc-123".into(),
            layout: layout.into(),
            photos,
            timer: TimerSetting::Three,
            created_at: 0,
        }
    }

    fn service() -> RenderService {
        let composer = Composer::new(ComposerConfig {
            width: 108,
            height: 192,
            template_width: 120,
            template_height: 180,
            ..ComposerConfig::default()
        });
        RenderService::new(composer, TemplateLibrary::default())
    }

    #[test]
    fn data_url_round_trip() {
        let img = decode_data_url(&png_url([1, 2, 3, 255])).unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));
    }

    #[test]
    fn data_url_rejects_bad_input() {
        let bad = |url: &str| decode_data_url(url).unwrap_err();
        assert!(matches!(bad("hello"), RenderError::InvalidDataUrl));
        assert!(matches!(bad("data:text/plain;base64,aGk="), RenderError::InvalidDataUrl));
        assert!(matches!(bad("data:image/png;base64,!!!"), RenderError::Base64(_)));
        assert!(matches!(bad("data:image/png;base64,aGk="), RenderError::Image(_)));
    }

    fn three_photos_with_bad_middle() -> Vec<String> {
        vec![
            png_url([255, 0, 0, 255]),
            "garbage".to_string(),
            png_url([0, 0, 255, 255]),
        ]
    }

    #[tokio::test]
    async fn decode_photos_keeps_positions_of_bad_entries() {
        let decoded = decode_photos(&three_photos_with_bad_middle()).await;
        assert_eq!(decoded.len(), 3);
        let first = decoded[0].as_ref().unwrap().to_rgba8();
        assert_eq!(first.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert!(decoded[1].is_none());
        let third = decoded[2].as_ref().unwrap().to_rgba8();
        assert_eq!(third.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    }

    #[tokio::test]
    async fn undecodable_photo_leaves_its_slot_blank() {
        let record = session("3-grid", three_photos_with_bad_middle());
        let img = service().render(&record, None).await.unwrap();
        let cells = LayoutPreset::for_template("3-grid").cells(108, 192);
        let centre = |i: usize| {
            let c = cells[i];
            *img.get_pixel(c.x + c.width / 2, c.y + c.height / 2)
        };
        assert_eq!(centre(0), Rgba([255, 0, 0, 255]));
        assert_eq!(centre(1), Rgba([255, 255, 255, 255]));
        assert_eq!(centre(2), Rgba([0, 0, 255, 255]));
    }

    #[tokio::test]
    async fn render_uses_recipe_size_without_template() {
        let img = service()
            .render(&session("template-phone", vec![png_url([9, 9, 9, 255])]), None)
            .await
            .unwrap();
        assert_eq!(img.dimensions(), (108, 192));
    }

    #[tokio::test]
    async fn render_uses_template_when_present() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(60, 90, Rgba([0, 0, 0, 0]))
            .save(dir.path().join("frame-a.png"))
            .unwrap();
        let composer = Composer::new(ComposerConfig {
            template_width: 120,
            template_height: 180,
            ..ComposerConfig::default()
        });
        let library = TemplateLibrary::new(Some(dir.path().to_path_buf()));
        let svc = RenderService::new(composer, library);
        let img = svc.render(&session("frame-a", vec![]), None).await.unwrap();
        assert_eq!(img.dimensions(), (120, 180));
    }

    #[tokio::test]
    async fn publish_without_uploader_keeps_local_result() {
        let outcome = service()
            .publish(&session("3-grid", vec![]), None, "https://booth.example.com/")
            .await
            .unwrap();
        assert!(!outcome.uploaded);
        assert!(outcome.cloud_url.is_none());
        assert_eq!(
            outcome.local_url,
            "https://booth.example.com/api/sessions/abc-123/result.png"
        );
        assert_eq!(outcome.share_url, "https://booth.example.com/photo-result?id=abc-123");
        assert!(
            outcome
                .qr_url
                .starts_with("https://booth.example.com/api/qr?data=https%3A%2F%2F")
        );
        assert!(outcome.error.is_some());
    }

    #[test]
    fn share_link_encodes_cloud_url() {
        let cloud = Some("https://res.example.com/a b.png");
        let link = share_link("http://localhost:8080", cloud, "x").unwrap();
        assert_eq!(
            link,
            "http://localhost:8080/photo-result?url=https%3A%2F%2Fres.example.com%2Fa+b.png"
        );
    }

    #[test]
    fn preview_aspect_depends_on_layout() {
        assert_eq!(preview_size("template-phone-dark", 300), (300, 400));
        assert_eq!(preview_size("4-grid", 300), (300, 600));
    }
}
