//! QR code rendering for share links.

use image::{DynamicImage, GrayImage, Luma};
use qrcode::QrCode;
use tracing::debug;

/// Quiet zone around the symbol, in modules.
const QUIET_ZONE: u32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("QR encode error: {0}")]
    Encode(String),

    #[error("QR payload is empty")]
    EmptyPayload,
}

/// Generate a QR code image from a URL or text string.
///
/// Each module is drawn as a `scale` x `scale` square where
/// `scale = max(1, target_width / modules)`, surrounded by a white
/// quiet zone, so the result is square and at most a few modules wider
/// than `target_width`.
pub fn generate_qr(data: &str, target_width: u32) -> Result<DynamicImage, QrError> {
    if data.is_empty() {
        return Err(QrError::EmptyPayload);
    }
    let code = QrCode::new(data.as_bytes()).map_err(|e| QrError::Encode(e.to_string()))?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let total_modules = module_count + QUIET_ZONE * 2;

    let scale = (target_width / total_modules).max(1);
    let img_size = total_modules * scale;
    debug!(module_count, scale, img_size, "Rendering QR code");

    let mut img = GrayImage::from_pixel(img_size, img_size, Luma([255u8]));
    let offset = QUIET_ZONE * scale;

    for (i, color) in modules.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let x = (i as u32) % module_count;
        let y = (i as u32) / module_count;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(offset + x * scale + dx, offset + y * scale + dy, Luma([0u8]));
            }
        }
    }

    Ok(DynamicImage::ImageLuma8(img))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_qr_produces_square_image() {
        let img = generate_qr("https://example.com/photo-result?id=abc", 200).unwrap();
        assert!(img.width() > 0);
        assert_eq!(img.width(), img.height());
        assert!(img.width() <= 200);
    }

    #[test]
    fn generate_qr_keeps_quiet_zone_white() {
        let img = generate_qr("test", 100).unwrap().to_luma8();
        assert_eq!(img.get_pixel(0, 0)[0], 255);
        assert_eq!(img.get_pixel(img.width() - 1, img.height() - 1)[0], 255);
        assert!(img.pixels().any(|p| p[0] == 0));
    }

    #[test]
    fn generate_qr_tiny_target_still_renders() {
        let img = generate_qr("test", 1).unwrap();
        assert!(img.width() >= 21);
    }

    #[test]
    fn generate_qr_rejects_empty_payload() {
        assert!(matches!(generate_qr("", 200), Err(QrError::EmptyPayload)));
    }
}
