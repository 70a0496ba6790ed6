//! Runtime configuration loaded from the environment.

use std::path::PathBuf;

use tracing::warn;

use super::validation::validate_setting;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PREVIEW_WIDTH: u32 = 400;
pub const DEFAULT_SESSION_RETENTION_HOURS: u32 = 72;

/// Credentials and defaults for the image upload service.
#[derive(Debug, Clone, Default)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder used when a request does not name one.
    pub folder: String,
}

impl CloudinaryConfig {
    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    /// Base for share links and QR codes, without trailing slash.
    pub public_base_url: String,
    /// Directory of `{layout}.png` template images.
    pub template_dir: Option<PathBuf>,
    pub brand_font_path: Option<PathBuf>,
    pub brand_logo_path: Option<PathBuf>,
    pub brand_heading: Option<String>,
    pub brand_sub: Option<String>,
    /// JSON file overriding the slot-detection thresholds.
    pub mask_thresholds_file: Option<PathBuf>,
    pub preview_width: u32,
    /// Sessions older than this are pruned; 0 keeps them forever.
    pub session_retention_hours: u32,
    pub cloudinary: CloudinaryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            public_base_url: format!("http://localhost:{DEFAULT_PORT}"),
            template_dir: None,
            brand_font_path: None,
            brand_logo_path: None,
            brand_heading: None,
            brand_sub: None,
            mask_thresholds_file: None,
            preview_width: DEFAULT_PREVIEW_WIDTH,
            session_retention_hours: DEFAULT_SESSION_RETENTION_HOURS,
            cloudinary: CloudinaryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Self {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through a key lookup. Empty and invalid values
    /// fall back to defaults; invalid ones are logged.
    pub fn load_from<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> String {
            let value = lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
            if value.is_empty() {
                return value;
            }
            match validate_setting(key, &value) {
                Ok(()) => value,
                Err(e) => {
                    warn!(key, "Ignoring invalid setting: {e}");
                    String::new()
                }
            }
        };
        let path = |key: &str| Some(g(key)).filter(|v| !v.is_empty()).map(PathBuf::from);
        let text = |key: &str| Some(g(key)).filter(|v| !v.is_empty());

        let server_port = parse_u16(&g("SERVER_PORT"), DEFAULT_PORT);
        let public_base_url = {
            let url = g("PUBLIC_BASE_URL");
            if url.is_empty() {
                format!("http://localhost:{server_port}")
            } else {
                url.trim_end_matches('/').to_string()
            }
        };

        Self {
            server_port,
            public_base_url,
            template_dir: path("TEMPLATE_DIR"),
            brand_font_path: path("BRAND_FONT_PATH"),
            brand_logo_path: path("BRAND_LOGO_PATH"),
            brand_heading: text("BRAND_HEADING"),
            brand_sub: text("BRAND_SUB"),
            mask_thresholds_file: path("MASK_THRESHOLDS_FILE"),
            preview_width: parse_u32(&g("PREVIEW_WIDTH"), DEFAULT_PREVIEW_WIDTH),
            session_retention_hours: parse_u32(
                &g("SESSION_RETENTION_HOURS"),
                DEFAULT_SESSION_RETENTION_HOURS,
            ),
            cloudinary: CloudinaryConfig {
                cloud_name: g("CLOUDINARY_CLOUD_NAME"),
                api_key: g("CLOUDINARY_API_KEY"),
                api_secret: g("CLOUDINARY_API_SECRET"),
                folder: g("CLOUDINARY_FOLDER"),
            },
        }
    }
}

fn parse_u16(s: &str, default: u16) -> u16 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

fn parse_u32(s: &str, default: u32) -> u32 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
