//! Signed uploads to the Cloudinary image API.
//!
//! The API secret never leaves the server: requests are signed by sorting
//! the non-empty parameters, joining them as `k=v` pairs with `&`,
//! appending the secret and taking the SHA-1 hex digest.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::config::CloudinaryConfig;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Cloudinary environment variables are not configured")]
    NotConfigured,

    #[error("Missing image")]
    MissingImage,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload failed (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Subset of the upload response passed back to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub secure_url: String,
    pub public_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorMessage {
    message: String,
}

/// Compute the request signature for `params`.
pub fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut entries: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = entries
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    api_secret: String,
    default_folder: String,
}

impl CloudinaryClient {
    pub fn from_config(cfg: &CloudinaryConfig) -> Result<Self, UploadError> {
        if !cfg.is_configured() {
            return Err(UploadError::NotConfigured);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: format!("{API_BASE}/{}/image/upload", cfg.cloud_name),
            api_key: cfg.api_key.clone(),
            api_secret: cfg.api_secret.clone(),
            default_folder: cfg.folder.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn default_folder(&self) -> &str {
        &self.default_folder
    }

    /// Upload `file` (a data URL or remote URL). An empty or missing
    /// `folder` uses the configured default.
    pub async fn upload(
        &self,
        file: &str,
        folder: Option<&str>,
        public_id: Option<&str>,
    ) -> Result<UploadResult, UploadError> {
        if file.is_empty() {
            return Err(UploadError::MissingImage);
        }
        let folder = folder
            .filter(|f| !f.is_empty())
            .unwrap_or(self.default_folder.as_str())
            .to_string();
        let public_id = public_id.unwrap_or_default().to_string();
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let signature = sign_params(
            &[
                ("timestamp", timestamp.as_str()),
                ("folder", folder.as_str()),
                ("public_id", public_id.as_str()),
            ],
            &self.api_secret,
        );

        let mut form = reqwest::multipart::Form::new()
            .text("file", file.to_string())
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);
        if !folder.is_empty() {
            form = form.text("folder", folder.clone());
        }
        if !public_id.is_empty() {
            form = form.text("public_id", public_id);
        }

        debug!(folder = %folder, bytes = file.len(), "Uploading image");
        let resp = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .map(|e| e.message)
                .unwrap_or_else(|| "Upload failed".to_string());
            warn!(status = status.as_u16(), "Upload rejected: {message}");
            return Err(UploadError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| UploadError::Api {
            status: status.as_u16(),
            message: format!("Unexpected upload response: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_and_skips_empty_values() {
        let a = sign_params(
            &[("timestamp", "1700000000"), ("folder", "photobooth"), ("public_id", "")],
            "s3cr3t",
        );
        let b = sign_params(&[("folder", "photobooth"), ("timestamp", "1700000000")], "s3cr3t");
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signature_matches_known_digest() {
        // sha1("folder=photobooth&timestamp=1700000000abcd")
        let mut hasher = Sha1::new();
        hasher.update(b"folder=photobooth&timestamp=1700000000abcd");
        let expected = hex::encode(hasher.finalize());
        assert_eq!(
            sign_params(&[("timestamp", "1700000000"), ("folder", "photobooth")], "abcd"),
            expected
        );
    }

    #[test]
    fn signature_depends_on_secret() {
        let params = [("timestamp", "1")];
        assert_ne!(sign_params(&params, "a"), sign_params(&params, "b"));
    }

    #[test]
    fn client_requires_credentials() {
        let cfg = CloudinaryConfig {
            cloud_name: "demo".into(),
            ..CloudinaryConfig::default()
        };
        assert!(matches!(CloudinaryClient::from_config(&cfg), Err(UploadError::NotConfigured)));
    }

    #[test]
    fn client_builds_endpoint_from_cloud_name() {
        let cfg = CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "k".into(),
            api_secret: "s".into(),
            folder: "events".into(),
        };
        let client = CloudinaryClient::from_config(&cfg).unwrap();
        assert_eq!(client.endpoint(), "https://api.cloudinary.com/v1_1/demo/image/upload");
        assert_eq!(client.default_folder(), "events");
    }

    #[tokio::test]
    async fn empty_file_is_rejected_before_any_request() {
        let cfg = CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "k".into(),
            api_secret: "s".into(),
            folder: String::new(),
        };
        let client = CloudinaryClient::from_config(&cfg).unwrap();
        assert!(matches!(client.upload("", None, None).await, Err(UploadError::MissingImage)));
    }

    #[test]
    fn upload_result_parses_response_subset() {
        let body = r#"{
            "secure_url": "https://res.cloudinary.com/demo/x.png",
            "public_id": "photobooth/x",
            "width": 1200,
            "height": 1800,
            "bytes": 12345,
            "format": "png",
            "etag": "ignored"
        }"#;
        let result: UploadResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.width, 1200);
        assert_eq!(result.public_id, "photobooth/x");
    }
}
