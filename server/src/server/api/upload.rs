//! Direct image upload proxy.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;

use crate::app::SharedState;
use crate::services::upload::UploadError;

use super::{ApiError, err_json};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
    pub image: Option<String>,
    pub folder: Option<String>,
    pub public_id: Option<String>,
}

/// POST /api/upload – Sign and forward an image to the upload service
pub async fn upload_image(
    State(state): State<SharedState>,
    Json(body): Json<UploadBody>,
) -> Result<Json<Value>, ApiError> {
    let Some(image) = body.image.filter(|i| !i.is_empty()) else {
        return Err(err_json(400, &UploadError::MissingImage.to_string()));
    };
    let Some(client) = state.uploader() else {
        return Err(err_json(500, &UploadError::NotConfigured.to_string()));
    };

    let result = client
        .upload(&image, body.folder.as_deref(), body.public_id.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Upload failed: {e}");
            err_json(500, &e.to_string())
        })?;
    let value = serde_json::to_value(result).map_err(|e| err_json(500, &e.to_string()))?;
    Ok(Json(value))
}
