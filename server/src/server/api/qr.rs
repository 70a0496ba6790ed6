//! QR code rendering for share links.

use axum::extract::Query;
use axum::response::Response;
use serde::Deserialize;

use crate::services::render::encode_png;

use super::{ApiError, err_json, png_response};

const DEFAULT_QR_SIZE: u32 = 200;
const MIN_QR_SIZE: u32 = 64;
const MAX_QR_SIZE: u32 = 1024;

#[derive(Debug, Default, Deserialize)]
pub struct QrQuery {
    pub data: Option<String>,
    pub size: Option<u32>,
}

/// GET /api/qr?data=&size= – PNG QR code
pub async fn get_qr(Query(query): Query<QrQuery>) -> Result<Response, ApiError> {
    let Some(data) = query.data.filter(|d| !d.is_empty()) else {
        return Err(err_json(400, "data is required"));
    };
    let size = query.size.unwrap_or(DEFAULT_QR_SIZE).clamp(MIN_QR_SIZE, MAX_QR_SIZE);

    let png = tokio::task::spawn_blocking(move || {
        let img = image_engine::generate_qr(&data, size).map_err(|e| e.to_string())?;
        encode_png(&img.to_rgba8()).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| err_json(500, &e.to_string()))?
    .map_err(|e| err_json(500, &e))?;
    png_response(png)
}
