//! REST API handlers grouped by domain.

pub mod qr;
pub mod result;
pub mod sessions;
pub mod upload;

use axum::Json;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};

type ApiError = (StatusCode, Json<Value>);

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> ApiError {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

/// PNG response that must not be cached by intermediaries.
pub fn png_response(data: Vec<u8>) -> Result<Response, ApiError> {
    Response::builder()
        .header(header::CONTENT_TYPE, "image/png")
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(data))
        .map_err(|e| err_json(500, &e.to_string()))
}
