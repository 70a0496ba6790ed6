use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::api;
use crate::app::SharedState;

/// Sessions carry up to four full-resolution data URLs.
const BODY_LIMIT: usize = 40 * 1024 * 1024;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        // --- Sessions ---
        .route("/api/sessions", post(api::sessions::create_session))
        .route(
            "/api/sessions/{id}",
            get(api::sessions::get_session).patch(api::sessions::update_session),
        )
        .route("/api/sessions/{id}/result.png", get(api::result::get_result))
        .route("/api/sessions/{id}/preview.png", get(api::result::get_preview))
        .route("/api/sessions/{id}/publish", post(api::result::publish_session))
        // --- Upload / QR ---
        .route("/api/upload", post(api::upload::upload_image))
        .route("/api/qr", get(api::qr::get_qr))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
