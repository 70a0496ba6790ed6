//! Rendered result, preview and publish endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::Value;
use session_store::SessionRecord;

use crate::app::SharedState;
use crate::services::render::preview_size;

use super::{ApiError, err_json, png_response};

/// Widest preview a client may request.
const MAX_PREVIEW_WIDTH: u32 = 2048;

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub width: Option<u32>,
}

fn find_session(state: &SharedState, id: &str) -> Result<SessionRecord, ApiError> {
    state.store().load(id).ok_or_else(|| err_json(404, "Session not found"))
}

/// GET /api/sessions/{id}/result.png – Full-size composition
pub async fn get_result(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, &id)?;
    let png = state
        .renderer()
        .render_png(&session, None)
        .await
        .map_err(|e| err_json(500, &e.to_string()))?;
    png_response(png)
}

/// GET /api/sessions/{id}/preview.png?width= – Reduced preview
pub async fn get_preview(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, &id)?;
    let width = match query.width {
        Some(w) => w.clamp(1, MAX_PREVIEW_WIDTH),
        None => state.config().preview_width,
    };
    let size = preview_size(&session.layout, width);
    let png = state
        .renderer()
        .render_png(&session, Some(size))
        .await
        .map_err(|e| err_json(500, &e.to_string()))?;
    png_response(png)
}

/// POST /api/sessions/{id}/publish – Render, upload and build share links
pub async fn publish_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let session = find_session(&state, &id)?;
    let base_url = {
        let config = state.config();
        if config.public_base_url.is_empty() {
            format!("http://localhost:{}", config.server_port)
        } else {
            config.public_base_url.clone()
        }
    };
    let outcome = state
        .renderer()
        .publish(&session, state.uploader(), &base_url)
        .await
        .map_err(|e| err_json(500, &e.to_string()))?;
    let value = serde_json::to_value(outcome).map_err(|e| err_json(500, &e.to_string()))?;
    Ok(Json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::api::test_support::test_state;
    use axum::http::{StatusCode, header};
    use session_store::TimerSetting;

    fn decode_body_png(bytes: &[u8]) -> image::DynamicImage {
        image::load_from_memory(bytes).unwrap()
    }

    #[tokio::test]
    async fn result_is_png_at_default_size() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let record = state.store().create("4-grid", vec![], TimerSetting::Three).unwrap();

        let resp = get_result(State(state), Path(record.id)).await.unwrap();
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let img = decode_body_png(&bytes);
        assert_eq!((img.width(), img.height()), (1080, 1920));
    }

    #[tokio::test]
    async fn preview_follows_layout_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let phone = state.store().create("template-phone", vec![], TimerSetting::Three).unwrap();
        let grid = state.store().create("3-grid", vec![], TimerSetting::Five).unwrap();

        let query = Query(PreviewQuery { width: Some(120) });
        let resp = get_preview(State(state.clone()), Path(phone.id), query).await.unwrap();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let img = decode_body_png(&bytes);
        assert_eq!((img.width(), img.height()), (120, 160));

        let resp = get_preview(State(state), Path(grid.id), Query(PreviewQuery::default()))
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let img = decode_body_png(&bytes);
        assert_eq!((img.width(), img.height()), (400, 800));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let (status, _) = get_result(State(state.clone()), Path("missing".into()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = publish_session(State(state), Path("missing".into())).await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn publish_without_credentials_reports_local_links() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let record = state.store().create("3-grid", vec![], TimerSetting::Three).unwrap();

        let Json(outcome) = publish_session(State(state), Path(record.id.clone())).await.unwrap();
        assert_eq!(outcome["uploaded"], false);
        assert!(outcome["cloud_url"].is_null());
        assert_eq!(
            outcome["local_url"],
            format!("http://booth.test/api/sessions/{}/result.png", record.id)
        );
        assert_eq!(
            outcome["share_url"],
            format!("http://booth.test/photo-result?id={}", record.id)
        );
        assert!(outcome["error"].as_str().unwrap().contains("not configured"));
    }
}
