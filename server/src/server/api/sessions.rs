//! Session CRUD API.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use session_store::{SessionPatch, TimerSetting, is_valid_id};

use crate::app::SharedState;

use super::{ApiError, err_json};

type ApiResult = Result<Json<Value>, ApiError>;

pub const MAX_PHOTOS: usize = 4;
pub const DEFAULT_LAYOUT: &str = "template-phone";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionBody {
    pub layout: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub timer: Option<u8>,
}

fn check_layout(layout: &str) -> Result<(), ApiError> {
    if is_valid_id(layout) {
        Ok(())
    } else {
        Err(err_json(400, "layout must contain only letters, digits, '-' or '_'"))
    }
}

fn check_photos(photos: &[String]) -> Result<(), ApiError> {
    if photos.len() > MAX_PHOTOS {
        return Err(err_json(400, &format!("at most {MAX_PHOTOS} photos are allowed")));
    }
    Ok(())
}

/// POST /api/sessions – Create a session
pub async fn create_session(
    State(state): State<SharedState>,
    Json(body): Json<CreateSessionBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let layout = body.layout.unwrap_or_else(|| DEFAULT_LAYOUT.to_string());
    check_layout(&layout)?;
    check_photos(&body.photos)?;
    let timer = match body.timer {
        Some(t) => TimerSetting::try_from(t).map_err(|e| err_json(400, &e))?,
        None => TimerSetting::default(),
    };

    let record = state
        .store()
        .create(&layout, body.photos, timer)
        .ok_or_else(|| err_json(500, "Failed to save session"))?;

    tracing::info!(id = %record.id, layout = %record.layout, "Session created");
    Ok((StatusCode::CREATED, Json(json!({ "id": record.id }))))
}

/// GET /api/sessions/{id} – Fetch a session
pub async fn get_session(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult {
    let record = state
        .store()
        .load(&id)
        .ok_or_else(|| err_json(404, "Session not found"))?;
    let value = serde_json::to_value(record).map_err(|e| err_json(500, &e.to_string()))?;
    Ok(Json(value))
}

/// PATCH /api/sessions/{id} – Partially update a session
pub async fn update_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(patch): Json<SessionPatch>,
) -> ApiResult {
    if let Some(layout) = &patch.layout {
        check_layout(layout)?;
    }
    if let Some(photos) = &patch.photos {
        check_photos(photos)?;
    }
    if state.store().load(&id).is_none() {
        return Err(err_json(404, "Session not found"));
    }
    let success = state.store().update(&id, patch);
    if !success {
        return Err(err_json(500, "Failed to save session"));
    }
    Ok(Json(json!({ "success": true })))
}
