use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::AppState;
use crate::domain::LogId;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOverrideBody {
    pub buy_price: f64,
}

/// Record a manual per-share cost basis for one sell event. A non-positive
/// or non-finite price clears any existing override instead.
pub async fn set_override(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<SetOverrideBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = LogId::new(id);
    state.service.cache().set_override(&id, body.buy_price)?;
    info!(id = id.as_str(), buy_price = body.buy_price, "override set");
    Ok(Json(json!({"status": "ok"})))
}

pub async fn clear_override(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = LogId::new(id);
    let existed = state.service.cache().clear_override(&id)?;
    if !existed {
        return Err(AppError::NotFound(format!("no override for {}", id.as_str())));
    }
    Ok(Json(json!({"status": "ok"})))
}

pub async fn clear_all_overrides(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.service.cache().clear_all_overrides()?;
    Ok(Json(json!({"status": "ok"})))
}
