use axum::extract::State;
use axum::Json;
use serde_json::json;
use tracing::info;

use super::AppState;
use crate::error::AppError;

/// Drop all cached logs, coverage, and any resume cursor. Manual overrides
/// are kept; clear them through the overrides endpoints.
pub async fn clear_cache(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.service.cache().clear_logs_and_coverage()?;
    info!("cache cleared");
    Ok(Json(json!({"status": "ok"})))
}
