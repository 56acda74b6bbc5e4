use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::error::AppError;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Readiness includes a store round-trip, so a wedged store file surfaces
/// here instead of on the first window query.
pub async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let coverage = state.service.cache().load_coverage()?;
    let logs = state.service.cache().load_logs()?;
    Ok(Json(serde_json::json!({
        "status": "ready",
        "coveredRanges": coverage.intervals().len(),
        "cachedEvents": logs.len(),
    })))
}
