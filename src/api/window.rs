use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::domain::TimeSec;
use crate::error::AppError;
use crate::orchestration::WindowReport;

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub from: i64,
    pub to: i64,
}

pub async fn get_window(
    Query(params): Query<WindowQuery>,
    State(state): State<AppState>,
) -> Result<Json<WindowReport>, AppError> {
    let report = state
        .service
        .get_window(TimeSec::new(params.from), TimeSec::new(params.to))
        .await?;
    Ok(Json(report))
}
