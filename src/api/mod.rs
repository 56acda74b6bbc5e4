pub mod admin;
pub mod health;
pub mod overrides;
pub mod window;

use crate::orchestration::WindowService;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WindowService>,
}

impl AppState {
    pub fn new(service: Arc<WindowService>) -> Self {
        Self { service }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/window", get(window::get_window))
        .route(
            "/v1/overrides/:id",
            put(overrides::set_override).delete(overrides::clear_override),
        )
        .route("/v1/overrides", axum::routing::delete(overrides::clear_all_overrides))
        .route("/v1/admin/clear-cache", post(admin::clear_cache))
        .layer(cors)
        .with_state(state)
}
