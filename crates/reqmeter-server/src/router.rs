//! Axum router wiring.

use axum::{routing::get, Router};

use crate::{app_state::AppState, handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/error", get(handlers::error))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}
