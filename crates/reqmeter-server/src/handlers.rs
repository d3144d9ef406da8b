//! HTTP handlers.
//!
//! - `/`        : 200 `OK`, counts `{GET, 200}`
//! - `/error`   : 500 `ERROR`, counts `{GET, 500}`
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{app_state::AppState, error::ApiError};

pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    state.http().record(Method::GET, StatusCode::OK);
    (StatusCode::OK, "OK")
}

pub async fn error(State(state): State<AppState>) -> impl IntoResponse {
    state.http().record(Method::GET, StatusCode::INTERNAL_SERVER_ERROR);
    (StatusCode::INTERNAL_SERVER_ERROR, "ERROR")
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let registry = state.registry();
    let body = registry.render().map_err(|e| {
        tracing::error!(error = %e, "metrics render failed");
        e
    })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, registry.content_type())],
        body,
    )
        .into_response())
}
