//! HTTP mapping for `ReqMeterError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use reqmeter_core::error::{ClientCode, ReqMeterError};

/// Handler error. Wraps the shared error so it can become a response.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ReqMeterError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::BadRequest | ClientCode::InvalidLabel | ClientCode::InvalidName => {
                StatusCode::BAD_REQUEST
            }
            ClientCode::DuplicateName | ClientCode::UnsupportedVersion | ClientCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({
            "error": code.as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
