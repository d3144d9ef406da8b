//! Shared error type across reqmeter crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// A metric with the same name is already registered.
    DuplicateName,
    /// Label set does not match the declared label names.
    InvalidLabel,
    /// Metric or label name is not a valid identifier.
    InvalidName,
    /// Invalid input / malformed config.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::DuplicateName => "DUPLICATE_NAME",
            ClientCode::InvalidLabel => "INVALID_LABEL",
            ClientCode::InvalidName => "INVALID_NAME",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ReqMeterError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ReqMeterError {
    #[error("metric already registered: {0}")]
    DuplicateName(String),
    #[error("invalid labels: {0}")]
    InvalidLabel(String),
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ReqMeterError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ReqMeterError::DuplicateName(_) => ClientCode::DuplicateName,
            ReqMeterError::InvalidLabel(_) => ClientCode::InvalidLabel,
            ReqMeterError::InvalidName(_) => ClientCode::InvalidName,
            ReqMeterError::BadRequest(_) => ClientCode::BadRequest,
            ReqMeterError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            ReqMeterError::Internal(_) => ClientCode::Internal,
        }
    }
}
