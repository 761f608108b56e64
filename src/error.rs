//! Error types for the result cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the result cache.
///
/// Connectivity failures never reach callers of `CacheStore`; they are
/// absorbed into the degraded flag. `Backend` only travels between a
/// backend implementation and the store.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A value or argument could not be encoded (caller error)
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store could not be reached or answered with an error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration is present but unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error (e.g. a blocking task was cancelled)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Serialization(_) | CacheError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::Backend(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::InvalidConfig(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the result cache.
pub type Result<T> = std::result::Result<T, CacheError>;
