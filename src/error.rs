//! Error types for the cache service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache store and the API layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Bad TTL, key or configuration value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller exceeded its request quota for the current window
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Wrapped handler failed; never cached
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CacheError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            CacheError::UpstreamFailure(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            CacheError::InvalidArgument(msg) => ErrorResponse::with_details("Invalid argument", msg),
            CacheError::RateLimited { retry_after_secs } => ErrorResponse::with_details(
                "Too many requests",
                format!("retry after {}s", retry_after_secs),
            ),
            CacheError::UpstreamFailure(msg) => ErrorResponse::with_details("Upstream failure", msg),
            CacheError::Internal(msg) => ErrorResponse::with_details("Internal error", msg),
        };

        match self {
            CacheError::RateLimited { retry_after_secs } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(body),
            )
                .into_response(),
            _ => (status, Json(body)).into_response(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache service.
pub type Result<T> = std::result::Result<T, CacheError>;
