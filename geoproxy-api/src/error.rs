//! API error handling.
//!
//! Failures are rendered as plain-text bodies; only successful lookups
//! carry JSON.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use geoproxy_core::error::GeoError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Plain-text message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<GeoError> for ApiError {
    fn from(err: GeoError) -> Self {
        if err.is_client_error() {
            ApiError::bad_request(err.to_string())
        } else if err.is_upstream_error() {
            tracing::warn!(error = %err, "Upstream lookup failed");
            ApiError::internal(err.to_string())
        } else {
            tracing::error!(error = %err, "Internal error");
            ApiError::internal(err.to_string())
        }
    }
}

/// Turns a handler panic into a plain-text 500.
pub(crate) fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(%detail, "Request handler panicked");
    ApiError::internal(format!("Internal error: {}", detail)).into_response()
}
