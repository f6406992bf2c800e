//! Error types for GEOPROXY.
//!
//! Every variant belongs to exactly one class: client, upstream, store or
//! internal. The lookup pipeline absorbs store errors, propagates upstream
//! errors, and rejects client errors before any I/O.

use thiserror::Error;

/// Result type alias using `GeoError`.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Main error type for all GEOPROXY operations.
#[derive(Debug, Error)]
pub enum GeoError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CLIENT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Inbound request is missing or has an empty parameter.
    #[error("{0}")]
    BadRequest(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Upstream provider failed.
    #[error("Upstream geocoding request failed: {0}")]
    Upstream(String),

    /// Upstream provider answered with a non-success status.
    #[error("Upstream geocoding request failed with status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Provider credential is not configured.
    #[error("Missing upstream credential: {0}")]
    MissingCredential(String),

    /// HTTP transport failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Upstream did not answer in time.
    #[error("Upstream timeout: {0}")]
    Timeout(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Lookup store read or write failed.
    #[error("Store error: {0}")]
    Store(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persisted store format version mismatch.
    #[error("Store format version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected failure during orchestration.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GeoError {
    /// Returns true if the caller sent an invalid request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GeoError::BadRequest(_))
    }

    /// Returns true if the upstream provider failed or is misconfigured.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            GeoError::Upstream(_)
                | GeoError::UpstreamStatus { .. }
                | GeoError::MissingCredential(_)
                | GeoError::Http(_)
                | GeoError::Timeout(_)
        )
    }

    /// Returns true if this is a lookup store failure.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            GeoError::Store(_)
                | GeoError::Io(_)
                | GeoError::Json(_)
                | GeoError::VersionMismatch { .. }
        )
    }

    /// Returns true if this error is transient (can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            GeoError::Http(_) | GeoError::Timeout(_) => true,
            GeoError::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Converts any error into the upstream class, keeping upstream errors as-is.
    pub fn into_upstream(self) -> Self {
        if self.is_upstream_error() {
            self
        } else {
            GeoError::Upstream(self.to_string())
        }
    }
}
