//! Cache entries stored by the lookup store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached upstream payload.
///
/// The constructors always take an expiry, so a payload never exists in a
/// store without one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The raw address string the payload was fetched for
    pub key: String,
    /// Opaque response body, passed through verbatim
    pub payload: String,
    /// Absolute instant after which the entry is stale
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry with an absolute expiry.
    pub fn new(key: impl Into<String>, payload: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
            expires_at,
        }
    }

    /// Creates an entry that expires `ttl` after `now`.
    ///
    /// A TTL too large to represent saturates to the maximum timestamp.
    pub fn with_ttl(
        key: impl Into<String>,
        payload: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(key, payload, expires_at)
    }

    /// Returns true once `now` is past the expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
