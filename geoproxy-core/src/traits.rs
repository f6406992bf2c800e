//! Collaborator contracts for the lookup pipeline.
//!
//! The request handler only talks to the outside world through these traits,
//! so stores, providers and clocks can be swapped in tests and deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::CacheEntry;

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Key-value store for cached provider payloads.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - A local file (for single-node deployments)
/// - A managed table with native TTL
///
/// A store may keep returning entries after they expire; callers must check
/// [`CacheEntry::is_expired_at`] themselves.
#[async_trait]
pub trait LookupStore: Send + Sync {
    /// Point lookup by the verbatim address.
    ///
    /// Returns `Ok(None)` when nothing is stored. Errors only on real
    /// connectivity or storage failures.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Point write. Replaces any entry stored under the same key.
    async fn put(&self, entry: CacheEntry) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM PROVIDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of fresh geocoding payloads.
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    /// Fetches the raw response body for an address.
    ///
    /// One attempt per call. Fails on non-success status, transport failure
    /// or missing configuration.
    async fn fetch(&self, address: &str) -> Result<String>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLOCK
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of the current time for expiry decisions.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
