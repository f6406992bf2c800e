//! Cache-first lookup handler.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use geoproxy_core::constants::DEFAULT_CACHE_TTL_SECONDS;
use geoproxy_core::error::Result;
use geoproxy_core::traits::{Clock, LookupStore, SystemClock, UpstreamProvider};
use geoproxy_core::types::{CacheEntry, LookupRequest, LookupResponse};

use crate::single_flight::KeyedLocks;

/// Orchestrates store reads, provider fallbacks and cache population.
///
/// Per request: one store read, at most one provider call, at most one
/// store write. Store failures never fail a request; provider failures
/// always do.
pub struct LookupHandler {
    store: Arc<dyn LookupStore>,
    provider: Arc<dyn UpstreamProvider>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    in_flight: Option<KeyedLocks>,
}

impl LookupHandler {
    /// Creates a handler with the 30-day TTL and the system clock.
    pub fn new(store: Arc<dyn LookupStore>, provider: Arc<dyn UpstreamProvider>) -> Self {
        Self {
            store,
            provider,
            clock: Arc::new(SystemClock),
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            in_flight: None,
        }
    }

    /// Overrides the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Overrides the clock used for expiry decisions.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Coalesces concurrent lookups for the same address.
    ///
    /// Followers wait for the leader and then find its entry in the store.
    /// Off by default.
    pub fn with_single_flight(mut self) -> Self {
        self.in_flight = Some(KeyedLocks::new());
        self
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns true if single-flight coalescing is enabled.
    pub fn is_single_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Handles one lookup request.
    ///
    /// Fails with `BadRequest` before any I/O if the address is missing or
    /// blank, and with an upstream-class error if the provider fails.
    #[instrument(skip(self, request))]
    pub async fn handle(&self, request: &LookupRequest) -> Result<LookupResponse> {
        let address = request.address()?;

        match &self.in_flight {
            Some(locks) => {
                let _guard = locks.lock(address).await;
                self.lookup(address).await
            }
            None => self.lookup(address).await,
        }
    }

    async fn lookup(&self, address: &str) -> Result<LookupResponse> {
        let now = self.clock.now();

        match self.store.get(address).await {
            Ok(Some(entry)) if !entry.is_expired_at(now) => {
                debug!(address, expires_at = %entry.expires_at, "Cache hit");
                return Ok(LookupResponse::hit(entry.payload));
            }
            Ok(Some(entry)) => {
                debug!(address, expires_at = %entry.expires_at, "Cached entry expired, treating as miss");
            }
            Ok(None) => {
                debug!(address, "Cache miss");
            }
            Err(e) => {
                warn!(address, error = %e, "Store read failed, falling back to provider");
            }
        }

        let body = self
            .provider
            .fetch(address)
            .await
            .map_err(|e| e.into_upstream())?;

        let entry = CacheEntry::with_ttl(address, body.clone(), now, self.ttl);
        let expires_at = entry.expires_at;
        if let Err(e) = self.store.put(entry).await {
            warn!(address, error = %e, "Store write failed, returning fresh response anyway");
        } else {
            info!(address, %expires_at, "Cached fresh geocoding response");
        }

        Ok(LookupResponse::miss(body))
    }
}
