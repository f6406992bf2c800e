//! Retrying wrapper for upstream providers.
//!
//! Not part of the default pipeline; wrap a provider explicitly to opt in.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use geoproxy_core::error::Result;
use geoproxy_core::traits::UpstreamProvider;

/// Retry policy.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

/// Provider that retries recoverable failures with exponential backoff.
pub struct RetryingProvider<P> {
    inner: P,
    config: RetryConfig,
}

impl<P: UpstreamProvider> RetryingProvider<P> {
    /// Wraps a provider with the default policy.
    pub fn new(inner: P) -> Self {
        Self::with_config(inner, RetryConfig::default())
    }

    /// Wraps a provider with a custom policy.
    pub fn with_config(inner: P, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Returns the wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: UpstreamProvider> UpstreamProvider for RetryingProvider<P> {
    async fn fetch(&self, address: &str) -> Result<String> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut delay = self.config.base_delay;
        let mut attempt = 1;

        loop {
            match self.inner.fetch(address).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_recoverable() && attempt < max_attempts => {
                    warn!(attempt, error = %e, "Upstream fetch failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
