//! App state: lookup handler, config.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use geoproxy_core::constants::{DEFAULT_CACHE_TTL_DAYS, DEFAULT_GEOCODING_URL, DEFAULT_UPSTREAM_TIMEOUT_SECONDS};
use geoproxy_core::error::Result;
use geoproxy_core::traits::{LookupStore, UpstreamProvider};
use geoproxy_lookup::LookupHandler;
use geoproxy_store::{FileStore, MemoryStore};
use geoproxy_upstream::{GeocodingClient, GeocodingConfig, RetryConfig, RetryingProvider};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Geocoding API key; absence only surfaces on the first upstream call
    pub api_key: Option<String>,
    /// Geocoding endpoint
    pub geocoding_url: String,
    /// Upstream timeout in seconds
    pub upstream_timeout_seconds: u64,
    /// Upstream attempts per lookup; values above 1 enable retries
    pub upstream_max_attempts: u32,
    /// Cache file; `None` keeps the cache in memory
    pub cache_path: Option<PathBuf>,
    /// Cache TTL in days
    pub cache_ttl_days: u64,
    /// Coalesce concurrent lookups for the same address
    pub single_flight: bool,
    /// How often the store drops expired entries
    pub purge_interval_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocoding_url: DEFAULT_GEOCODING_URL.into(),
            upstream_timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
            upstream_max_attempts: 1,
            cache_path: None,
            cache_ttl_days: DEFAULT_CACHE_TTL_DAYS as u64,
            single_flight: false,
            purge_interval_seconds: 3600,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
        .unwrap_or(false)
}

impl ApiConfig {
    /// Reads configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            api_key: std::env::var("GEOCODING_API_KEY").ok(),
            geocoding_url: std::env::var("GEOCODING_BASE_URL").unwrap_or(defaults.geocoding_url),
            upstream_timeout_seconds: env_parse("GEOCODING_TIMEOUT_SECS", defaults.upstream_timeout_seconds),
            upstream_max_attempts: env_parse("GEOCODING_MAX_ATTEMPTS", defaults.upstream_max_attempts),
            cache_path: std::env::var("GEOPROXY_CACHE_PATH").ok().map(PathBuf::from),
            cache_ttl_days: env_parse("GEOPROXY_CACHE_TTL_DAYS", defaults.cache_ttl_days),
            single_flight: env_flag("GEOPROXY_SINGLE_FLIGHT"),
            purge_interval_seconds: env_parse("GEOPROXY_PURGE_INTERVAL_SECS", defaults.purge_interval_seconds),
        }
    }

    /// Cache TTL as a duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_days.saturating_mul(24 * 60 * 60))
    }

    /// Builds the upstream provider described by this config.
    pub fn build_provider(&self) -> Result<Arc<dyn UpstreamProvider>> {
        let client = GeocodingClient::with_config(GeocodingConfig {
            base_url: self.geocoding_url.clone(),
            api_key: self.api_key.clone(),
            timeout_seconds: self.upstream_timeout_seconds,
        })?;

        if self.upstream_max_attempts > 1 {
            let retry = RetryConfig {
                max_attempts: self.upstream_max_attempts,
                ..Default::default()
            };
            Ok(Arc::new(RetryingProvider::with_config(client, retry)))
        } else {
            Ok(Arc::new(client))
        }
    }

    /// Interval between background purges of expired entries.
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_seconds.max(1))
    }

    /// Opens the store described by this config.
    ///
    /// Either store gets a background task purging expired entries, so this
    /// must run inside a Tokio runtime.
    pub async fn open_store(&self) -> Result<Arc<dyn LookupStore>> {
        match &self.cache_path {
            Some(path) => {
                let store = Arc::new(FileStore::open(path).await?);
                store.clone().spawn_reaper(self.purge_interval());
                info!(path = ?path, entries = store.len(), "Using file-backed cache");
                Ok(store)
            }
            None => {
                let store = Arc::new(MemoryStore::new());
                store.clone().spawn_reaper(self.purge_interval());
                info!("Using in-memory cache");
                Ok(store)
            }
        }
    }

    /// Builds the lookup handler described by this config.
    pub async fn build_handler(&self) -> Result<LookupHandler> {
        let store = self.open_store().await?;
        let provider = self.build_provider()?;

        let mut handler = LookupHandler::new(store, provider).with_ttl(self.cache_ttl());
        if self.single_flight {
            handler = handler.with_single_flight();
        }
        Ok(handler)
    }
}

/// Shared state for request handlers.
pub struct AppState {
    /// Configuration the state was built from
    pub config: ApiConfig,
    /// Cache-first lookup pipeline
    pub handler: LookupHandler,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates state around an already-built handler.
    pub fn new(config: ApiConfig, handler: LookupHandler) -> Self {
        Self {
            config,
            handler,
            started_at: Instant::now(),
        }
    }

    /// Builds store, provider and handler from the config.
    pub async fn from_config(config: ApiConfig) -> Result<Self> {
        let handler = config.build_handler().await?;
        Ok(Self::new(config, handler))
    }
}
