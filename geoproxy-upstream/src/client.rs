//! HTTP client for the geocoding provider.
//!
//! Sends a single GET per lookup with the address URL-escaped and the API
//! key appended, and returns the response body untouched.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use geoproxy_core::constants::{ADDRESS_PARAM, DEFAULT_GEOCODING_URL, DEFAULT_UPSTREAM_TIMEOUT_SECONDS};
use geoproxy_core::error::{GeoError, Result};
use geoproxy_core::traits::UpstreamProvider;

/// Geocoding client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Endpoint URL (e.g., "https://maps.googleapis.com/maps/api/geocode/json")
    pub base_url: String,
    /// API key, checked on first use rather than at startup
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODING_URL.into(),
            api_key: None,
            timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
        }
    }
}

impl GeocodingConfig {
    /// Creates a config with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Overrides the endpoint URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Geocoding provider client.
pub struct GeocodingClient {
    config: GeocodingConfig,
    http_client: reqwest::Client,
}

impl GeocodingClient {
    /// Creates a client with the given API key and default endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeocodingConfig::with_api_key(api_key))
    }

    /// Creates a client with custom configuration.
    pub fn with_config(config: GeocodingConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GeoError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Builds the request URL for an address.
    fn request_url(&self, address: &str) -> Result<Url> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GeoError::MissingCredential("geocoding API key not configured".into()))?;

        Url::parse_with_params(
            &self.config.base_url,
            &[(ADDRESS_PARAM, address), ("key", api_key)],
        )
        .map_err(|e| GeoError::Config(format!("Invalid geocoding URL '{}': {}", self.config.base_url, e)))
    }
}

#[async_trait]
impl UpstreamProvider for GeocodingClient {
    #[instrument(skip(self))]
    async fn fetch(&self, address: &str) -> Result<String> {
        let url = self.request_url(address)?;

        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeoError::Timeout(format!("no response within {}s", self.config.timeout_seconds))
            } else {
                GeoError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeoError::Http(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Geocoding provider returned an error status");
            return Err(GeoError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!(bytes = body.len(), "Fetched geocoding response");
        Ok(body)
    }
}
