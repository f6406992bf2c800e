//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};

/// Query string of `GET /geocode`.
#[derive(Debug, Default, Deserialize)]
pub struct GeocodeParams {
    /// Address to geocode, passed through verbatim
    pub address: Option<String>,
}

/// Response for the health check.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Cache TTL in days
    pub cache_ttl_days: u64,
    /// Whether concurrent identical lookups are coalesced
    pub single_flight: bool,
}
