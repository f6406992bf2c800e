//! Pipeline constants for GEOPROXY.

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE LIFETIME
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of days a cached geocoding response stays valid.
pub const DEFAULT_CACHE_TTL_DAYS: i64 = 30;

/// Default TTL in seconds (30 days).
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = DEFAULT_CACHE_TTL_DAYS as u64 * 24 * 60 * 60;

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST SURFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// Name of the inbound query parameter carrying the address.
pub const ADDRESS_PARAM: &str = "address";

/// Message returned when the address parameter is missing or blank.
pub const MISSING_ADDRESS_MESSAGE: &str = "Missing required parameter: address";

/// Response header carrying the cache status.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM
// ═══════════════════════════════════════════════════════════════════════════════

/// Default geocoding endpoint.
pub const DEFAULT_GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Default upstream request timeout in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 10;
