//! Lookup requests and annotated responses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MISSING_ADDRESS_MESSAGE;
use crate::error::{GeoError, Result};

/// A raw inbound lookup request.
///
/// The address is kept exactly as received; validation only decides whether
/// it is usable, it never rewrites it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// The `address` parameter, if present
    #[serde(default)]
    pub address: Option<String>,
}

impl LookupRequest {
    /// Creates a request from an optional address parameter.
    pub fn new(address: Option<String>) -> Self {
        Self { address }
    }

    /// Creates a request for a known address.
    pub fn for_address(address: impl Into<String>) -> Self {
        Self::new(Some(address.into()))
    }

    /// Returns the validated address.
    ///
    /// Missing, empty, or whitespace-only addresses are a `BadRequest`.
    /// The returned slice is the raw address, not trimmed.
    pub fn address(&self) -> Result<&str> {
        match self.address.as_deref() {
            Some(address) if !address.trim().is_empty() => Ok(address),
            _ => Err(GeoError::BadRequest(MISSING_ADDRESS_MESSAGE.into())),
        }
    }
}

/// Where a response payload came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    /// Served from the lookup store
    Hit,
    /// Freshly fetched from the upstream provider
    Miss,
}

impl CacheStatus {
    /// Header value for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupResponse {
    /// Opaque JSON body, verbatim from the provider or the store
    pub body: String,
    /// HIT or MISS
    pub cache_status: CacheStatus,
}

impl LookupResponse {
    /// A response served from the store.
    pub fn hit(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            cache_status: CacheStatus::Hit,
        }
    }

    /// A response freshly fetched from the provider.
    pub fn miss(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            cache_status: CacheStatus::Miss,
        }
    }

    /// Returns true if served from the store.
    pub fn is_hit(&self) -> bool {
        self.cache_status == CacheStatus::Hit
    }
}
