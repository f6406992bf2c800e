//! # GEOPROXY Upstream
//!
//! Clients for the external geocoding provider.
//!
//! - [`GeocodingClient`]: one HTTP GET per lookup, body passed through verbatim
//! - [`RetryingProvider`]: optional backoff wrapper around any provider

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod client;
mod retry;

pub use client::{GeocodingClient, GeocodingConfig};
pub use retry::{RetryConfig, RetryingProvider};
