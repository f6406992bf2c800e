//! # GEOPROXY Core
//!
//! Core types, errors, and traits for the GEOPROXY cache-first geocoding proxy.
//!
//! This crate provides the building blocks shared by every other GEOPROXY crate:
//!
//! - **Types**: cache entries, lookup requests and annotated responses
//! - **Errors**: the error taxonomy and its client/upstream/store classes
//! - **Constants**: TTL, header names and validation messages
//! - **Traits**: the Lookup Store, Upstream Provider and Clock contracts
//!
//! ## Example
//!
//! ```rust
//! use geoproxy_core::{CacheStatus, LookupRequest};
//!
//! let request = LookupRequest::new(Some("70 Vanderbilt Ave, New York, NY 10017".into()));
//! assert!(request.address().is_ok());
//! assert_eq!(CacheStatus::Hit.as_str(), "HIT");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{GeoError, Result};
pub use traits::*;
pub use types::*;
