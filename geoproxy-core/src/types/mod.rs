//! Domain types for GEOPROXY.
//!
//! - [`CacheEntry`]: a cached provider payload with its absolute expiry
//! - [`LookupRequest`]: the raw inbound request
//! - [`LookupResponse`]: the payload annotated with [`CacheStatus`]

mod entry;
mod lookup;

pub use entry::*;
pub use lookup::*;
