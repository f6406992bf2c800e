//! # GEOPROXY Lookup
//!
//! The cache-first request pipeline.
//!
//! ```text
//! request -> validate -> store.get -> hit:  return body (HIT)
//!                                  -> miss: provider.fetch -> store.put(now + ttl) -> return body (MISS)
//! ```
//!
//! Store failures degrade to a miss or are ignored; provider failures fail
//! the request.
//!
//! ## Example
//!
//! ```rust,ignore
//! use geoproxy_lookup::LookupHandler;
//!
//! let handler = LookupHandler::new(store, provider);
//! let response = handler.handle(&LookupRequest::for_address("70 Vanderbilt Ave")).await?;
//! println!("{} {}", response.cache_status, response.body);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod handler;
mod single_flight;

pub use handler::LookupHandler;
pub use single_flight::{KeyGuard, KeyedLocks};
