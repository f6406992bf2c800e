//! # GEOPROXY Store
//!
//! Lookup store adapters for cached geocoding payloads.
//!
//! This crate provides two backends:
//!
//! - **Memory**: in-memory map with lazy expiry, for development and testing
//! - **File**: write-through file persistence for single-node deployments
//!
//! ## Example
//!
//! ```rust,ignore
//! use geoproxy_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! store.put(CacheEntry::with_ttl(address, body, Utc::now(), ttl)).await?;
//! let cached = store.get(address).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod memory;
mod file;

pub use memory::{MemoryStore, StoreStats};
pub use file::FileStore;

// Re-export the trait from core
pub use geoproxy_core::traits::LookupStore as Store;
