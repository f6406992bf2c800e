//! In-memory lookup store with lazy expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use geoproxy_core::error::Result;
use geoproxy_core::traits::LookupStore;
use geoproxy_core::types::CacheEntry;

/// In-memory store for cached payloads.
///
/// Thread-safe. Like a managed table with native TTL, expired entries are
/// only removed by [`MemoryStore::purge_expired`] (or the reaper task), so
/// `get` may hand back a stale entry.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Loads a set of entries, replacing any with the same key.
    pub fn import(&self, entries: impl IntoIterator<Item = CacheEntry>) {
        let mut map = self.entries.write();
        for entry in entries {
            map.insert(entry.key.clone(), entry);
        }
    }

    /// Inserts an entry, returning the one it replaced.
    pub fn insert(&self, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.write().insert(entry.key.clone(), entry)
    }

    /// Removes the entry for `key`, returning it.
    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        self.entries.write().remove(key)
    }

    /// Returns a snapshot of every stored entry.
    pub fn all_entries(&self) -> Vec<CacheEntry> {
        self.entries.read().values().cloned().collect()
    }

    /// Removes all entries that expired before `now`. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired_at(now));
        before - entries.len()
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns store statistics as of `now`.
    pub fn stats(&self, now: DateTime<Utc>) -> StoreStats {
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired_at(now)).count();
        StoreStats {
            total_entries: entries.len(),
            expired_entries: expired,
            live_entries: entries.len().saturating_sub(expired),
        }
    }

    /// Spawns a task that purges expired entries every `interval`.
    pub fn spawn_reaper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.purge_expired(Utc::now());
                if removed > 0 {
                    debug!(removed, "Purged expired cache entries");
                }
            }
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LookupStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.insert(entry);
        Ok(())
    }
}

/// Store statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Entries past their expiry but not yet purged
    pub expired_entries: usize,
    /// Entries still valid
    pub live_entries: usize,
}
