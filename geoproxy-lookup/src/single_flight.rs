//! Per-key async locks for coalescing concurrent lookups.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A set of async locks keyed by address.
///
/// Holding the guard for a key makes every other caller for that key wait.
/// Idle keys are removed when their last guard drops.
#[derive(Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    /// Creates an empty lock set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the lock on `key`.
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let slot = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let guard = slot.clone().lock_owned().await;

        KeyGuard {
            owner: self,
            key: key.to_string(),
            slot,
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or waited on.
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }
}

/// Guard for one key; releases the lock on drop.
pub struct KeyGuard<'a> {
    owner: &'a KeyedLocks,
    key: String,
    slot: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map and this guard still reference the slot: nobody is waiting.
        self.owner
            .locks
            .remove_if(&self.key, |_, slot| Arc::ptr_eq(slot, &self.slot) && Arc::strong_count(slot) == 2);
    }
}
