//! File-backed lookup store with write-through persistence.
//!
//! Keeps entries in a [`MemoryStore`] and rewrites the file on every put.
//! Suitable for single-node deployments where the cache should survive
//! restarts.
//!
//! A put whose save fails is rolled back in memory, so memory never holds an
//! entry the file is missing. A failed save during purge leaves the purged
//! entries on disk only; they are expired and get dropped again on reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use geoproxy_core::error::{GeoError, Result};
use geoproxy_core::traits::LookupStore;
use geoproxy_core::types::CacheEntry;

use crate::MemoryStore;

/// File-based lookup store.
///
/// # File Format
///
/// ```text
/// magic (4 bytes): "GEOC"
/// version (1 byte): 1
/// count (8 bytes): number of entries, little-endian
/// entries (variable): JSON array of cache entries
/// ```
pub struct FileStore {
    /// Path to the storage file
    path: PathBuf,
    /// In-memory view of the file
    memory: MemoryStore,
    /// Serialises writers so saves never interleave
    write_lock: Mutex<()>,
}

/// File format magic bytes
const MAGIC: &[u8; 4] = b"GEOC";
/// Current file format version
const VERSION: u8 = 1;
/// magic + version + count
const HEADER_LEN: usize = 13;

impl FileStore {
    /// Opens a file store at the given path.
    ///
    /// If the file exists it is loaded, otherwise the store starts empty and
    /// the file is created on the first write.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            memory: MemoryStore::new(),
            write_lock: Mutex::new(()),
        };

        if fs::try_exists(&store.path).await? {
            store.load().await?;
        }

        Ok(store)
    }

    /// Loads entries from the file.
    #[instrument(skip(self))]
    async fn load(&self) -> Result<()> {
        let contents = fs::read(&self.path).await?;

        if contents.len() < HEADER_LEN {
            return Err(GeoError::Store("Cache file too short".into()));
        }

        if &contents[0..4] != MAGIC {
            return Err(GeoError::Store("Invalid magic bytes".into()));
        }

        let version = contents[4];
        if version != VERSION {
            return Err(GeoError::VersionMismatch {
                expected: VERSION,
                actual: version,
            });
        }

        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&contents[5..HEADER_LEN]);
        let count = u64::from_le_bytes(count_bytes);

        let entries: Vec<CacheEntry> = if contents.len() > HEADER_LEN {
            serde_json::from_slice(&contents[HEADER_LEN..])?
        } else {
            Vec::new()
        };

        if entries.len() as u64 != count {
            return Err(GeoError::Store(format!(
                "Entry count mismatch: header says {}, found {}",
                count,
                entries.len()
            )));
        }

        info!(count, "Loaded cache entries from file");
        self.memory.import(entries);
        Ok(())
    }

    /// Writes the current entries to disk atomically (temp file, then rename).
    async fn save(&self) -> Result<()> {
        let entries = self.memory.all_entries();
        let count = entries.len() as u64;
        let serialized = serde_json::to_vec(&entries)?;

        let mut contents = Vec::with_capacity(HEADER_LEN + serialized.len());
        contents.extend_from_slice(MAGIC);
        contents.push(VERSION);
        contents.extend_from_slice(&count.to_le_bytes());
        contents.extend_from_slice(&serialized);

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(count, path = ?self.path, "Cache file saved");
        Ok(())
    }

    /// Removes expired entries and persists the result. Returns how many were removed.
    #[instrument(skip(self))]
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let removed = self.memory.purge_expired(now);
        if removed > 0 {
            self.save().await?;
        }
        Ok(removed)
    }

    /// Spawns a task that purges expired entries every `interval` and
    /// persists the result. Save failures are logged and retried next tick.
    pub fn spawn_reaper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match self.purge_expired(Utc::now()).await {
                    Ok(0) => {}
                    Ok(removed) => debug!(removed, "Purged expired cache entries"),
                    Err(e) => warn!(error = %e, "Failed to purge cache file"),
                }
            }
        })
    }

    /// Returns the underlying memory store for direct access.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}

#[async_trait]
impl LookupStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        self.memory.get(key).await
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let key = entry.key.clone();
        let previous = self.memory.insert(entry);

        if let Err(e) = self.save().await {
            match previous {
                Some(previous) => {
                    self.memory.insert(previous);
                }
                None => {
                    self.memory.remove(&key);
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(key: &str, expires_at: DateTime<Utc>) -> CacheEntry {
        CacheEntry::new(key, r#"{"status":"OK"}"#, expires_at)
    }

    #[tokio::test]
    async fn test_open_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.bin");

        let store = FileStore::open(&path).await.unwrap();
        assert!(store.is_empty());
        assert!(!path.exists()); // File not created until first put
    }

    #[tokio::test]
    async fn test_put_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.bin");
        let expires_at = Utc::now() + chrono::Duration::days(30);

        {
            let store = FileStore::open(&path).await.unwrap();
            store.put(entry("70 Vanderbilt Ave", expires_at)).await.unwrap();
            store.put(entry("1600 Amphitheatre Pkwy", expires_at)).await.unwrap();
        }

        let store = FileStore::open(&path).await.unwrap();
        assert_eq!(store.len(), 2);
        let cached = store.get("70 Vanderbilt Ave").await.unwrap().unwrap();
        assert_eq!(cached.payload, r#"{"status":"OK"}"#);
        assert_eq!(cached.expires_at, expires_at);
    }

    #[tokio::test]
    async fn test_purge_expired_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.bin");
        let now = Utc::now();

        let store = FileStore::open(&path).await.unwrap();
        store.put(entry("old", now - chrono::Duration::seconds(5))).await.unwrap();
        store.put(entry("fresh", now + chrono::Duration::days(1))).await.unwrap();

        assert_eq!(store.purge_expired(now).await.unwrap(), 1);

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.get("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.bin");

        fs::write(&path, b"invalid data").await.unwrap();

        let result = FileStore::open(&path).await;
        assert!(matches!(result, Err(GeoError::Store(_))));
    }

    #[tokio::test]
    async fn test_version_mismatch_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.bin");

        let mut contents = MAGIC.to_vec();
        contents.push(9);
        contents.extend_from_slice(&0u64.to_le_bytes());
        fs::write(&path, contents).await.unwrap();

        let result = FileStore::open(&path).await;
        assert!(matches!(
            result,
            Err(GeoError::VersionMismatch { expected: 1, actual: 9 })
        ));
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_new_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("cache.bin");

        let store = FileStore::open(&path).await.unwrap();
        let result = store.put(entry("a", Utc::now() + chrono::Duration::days(1))).await;

        assert!(matches!(result, Err(GeoError::Io(_))));
        assert!(store.is_empty());
        assert!(store.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_save_restores_previous_entry() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).await.unwrap();
        let path = sub.join("cache.bin");
        let expires_at = Utc::now() + chrono::Duration::days(1);

        let store = FileStore::open(&path).await.unwrap();
        store.put(CacheEntry::new("a", "first", expires_at)).await.unwrap();

        fs::remove_dir_all(&sub).await.unwrap();
        assert!(store.put(CacheEntry::new("a", "second", expires_at)).await.is_err());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").await.unwrap().unwrap().payload, "first");
    }

    #[tokio::test]
    async fn test_reaper_purges_file_in_background() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.bin");
        let now = Utc::now();

        let store = Arc::new(FileStore::open(&path).await.unwrap());
        store.put(entry("old", now - chrono::Duration::days(400))).await.unwrap();
        store.put(entry("fresh", now + chrono::Duration::days(1))).await.unwrap();

        let handle = store.clone().spawn_reaper(Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.abort();

        assert_eq!(store.len(), 1);
        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.get("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_atomic_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.bin");
        let temp_path = path.with_extension("tmp");

        let store = FileStore::open(&path).await.unwrap();
        store.put(entry("a", Utc::now())).await.unwrap();

        assert!(!temp_path.exists());
        assert!(path.exists());
    }
}
