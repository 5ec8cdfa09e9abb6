//! Ordered key-value storage adapter.
//!
//! Thin wrapper around [`sled`] exposing exactly the capabilities the index
//! needs: atomic multi-put and multi-delete, point reads, existence checks,
//! and ordered prefix scans. Keys are UTF-8 strings at this boundary; values
//! are opaque bytes. The adapter adds no retries; engine errors surface to
//! the caller as [`Error::Storage`](crate::Error::Storage).
//!
//! The handle is cheap to clone and safe to share across threads; sled's
//! `Db` is internally reference-counted and serializes batch commits.

use tracing::debug;

use crate::error::Result;

/// Handle to an embedded ordered KV tree, on disk or in memory.
#[derive(Debug, Clone)]
pub struct KvStore {
    db: sled::Db,
}

impl KvStore {
    /// Open a store at `path`. An empty path opens a temporary in-memory
    /// tree that is discarded on drop.
    pub fn open(path: &str) -> Result<Self> {
        let db = if path.is_empty() {
            sled::Config::new().temporary(true).open()?
        } else {
            sled::open(path)?
        };

        debug!(path, recovered = db.was_recovered(), "opened kv store");

        Ok(Self { db })
    }

    /// Atomically write all entries in a single batch. Either every entry
    /// becomes visible or none does.
    pub fn put_batch(&self, entries: Vec<(String, Vec<u8>)>) -> Result<()> {
        let mut batch = sled::Batch::default();
        for (key, value) in entries {
            batch.insert(key.into_bytes(), value);
        }

        self.db.apply_batch(batch)?;

        Ok(())
    }

    /// Read the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    /// Collect the values of every key starting with `prefix`, in
    /// lexicographic byte order of the keys.
    pub fn get_prefix(&self, prefix: &str) -> Result<Vec<Vec<u8>>> {
        let mut values = Vec::new();
        for entry in self.db.scan_prefix(prefix) {
            let (_, value) = entry?;
            values.push(value.to_vec());
        }

        Ok(values)
    }

    /// Whether `key` is present.
    pub fn key_exists(&self, key: &str) -> Result<bool> {
        Ok(self.db.contains_key(key)?)
    }

    /// Atomically delete all listed keys.
    pub fn del_batch(&self, keys: &[String]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for key in keys {
            batch.remove(key.as_bytes());
        }

        self.db.apply_batch(batch)?;

        Ok(())
    }

    /// Flush outstanding writes to durable storage.
    ///
    /// This is the shutdown barrier: sled also persists on drop, so calling
    /// it more than once is harmless.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;

        Ok(())
    }
}
