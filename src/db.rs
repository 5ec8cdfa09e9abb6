//! Database façade: a named-index registry over one shared KV store.
//!
//! A [`Db`] owns the store handle and a registry mapping index names to
//! index handles behind a readers-writer lock. Lookups on the hot add/query
//! path take the shared side; only index creation takes the exclusive side.
//! Index handles are trait objects so future index families can register
//! alongside LSH without touching the façade.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::lsh::LshIndex;
use crate::store::KvStore;

/// Capability set the façade dispatches on.
///
/// Implementations must be safe to call concurrently; `add` and `search`
/// take `&self` so a handle can be shared across threads without locking.
pub trait VectorIndex: Send + Sync {
    /// Insert a vector under an item id.
    fn add(&self, item_id: &str, vector: &[f64]) -> Result<()>;

    /// Approximate neighbors above a cosine-similarity threshold.
    fn search(&self, query: &[f64], threshold: f64, k: u32) -> Result<Vec<String>>;

    /// Configured parameters, for introspection.
    fn info(&self) -> IndexInfo;
}

impl VectorIndex for LshIndex {
    fn add(&self, item_id: &str, vector: &[f64]) -> Result<()> {
        LshIndex::add(self, item_id, vector)
    }

    fn search(&self, query: &[f64], threshold: f64, k: u32) -> Result<Vec<String>> {
        LshIndex::search(self, query, threshold, k)
    }

    fn info(&self) -> IndexInfo {
        LshIndex::info(self)
    }
}

/// Configured parameters of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub num_rounds: u32,
    pub num_hyper_planes: u32,
    pub space_dim: u32,
}

/// Parameters for one LSH index.
///
/// An empty `index_name` gets a fresh UUID. Parameters below the minimums
/// are clamped (see [`crate::lsh`]). When the name already exists on disk,
/// the numeric parameters are ignored in favor of the persisted
/// configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LshConfig {
    pub index_name: String,
    pub num_rounds: u32,
    pub num_hyper_planes: u32,
    pub space_dim: u32,
}

/// Database configuration.
///
/// An empty `path` keeps everything in memory; a non-empty path is the
/// directory of a persistent store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub path: String,
    pub lsh: Vec<LshConfig>,
}

/// An embedded vector database: one KV store, many named indexes.
pub struct Db {
    store: KvStore,
    registry: RwLock<HashMap<String, Arc<dyn VectorIndex>>>,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").finish_non_exhaustive()
    }
}

impl Db {
    /// Open the database described by `config`.
    ///
    /// The configured LSH indexes are created (or loaded, when their
    /// configuration is already persisted) in order. Duplicate index names
    /// fail with [`Error::IndexAlreadyExists`] before anything is written,
    /// so a rejected call leaves neither the registry nor the store
    /// modified.
    pub fn open(config: DbConfig) -> Result<Self> {
        let store = KvStore::open(&config.path)?;

        let db = Self {
            store,
            registry: RwLock::new(HashMap::new()),
        };
        db.add_lsh(config.lsh)?;

        Ok(db)
    }

    /// Register the given LSH indexes.
    fn add_lsh(&self, configs: Vec<LshConfig>) -> Result<()> {
        // Reject duplicates up front, both against the registry and within
        // the batch itself, so no config keys are written for a failed call.
        {
            let registry = self.registry.read().map_err(|_| Error::RegistryUnavailable)?;
            let mut seen = HashSet::new();
            for config in &configs {
                if config.index_name.is_empty() {
                    continue; // generated UUIDs cannot collide
                }
                if registry.contains_key(&config.index_name)
                    || !seen.insert(config.index_name.as_str())
                {
                    let err = Error::IndexAlreadyExists {
                        name: config.index_name.clone(),
                    };
                    error!(%err, "index registration rejected");
                    return Err(err);
                }
            }
        }

        for mut config in configs {
            if config.index_name.is_empty() {
                config.index_name = Uuid::new_v4().to_string();
            }

            let index = LshIndex::open(
                &config.index_name,
                self.store.clone(),
                config.num_rounds,
                config.num_hyper_planes,
                config.space_dim,
            )?;

            self.registry
                .write()
                .map_err(|_| Error::RegistryUnavailable)?
                .insert(config.index_name, Arc::new(index));
        }

        Ok(())
    }

    /// Insert `item_vec` under `item_id` into the named indexes, or into
    /// every registered index when `index_names` is empty.
    ///
    /// Fan-out is at-least-once per index: the first failure aborts the
    /// loop, and indexes visited earlier keep their writes.
    pub fn add(&self, item_id: &str, item_vec: &[f64], index_names: &[&str]) -> Result<()> {
        if self.num_indexes()? == 0 {
            return Err(Error::DbHasNoIndex);
        }

        for (_, index) in self.resolve(index_names)? {
            index.add(item_id, item_vec)?;
        }

        Ok(())
    }

    /// Query the named indexes (all of them when `index_names` is empty),
    /// returning neighbor ids per index name.
    pub fn get(
        &self,
        query: &[f64],
        threshold: f64,
        k: u32,
        index_names: &[&str],
    ) -> Result<HashMap<String, Vec<String>>> {
        let targets = self.resolve(index_names)?;

        let mut results = HashMap::with_capacity(targets.len());
        for (name, index) in targets {
            let ids = index.search(query, threshold, k)?;
            results.insert(name, ids);
        }

        Ok(results)
    }

    /// Names of all registered indexes, in no particular order.
    pub fn indexes(&self) -> Result<Vec<String>> {
        let registry = self.registry.read().map_err(|_| Error::RegistryUnavailable)?;
        Ok(registry.keys().cloned().collect())
    }

    /// Number of registered indexes.
    pub fn num_indexes(&self) -> Result<u32> {
        let registry = self.registry.read().map_err(|_| Error::RegistryUnavailable)?;
        Ok(registry.len() as u32)
    }

    /// Configured parameters of the named index.
    pub fn info(&self, index_name: &str) -> Result<IndexInfo> {
        let registry = self.registry.read().map_err(|_| Error::RegistryUnavailable)?;
        registry
            .get(index_name)
            .map(|index| index.info())
            .ok_or_else(|| Error::IndexDoesNotExist {
                name: index_name.to_string(),
            })
    }

    /// Flush outstanding writes to durable storage.
    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }

    /// Snapshot the handles for the named indexes (or all indexes when the
    /// slice is empty). The registry lock is held only for the lookup, never
    /// across index operations.
    fn resolve(&self, index_names: &[&str]) -> Result<Vec<(String, Arc<dyn VectorIndex>)>> {
        let registry = self.registry.read().map_err(|_| Error::RegistryUnavailable)?;

        if index_names.is_empty() {
            return Ok(registry
                .iter()
                .map(|(name, index)| (name.clone(), Arc::clone(index)))
                .collect());
        }

        index_names
            .iter()
            .map(|&name| {
                registry
                    .get(name)
                    .map(|index| (name.to_string(), Arc::clone(index)))
                    .ok_or_else(|| Error::IndexDoesNotExist {
                        name: name.to_string(),
                    })
            })
            .collect()
    }
}
