//! Multi-round LSH index over the KV store.
//!
//! Each index owns `num_rounds` independent [`SimHash`] instances. Adding an
//! item writes its raw embedding plus one bucket-membership entry per round;
//! querying unions the buckets touched by the query's sketches and hands the
//! deduplicated candidates to the exact-cosine re-ranker.
//!
//! For two vectors at angle θ, one round of H hyperplanes matches with
//! probability `(1 - θ/π)^H`; R rounds amplify recall to
//! `1 - (1 - (1 - θ/π)^H)^R`. The re-ranker then discards the false
//! positives, so reported neighbors always satisfy the caller's threshold.
//!
//! # Key layout
//!
//! All keys are UTF-8 with `/` as the hierarchy separator:
//!
//! ```text
//! index/{name}                          marker, empty value
//! index/{name}/num_rounds               u32 LE
//! index/{name}/num_hyperplanes          u32 LE
//! index/{name}/space_dim                u32 LE
//! index/{name}/hash/{r}/hyperplanes     f64 matrix LE, row-major
//! index/{name}/embedding/{id}           f64 sequence LE
//! index/{name}/sketch/{s}/{id}          UTF-8 bytes of {id}
//! ```
//!
//! Construction is **persistence-wins**: opening a name that already exists
//! in the store loads the stored configuration and hyperplanes, ignoring the
//! constructor arguments. This prevents a caller from accidentally
//! reconfiguring an index whose buckets were built under other parameters.

use std::collections::HashMap;

use tracing::{debug, error};

use crate::codec;
use crate::db::IndexInfo;
use crate::error::{Error, Result};
use crate::rerank;
use crate::simhash::SimHash;
use crate::store::KvStore;

/// Minimum number of hashing rounds; lower requests are clamped.
pub const MIN_NUM_ROUNDS: u32 = 1;

/// Minimum number of hyperplanes per round; lower requests are clamped.
pub const MIN_NUM_HYPERPLANES: u32 = 1;

/// Minimum vector dimension; lower requests are clamped.
pub const MIN_SPACE_DIM: u32 = 2;

fn index_key(name: &str) -> String {
    format!("index/{name}")
}

fn num_rounds_key(name: &str) -> String {
    format!("index/{name}/num_rounds")
}

fn num_hyperplanes_key(name: &str) -> String {
    format!("index/{name}/num_hyperplanes")
}

fn space_dim_key(name: &str) -> String {
    format!("index/{name}/space_dim")
}

fn hyperplanes_key(name: &str, round: u32) -> String {
    format!("index/{name}/hash/{round}/hyperplanes")
}

fn embedding_key(name: &str, id: &str) -> String {
    format!("index/{name}/embedding/{id}")
}

fn sketch_key(name: &str, sketch: &str, id: &str) -> String {
    format!("index/{name}/sketch/{sketch}/{id}")
}

fn sketch_prefix(name: &str, sketch: &str) -> String {
    format!("index/{name}/sketch/{sketch}/")
}

/// A named random-hyperplane LSH index bound to a [`KvStore`].
pub struct LshIndex {
    name: String,
    store: KvStore,
    hashes: Vec<SimHash>,

    num_rounds: u32,
    num_hyper_planes: u32,
    space_dim: u32,
}

impl LshIndex {
    /// Open the index `name` on `store`.
    ///
    /// If the store already holds configuration for this name, the stored
    /// `num_rounds`, `num_hyperplanes`, `space_dim`, and hyperplane matrices
    /// are loaded and the arguments are ignored. Otherwise the parameters
    /// (clamped to the minimums) are used to generate fresh hyperplanes, and
    /// configuration plus matrices are persisted in one atomic batch.
    pub fn open(
        name: &str,
        store: KvStore,
        num_rounds: u32,
        num_hyper_planes: u32,
        space_dim: u32,
    ) -> Result<Self> {
        let result = if store.key_exists(&index_key(name))? {
            Self::load(name, store)
        } else {
            Self::create(name, store, num_rounds, num_hyper_planes, space_dim)
        };

        if let Err(err) = &result {
            error!(%err, index = name, "failed to open index");
        }

        result
    }

    fn load(name: &str, store: KvStore) -> Result<Self> {
        let num_rounds = codec::decode_u32(&Self::must_get(&store, &num_rounds_key(name))?)?;
        let num_hyper_planes =
            codec::decode_u32(&Self::must_get(&store, &num_hyperplanes_key(name))?)?;
        let space_dim = codec::decode_u32(&Self::must_get(&store, &space_dim_key(name))?)?;

        let mut hashes = Vec::with_capacity(num_rounds as usize);
        for round in 0..num_rounds {
            let encoded = Self::must_get(&store, &hyperplanes_key(name, round))?;
            let hyperplanes = codec::decode_f64_matrix(&encoded, space_dim as usize)?;

            if hyperplanes.len() != num_hyper_planes as usize {
                return Err(Error::Format(format!(
                    "round {round} holds {} hyperplanes, config says {num_hyper_planes}",
                    hyperplanes.len()
                )));
            }

            hashes.push(SimHash::from_hyperplanes(hyperplanes));
        }

        debug!(
            index = name,
            num_rounds,
            num_hyper_planes,
            space_dim,
            "loaded persisted index; constructor parameters ignored"
        );

        Ok(Self {
            name: name.to_string(),
            store,
            hashes,
            num_rounds,
            num_hyper_planes,
            space_dim,
        })
    }

    fn create(
        name: &str,
        store: KvStore,
        num_rounds: u32,
        num_hyper_planes: u32,
        space_dim: u32,
    ) -> Result<Self> {
        let num_rounds = num_rounds.max(MIN_NUM_ROUNDS);
        let num_hyper_planes = num_hyper_planes.max(MIN_NUM_HYPERPLANES);
        let space_dim = space_dim.max(MIN_SPACE_DIM);

        let hashes: Vec<SimHash> = (0..num_rounds)
            .map(|_| SimHash::new(num_hyper_planes, space_dim))
            .collect::<Result<_>>()?;

        let mut entries = Vec::with_capacity(4 + hashes.len());
        entries.push((index_key(name), Vec::new()));
        entries.push((num_rounds_key(name), codec::encode_u32(num_rounds)));
        entries.push((num_hyperplanes_key(name), codec::encode_u32(num_hyper_planes)));
        entries.push((space_dim_key(name), codec::encode_u32(space_dim)));
        for (round, hash) in hashes.iter().enumerate() {
            entries.push((
                hyperplanes_key(name, round as u32),
                codec::encode_f64_matrix(hash.hyperplanes()),
            ));
        }

        store.put_batch(entries)?;

        debug!(index = name, num_rounds, num_hyper_planes, space_dim, "created index");

        Ok(Self {
            name: name.to_string(),
            store,
            hashes,
            num_rounds,
            num_hyper_planes,
            space_dim,
        })
    }

    fn must_get(store: &KvStore, key: &str) -> Result<Vec<u8>> {
        store.get(key)?.ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Configured parameters.
    pub fn info(&self) -> IndexInfo {
        IndexInfo {
            num_rounds: self.num_rounds,
            num_hyper_planes: self.num_hyper_planes,
            space_dim: self.space_dim,
        }
    }

    /// Insert `embedding` under `id`.
    ///
    /// Writes the raw embedding and one bucket-membership entry per round in
    /// a single atomic batch: either all entries become visible or none do.
    /// An id that was already present is overwritten.
    pub fn add(&self, id: &str, embedding: &[f64]) -> Result<()> {
        let result = self.add_inner(id, embedding);

        if let Err(err) = &result {
            error!(%err, index = %self.name, id, "add failed");
        }

        result
    }

    fn add_inner(&self, id: &str, embedding: &[f64]) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidIdLength);
        }
        self.check_embedding(embedding)?;

        let sketches = self.sketches(embedding)?;
        self.check_sketches(&sketches)?;

        let mut entries = Vec::with_capacity(1 + sketches.len());
        entries.push((
            embedding_key(&self.name, id),
            codec::encode_f64_slice(embedding),
        ));
        for sketch in &sketches {
            entries.push((
                sketch_key(&self.name, sketch, id),
                id.as_bytes().to_vec(),
            ));
        }

        self.store.put_batch(entries)
    }

    /// Approximate neighbors of `query` with cosine similarity at least
    /// `threshold`, ordered by descending similarity.
    ///
    /// `k == 0` means no bound on the result count.
    pub fn search(&self, query: &[f64], threshold: f64, k: u32) -> Result<Vec<String>> {
        let result = self.search_inner(query, threshold, k);

        if let Err(err) = &result {
            error!(%err, index = %self.name, "search failed");
        }

        result
    }

    fn search_inner(&self, query: &[f64], threshold: f64, k: u32) -> Result<Vec<String>> {
        self.check_embedding(query)?;
        self.check_threshold(threshold)?;

        let sketches = self.sketches(query)?;
        let candidates = self.candidates_from_buckets(&sketches)?;

        rerank::rank(query, &candidates, threshold, k)
    }

    /// Union of the bucket members touched by `sketches`, with each unique
    /// candidate's embedding fetched exactly once.
    fn candidates_from_buckets(&self, sketches: &[String]) -> Result<HashMap<String, Vec<f64>>> {
        let mut candidates = HashMap::new();

        for sketch in sketches {
            for id in self.bucket_ids(sketch)? {
                if !candidates.contains_key(&id) {
                    let embedding = self.embedding(&id)?;
                    candidates.insert(id, embedding);
                }
            }
        }

        Ok(candidates)
    }

    fn bucket_ids(&self, sketch: &str) -> Result<Vec<String>> {
        let values = self.store.get_prefix(&sketch_prefix(&self.name, sketch))?;

        values
            .into_iter()
            .map(|raw| {
                String::from_utf8(raw)
                    .map_err(|_| Error::Format("bucket entry is not valid UTF-8".into()))
            })
            .collect()
    }

    fn embedding(&self, id: &str) -> Result<Vec<f64>> {
        let key = embedding_key(&self.name, id);
        let encoded = Self::must_get(&self.store, &key)?;
        codec::decode_f64_slice(&encoded)
    }

    fn sketches(&self, embedding: &[f64]) -> Result<Vec<String>> {
        self.hashes.iter().map(|hash| hash.sketch(embedding)).collect()
    }

    fn check_embedding(&self, embedding: &[f64]) -> Result<()> {
        if embedding.len() != self.space_dim as usize {
            return Err(Error::DimensionMismatch {
                expected: self.space_dim as usize,
                got: embedding.len(),
            });
        }

        Ok(())
    }

    fn check_threshold(&self, threshold: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidThreshold { got: threshold });
        }

        Ok(())
    }

    // Sketch count and widths must match the configured rounds and
    // hyperplanes; verified before any write.
    fn check_sketches(&self, sketches: &[String]) -> Result<()> {
        if sketches.len() != self.num_rounds as usize {
            return Err(Error::InvalidNumSketches {
                expected: self.num_rounds,
                got: sketches.len() as u32,
            });
        }

        for sketch in sketches {
            if sketch.len() != self.num_hyper_planes as usize {
                return Err(Error::InvalidSketchLength {
                    expected: self.num_hyper_planes,
                    got: sketch.len() as u32,
                });
            }
        }

        Ok(())
    }
}
