//! simdex: embedded vector similarity search.
//!
//! An approximate-nearest-neighbor engine built from three pieces:
//!
//! - **SimHash** ([`simhash`]): random-hyperplane signatures of vectors
//! - **LSH index** ([`lsh`]): multi-round bucketing over an embedded ordered
//!   KV store, with exact-cosine re-ranking ([`rerank`])
//! - **Database façade** ([`db`]): a thread-safe registry of named indexes
//!   sharing one store
//!
//! The engine stores vectors and caller-supplied ids, nothing else; whatever
//! an id refers to is the caller's business.
//!
//! # Recall and precision
//!
//! For two vectors at angle θ, one hashing round with H hyperplanes puts
//! them in the same bucket with probability `(1 - θ/π)^H`. R independent
//! rounds amplify recall to `1 - (1 - (1 - θ/π)^H)^R`. Candidates are then
//! re-ranked by exact cosine similarity, so results never violate the
//! caller's threshold: more hyperplanes buy precision (smaller buckets),
//! more rounds buy recall, and a false positive costs only the work of
//! scoring it.
//!
//! # Persistence
//!
//! With a non-empty `path`, configuration, hyperplanes, embeddings, and
//! buckets all live in an embedded [`sled`] tree. Reopening an index by name
//! loads its persisted configuration and ignores the constructor arguments,
//! so an index can never silently change shape between runs. Sketches are
//! bit-stable across restarts.
//!
//! # Example
//!
//! ```
//! use simdex::{Db, DbConfig, LshConfig};
//!
//! let db = Db::open(DbConfig {
//!     path: String::new(), // in-memory
//!     lsh: vec![LshConfig {
//!         index_name: "docs".into(),
//!         num_rounds: 10,
//!         num_hyper_planes: 1,
//!         space_dim: 3,
//!     }],
//! })?;
//!
//! db.add("a", &[1.0, 2.0, 3.0], &[])?;
//! db.add("b", &[4.0, 5.0, 6.0], &[])?;
//!
//! // sim(a) = 1.0; sim(b) ≈ 0.9746 falls below the threshold.
//! let hits = db.get(&[1.0, 2.0, 3.0], 0.99, 0, &[])?;
//! assert_eq!(hits["docs"], vec!["a".to_string()]);
//! # Ok::<(), simdex::Error>(())
//! ```

pub mod codec;
pub mod db;
pub mod error;
pub mod lsh;
pub mod math;
pub mod rerank;
pub mod simhash;
pub mod store;

pub use db::{Db, DbConfig, IndexInfo, LshConfig, VectorIndex};
pub use error::{Error, Result};
