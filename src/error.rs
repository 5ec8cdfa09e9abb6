//! Error types for simdex.

use thiserror::Error;

/// Errors that can occur during indexing, search, and storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Vector length disagrees with the expected dimension.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Norm of a zero-length vector requested.
    #[error("vector cannot be empty")]
    EmptyVector,

    /// Empty item id on add.
    #[error("item id cannot be empty")]
    InvalidIdLength,

    /// Similarity threshold outside `[0, 1]`.
    #[error("threshold must be between 0 and 1, got {got}")]
    InvalidThreshold { got: f64 },

    /// Number of sketches disagrees with the configured round count.
    #[error("invalid number of sketches: expected {expected}, got {got}")]
    InvalidNumSketches { expected: u32, got: u32 },

    /// Sketch length disagrees with the configured hyperplane count.
    #[error("sketch length must match hyperplane count: expected {expected}, got {got}")]
    InvalidSketchLength { expected: u32, got: u32 },

    /// SimHash construction with zero hyperplanes.
    #[error("number of hyperplanes cannot be zero")]
    ZeroHyperplanes,

    /// SimHash construction with zero space dimension.
    #[error("space dimension cannot be zero")]
    ZeroSpaceDim,

    /// An index with this name is already registered.
    #[error("index {name} already exists")]
    IndexAlreadyExists { name: String },

    /// No index with this name is registered.
    #[error("index {name} does not exist")]
    IndexDoesNotExist { name: String },

    /// The database has no registered index.
    #[error("database has no index")]
    DbHasNoIndex,

    /// The index registry lock was poisoned by a panicking thread.
    #[error("index registry is unavailable")]
    RegistryUnavailable,

    /// A key expected to be present was not found in the store.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Stored bytes do not match the expected binary layout.
    #[error("format error: {0}")]
    Format(String),

    /// Error surfaced from the underlying KV engine.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),
}

/// Result type alias for simdex operations.
pub type Result<T> = std::result::Result<T, Error>;
