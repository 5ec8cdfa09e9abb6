//! SimHash: random-hyperplane signatures for cosine similarity.
//!
//! Each instance holds a fixed matrix of hyperplanes drawn from the standard
//! normal distribution. Sketching a vector projects it onto every hyperplane
//! and records which side it falls on, producing a `'0'`/`'1'` string. Two
//! vectors at angle θ agree on each bit with probability `1 - θ/π`, the
//! locality-sensitive property the LSH index amplifies across rounds.
//!
//! Hyperplanes are immutable once generated. Instances reloaded from
//! persisted rows via [`SimHash::from_hyperplanes`] reproduce sketches
//! bit-exactly.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{Error, Result};
use crate::math;

const POSITIVE_SIDE: char = '1';
const NEGATIVE_SIDE: char = '0';

/// A fixed set of random hyperplanes that maps vectors to bit-string
/// sketches.
#[derive(Debug, Clone)]
pub struct SimHash {
    hyperplanes: Vec<Vec<f64>>,
}

impl SimHash {
    /// Create a new instance with `num_hyperplanes` hyperplanes of dimension
    /// `space_dim`, drawn independently from the standard normal
    /// distribution.
    pub fn new(num_hyperplanes: u32, space_dim: u32) -> Result<Self> {
        if num_hyperplanes == 0 {
            return Err(Error::ZeroHyperplanes);
        }
        if space_dim == 0 {
            return Err(Error::ZeroSpaceDim);
        }

        let mut rng = rand::rng();
        let hyperplanes = (0..num_hyperplanes)
            .map(|_| (0..space_dim).map(|_| rng.sample(StandardNormal)).collect())
            .collect();

        Ok(Self { hyperplanes })
    }

    /// Rebuild an instance from previously persisted hyperplane rows.
    pub fn from_hyperplanes(hyperplanes: Vec<Vec<f64>>) -> Self {
        Self { hyperplanes }
    }

    /// The hyperplane matrix, row per hyperplane.
    pub fn hyperplanes(&self) -> &[Vec<f64>] {
        &self.hyperplanes
    }

    /// Compute the sketch of a vector: one character per hyperplane, `'1'`
    /// where the projection is non-negative and `'0'` otherwise.
    ///
    /// Fails with [`Error::DimensionMismatch`] if the vector length differs
    /// from the hyperplane dimension.
    pub fn sketch(&self, embedding: &[f64]) -> Result<String> {
        let mut sketch = String::with_capacity(self.hyperplanes.len());

        for hyperplane in &self.hyperplanes {
            let projection = math::dot(hyperplane, embedding)?;
            sketch.push(if projection >= 0.0 {
                POSITIVE_SIDE
            } else {
                NEGATIVE_SIDE
            });
        }

        Ok(sketch)
    }
}
