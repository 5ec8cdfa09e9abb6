//! Exact-cosine re-ranking of LSH candidates.
//!
//! The bucket stage trades precision for recall; this stage buys the
//! precision back. It is stateless and knows nothing about how candidates
//! were produced: it filters by exact cosine similarity against a
//! threshold, orders by similarity, and truncates to the requested count.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::Result;
use crate::math;

/// Filter `candidates` by cosine similarity to `query`, returning ids in
/// descending similarity order.
///
/// Ids with similarity below `threshold` are dropped. `k == 0` means
/// unbounded; otherwise at most `k` ids are returned. Ties are broken
/// arbitrarily.
pub fn rank(
    query: &[f64],
    candidates: &HashMap<String, Vec<f64>>,
    threshold: f64,
    k: u32,
) -> Result<Vec<String>> {
    let query_norm = math::norm(query)?;

    let mut scored = Vec::with_capacity(candidates.len());
    for (id, candidate) in candidates {
        let candidate_norm = math::norm(candidate)?;
        let sim = math::cosine(query, candidate, query_norm, candidate_norm)?;

        if sim >= threshold {
            scored.push((id.clone(), sim));
        }
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut ids: Vec<String> = scored.into_iter().map(|(id, _)| id).collect();
    if k > 0 && (k as usize) < ids.len() {
        ids.truncate(k as usize);
    }

    Ok(ids)
}
