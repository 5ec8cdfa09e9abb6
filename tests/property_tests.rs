//! Property-based tests for simdex invariants.
//!
//! These verify properties that should hold regardless of input:
//! - binary codecs round-trip bitwise
//! - query results are ordered by descending exact similarity
//! - `k` bounds the result count; `k = 0` never truncates
//! - reported neighbors never fall below the threshold

use proptest::prelude::*;

use simdex::lsh::LshIndex;
use simdex::store::KvStore;
use simdex::{codec, math};

fn arb_vector(dim: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-10.0f64..10.0, dim)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn f64_slice_codec_round_trips(values in prop::collection::vec(any::<f64>(), 0..64)) {
        let decoded = codec::decode_f64_slice(&codec::encode_f64_slice(&values)).unwrap();
        prop_assert_eq!(values.len(), decoded.len());
        for (a, b) in values.iter().zip(decoded.iter()) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn f64_matrix_codec_round_trips(
        rows in prop::collection::vec(prop::collection::vec(any::<f64>(), 5), 1..8),
    ) {
        let decoded = codec::decode_f64_matrix(&codec::encode_f64_matrix(&rows), 5).unwrap();
        prop_assert_eq!(rows.len(), decoded.len());
        for (row, got) in rows.iter().zip(decoded.iter()) {
            for (a, b) in row.iter().zip(got.iter()) {
                prop_assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn u32_codec_round_trips(value in any::<u32>()) {
        prop_assert_eq!(codec::decode_u32(&codec::encode_u32(value)).unwrap(), value);
    }

    #[test]
    fn results_are_sorted_and_above_threshold(
        vectors in prop::collection::vec(arb_vector(4), 1..12),
        query in arb_vector(4),
        threshold in 0.0f64..1.0,
    ) {
        let store = KvStore::open("").unwrap();
        let index = LshIndex::open("prop", store, 2, 2, 4).unwrap();

        for (i, v) in vectors.iter().enumerate() {
            index.add(&format!("v{i}"), v).unwrap();
        }

        let hits = index.search(&query, threshold, 0).unwrap();

        let query_norm = math::norm(&query).unwrap();
        let sims: Vec<f64> = hits
            .iter()
            .map(|id| {
                let i: usize = id[1..].parse().unwrap();
                let v = &vectors[i];
                math::cosine(&query, v, query_norm, math::norm(v).unwrap()).unwrap()
            })
            .collect();

        for sim in &sims {
            prop_assert!(*sim >= threshold);
        }
        for pair in sims.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn k_bounds_the_result_count(
        vectors in prop::collection::vec(arb_vector(3), 1..16),
        k in 1u32..8,
    ) {
        let store = KvStore::open("").unwrap();
        let index = LshIndex::open("bounded", store, 4, 1, 3).unwrap();

        for (i, v) in vectors.iter().enumerate() {
            index.add(&format!("v{i}"), v).unwrap();
        }

        let query = vectors[0].clone();
        let hits = index.search(&query, 0.0, k).unwrap();
        prop_assert!(hits.len() <= k as usize);

        let unbounded = index.search(&query, 0.0, 0).unwrap();
        prop_assert!(unbounded.len() >= hits.len());
    }
}
