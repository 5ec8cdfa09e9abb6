//! End-to-end query scenarios against an in-memory database.
//!
//! Thresholds and vectors are chosen so the expected result sets are
//! near-deterministic: the query vector always collides with its own
//! sketches, and the `[1,2,3]`/`[4,5,6]` pair matches per round with
//! probability ≈ 0.93, so ten single-hyperplane rounds make a miss
//! astronomically unlikely.

use simdex::{Db, DbConfig, LshConfig};

fn single_index_db(num_rounds: u32, num_hyper_planes: u32, space_dim: u32) -> Db {
    Db::open(DbConfig {
        path: String::new(),
        lsh: vec![LshConfig {
            index_name: "idx".into(),
            num_rounds,
            num_hyper_planes,
            space_dim,
        }],
    })
    .expect("failed to open db")
}

#[test]
fn tight_threshold_excludes_near_neighbor() {
    let db = single_index_db(10, 1, 3);
    db.add("a", &[1.0, 2.0, 3.0], &[]).unwrap();
    db.add("b", &[4.0, 5.0, 6.0], &[]).unwrap();

    // sim(a) = 1.0, sim(b) ≈ 0.9746
    let hits = db.get(&[1.0, 2.0, 3.0], 0.99, 0, &[]).unwrap();
    assert_eq!(hits["idx"], vec!["a".to_string()]);
}

#[test]
fn looser_threshold_admits_both_in_order() {
    let db = single_index_db(10, 1, 3);
    db.add("a", &[1.0, 2.0, 3.0], &[]).unwrap();
    db.add("b", &[4.0, 5.0, 6.0], &[]).unwrap();

    let hits = db.get(&[1.0, 2.0, 3.0], 0.97, 0, &[]).unwrap();
    assert_eq!(hits["idx"], vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn k_one_returns_only_the_best() {
    let db = single_index_db(10, 1, 3);
    db.add("a", &[1.0, 2.0, 3.0], &[]).unwrap();
    db.add("b", &[4.0, 5.0, 6.0], &[]).unwrap();
    db.add("c", &[7.0, 8.0, 9.0], &[]).unwrap();

    let hits = db.get(&[1.0, 2.0, 3.0], 0.96, 1, &[]).unwrap();
    assert_eq!(hits["idx"], vec!["a".to_string()]);
}

#[test]
fn antiparallel_vector_never_matches() {
    let db = single_index_db(10, 1, 3);
    db.add("a", &[-1.0, -2.0, -3.0], &[]).unwrap();
    db.add("b", &[1.0, 2.0, 3.0], &[]).unwrap();

    // b is anti-parallel to the query: sim ≈ -1, far below 0.5.
    let hits = db.get(&[-1.0, -2.0, -3.0], 0.5, 0, &[]).unwrap();
    assert_eq!(hits["idx"], vec!["a".to_string()]);
}

#[test]
fn empty_index_returns_empty_result() {
    let db = single_index_db(10, 1, 3);

    let hits = db.get(&[1.0, 2.0, 3.0], 0.5, 0, &[]).unwrap();
    assert!(hits["idx"].is_empty());
}

#[test]
fn results_are_ordered_by_descending_similarity() {
    let db = single_index_db(20, 1, 3);
    db.add("far", &[7.0, 8.0, 9.0], &[]).unwrap();
    db.add("self", &[1.0, 2.0, 3.0], &[]).unwrap();
    db.add("near", &[4.0, 5.0, 6.0], &[]).unwrap();

    let hits = db.get(&[1.0, 2.0, 3.0], 0.0, 0, &[]).unwrap();
    assert_eq!(
        hits["idx"],
        vec!["self".to_string(), "near".to_string(), "far".to_string()]
    );
}
