#![cfg(test)]
use super::report::*;
use crate::banding::Banding;
use crate::config::{
    BandingConfig, LshRatingsConfig, LshTextConfig, MinHashRatingsConfig, MinHashTextConfig,
};
use crate::data::{read_ratings, Document, RowPolicy};
use crate::jaccard::jaccard;
use crate::pair::Pair;
use crate::shingle::ShingleSpec;
use crate::{EntitySets, Error};

fn doc(name: &str, text: &str) -> Document {
    Document {
        name: name.to_string(),
        text: text.to_string(),
    }
}

fn fox_docs() -> Vec<Document> {
    vec![
        doc("D1.txt", "The quick brown fox jumps over the lazy dog"),
        doc("D2.txt", "the quick brown fox jumps over the lazy dog"),
        doc("D3.txt", "Lorem ipsum dolor sit amet consectetur"),
    ]
}

// 1 and 2 are near duplicates, 3 and 4 overlap a little, 5 stands alone.
fn users() -> EntitySets<u32, u32> {
    let mut users = EntitySets::new();
    users.insert(1, (0..40).collect());
    users.insert(2, (0..38).collect());
    users.insert(3, (100..140).collect());
    users.insert(4, (100..110).chain(200..230).collect());
    users.insert(5, (300..340).collect());
    users
}

// Prime above every item ID, so each affine function is injective.
const MODULUS: u64 = 401;

#[test]
fn test_kgram_report() {
    let docs = vec![doc("A", "abcd"), doc("B", "abce"), doc("C", ""), doc("D", "")];
    let report = kgram_report(&docs, &[ShingleSpec::chars(2), ShingleSpec::words(2)]);

    assert_eq!(report.counts[0], ("A".to_string(), vec![3, 0]));
    assert_eq!(report.similarities.len(), 6);
    assert_eq!(
        report.similarities[0],
        (Pair::new("A".to_string(), "B".to_string()), vec![Some(0.5), None])
    );
    assert_eq!(report.similarities[1].1, vec![Some(0.), None]);
    assert_eq!(report.similarities[5].1, vec![None, None]);

    let out = report.to_string();
    assert!(out.contains("A: Char 2-grams=3, Word 2-grams=0"));
    assert!(out.contains("A - B: Char 2-gram=0.5000, Word 2-gram=undefined"));
}

#[test]
fn test_minhash_text_report() {
    let docs = fox_docs();
    let config = MinHashTextConfig {
        shingle: ShingleSpec::chars(3),
        hash_counts: vec![20, 400],
        max_hash: 10_000,
    };
    let report = minhash_text_report(&docs, &config, 3).unwrap();
    assert_eq!(report.exact.len(), 3);
    assert_eq!(report.estimates.len(), 2);
    assert_eq!(report.estimates[1].0, 400);

    // identical after lower-casing
    assert_eq!(report.exact[0].1, Some(1.));
    assert_eq!(report.estimates[0].1[0], 1.);
    assert_eq!(report.estimates[1].1[0], 1.);

    let exact = report.exact[1].1.unwrap();
    assert!((report.estimates[1].1[1] - exact).abs() < 0.15);

    let again = minhash_text_report(&docs, &config, 3).unwrap();
    assert_eq!(report, again);
    assert!(report.to_string().contains("t = 400: Jaccard Similarity = 1.0000"));
}

#[test]
fn test_lsh_text_report() {
    let config = LshTextConfig::default();
    let report = lsh_text_report(&fox_docs(), &config, 9).unwrap();
    assert_eq!(report.banding, Banding::new(10, 16).unwrap());

    let twins = &report.pairs[0];
    assert_eq!(twins.probability, Some(1.));
    assert!(twins.candidate);

    let far = &report.pairs[1];
    assert!(far.probability.unwrap() < 1e-6);
    assert!(!far.candidate);

    let out = report.to_string();
    assert!(out.starts_with("Best values for LSH: r = 10, b = 16"));
    assert!(out.contains("D1.txt - D2.txt: 1.0000 (Jaccard 1.0000, candidate: yes)"));
}

#[test]
fn test_minhash_ratings_report() {
    let config = MinHashRatingsConfig {
        hash_counts: vec![50, 100, 200],
        threshold: 0.5,
    };
    let report = minhash_ratings_report(&users(), MODULUS, &config, 42).unwrap();
    assert_eq!(report.ground_truth, 1);
    assert_eq!(
        report.rows.iter().map(|r| r.hashes).collect::<Vec<_>>(),
        vec![50, 100, 200]
    );
    for row in &report.rows {
        assert!(row.banding.is_none());
        assert_eq!(row.evaluation.true_positives, 1);
        assert_eq!(row.evaluation.false_positives, 0);
        assert_eq!(row.evaluation.false_negatives, 0);
    }
    let out = report.to_string();
    assert!(out.starts_with("Exact Jaccard Similarity (>= 0.5): 1"));
    assert!(out.contains("Using 100 hash functions:"));
}

#[test]
fn test_lsh_ratings_report() {
    let config = LshRatingsConfig {
        threshold: 0.6,
        bandings: vec![BandingConfig::fixed(50, 5, 10), BandingConfig::budget(100)],
    };
    let report = lsh_ratings_report(&users(), MODULUS, &config, 42).unwrap();
    assert_eq!(report.ground_truth, 1);
    assert_eq!(report.rows[0].banding, Some(Banding::new(5, 10).unwrap()));
    assert_eq!(report.rows[1].banding, Some(Banding::new(5, 20).unwrap()));
    for row in &report.rows {
        assert_eq!(row.evaluation.true_positives, 1);
        assert_eq!(row.evaluation.false_negatives, 0);
    }

    let again = lsh_ratings_report(&users(), MODULUS, &config, 42).unwrap();
    assert_eq!(report, again);

    let out = report.to_string();
    assert!(out.contains("Using 50 hash functions, r=5, b=10"));
    assert!(out.contains("Total Exact Pairs (>= 0.6): 1"));
}

#[test]
fn test_lsh_ratings_bad_banding() {
    let config = LshRatingsConfig {
        threshold: 0.6,
        bandings: vec![BandingConfig::fixed(60, 5, 10)],
    };
    match lsh_ratings_report(&users(), MODULUS, &config, 1) {
        Err(Error::InvalidParam(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_empty_users_fail_ground_truth() {
    let mut users = users();
    users.insert(6, Default::default());
    users.insert(7, Default::default());
    let config = MinHashRatingsConfig::default();
    match minhash_ratings_report(&users, MODULUS, &config, 1) {
        Err(Error::EmptyUnion) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_item_modulus() {
    let ratings = read_ratings("userId,movieId\n1,5\n2,5\n".as_bytes(), RowPolicy::Fail).unwrap();
    assert!(item_modulus(None, &ratings).is_err());
    assert_eq!(item_modulus(Some(401), &ratings).unwrap(), 401);

    let ratings = read_ratings("userId,movieId\n1,5\n2,9\n".as_bytes(), RowPolicy::Fail).unwrap();
    assert_eq!(item_modulus(None, &ratings).unwrap(), 2);
}

#[test]
fn test_shingle_documents() {
    let sets = shingle_documents(&fox_docs(), ShingleSpec::words(2));
    assert_eq!(sets.len(), 3);
    assert_eq!(
        jaccard(&sets["D1.txt"], &sets["D2.txt"]).unwrap(),
        1.
    );
    assert!(sets["D3.txt"].contains("lorem ipsum"));
}
