//! # jaccard-lsh (Jaccard similarity, MinHash and banded LSH)
//!
//! Finding pairs of sets with a high Jaccard similarity without comparing every pair.
//!
//! For more information on the subject see:
//! * [Mining of Massive Datasets, chapter 3](http://infolab.stanford.edu/~ullman/mmds/ch3.pdf)
//!
//! ## Building blocks
//! * Exact Jaccard similarity of two sets and all-pairs thresholding.
//! * Character and word k-gram shingling of text.
//! * MinHash signatures from two hash families: affine `(a * x + b) mod M` for integer
//!   items and seeded SHA-256 for byte-like items.
//! * Banding of signatures into `b` bands of `r` rows to produce candidate pairs.
//! * Evaluation of approximate pairs against exact ground truth.
//!
//! ## Getting started
//!
//! ```rust
//! use jaccard_lsh::prelude::*;
//!
//! let mut sets: EntitySets<u32, u32> = EntitySets::new();
//! sets.insert(1, (0..50).collect());
//! sets.insert(2, (5..50).collect());
//! sets.insert(3, (100..150).collect());
//!
//! // Exact pairs with a similarity of at least 0.6.
//! let truth = exact_pairs(&sets, 0.6).unwrap();
//!
//! // One family of 100 hash functions, seeded for reproducible runs.
//! let family = AffineHash::new(100, 200, 12).unwrap();
//! let signatures = SignatureSet::build(&family, &sets);
//!
//! // Bands tuned so the S-curve crosses 0.5 near similarity 0.6.
//! let banding = Banding::optimal(100, 0.6).unwrap();
//! let candidates = banding.candidate_pairs(&signatures).unwrap();
//!
//! let eval = Evaluation::new(&truth, &candidates);
//! assert_eq!(eval.ground_truth, 1);
//! ```
//!
//! ## Shingling
//! ```rust
//! use jaccard_lsh::shingle::ShingleSpec;
//! let grams = ShingleSpec::chars(3).shingles("Hello");
//! assert!(grams.contains("hel"));
//! ```
//!
//! ## Seed
//! Every hash family is drawn from a seeded random generator. The same seed gives the
//! same family and so the same signatures, estimates and candidates.
pub mod banding;
pub mod config;
pub mod data;
mod error;
pub mod eval;
pub mod hash;
pub mod jaccard;
pub mod pair;
pub mod prelude;
pub mod shingle;
pub mod signature;
#[cfg(feature = "stats")]
pub mod stats;
pub mod utils;
pub mod experiment {
    pub mod report;
    mod test;
}

pub use banding::Banding;
pub use eval::Evaluation;
pub use hash::{AffineHash, DigestHash, SetHash};
pub use pair::{Pair, PairSet, ScoredPairs};
pub use signature::{Signature, SignatureSet};

/// A set of items, such as the k-grams of a document or the movies rated by a user.
pub type ItemSet<T> = fnv::FnvHashSet<T>;
/// Sets keyed by entity ID, iterated in ID order.
pub type EntitySets<I, T> = std::collections::BTreeMap<I, ItemSet<T>>;
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
