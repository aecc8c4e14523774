//! Re-export of the public api of jaccard-lsh.
#[cfg(feature = "stats")]
pub use crate::stats::{expected_candidates, prob_within, std_error};
pub use crate::{
    banding::{BandStats, Banding},
    error::Error,
    eval::Evaluation,
    hash::{AffineHash, DigestHash, SetHash},
    jaccard::{exact_pairs, jaccard, pairwise},
    pair::{Pair, PairLookup, PairSet, ScoredPairs},
    shingle::{ShingleMode, ShingleSpec},
    signature::{Signature, SignatureSet},
    EntitySets, ItemSet, Result,
};
