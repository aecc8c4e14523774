//! Unordered entity pairs.
//!
//! A [`Pair`] always stores the lower ID first, so `(a, b)` and `(b, a)` are the
//! same value in every set or map.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pair<I> {
    low: I,
    high: I,
}

impl<I: Ord> Pair<I> {
    pub fn new(a: I, b: I) -> Self {
        if a <= b {
            Pair { low: a, high: b }
        } else {
            Pair { low: b, high: a }
        }
    }

    pub fn low(&self) -> &I {
        &self.low
    }

    pub fn high(&self) -> &I {
        &self.high
    }

    pub fn is_self_pair(&self) -> bool {
        self.low == self.high
    }
}

impl<I: fmt::Display> fmt::Display for Pair<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.low, self.high)
    }
}

/// Pairs without scores, e.g. LSH candidates.
pub type PairSet<I> = BTreeSet<Pair<I>>;
/// Pairs with an exact or estimated similarity attached.
pub type ScoredPairs<I> = BTreeMap<Pair<I>, f64>;

/// Membership view shared by scored and unscored pair collections.
pub trait PairLookup<I> {
    fn contains_pair(&self, pair: &Pair<I>) -> bool;

    fn n_pairs(&self) -> usize;

    fn pairs<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Pair<I>> + 'a>;
}

impl<I: Ord> PairLookup<I> for PairSet<I> {
    fn contains_pair(&self, pair: &Pair<I>) -> bool {
        self.contains(pair)
    }

    fn n_pairs(&self) -> usize {
        self.len()
    }

    fn pairs<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Pair<I>> + 'a> {
        Box::new(self.iter())
    }
}

impl<I: Ord> PairLookup<I> for ScoredPairs<I> {
    fn contains_pair(&self, pair: &Pair<I>) -> bool {
        self.contains_key(pair)
    }

    fn n_pairs(&self) -> usize {
        self.len()
    }

    fn pairs<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Pair<I>> + 'a> {
        Box::new(self.keys())
    }
}
