use crate::pair::PairLookup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Agreement between an approximate pair set and the exact ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// In both sets.
    pub true_positives: usize,
    /// Candidate but not in the ground truth.
    pub false_positives: usize,
    /// Ground truth but not a candidate.
    pub false_negatives: usize,
    pub ground_truth: usize,
    pub candidates: usize,
}

impl Evaluation {
    /// Compare `candidates` against `truth`. Both sides may be scored or plain
    /// pair collections; pairs are matched by their canonical order.
    ///
    /// # Examples
    ///
    /// ```
    /// use jaccard_lsh::{Evaluation, Pair, PairSet};
    /// let truth: PairSet<u32> = vec![Pair::new(1, 2), Pair::new(3, 4)].into_iter().collect();
    /// let found: PairSet<u32> = vec![Pair::new(2, 1), Pair::new(5, 6)].into_iter().collect();
    /// let eval = Evaluation::new(&truth, &found);
    /// assert_eq!((eval.true_positives, eval.false_positives, eval.false_negatives), (1, 1, 1));
    /// ```
    pub fn new<I, G, C>(truth: &G, candidates: &C) -> Self
    where
        G: PairLookup<I> + ?Sized,
        C: PairLookup<I> + ?Sized,
    {
        let true_positives = candidates
            .pairs()
            .filter(|p| truth.contains_pair(p))
            .count();
        let false_negatives = truth
            .pairs()
            .filter(|p| !candidates.contains_pair(p))
            .count();
        Evaluation {
            true_positives,
            false_positives: candidates.n_pairs() - true_positives,
            false_negatives,
            ground_truth: truth.n_pairs(),
            candidates: candidates.n_pairs(),
        }
    }

    /// Share of candidates that are real. `None` without candidates.
    pub fn precision(&self) -> Option<f64> {
        if self.candidates == 0 {
            return None;
        }
        Some(self.true_positives as f64 / self.candidates as f64)
    }

    /// Share of the ground truth that was found. `None` for an empty ground truth.
    pub fn recall(&self) -> Option<f64> {
        if self.ground_truth == 0 {
            return None;
        }
        Some(self.true_positives as f64 / self.ground_truth as f64)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "False Positives: {}", self.false_positives)?;
        writeln!(f, "False Negatives: {}", self.false_negatives)?;
        write!(f, "True Positives: {}", self.true_positives)
    }
}
