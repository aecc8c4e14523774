//! Exact Jaccard similarity and the ground truth pair sets built from it.
use crate::pair::{Pair, ScoredPairs};
use crate::utils::check_unit_range;
use crate::{EntitySets, Error, ItemSet, Result};
use rayon::prelude::*;
use std::hash::Hash;
use tracing::debug;

/// `|A ∩ B| / |A ∪ B|`.
///
/// # Errors
///
/// Returns [`Error::EmptyUnion`] if both sets are empty, the ratio is undefined there.
///
/// # Examples
///
/// ```
/// use jaccard_lsh::{jaccard::jaccard, ItemSet};
/// let a: ItemSet<&str> = ["ab", "bc", "cd"].iter().copied().collect();
/// let b: ItemSet<&str> = ["bc", "cd", "de"].iter().copied().collect();
/// assert_eq!(jaccard(&a, &b).unwrap(), 0.5);
/// ```
pub fn jaccard<T: Hash + Eq>(a: &ItemSet<T>, b: &ItemSet<T>) -> Result<f64> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|x| large.contains(*x)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return Err(Error::EmptyUnion);
    }
    Ok(intersection as f64 / union as f64)
}

/// Jaccard of every unordered pair of entities, `None` where both sets are empty.
/// Pairs come out in ID order.
pub fn pairwise<I, T>(sets: &EntitySets<I, T>) -> Vec<(Pair<I>, Option<f64>)>
where
    I: Ord + Clone,
    T: Hash + Eq,
{
    let entries: Vec<(&I, &ItemSet<T>)> = sets.iter().collect();
    let mut out = Vec::with_capacity(entries.len() * entries.len().saturating_sub(1) / 2);
    for (i, (id_a, set_a)) in entries.iter().enumerate() {
        for (id_b, set_b) in &entries[i + 1..] {
            let sim = jaccard(set_a, set_b).ok();
            out.push((Pair::new((*id_a).clone(), (*id_b).clone()), sim));
        }
    }
    out
}

/// Ground truth: every pair whose exact Jaccard is at least `threshold`.
///
/// Each unordered pair is visited once. A pair of two empty sets fails the
/// whole computation with [`Error::EmptyUnion`].
pub fn exact_pairs<I, T>(sets: &EntitySets<I, T>, threshold: f64) -> Result<ScoredPairs<I>>
where
    I: Ord + Clone + Send + Sync,
    T: Hash + Eq + Sync,
{
    check_unit_range(threshold, "threshold")?;
    let entries: Vec<(&I, &ItemSet<T>)> = sets.iter().collect();

    let rows: Vec<Vec<(Pair<I>, f64)>> = (0..entries.len())
        .into_par_iter()
        .map(|i| -> Result<Vec<(Pair<I>, f64)>> {
            let (id_a, set_a) = entries[i];
            let mut row = vec![];
            for (id_b, set_b) in &entries[i + 1..] {
                let sim = jaccard(set_a, set_b)?;
                if sim >= threshold {
                    row.push((Pair::new(id_a.clone(), (*id_b).clone()), sim));
                }
            }
            Ok(row)
        })
        .collect::<Result<_>>()?;

    let pairs: ScoredPairs<I> = rows.into_iter().flatten().collect();
    debug!(
        entities = entries.len(),
        threshold,
        pairs = pairs.len(),
        "computed exact ground truth"
    );
    Ok(pairs)
}
