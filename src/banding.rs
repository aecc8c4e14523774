//! LSH banding of MinHash signatures.
//!
//! A signature of length `t = r * b` is cut into `b` bands of `r` rows. Two
//! entities become a candidate pair when any of their bands are identical, which
//! happens with probability `1 - (1 - s^r)^b` for true similarity `s`.
use crate::pair::{Pair, PairSet};
use crate::signature::SignatureSet;
use crate::utils::check_unit_range;
use crate::{Error, Result};
use fnv::FnvHashMap as HashMap;
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BandingParams")]
pub struct Banding {
    /// Rows per band, `r`.
    rows: usize,
    /// Number of bands, `b`.
    bands: usize,
}

#[derive(Deserialize)]
struct BandingParams {
    rows: usize,
    bands: usize,
}

impl TryFrom<BandingParams> for Banding {
    type Error = Error;

    fn try_from(p: BandingParams) -> Result<Self> {
        Banding::new(p.rows, p.bands)
    }
}

/// Bucket occupancy of one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BandStats {
    pub band: usize,
    pub buckets: usize,
    /// Buckets holding two or more entities.
    pub colliding: usize,
    pub largest: usize,
}

impl Banding {
    pub fn new(rows: usize, bands: usize) -> Result<Self> {
        if rows == 0 || bands == 0 {
            return Err(Error::invalid("rows and bands must be >= 1"));
        }
        if rows.checked_mul(bands).is_none() {
            return Err(Error::invalid(format!(
                "rows {} * bands {} overflows",
                rows, bands
            )));
        }
        Ok(Banding { rows, bands })
    }

    /// The `(r, b)` with `r * b = t` whose S-curve is closest to 0.5 at `threshold`.
    ///
    /// Only exact divisors of `t` are considered. Ties keep the smaller `r`.
    ///
    /// # Examples
    ///
    /// ```
    /// use jaccard_lsh::Banding;
    /// let banding = Banding::optimal(160, 0.7).unwrap();
    /// assert_eq!((banding.rows(), banding.bands()), (10, 16));
    /// ```
    pub fn optimal(t: usize, threshold: f64) -> Result<Self> {
        if t == 0 {
            return Err(Error::invalid("hash budget must be >= 1"));
        }
        check_unit_range(threshold, "threshold")?;

        let mut best = Banding { rows: 1, bands: t };
        let mut best_diff = f64::MAX;
        for rows in (1..=t).filter(|r| t % r == 0) {
            let candidate = Banding {
                rows,
                bands: t / rows,
            };
            let diff = (candidate.probability(threshold) - 0.5).abs();
            if diff < best_diff {
                best_diff = diff;
                best = candidate;
            }
        }
        Ok(best)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Signature length this banding expects.
    pub fn n_hashes(&self) -> usize {
        self.rows * self.bands
    }

    /// Probability that two entities with similarity `s` share at least one band.
    pub fn probability(&self, s: f64) -> f64 {
        1. - (1. - s.powi(self.rows as i32)).powi(self.bands as i32)
    }

    /// Similarity `(1/b)^(1/r)` near which the S-curve is steepest.
    pub fn threshold(&self) -> f64 {
        (1. / self.bands as f64).powf(1. / self.rows as f64)
    }

    fn check_len<I>(&self, set: &SignatureSet<I>) -> Result<()> {
        if set.n_hashes() != self.n_hashes() {
            return Err(Error::SignatureLength {
                expected: self.n_hashes(),
                got: set.n_hashes(),
            });
        }
        Ok(())
    }

    /// Group entity indexes by the exact values of one band.
    fn buckets<'a, I>(&self, set: &'a SignatureSet<I>, band: usize) -> HashMap<&'a [u64], Vec<usize>> {
        let mut buckets: HashMap<&[u64], Vec<usize>> = HashMap::default();
        for (idx, sig) in set.signatures().iter().enumerate() {
            if let Some(key) = sig.band(band, self.rows) {
                buckets.entry(key).or_insert_with(Vec::new).push(idx);
            }
        }
        buckets
    }

    fn band_candidates<I>(&self, set: &SignatureSet<I>, band: usize) -> (PairSet<I>, BandStats)
    where
        I: Ord + Clone + Send + Sync,
    {
        let buckets = self.buckets(set, band);
        let ids = set.ids();
        let mut pairs = PairSet::new();
        let mut stats = BandStats {
            band,
            buckets: buckets.len(),
            ..Default::default()
        };

        for members in buckets.values() {
            stats.largest = stats.largest.max(members.len());
            if members.len() < 2 {
                continue;
            }
            stats.colliding += 1;
            for (&a, &b) in members.iter().tuple_combinations() {
                pairs.insert(Pair::new(ids[a].clone(), ids[b].clone()));
            }
        }
        (pairs, stats)
    }

    /// All pairs that collide in at least one band. Each pair appears once, no
    /// matter how many bands it collides in.
    ///
    /// Entities with empty item sets share the same all-[`EMPTY_SLOT`](crate::signature::EMPTY_SLOT)
    /// signature and therefore collide with each other.
    ///
    /// # Errors
    ///
    /// The signatures must be exactly `r * b` long.
    pub fn candidate_pairs<I>(&self, set: &SignatureSet<I>) -> Result<PairSet<I>>
    where
        I: Ord + Clone + Send + Sync,
    {
        self.check_len(set)?;
        let per_band: Vec<(PairSet<I>, BandStats)> = (0..self.bands)
            .into_par_iter()
            .map(|band| self.band_candidates(set, band))
            .collect();

        let mut candidates = PairSet::new();
        for (pairs, stats) in per_band {
            debug!(
                band = stats.band,
                buckets = stats.buckets,
                colliding = stats.colliding,
                largest = stats.largest,
                "banded"
            );
            candidates.extend(pairs);
        }
        debug!(
            rows = self.rows,
            bands = self.bands,
            entities = set.len(),
            candidates = candidates.len(),
            "lsh candidates"
        );
        Ok(candidates)
    }

    /// Bucket occupancy per band.
    pub fn describe<I>(&self, set: &SignatureSet<I>) -> Result<Vec<BandStats>>
    where
        I: Ord + Clone + Send + Sync,
    {
        self.check_len(set)?;
        Ok((0..self.bands)
            .map(|band| self.band_candidates(set, band).1)
            .collect())
    }
}
