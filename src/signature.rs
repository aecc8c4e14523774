//! MinHash signatures and the signature-agreement estimate of Jaccard similarity.
use crate::hash::SetHash;
use crate::pair::{Pair, ScoredPairs};
use crate::utils::check_unit_range;
use crate::{EntitySets, Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Slot value of an empty set: no item ever lowered the minimum.
pub const EMPTY_SLOT: u64 = u64::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(Vec<u64>);

impl Signature {
    pub fn new(values: Vec<u64>) -> Self {
        Signature(values)
    }

    pub fn values(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rows `[band * rows, (band + 1) * rows)`, `None` past the end of the signature.
    pub fn band(&self, band: usize, rows: usize) -> Option<&[u64]> {
        let start = band.checked_mul(rows)?;
        let end = start.checked_add(rows)?;
        self.0.get(start..end)
    }

    /// Fraction of slots where both signatures agree.
    ///
    /// # Errors
    ///
    /// Signatures of different lengths come from different families and cannot be compared.
    pub fn estimate_jaccard(&self, other: &Signature) -> Result<f64> {
        if self.len() != other.len() {
            return Err(Error::SignatureLength {
                expected: self.len(),
                got: other.len(),
            });
        }
        if self.is_empty() {
            return Err(Error::invalid("cannot compare empty signatures"));
        }
        let matches = self
            .0
            .iter()
            .zip(other.0.iter())
            .filter(|(a, b)| a == b)
            .count();
        Ok(matches as f64 / self.len() as f64)
    }
}

/// Signatures of a group of entities, all produced by one hash family.
///
/// Sets are made by [`SignatureSet::build`], so every signature in the set has
/// the same length and comes from the same functions. Deserialized sets are
/// checked for equal lengths and sorted, unique IDs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawSignatureSet<I>",
    bound(deserialize = "I: Deserialize<'de> + Ord")
)]
pub struct SignatureSet<I> {
    ids: Vec<I>,
    signatures: Vec<Signature>,
    n_hashes: usize,
}

#[derive(Deserialize)]
struct RawSignatureSet<I> {
    ids: Vec<I>,
    signatures: Vec<Signature>,
    n_hashes: usize,
}

impl<I: Ord> TryFrom<RawSignatureSet<I>> for SignatureSet<I> {
    type Error = Error;

    fn try_from(raw: RawSignatureSet<I>) -> Result<Self> {
        if raw.ids.len() != raw.signatures.len() {
            return Err(Error::invalid(format!(
                "{} ids for {} signatures",
                raw.ids.len(),
                raw.signatures.len()
            )));
        }
        if let Some(sig) = raw.signatures.iter().find(|s| s.len() != raw.n_hashes) {
            return Err(Error::SignatureLength {
                expected: raw.n_hashes,
                got: sig.len(),
            });
        }
        if raw.ids.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::invalid("signature ids must be sorted and unique"));
        }
        Ok(SignatureSet {
            ids: raw.ids,
            signatures: raw.signatures,
            n_hashes: raw.n_hashes,
        })
    }
}

impl<I> SignatureSet<I> {
    pub fn ids(&self) -> &[I] {
        &self.ids
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn n_hashes(&self) -> usize {
        self.n_hashes
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<I: Ord + Clone + Send + Sync> SignatureSet<I> {
    /// Hash every entity with `hasher`. Entities keep the ID order of `sets`.
    pub fn build<T, H>(hasher: &H, sets: &EntitySets<I, T>) -> Self
    where
        T: Sync,
        H: SetHash<T> + Sync,
    {
        let entries: Vec<_> = sets.iter().collect();
        let signatures = entries
            .par_iter()
            .map(|(_, set)| hasher.signature(set))
            .collect();
        SignatureSet {
            ids: entries.iter().map(|(id, _)| (*id).clone()).collect(),
            signatures,
            n_hashes: hasher.n_hashes(),
        }
    }

    pub fn get(&self, id: &I) -> Option<&Signature> {
        self.ids
            .binary_search(id)
            .ok()
            .map(|idx| &self.signatures[idx])
    }

    /// Keep the first `t` slots of every signature. Equal to hashing with the
    /// first `t` functions of the family.
    pub fn truncate(&self, t: usize) -> Result<Self> {
        if t == 0 || t > self.n_hashes {
            return Err(Error::invalid(format!(
                "cannot truncate signatures of length {} to {}",
                self.n_hashes, t
            )));
        }
        Ok(SignatureSet {
            ids: self.ids.clone(),
            signatures: self
                .signatures
                .iter()
                .map(|s| Signature::new(s.values()[..t].to_vec()))
                .collect(),
            n_hashes: t,
        })
    }

    /// Estimated Jaccard of two entities in this set.
    pub fn estimate(&self, a: &I, b: &I) -> Result<f64> {
        let missing = || Error::invalid("entity has no signature in this set");
        let sa = self.get(a).ok_or_else(missing)?;
        let sb = self.get(b).ok_or_else(missing)?;
        sa.estimate_jaccard(sb)
    }

    /// Every pair whose estimated Jaccard is at least `threshold`, with its estimate.
    pub fn approximate_pairs(&self, threshold: f64) -> Result<ScoredPairs<I>> {
        check_unit_range(threshold, "threshold")?;
        let rows: Vec<Vec<(Pair<I>, f64)>> = (0..self.len())
            .into_par_iter()
            .map(|i| -> Result<Vec<(Pair<I>, f64)>> {
                let mut row = vec![];
                for j in i + 1..self.len() {
                    let est = self.signatures[i].estimate_jaccard(&self.signatures[j])?;
                    if est >= threshold {
                        row.push((Pair::new(self.ids[i].clone(), self.ids[j].clone()), est));
                    }
                }
                Ok(row)
            })
            .collect::<Result<_>>()?;
        Ok(rows.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hash::{AffineHash, DigestHash};
    use crate::jaccard::jaccard;
    use crate::ItemSet;

    fn ratings() -> EntitySets<u32, u32> {
        let mut sets = EntitySets::new();
        sets.insert(3, (1..=10).collect());
        sets.insert(1, (1..=10).collect());
        sets.insert(2, (50..=60).collect());
        sets
    }

    #[test]
    fn test_estimate() {
        let a = Signature::new(vec![1, 2, 3, 4]);
        let b = Signature::new(vec![1, 0, 3, 0]);
        assert_eq!(a.estimate_jaccard(&b).unwrap(), 0.5);
        assert_eq!(a.estimate_jaccard(&a).unwrap(), 1.0);
    }

    #[test]
    fn test_length_mismatch_fails() {
        let a = Signature::new(vec![1, 2, 3]);
        let b = Signature::new(vec![1, 2]);
        match a.estimate_jaccard(&b) {
            Err(Error::SignatureLength { expected: 3, got: 2 }) => (),
            other => panic!("unexpected {:?}", other),
        }
        assert!(Signature::new(vec![]).estimate_jaccard(&Signature::new(vec![])).is_err());
    }

    #[test]
    fn test_band_slices() {
        let s = Signature::new((0..6).collect());
        assert_eq!(s.band(0, 2), Some(&[0, 1][..]));
        assert_eq!(s.band(2, 2), Some(&[4, 5][..]));
        assert_eq!(s.band(3, 2), None);
        assert_eq!(s.band(1, 6), None);
        assert_eq!(s.band(usize::MAX, 2), None);
    }

    #[test]
    fn test_deserialize_checks_shape() {
        let ok: SignatureSet<u32> =
            serde_json::from_str(r#"{"ids":[1,2],"signatures":[[1,2],[3,4]],"n_hashes":2}"#).unwrap();
        assert_eq!(ok.estimate(&1, &2).unwrap(), 0.);

        let mixed = serde_json::from_str::<SignatureSet<u32>>(
            r#"{"ids":[1,2],"signatures":[[1,2,3,4],[1,2]],"n_hashes":4}"#,
        );
        assert!(mixed.is_err());
        let wrong_len = serde_json::from_str::<SignatureSet<u32>>(
            r#"{"ids":[1,2],"signatures":[[1,2],[3,4]],"n_hashes":4}"#,
        );
        assert!(wrong_len.is_err());
        let unsorted = serde_json::from_str::<SignatureSet<u32>>(
            r#"{"ids":[5,1],"signatures":[[1,2],[3,4]],"n_hashes":2}"#,
        );
        assert!(unsorted.is_err());
        let missing_sig = serde_json::from_str::<SignatureSet<u32>>(
            r#"{"ids":[1,2,3],"signatures":[[1,2],[3,4]],"n_hashes":2}"#,
        );
        assert!(missing_sig.is_err());
    }

    #[test]
    fn test_serialized_set_round_trips() {
        let h = AffineHash::new(8, 101, 2).unwrap();
        let set = SignatureSet::build(&h, &ratings());
        let back: SignatureSet<u32> =
            serde_json::from_str(&serde_json::to_string(&set).unwrap()).unwrap();
        assert_eq!(set, back);
    }

    #[test]
    fn test_build_keeps_id_order() {
        let h = AffineHash::new(30, 1682, 1).unwrap();
        let set = SignatureSet::build(&h, &ratings());
        assert_eq!(set.ids(), &[1, 2, 3]);
        assert_eq!(set.n_hashes(), 30);
        assert!(set.signatures().iter().all(|s| s.len() == 30));
        // identical item sets hash identically
        assert_eq!(set.estimate(&1, &3).unwrap(), 1.0);
        assert!(set.estimate(&1, &99).is_err());
    }

    #[test]
    fn test_truncate() {
        let h = AffineHash::new(40, 1682, 1).unwrap();
        let sets = ratings();
        let full = SignatureSet::build(&h, &sets);
        let short = full.truncate(10).unwrap();
        let direct = SignatureSet::build(&h.prefix(10).unwrap(), &sets);
        assert_eq!(short, direct);
        assert!(full.truncate(0).is_err());
        assert!(full.truncate(41).is_err());
    }

    #[test]
    fn test_approximate_pairs() {
        let h = AffineHash::new(50, 1682, 2).unwrap();
        let set = SignatureSet::build(&h, &ratings());
        let pairs = set.approximate_pairs(0.9).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[&Pair::new(3, 1)], 1.0);
        assert!(set.approximate_pairs(-0.1).is_err());
    }

    #[test]
    fn test_minhash_converges() {
        // |A ∩ B| = 30, |A ∪ B| = 90
        let a: ItemSet<String> = (0..60).map(|i| format!("tok{}", i)).collect();
        let b: ItemSet<String> = (30..90).map(|i| format!("tok{}", i)).collect();
        let truth = jaccard(&a, &b).unwrap();
        assert!((truth - 1. / 3.).abs() < 1e-12);

        let trials = 20;
        let mut within = 0;
        let mut sum = 0.;
        for seed in 0..trials {
            let h = DigestHash::new(200, 1 << 32, seed).unwrap();
            let est = h.signature(&a).estimate_jaccard(&h.signature(&b)).unwrap();
            sum += est;
            if (est - truth).abs() < 0.1 {
                within += 1;
            }
        }
        assert!(within >= 18, "only {} of {} estimates within 0.1", within, trials);
        assert!((sum / trials as f64 - truth).abs() < 0.04);
    }

    #[test]
    fn test_larger_family_is_closer() {
        let a: ItemSet<String> = (0..60).map(|i| format!("w{}", i)).collect();
        let b: ItemSet<String> = (20..80).map(|i| format!("w{}", i)).collect();
        let truth = jaccard(&a, &b).unwrap();

        let mean_abs_err = |t: usize| {
            let mut err = 0.;
            for seed in 100..120 {
                let h = DigestHash::new(t, 1 << 32, seed).unwrap();
                let est = h.signature(&a).estimate_jaccard(&h.signature(&b)).unwrap();
                err += (est - truth).abs();
            }
            err / 20.
        };
        assert!(mean_abs_err(200) < mean_abs_err(5));
    }
}
