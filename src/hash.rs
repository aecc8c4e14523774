use crate::signature::{Signature, EMPTY_SLOT};
use crate::utils::create_rng;
use crate::{Error, ItemSet, Result};
use rand::distributions::Uniform;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// A family of `t` hash functions mapping set items into a bounded integer range.
///
/// One family is drawn per run and applied to every entity, so all signatures
/// of a run are comparable.
pub trait SetHash<T> {
    /// Family size, which is also the signature length.
    fn n_hashes(&self) -> usize;

    /// Value of hash function `idx` for `item`.
    fn hash_item(&self, idx: usize, item: &T) -> u64;

    /// Slot `i` holds the minimum of hash function `i` over all items.
    /// An empty set gives a signature filled with [`EMPTY_SLOT`].
    fn signature(&self, set: &ItemSet<T>) -> Signature {
        let mut mins = vec![EMPTY_SLOT; self.n_hashes()];
        for item in set {
            for (i, m) in mins.iter_mut().enumerate() {
                let h = self.hash_item(i, item);
                if h < *m {
                    *m = h;
                }
            }
        }
        Signature::new(mins)
    }
}

/// Affine hashes `h(x) = (a * x + b) mod M` over a bounded integer domain,
/// e.g. movie IDs with `M` the number of distinct movies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffineHash {
    /// (multiplier, offset) per hash function.
    params: Vec<(u64, u64)>,
    modulus: u64,
}

impl AffineHash {
    ///
    /// # Arguments
    ///
    /// * `n_hashes` - Family size `t`.
    /// * `modulus` - Size of the item domain `M`. Must be at least 2.
    /// * `seed` - Seed of the rng drawing the parameters.
    pub fn new(n_hashes: usize, modulus: u64, seed: u64) -> Result<Self> {
        if modulus < 2 {
            return Err(Error::invalid("affine modulus must be at least 2"));
        }
        let mut rng = create_rng(seed);
        let multipliers = Uniform::new(1, modulus);
        let offsets = Uniform::new(0, modulus);
        let params = (0..n_hashes)
            .map(|_| (rng.sample(&multipliers), rng.sample(&offsets)))
            .collect();
        Self::from_params(params, modulus)
    }

    pub fn from_params(params: Vec<(u64, u64)>, modulus: u64) -> Result<Self> {
        if params.is_empty() {
            return Err(Error::invalid("a hash family needs at least one function"));
        }
        if modulus == 0 {
            return Err(Error::invalid("affine modulus must be positive"));
        }
        Ok(AffineHash { params, modulus })
    }

    pub fn params(&self) -> &[(u64, u64)] {
        &self.params
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// The first `t` functions of this family.
    pub fn prefix(&self, t: usize) -> Result<Self> {
        if t > self.params.len() {
            return Err(Error::invalid(format!(
                "cannot take {} functions from a family of {}",
                t,
                self.params.len()
            )));
        }
        Self::from_params(self.params[..t].to_vec(), self.modulus)
    }
}

impl<T: Copy + Into<u64>> SetHash<T> for AffineHash {
    fn n_hashes(&self) -> usize {
        self.params.len()
    }

    fn hash_item(&self, idx: usize, item: &T) -> u64 {
        let (a, b) = self.params[idx];
        let x: u64 = (*item).into();
        ((a as u128 * x as u128 + b as u128) % self.modulus as u128) as u64
    }
}

/// Digest based hashes for open vocabularies such as text k-grams.
///
/// Function `i` is SHA-256 over `(seed_i, token)`; the first four digest bytes,
/// read big-endian, are reduced modulo `max_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestHash {
    seeds: Vec<u64>,
    max_hash: u64,
}

/// Largest range a four byte digest prefix can fill.
pub const MAX_DIGEST_RANGE: u64 = 1 << 32;

impl DigestHash {
    ///
    /// # Arguments
    ///
    /// * `n_hashes` - Family size `t`.
    /// * `max_hash` - Output range, in `1..=2^32`.
    /// * `seed` - Seed of the rng drawing the per-function seeds.
    pub fn new(n_hashes: usize, max_hash: u64, seed: u64) -> Result<Self> {
        let mut rng = create_rng(seed);
        let seeds = (0..n_hashes).map(|_| rng.gen()).collect();
        Self::from_seeds(seeds, max_hash)
    }

    pub fn from_seeds(seeds: Vec<u64>, max_hash: u64) -> Result<Self> {
        if seeds.is_empty() {
            return Err(Error::invalid("a hash family needs at least one function"));
        }
        if max_hash == 0 || max_hash > MAX_DIGEST_RANGE {
            return Err(Error::invalid(format!(
                "max_hash must be within 1..={}, got {}",
                MAX_DIGEST_RANGE, max_hash
            )));
        }
        Ok(DigestHash { seeds, max_hash })
    }

    pub fn max_hash(&self) -> u64 {
        self.max_hash
    }

    /// The first `t` functions of this family.
    pub fn prefix(&self, t: usize) -> Result<Self> {
        if t > self.seeds.len() {
            return Err(Error::invalid(format!(
                "cannot take {} functions from a family of {}",
                t,
                self.seeds.len()
            )));
        }
        Self::from_seeds(self.seeds[..t].to_vec(), self.max_hash)
    }
}

impl<T: AsRef<[u8]>> SetHash<T> for DigestHash {
    fn n_hashes(&self) -> usize {
        self.seeds.len()
    }

    fn hash_item(&self, idx: usize, item: &T) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.seeds[idx].to_le_bytes());
        hasher.update(item.as_ref());
        let d = hasher.finalize();
        let v = u32::from_be_bytes([d[0], d[1], d[2], d[3]]) as u64;
        v % self.max_hash
    }
}

/// Write a hash family to disk so later runs can reuse it.
pub fn dump_family<H: Serialize, P: AsRef<Path>>(family: &H, path: P) -> Result<()> {
    let blob = bincode::serialize(family)?;
    let mut f = File::create(path)?;
    f.write_all(&blob)?;
    Ok(())
}

pub fn load_family<H: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<H> {
    let mut f = File::open(path)?;
    let mut buf: Vec<u8> = vec![];
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}
