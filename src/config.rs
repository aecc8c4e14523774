//! Configuration of the similarity experiments.
//!
//! Every constant the experiments depend on (file paths, thresholds, sweep sizes,
//! hash ranges and the seed) lives here, so runs against small synthetic data use
//! the same code paths as runs against the real corpora.
use crate::data::RowPolicy;
use crate::hash::MAX_DIGEST_RANGE;
use crate::shingle::ShingleSpec;
use crate::utils::check_unit_range;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Seed of every hash family drawn in a run.
    pub seed: u64,
    pub documents: Vec<PathBuf>,
    pub ratings: PathBuf,
    pub row_policy: RowPolicy,
    /// Affine hash domain size. Defaults to the number of distinct items.
    pub modulus: Option<u64>,
    /// Shingle types compared in the k-gram report.
    pub kgrams: Vec<ShingleSpec>,
    pub minhash_text: MinHashTextConfig,
    pub lsh_text: LshTextConfig,
    pub minhash_ratings: MinHashRatingsConfig,
    pub lsh_ratings: LshRatingsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinHashTextConfig {
    pub shingle: ShingleSpec,
    /// Family sizes `t` to sweep.
    pub hash_counts: Vec<usize>,
    /// Digest output range.
    pub max_hash: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LshTextConfig {
    pub shingle: ShingleSpec,
    /// Total hash functions `t = r * b`.
    pub hash_budget: usize,
    /// Similarity at which the S-curve should cross 0.5.
    pub threshold: f64,
    pub max_hash: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinHashRatingsConfig {
    pub hash_counts: Vec<usize>,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LshRatingsConfig {
    pub threshold: f64,
    pub bandings: Vec<BandingConfig>,
}

/// One LSH configuration to sweep. Without `rows` and `bands` the optimal
/// banding for the threshold is searched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandingConfig {
    pub hashes: usize,
    #[serde(default)]
    pub rows: Option<usize>,
    #[serde(default)]
    pub bands: Option<usize>,
}

impl BandingConfig {
    pub fn fixed(hashes: usize, rows: usize, bands: usize) -> Self {
        BandingConfig {
            hashes,
            rows: Some(rows),
            bands: Some(bands),
        }
    }

    pub fn budget(hashes: usize) -> Self {
        BandingConfig {
            hashes,
            rows: None,
            bands: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.hashes == 0 {
            return Err(Error::invalid("banding hashes must be >= 1"));
        }
        match (self.rows, self.bands) {
            (None, None) => Ok(()),
            (Some(r), Some(b)) if r.checked_mul(b) == Some(self.hashes) => Ok(()),
            (Some(r), Some(b)) => Err(Error::invalid(format!(
                "rows {} * bands {} != hashes {}",
                r, b, self.hashes
            ))),
            _ => Err(Error::invalid("set both rows and bands or neither")),
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            seed: 42,
            documents: (1..=4).map(|i| PathBuf::from(format!("D{}.txt", i))).collect(),
            ratings: PathBuf::from("ratings.csv"),
            row_policy: RowPolicy::default(),
            modulus: None,
            kgrams: vec![
                ShingleSpec::chars(2),
                ShingleSpec::chars(3),
                ShingleSpec::words(2),
            ],
            minhash_text: MinHashTextConfig::default(),
            lsh_text: LshTextConfig::default(),
            minhash_ratings: MinHashRatingsConfig::default(),
            lsh_ratings: LshRatingsConfig::default(),
        }
    }
}

impl Default for MinHashTextConfig {
    fn default() -> Self {
        MinHashTextConfig {
            shingle: ShingleSpec::chars(3),
            hash_counts: vec![20, 60, 150, 300, 600],
            max_hash: 10_000,
        }
    }
}

impl Default for LshTextConfig {
    fn default() -> Self {
        LshTextConfig {
            shingle: ShingleSpec::chars(3),
            hash_budget: 160,
            threshold: 0.7,
            max_hash: 10_000,
        }
    }
}

impl Default for MinHashRatingsConfig {
    fn default() -> Self {
        MinHashRatingsConfig {
            hash_counts: vec![50, 100, 200],
            threshold: 0.5,
        }
    }
}

impl Default for LshRatingsConfig {
    fn default() -> Self {
        LshRatingsConfig {
            threshold: 0.6,
            bandings: vec![
                BandingConfig::fixed(50, 5, 10),
                BandingConfig::fixed(100, 5, 20),
                BandingConfig::fixed(200, 5, 40),
                BandingConfig::fixed(200, 10, 20),
            ],
        }
    }
}

fn check_counts(counts: &[usize], name: &str) -> Result<()> {
    if counts.is_empty() || counts.contains(&0) {
        return Err(Error::invalid(format!(
            "{} needs at least one family size, all >= 1",
            name
        )));
    }
    Ok(())
}

fn check_max_hash(max_hash: u64) -> Result<()> {
    if max_hash == 0 || max_hash > MAX_DIGEST_RANGE {
        return Err(Error::invalid(format!(
            "max_hash must be within 1..={}",
            MAX_DIGEST_RANGE
        )));
    }
    Ok(())
}

impl ExperimentConfig {
    /// Read a JSON file. Missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: ExperimentConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.kgrams.iter().any(|s| s.k == 0) {
            return Err(Error::invalid("k-gram width must be >= 1"));
        }
        if self.minhash_text.shingle.k == 0 || self.lsh_text.shingle.k == 0 {
            return Err(Error::invalid("k-gram width must be >= 1"));
        }
        if let Some(m) = self.modulus {
            if m < 2 {
                return Err(Error::invalid("modulus must be at least 2"));
            }
        }
        check_counts(&self.minhash_text.hash_counts, "minhash_text.hash_counts")?;
        check_counts(&self.minhash_ratings.hash_counts, "minhash_ratings.hash_counts")?;
        check_max_hash(self.minhash_text.max_hash)?;
        check_max_hash(self.lsh_text.max_hash)?;
        if self.lsh_text.hash_budget == 0 {
            return Err(Error::invalid("lsh_text.hash_budget must be >= 1"));
        }
        check_unit_range(self.lsh_text.threshold, "lsh_text.threshold")?;
        check_unit_range(self.minhash_ratings.threshold, "minhash_ratings.threshold")?;
        check_unit_range(self.lsh_ratings.threshold, "lsh_ratings.threshold")?;
        if self.lsh_ratings.bandings.is_empty() {
            return Err(Error::invalid("lsh_ratings.bandings is empty"));
        }
        for b in &self.lsh_ratings.bandings {
            b.validate()?;
        }
        Ok(())
    }
}
