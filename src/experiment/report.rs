use crate::banding::Banding;
use crate::config::{
    BandingConfig, LshRatingsConfig, LshTextConfig, MinHashRatingsConfig, MinHashTextConfig,
};
use crate::data::{Document, Ratings};
use crate::eval::Evaluation;
use crate::hash::{AffineHash, DigestHash};
use crate::jaccard::{exact_pairs, pairwise};
use crate::pair::Pair;
use crate::shingle::ShingleSpec;
use crate::signature::SignatureSet;
use crate::utils::create_rng;
use crate::{EntitySets, Error, Result};
use rand::Rng;
use rayon::prelude::*;
use std::fmt;
use std::time::Instant;
use tracing::debug;

fn fmt_sim(sim: Option<f64>) -> String {
    match sim {
        Some(s) => format!("{:.4}", s),
        None => "undefined".to_string(),
    }
}

/// Shingle every document, keyed by document name.
pub fn shingle_documents(docs: &[Document], spec: ShingleSpec) -> EntitySets<String, String> {
    docs.iter()
        .map(|d| (d.name.clone(), spec.shingles(&d.text)))
        .collect()
}

/// Affine domain size: the configured value, or the number of distinct rated items.
pub fn item_modulus(configured: Option<u64>, ratings: &Ratings) -> Result<u64> {
    let m = configured.unwrap_or(ratings.n_items() as u64);
    if m < 2 {
        return Err(Error::invalid(format!(
            "affine modulus must be at least 2, got {}",
            m
        )));
    }
    Ok(m)
}

/// Distinct k-gram counts and pairwise Jaccard per shingle type.
#[derive(Debug, Clone, PartialEq)]
pub struct KGramReport {
    pub specs: Vec<ShingleSpec>,
    /// Per document, one count per spec.
    pub counts: Vec<(String, Vec<usize>)>,
    /// Per pair, one similarity per spec.
    pub similarities: Vec<(Pair<String>, Vec<Option<f64>>)>,
}

pub fn kgram_report(docs: &[Document], specs: &[ShingleSpec]) -> KGramReport {
    let per_spec: Vec<EntitySets<String, String>> = specs
        .iter()
        .map(|&spec| shingle_documents(docs, spec))
        .collect();

    let counts = docs
        .iter()
        .map(|d| {
            let c = per_spec
                .iter()
                .map(|sets| sets.get(&d.name).map_or(0, |s| s.len()))
                .collect();
            (d.name.clone(), c)
        })
        .collect();

    let mut similarities: Vec<(Pair<String>, Vec<Option<f64>>)> = vec![];
    for sets in &per_spec {
        for (i, (pair, sim)) in pairwise(sets).into_iter().enumerate() {
            if i < similarities.len() {
                similarities[i].1.push(sim);
            } else {
                similarities.push((pair, vec![sim]));
            }
        }
    }

    KGramReport {
        specs: specs.to_vec(),
        counts,
        similarities,
    }
}

impl fmt::Display for KGramReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Distinct k-grams per document:")?;
        for (name, counts) in &self.counts {
            let cols: Vec<String> = self
                .specs
                .iter()
                .zip(counts)
                .map(|(spec, c)| format!("{}s={}", spec, c))
                .collect();
            writeln!(f, "{}: {}", name, cols.join(", "))?;
        }
        writeln!(f)?;
        writeln!(f, "Jaccard similarity per document pair:")?;
        for (pair, sims) in &self.similarities {
            let cols: Vec<String> = self
                .specs
                .iter()
                .zip(sims)
                .map(|(spec, s)| format!("{}={}", spec, fmt_sim(*s)))
                .collect();
            writeln!(f, "{}: {}", pair, cols.join(", "))?;
        }
        Ok(())
    }
}

/// MinHash estimates of document similarity for a sweep of family sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct MinHashTextReport {
    pub exact: Vec<(Pair<String>, Option<f64>)>,
    /// `(t, estimate per pair in the order of exact)`.
    pub estimates: Vec<(usize, Vec<f64>)>,
}

pub fn minhash_text_report(
    docs: &[Document],
    config: &MinHashTextConfig,
    seed: u64,
) -> Result<MinHashTextReport> {
    let sets = shingle_documents(docs, config.shingle);
    let exact = pairwise(&sets);
    let max_t = config.hash_counts.iter().copied().max().unwrap_or(0);
    let family = DigestHash::new(max_t, config.max_hash, seed)?;
    let full = SignatureSet::build(&family, &sets);

    let estimates = config
        .hash_counts
        .iter()
        .map(|&t| -> Result<(usize, Vec<f64>)> {
            let sigs = full.truncate(t)?;
            let row = exact
                .iter()
                .map(|(pair, _)| sigs.estimate(pair.low(), pair.high()))
                .collect::<Result<Vec<f64>>>()?;
            Ok((t, row))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MinHashTextReport { exact, estimates })
}

impl fmt::Display for MinHashTextReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Min-Hash Jaccard Similarity Estimates:")?;
        for (i, (pair, exact)) in self.exact.iter().enumerate() {
            writeln!(f, "{} (exact {}):", pair, fmt_sim(*exact))?;
            for (t, row) in &self.estimates {
                writeln!(f, "t = {}: Jaccard Similarity = {:.4}", t, row[i])?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LshTextPair {
    pub pair: Pair<String>,
    pub jaccard: Option<f64>,
    /// S-curve probability at the exact similarity.
    pub probability: Option<f64>,
    /// Whether banding the signatures actually produced the pair.
    pub candidate: bool,
}

/// Optimal banding for a hash budget and the resulting per-pair candidate odds.
#[derive(Debug, Clone, PartialEq)]
pub struct LshTextReport {
    pub banding: Banding,
    pub pairs: Vec<LshTextPair>,
}

pub fn lsh_text_report(docs: &[Document], config: &LshTextConfig, seed: u64) -> Result<LshTextReport> {
    let banding = Banding::optimal(config.hash_budget, config.threshold)?;
    let sets = shingle_documents(docs, config.shingle);
    let family = DigestHash::new(banding.n_hashes(), config.max_hash, seed)?;
    let candidates = banding.candidate_pairs(&SignatureSet::build(&family, &sets))?;

    let pairs = pairwise(&sets)
        .into_iter()
        .map(|(pair, sim)| LshTextPair {
            candidate: candidates.contains(&pair),
            probability: sim.map(|s| banding.probability(s)),
            jaccard: sim,
            pair,
        })
        .collect();
    Ok(LshTextReport { banding, pairs })
}

impl fmt::Display for LshTextReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Best values for LSH: r = {}, b = {}",
            self.banding.rows(),
            self.banding.bands()
        )?;
        writeln!(
            f,
            "Approximate similarity threshold: {:.4}",
            self.banding.threshold()
        )?;
        writeln!(f)?;
        writeln!(f, "LSH Probabilities for Document Pairs:")?;
        for p in &self.pairs {
            writeln!(
                f,
                "{}: {} (Jaccard {}, candidate: {})",
                p.pair,
                fmt_sim(p.probability),
                fmt_sim(p.jaccard),
                if p.candidate { "yes" } else { "no" }
            )?;
        }
        Ok(())
    }
}

/// One point of a ratings sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRow {
    pub hashes: usize,
    /// Set for LSH sweeps.
    pub banding: Option<Banding>,
    pub evaluation: Evaluation,
}

/// Approximate pair sets of a ratings sweep, each scored against one ground truth.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingsReport {
    pub threshold: f64,
    pub ground_truth: usize,
    pub rows: Vec<SweepRow>,
}

/// Signature-agreement estimates at several family sizes against exact Jaccard.
///
/// One family of the largest size is drawn and every smaller size uses its prefix.
pub fn minhash_ratings_report(
    users: &EntitySets<u32, u32>,
    modulus: u64,
    config: &MinHashRatingsConfig,
    seed: u64,
) -> Result<RatingsReport> {
    let truth = exact_pairs(users, config.threshold)?;
    let max_t = config.hash_counts.iter().copied().max().unwrap_or(0);
    let family = AffineHash::new(max_t, modulus, seed)?;
    let full = SignatureSet::build(&family, users);

    let rows = config
        .hash_counts
        .par_iter()
        .map(|&t| -> Result<SweepRow> {
            let start = Instant::now();
            let approx = full.truncate(t)?.approximate_pairs(config.threshold)?;
            let evaluation = Evaluation::new(&truth, &approx);
            debug!(hashes = t, elapsed = ?start.elapsed(), "minhash sweep");
            Ok(SweepRow {
                hashes: t,
                banding: None,
                evaluation,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RatingsReport {
        threshold: config.threshold,
        ground_truth: truth.len(),
        rows,
    })
}

fn resolve_banding(config: &BandingConfig, threshold: f64) -> Result<Banding> {
    let banding = match (config.rows, config.bands) {
        (Some(r), Some(b)) => Banding::new(r, b)?,
        _ => Banding::optimal(config.hashes, threshold)?,
    };
    if banding.n_hashes() != config.hashes {
        return Err(Error::invalid(format!(
            "banding r={} b={} does not use {} hash functions",
            banding.rows(),
            banding.bands(),
            config.hashes
        )));
    }
    Ok(banding)
}

/// LSH candidate pairs for several bandings against exact Jaccard.
///
/// Each banding gets its own family, drawn from the run seed.
pub fn lsh_ratings_report(
    users: &EntitySets<u32, u32>,
    modulus: u64,
    config: &LshRatingsConfig,
    seed: u64,
) -> Result<RatingsReport> {
    let truth = exact_pairs(users, config.threshold)?;
    let mut rng = create_rng(seed);
    let seeds: Vec<u64> = config.bandings.iter().map(|_| rng.gen()).collect();

    let rows = config
        .bandings
        .par_iter()
        .zip(seeds)
        .map(|(bc, family_seed)| -> Result<SweepRow> {
            let start = Instant::now();
            let banding = resolve_banding(bc, config.threshold)?;
            let family = AffineHash::new(bc.hashes, modulus, family_seed)?;
            let sigs = SignatureSet::build(&family, users);
            let candidates = banding.candidate_pairs(&sigs)?;
            let evaluation = Evaluation::new(&truth, &candidates);
            debug!(
                hashes = bc.hashes,
                rows = banding.rows(),
                bands = banding.bands(),
                elapsed = ?start.elapsed(),
                "lsh sweep"
            );
            Ok(SweepRow {
                hashes: bc.hashes,
                banding: Some(banding),
                evaluation,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RatingsReport {
        threshold: config.threshold,
        ground_truth: truth.len(),
        rows,
    })
}

impl fmt::Display for RatingsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Exact Jaccard Similarity (>= {}): {}",
            self.threshold, self.ground_truth
        )?;
        for row in &self.rows {
            writeln!(f)?;
            match row.banding {
                Some(b) => {
                    writeln!(
                        f,
                        "Using {} hash functions, r={}, b={}",
                        row.hashes,
                        b.rows(),
                        b.bands()
                    )?;
                    writeln!(f, "Candidate Pairs Found: {}", row.evaluation.candidates)?;
                }
                None => {
                    writeln!(f, "Using {} hash functions:", row.hashes)?;
                    writeln!(f, "Approximate Pairs Found: {}", row.evaluation.candidates)?;
                }
            }
            writeln!(f, "{}", row.evaluation)?;
            writeln!(
                f,
                "Total Exact Pairs (>= {}): {}",
                self.threshold, self.ground_truth
            )?;
        }
        Ok(())
    }
}
