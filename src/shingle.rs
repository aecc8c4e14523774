//! Turn raw text into sets of k-grams.
//!
//! Documents are lower-cased before windowing. Character k-grams slide over
//! unicode scalar values, word k-grams over whitespace-delimited words joined
//! by a single space. Text shorter than `k` gives an empty set.
use crate::ItemSet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShingleMode {
    Char,
    Word,
}

/// Granularity and width of the k-grams to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShingleSpec {
    pub mode: ShingleMode,
    pub k: usize,
}

impl ShingleSpec {
    pub fn chars(k: usize) -> Self {
        ShingleSpec {
            mode: ShingleMode::Char,
            k,
        }
    }

    pub fn words(k: usize) -> Self {
        ShingleSpec {
            mode: ShingleMode::Word,
            k,
        }
    }

    pub fn shingles(&self, text: &str) -> ItemSet<String> {
        match self.mode {
            ShingleMode::Char => char_kgrams(text, self.k),
            ShingleMode::Word => word_kgrams(text, self.k),
        }
    }
}

impl fmt::Display for ShingleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ShingleMode::Char => write!(f, "Char {}-gram", self.k),
            ShingleMode::Word => write!(f, "Word {}-gram", self.k),
        }
    }
}

/// All distinct length `k` character windows of the lower-cased text.
///
/// # Examples
///
/// ```
/// use jaccard_lsh::shingle::char_kgrams;
/// let grams = char_kgrams("abcd", 2);
/// assert_eq!(grams.len(), 3);
/// assert!(grams.contains("bc"));
/// ```
pub fn char_kgrams(text: &str, k: usize) -> ItemSet<String> {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    if k == 0 || chars.len() < k {
        return ItemSet::default();
    }
    chars.windows(k).map(|w| w.iter().collect()).collect()
}

/// All distinct runs of `k` consecutive lower-cased words, joined by one space.
pub fn word_kgrams(text: &str, k: usize) -> ItemSet<String> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    if k == 0 || words.len() < k {
        return ItemSet::default();
    }
    words.windows(k).map(|w| w.join(" ")).collect()
}
