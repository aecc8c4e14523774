#![cfg(feature = "stats")]
use crate::banding::Banding;
use crate::{Error, Result};
use statrs::distribution::{Normal, Univariate};

/// Standard error of the MinHash estimate for true similarity `s` and `t` hash functions.
///
/// Slot agreements are Bernoulli(`s`) trials, so the estimate has variance `s(1 - s) / t`.
pub fn std_error(s: f64, t: usize) -> f64 {
    (s * (1. - s) / t as f64).sqrt()
}

/// Normal approximation of `P(|estimate - s| <= eps)` with `t` hash functions.
///
/// # Arguments
/// * `s` - True Jaccard similarity.
/// * `t` - Family size.
/// * `eps` - Tolerance around `s`.
pub fn prob_within(s: f64, t: usize, eps: f64) -> Result<f64> {
    if t == 0 {
        return Err(Error::invalid("family size must be >= 1"));
    }
    let se = std_error(s, t);
    if se == 0. {
        return Ok(1.);
    }
    let norm = Normal::new(0., 1.).map_err(|e| Error::Other(anyhow::anyhow!("{}", e)))?;
    Ok(2. * norm.cdf(eps / se) - 1.)
}

/// Expected number of candidate pairs for pairs with the given true similarities.
pub fn expected_candidates<It: IntoIterator<Item = f64>>(banding: &Banding, similarities: It) -> f64 {
    similarities
        .into_iter()
        .map(|s| banding.probability(s))
        .sum()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_std_error() {
        assert!((std_error(0.5, 100) - 0.05).abs() < 1e-12);
        assert_eq!(std_error(1., 100), 0.);
    }

    #[test]
    fn test_prob_within() {
        // one standard error either side, ~68%
        let p = prob_within(0.5, 100, 0.05).unwrap();
        assert!((p - 0.6827).abs() < 1e-3);
        // more hash functions tighten the estimate
        assert!(prob_within(0.3, 600, 0.05).unwrap() > prob_within(0.3, 20, 0.05).unwrap());
        assert_eq!(prob_within(0., 10, 0.01).unwrap(), 1.);
        assert!(prob_within(0.5, 0, 0.1).is_err());
    }

    #[test]
    fn test_expected_candidates() {
        let banding = Banding::new(5, 10).unwrap();
        let e = expected_candidates(&banding, vec![1., 0., 0.8]);
        assert!((e - 1.981131).abs() < 1e-5);
    }
}
