use crate::{Error, Result};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Every hash family of a run is drawn from an rng built here, so a run is fully
/// determined by its seed.
pub fn create_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Check that `v` is a usable similarity threshold.
pub fn check_unit_range(v: f64, name: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&v) {
        return Err(Error::invalid(format!(
            "{} must be within [0, 1], got {}",
            name, v
        )));
    }
    Ok(())
}
