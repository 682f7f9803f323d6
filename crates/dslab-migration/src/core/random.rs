//! Deterministic random sources.

use rand::prelude::*;
use rand_distr::Normal;
use rand_pcg::Pcg64;

pub const DEFAULT_SEED: u64 = 100;

/// Source of pseudo-random numbers used by VM load models and migration strategies.
///
/// A run is fully determined by the state of its random source, so two runs started from equally seeded sources
/// produce identical results.
pub trait RandomSource {
    /// Returns a sample from the uniform distribution on `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Returns a sample from the normal distribution with the specified parameters.
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64;

    /// Returns a uniformly chosen index in `0..len`, `len` must be positive.
    fn choose_index(&mut self, len: usize) -> usize {
        ((self.uniform() * len as f64) as usize).min(len - 1)
    }
}

/// Random source backed by the PCG generator.
pub struct PcgRandomSource {
    rand: Pcg64,
}

impl PcgRandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rand: Pcg64::seed_from_u64(seed),
        }
    }
}

impl Default for PcgRandomSource {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl RandomSource for PcgRandomSource {
    fn uniform(&mut self) -> f64 {
        self.rand.gen_range(0.0..1.0)
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(&mut self.rand),
            // degenerate deviation (negative or NaN), fall back to the mean
            Err(_) => mean,
        }
    }

    fn choose_index(&mut self, len: usize) -> usize {
        self.rand.gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = PcgRandomSource::new(42);
        let mut b = PcgRandomSource::new(42);
        for _ in 0..100 {
            assert_eq!(a.uniform(), b.uniform());
            assert_eq!(a.gaussian(3., 0.5), b.gaussian(3., 0.5));
            assert_eq!(a.choose_index(7), b.choose_index(7));
        }
    }

    #[test]
    fn choose_index_in_range() {
        let mut rand = PcgRandomSource::default();
        for len in 1..20 {
            assert!(rand.choose_index(len) < len);
        }
    }

    #[test]
    fn zero_deviation_returns_mean() {
        let mut rand = PcgRandomSource::default();
        assert_eq!(rand.gaussian(1.5, 0.), 1.5);
    }
}
