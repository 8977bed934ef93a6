//! Discrete Gaussian sampling
//!
//! The sampler owns the ChaCha20 stream used for every random choice in
//! key generation and encryption: Gaussian errors, ternary secrets and
//! uniform ring elements.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Default Gaussian standard deviation
pub const DEFAULT_SIGMA: f64 = 3.2;

/// Samples beyond this many standard deviations are rejected
const TAILCUT_SIGMAS: f64 = 6.0;

/// Discrete Gaussian sampler over Z using rejection sampling
#[derive(Clone)]
pub struct GaussianSampler {
    /// Standard deviation σ
    sigma: f64,
    /// Largest magnitude the sampler can return
    tailcut: u64,
    rng: ChaCha20Rng,
}

impl GaussianSampler {
    /// Sampler seeded from operating system entropy
    pub fn from_entropy(sigma: f64) -> Self {
        Self::from_rng(sigma, ChaCha20Rng::from_entropy())
    }

    /// Deterministic sampler, for tests and reproducible benchmarks
    pub fn with_seed(sigma: f64, seed: u64) -> Self {
        Self::from_rng(sigma, ChaCha20Rng::seed_from_u64(seed))
    }

    /// Sampler over an explicit 32-byte ChaCha20 seed
    pub fn from_seed(sigma: f64, seed: [u8; 32]) -> Self {
        Self::from_rng(sigma, ChaCha20Rng::from_seed(seed))
    }

    fn from_rng(sigma: f64, rng: ChaCha20Rng) -> Self {
        Self {
            sigma,
            tailcut: tailcut_bound(sigma),
            rng,
        }
    }

    /// Get the standard deviation
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Bound on |sample|
    pub fn tailcut(&self) -> u64 {
        self.tailcut
    }

    /// Derive an independent child sampler.
    ///
    /// Used to hand each parallel task its own stream.
    pub fn fork(&mut self) -> Self {
        let seed: [u8; 32] = self.rng.gen();
        Self::from_seed(self.sigma, seed)
    }

    /// Sample a single value from the discrete Gaussian D_σ
    pub fn sample(&mut self) -> i64 {
        let sigma_sq_2 = 2.0 * self.sigma * self.sigma;
        let bound = self.tailcut as i64;

        loop {
            let x = self.rng.gen_range(-bound..=bound);

            // Accept with probability exp(-x²/(2σ²))
            let prob = (-((x * x) as f64) / sigma_sq_2).exp();
            let u: f64 = self.rng.gen();
            if u < prob {
                return x;
            }
        }
    }

    /// Sample a vector of Gaussian values
    pub fn sample_vec(&mut self, len: usize) -> Vec<i64> {
        (0..len).map(|_| self.sample()).collect()
    }

    /// Uniform sample from {-1, 0, 1}
    pub fn sample_ternary(&mut self) -> i64 {
        self.rng.gen_range(-1..=1)
    }

    /// Sample a vector of ternary values
    pub fn sample_ternary_vec(&mut self, len: usize) -> Vec<i64> {
        (0..len).map(|_| self.sample_ternary()).collect()
    }

    /// Uniform sample from [0, q)
    pub fn sample_uniform(&mut self, q: u64) -> u64 {
        self.rng.gen_range(0..q)
    }

    /// Fill a buffer with uniform random bytes
    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill(dest);
    }
}

/// Tail bound used by the sampler for a given σ
pub fn tailcut_bound(sigma: f64) -> u64 {
    (sigma * TAILCUT_SIGMAS).ceil() as u64
}

impl std::fmt::Debug for GaussianSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaussianSampler")
            .field("sigma", &self.sigma)
            .field("tailcut", &self.tailcut)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_samples_within_tailcut() {
        let mut sampler = GaussianSampler::with_seed(DEFAULT_SIGMA, 7);
        let bound = tailcut_bound(DEFAULT_SIGMA) as i64;
        assert_eq!(bound, 20);

        for _ in 0..2000 {
            let s = sampler.sample();
            assert!(s.abs() <= bound, "sample {s} exceeds tailcut {bound}");
        }
    }

    #[test]
    fn test_deterministic_seeding() {
        let mut sampler1 = GaussianSampler::with_seed(DEFAULT_SIGMA, 12345);
        let mut sampler2 = GaussianSampler::with_seed(DEFAULT_SIGMA, 12345);

        for _ in 0..100 {
            assert_eq!(sampler1.sample(), sampler2.sample());
        }
    }

    #[test]
    fn test_fork_streams_diverge() {
        let mut parent = GaussianSampler::with_seed(DEFAULT_SIGMA, 1);
        let mut a = parent.fork();
        let mut b = parent.fork();

        let xs: Vec<u64> = (0..32).map(|_| a.sample_uniform(1 << 30)).collect();
        let ys: Vec<u64> = (0..32).map(|_| b.sample_uniform(1 << 30)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_distribution_shape() {
        let mut sampler = GaussianSampler::with_seed(DEFAULT_SIGMA, 99);
        let samples = sampler.sample_vec(20_000);

        let mean = samples.iter().sum::<i64>() as f64 / samples.len() as f64;
        let var = samples
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / samples.len() as f64;

        assert!(mean.abs() < 0.2, "mean {mean}");
        assert!((var.sqrt() - DEFAULT_SIGMA).abs() < 0.3, "stddev {}", var.sqrt());
    }

    #[test]
    fn test_ternary_support() {
        let mut sampler = GaussianSampler::with_seed(DEFAULT_SIGMA, 3);
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for s in sampler.sample_ternary_vec(3000) {
            *counts.entry(s).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        assert!(counts.keys().all(|k| (-1..=1).contains(k)));
        assert!(counts.values().all(|&c| c > 800));
    }
}
