//! Particle size sampling
//!
//! Sizes are drawn once per simulation, before any residual is built. The
//! draw is lognormal with parameters chosen so that the *linear-domain* mean
//! and standard deviation equal the requested values:
//!
//! ```text
//! mu    = ln( mean^2 / sqrt(var + mean^2) )
//! sigma = sqrt( ln(var / mean^2 + 1) )
//! ```
//!
//! A zero standard deviation short-circuits to a uniform population without
//! touching the random generator. With a fixed seed the draw is reproducible;
//! slots are filled volume by volume, slot by slot.

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, LogNormal};

use crate::error::{ConfigError, ConfigResult};
use crate::params::{SizeDistribution, SolidScheme};

/// Lognormal `(mu, sigma)` matching a linear-domain mean and standard deviation
pub fn lognormal_parameters(mean: f64, stddev: f64) -> (f64, f64) {
    let var = stddev * stddev;
    let mu = (mean * mean / (var + mean * mean).sqrt()).ln();
    let sigma = (var / (mean * mean) + 1.0).ln().sqrt();
    (mu, sigma)
}

/// Draw raw particle lengths, one row per control volume, one column per slot
pub fn sample_lengths(dist: &SizeDistribution, n_volumes: usize, n_slots: usize) -> ConfigResult<DMatrix<f64>> {
    if dist.stddev == 0.0 {
        return Ok(DMatrix::from_element(n_volumes, n_slots, dist.mean));
    }

    let (mu, sigma) = lognormal_parameters(dist.mean, dist.stddev);
    let lognormal = LogNormal::new(mu, sigma)
        .map_err(|e| ConfigError::Invalid(format!("particle size distribution: {e}")))?;
    let mut rng = StdRng::seed_from_u64(dist.seed);

    let mut lengths = DMatrix::zeros(n_volumes, n_slots);
    for i in 0..n_volumes {
        for j in 0..n_slots {
            lengths[(i, j)] = lognormal.sample(&mut rng);
        }
    }
    Ok(lengths)
}

/// Internal resolution of one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discretization {
    /// Number of nodes
    pub nodes: usize,
    /// Effective particle length \[m\]
    pub length: f64,
}

/// Derive node count and effective length from a raw length
///
/// Structured schemes snap the length up to a whole number of nodes with the
/// given spacing; homogeneous schemes keep the raw length on a single node.
pub fn discretize(raw_length: f64, spacing: f64, scheme: SolidScheme) -> Discretization {
    if scheme.is_structured() {
        // lengths that are an exact multiple of the spacing must not gain a
        // node from round-off
        let nodes = ((raw_length / spacing - 1e-9).ceil() as usize).max(1);
        Discretization { nodes, length: spacing * nodes as f64 }
    } else {
        Discretization { nodes: 1, length: raw_length }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn distribution(mean: f64, stddev: f64, seed: u64) -> SizeDistribution {
        SizeDistribution { mean, stddev, seed, ..Default::default() }
    }

    #[test]
    fn test_zero_stddev_is_uniform() {
        let lengths = sample_lengths(&distribution(150e-9, 0.0, 7), 3, 4).unwrap();
        assert_eq!(lengths.shape(), (3, 4));
        assert!(lengths.iter().all(|&l| l == 150e-9));
    }

    #[test]
    fn test_same_seed_same_draw() {
        let a = sample_lengths(&distribution(100e-9, 20e-9, 42), 4, 3).unwrap();
        let b = sample_lengths(&distribution(100e-9, 20e-9, 42), 4, 3).unwrap();
        let c = sample_lengths(&distribution(100e-9, 20e-9, 43), 4, 3).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_lognormal_parameters_roundtrip_moments() {
        let (mu, sigma) = lognormal_parameters(2.0, 0.5);
        let mean = (mu + sigma * sigma / 2.0).exp();
        let var = ((sigma * sigma).exp() - 1.0) * (2.0 * mu + sigma * sigma).exp();
        assert_relative_eq!(mean, 2.0, epsilon = 1e-12);
        assert_relative_eq!(var.sqrt(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_moments_converge() {
        let lengths = sample_lengths(&distribution(1.0, 0.25, 2024), 200, 100).unwrap();
        let n = lengths.len() as f64;
        let mean = lengths.iter().sum::<f64>() / n;
        let var = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / (n - 1.0);

        assert_relative_eq!(mean, 1.0, max_relative = 0.01);
        assert_relative_eq!(var.sqrt(), 0.25, max_relative = 0.03);
    }

    #[test]
    fn test_structured_discretization_rounds_up() {
        let d = discretize(95e-9, 10e-9, SolidScheme::ReactionLimited);
        assert_eq!(d.nodes, 10);
        assert_relative_eq!(d.length, 100e-9, epsilon = 1e-20);

        let d = discretize(100e-9, 10e-9, SolidScheme::RadialDiffusion);
        assert_eq!(d.nodes, 10);
    }

    #[test]
    fn test_homogeneous_discretization_keeps_length() {
        let d = discretize(95e-9, 10e-9, SolidScheme::Homogeneous);
        assert_eq!(d.nodes, 1);
        assert_eq!(d.length, 95e-9);
    }
}
