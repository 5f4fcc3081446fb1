//! Particle population
//!
//! - [`sampler`]: lognormal size draw and node-count derivation
//! - [`geometry`]: area and volume from length and shape

pub mod geometry;
pub mod sampler;

pub use geometry::ParticleGeometry;
pub use sampler::{Discretization, discretize, lognormal_parameters, sample_lengths};
