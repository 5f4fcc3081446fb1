//! Common utilities for integration tests

#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use fixtures::{cell_at_rest, radial_cell, single_particle_cell};
pub use mock_models::ExponentialDecay;
pub use test_helpers::{assert_monotone_increasing, build_scenario, run, run_to_horizon};
