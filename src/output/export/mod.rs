//! Export module for simulation results.
//!
//! # Architecture
//!
//! This module defines the [`Exporter`] trait that abstracts the export format.
//! Each format is an independent implementation in its own sub-module, so
//! adding a format means adding a file.
//!
//! # Available formats
//!
//! | Format  | Module          |
//! |---------|-----------------|
//! | CSV     | [`csv`]         |
//!
//! # Usage example
//!
//! ```rust,ignore
//! use intercal_rs::output::export::{CsvExporter, Exporter};
//!
//! let exporter = CsvExporter::default();
//!
//! // Every unknown, every report
//! exporter.export(&result, None, None, "run.csv")?;
//!
//! // Voltage curve only, downsampled to 200 rows
//! exporter.export(&result, Some(&["cell.ffrac", "cell.phi_applied"]), Some(200), "voltage.csv")?;
//! ```

pub mod csv;

pub use csv::{CsvConfig, CsvExporter, CsvMetadata};

use std::path::Path;

use crate::solver::SimulationResult;

/// Abstraction trait for all export formats.
///
/// # Associated type `Error`
///
/// Each format manages its own errors via the associated type, so the caller
/// can react precisely without boxing.
///
/// # Parameters
///
/// - `variables`: `None` exports every unknown in state-vector order,
///   `Some(names)` exports the named unknowns in the given order
/// - `n_points`: `None` exports every report, `Some(n)` uniformly
///   downsamples to `n` rows, always keeping the first and last
pub trait Exporter {
    /// Error type specific to this export format.
    type Error: std::error::Error;

    /// Export a result to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `result` contains no data
    /// - a requested variable does not exist
    /// - an exported value is not finite
    /// - the file cannot be written
    fn export(
        &self,
        result: &SimulationResult,
        variables: Option<&[&str]>,
        n_points: Option<usize>,
        path: impl AsRef<Path>,
    ) -> Result<(), Self::Error>;
}
