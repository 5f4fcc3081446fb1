//! Output module for simulation results
//!
//! Results are handed out as a [`SimulationResult`](crate::solver::SimulationResult)
//! whose columns are addressed by hierarchical unknown names. This module
//! writes them to files for external analysis.
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file
//! └── export/             ← Data export
//!     ├── mod.rs          ← Exporter trait
//!     └── csv.rs
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use intercal_rs::output::export::{CsvExporter, Exporter};
//!
//! CsvExporter::default().export(&result, Some(&["cell.phi_applied"]), None, "voltage.csv")?;
//! ```

pub mod export;

pub use export::{CsvConfig, CsvExporter, CsvMetadata, Exporter};
