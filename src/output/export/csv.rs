//! CSV export of simulation results
//!
//! Writes the trajectory of a [`SimulationResult`] to CSV (Comma-Separated
//! Values), readable by pandas, MATLAB and spreadsheets.
//!
//! # Features
//!
//! - **Named columns**: one column per exported unknown, headed by its
//!   hierarchical name (`trode.vol0.part1.c3`, `cell.phi_applied`, ...)
//! - **Variable selection**: all unknowns, or an explicit list
//! - **Downsampling**: optional uniform reduction to `n` rows, keeping the
//!   first and last report
//! - **Metadata support**: optional `#` header with model, solver and run
//!   status
//! - **Validation**: unknown names and non-finite values are errors
//!
//! # Quick Example
//!
//! ```rust,ignore
//! use intercal_rs::output::export::{CsvConfig, CsvExporter, CsvMetadata, Exporter};
//!
//! let config = CsvConfig::default().with_metadata(CsvMetadata::from_result(&result, "cell"));
//! CsvExporter::new(config).export(&result, Some(&["cell.ffrac", "cell.phi_applied"]), None, "discharge.csv")?;
//! ```
//!
//! **Output** (`discharge.csv`):
//! ```csv
//! # Intercalation Simulation Data
//! # Generated: 2026-02-11T15:30:00+00:00
//! # Model: cell
//! # Solver: Backward Euler
//! # Status: completed
//! #
//! t,cell.ffrac,cell.phi_applied
//! 0.000000,0.010000,-4.595120
//! ...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ExportError;
use crate::output::export::Exporter;
use crate::solver::{RunStatus, SimulationResult};

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Example
///
/// ```rust,ignore
/// let config = CsvConfig {
///     delimiter: ';',
///     precision: 10,
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Number of decimal places for floating-point values (default: 6)
    pub precision: usize,

    /// Metadata written as header comments, if any
    pub metadata: Option<CsvMetadata>,

    /// Header of the time column (default: "t")
    pub time_header: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self { delimiter: ',', decimal_separator: '.', precision: 6, metadata: None, time_header: "t".to_string() }
    }
}

impl CsvConfig {
    /// European CSV format (semicolon, comma for decimal)
    pub fn european() -> Self {
        Self { delimiter: ';', decimal_separator: ',', ..Default::default() }
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Metadata for CSV header comments
///
/// Only fields that are set are written.
#[derive(Clone, Debug, Default)]
pub struct CsvMetadata {
    pub model_name: Option<String>,
    pub solver_name: Option<String>,
    pub status: Option<String>,
    /// Additional key/value lines
    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Collect metadata from a result and the name of the model that produced it
    pub fn from_result(result: &SimulationResult, model: &str) -> Self {
        let status = match &result.status {
            RunStatus::Completed => "completed".to_string(),
            RunStatus::Failed { time, reason } => format!("failed at t = {time} ({reason})"),
        };
        let mut custom: Vec<(String, String)> =
            result.metadata.iter().filter(|(k, _)| k.as_str() != "solver").map(|(k, v)| (k.clone(), v.clone())).collect();
        custom.sort();
        Self {
            model_name: Some(model.to_string()),
            solver_name: result.metadata.get("solver").cloned(),
            status: Some(status),
            custom,
        }
    }

    /// Add custom parameter
    pub fn add_custom(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.push((key.into(), value.into()));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn write_metadata_header(out: &mut impl Write, metadata: &CsvMetadata) -> Result<(), ExportError> {
    writeln!(out, "# Intercalation Simulation Data")?;
    writeln!(out, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;

    if let Some(model) = &metadata.model_name {
        writeln!(out, "# Model: {model}")?;
    }
    if let Some(solver) = &metadata.solver_name {
        writeln!(out, "# Solver: {solver}")?;
    }
    if let Some(status) = &metadata.status {
        writeln!(out, "# Status: {status}")?;
    }
    for (key, value) in &metadata.custom {
        writeln!(out, "# {key}: {value}")?;
    }
    writeln!(out, "#")?;
    Ok(())
}

/// Format number with configured precision and decimal separator
fn format_number(value: f64, config: &CsvConfig) -> String {
    let formatted = format!("{:.prec$}", value, prec = config.precision);
    if config.decimal_separator != '.' {
        formatted.replace('.', &config.decimal_separator.to_string())
    } else {
        formatted
    }
}

/// Row indices of a uniform downsampling to `n` rows, first and last included
pub(crate) fn sample_rows(len: usize, n_points: Option<usize>) -> Vec<usize> {
    match n_points {
        Some(n) if n >= 2 && n < len => {
            let mut rows: Vec<usize> =
                (0..n).map(|k| ((k as f64) * (len - 1) as f64 / (n - 1) as f64).round() as usize).collect();
            rows.dedup();
            rows
        }
        Some(1) if len > 0 => vec![len - 1],
        _ => (0..len).collect(),
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// CSV implementation of [`Exporter`]
#[derive(Clone, Debug, Default)]
pub struct CsvExporter {
    pub config: CsvConfig,
}

impl CsvExporter {
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Write to any sink
    pub fn write_to(
        &self,
        out: &mut impl Write,
        result: &SimulationResult,
        variables: Option<&[&str]>,
        n_points: Option<usize>,
    ) -> Result<(), ExportError> {
        // ============================= Validation =============================

        if result.is_empty() {
            return Err(ExportError::Empty);
        }

        let columns: Vec<(usize, &str)> = match variables {
            Some(names) => names
                .iter()
                .map(|&name| result.index_of(name).map(|k| (k, name)).ok_or_else(|| ExportError::UnknownVariable(name.into())))
                .collect::<Result<_, _>>()?,
            None => result.variable_names.iter().enumerate().map(|(k, n)| (k, n.as_str())).collect(),
        };

        let rows = sample_rows(result.len(), n_points);
        for &row in &rows {
            let time = result.time_points[row];
            if let Some(&(_, name)) = columns.iter().find(|&&(k, _)| !result.trajectory[row][k].is_finite()) {
                return Err(ExportError::NonFinite { variable: name.to_string(), time });
            }
        }

        let config = &self.config;

        // ============================= Write Metadata =========================

        if let Some(metadata) = &config.metadata {
            write_metadata_header(out, metadata)?;
        }

        // ============================= Write Header ===========================

        write!(out, "{}", config.time_header)?;
        for (_, name) in &columns {
            write!(out, "{}{}", config.delimiter, name)?;
        }
        writeln!(out)?;

        // ============================= Write Data =============================

        for row in rows {
            write!(out, "{}", format_number(result.time_points[row], config))?;
            let state = &result.trajectory[row];
            for &(k, _) in &columns {
                write!(out, "{}{}", config.delimiter, format_number(state[k], config))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl Exporter for CsvExporter {
    type Error = ExportError;

    fn export(
        &self,
        result: &SimulationResult,
        variables: Option<&[&str]>,
        n_points: Option<usize>,
        path: impl AsRef<Path>,
    ) -> Result<(), Self::Error> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out, result, variables, n_points)?;
        out.flush()?;
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
