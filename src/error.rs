//! Error types
//!
//! Three families of failure exist in a simulation run, and each has its own
//! enum:
//!
//! - [`ConfigError`]: the parameter set cannot describe a valid cell. Raised
//!   before a single residual is evaluated.
//! - [`ModelError`]: a residual evaluation was asked for something the
//!   formulation cannot provide (state of the wrong length, open-circuit
//!   lookup outside its tabulated domain).
//! - [`SolverError`]: the solver was handed an invalid configuration or
//!   scenario.
//!
//! A fourth enum, [`ExportError`], covers writing results to disk.
//!
//! Non-convergence of the time integration is deliberately *not* an error:
//! the solver returns the partial trajectory together with a failure status
//! (see [`RunStatus`](crate::solver::RunStatus)).

use thiserror::Error;

/// Configuration errors, raised while building a model
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parameter '{name}' = {value} is invalid: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("solid scheme '{scheme}' is incompatible with particle shape '{shape}'")]
    IncompatibleShape { scheme: String, shape: String },

    #[error("{feature} requires the '{required}' solid scheme, got '{actual}'")]
    IncompatibleScheme {
        feature: &'static str,
        required: &'static str,
        actual: String,
    },

    #[error("{model} is only parameterized at T = {reference} K (got T_abs = {t_abs} K, T_ref = {t_ref} K)")]
    TemperatureOutOfRange {
        model: &'static str,
        reference: f64,
        t_abs: f64,
        t_ref: f64,
    },

    #[error("unknown {kind} model '{name}'")]
    UnknownModel { kind: &'static str, name: String },

    #[error("'{name}' has {actual} per-slot entries, expected {expected}")]
    SlotCount {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("particle ({volume}, {slot}) of length {length:e} m gives {nodes} radial nodes, at least 2 are required")]
    TooFewNodes {
        volume: usize,
        slot: usize,
        length: f64,
        nodes: usize,
    },

    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Errors raised during a residual evaluation
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("state length mismatch: expected {expected} unknowns, got {actual}")]
    StateLength { expected: usize, actual: usize },

    #[error("open-circuit fit '{fit}' evaluated at {value} outside its domain [{lower}, {upper}]")]
    OutOfDomain {
        fit: String,
        value: f64,
        lower: f64,
        upper: f64,
    },
}

/// Errors raised by a solver before or outside the time integration
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid solver configuration: {0}")]
    Configuration(String),

    #[error("invalid scenario: {0}")]
    Scenario(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors raised while exporting a simulation result
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("result contains no time points")]
    Empty,

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("non-finite value of '{variable}' at t = {time}")]
    NonFinite { variable: String, time: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias for configuration-time operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for residual evaluations
pub type ModelResult<T> = Result<T, ModelError>;
