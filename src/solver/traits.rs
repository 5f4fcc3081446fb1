//! Numerical solver traits and types
//!
//! # Design Philosophy
//!
//! - Central enum [`SolverType`] defines the kind of solution requested
//! - [`SolverConfiguration`] carries it together with the Newton and step
//!   controls every implicit method needs
//! - [`SimulationResult`] holds the trajectory, keyed by the model's unknown
//!   names, plus a [`RunStatus`] and free-form metadata
//!
//! A run that stops early is still a result: the trajectory up to the last
//! accepted report time is returned with [`RunStatus::Failed`]. Only problems
//! detected before integration starts are errors.

use std::collections::HashMap;

use nalgebra::DVector;

use crate::error::SolverError;
use crate::physics::StateSnapshot;
use crate::solver::Scenario;

// =================================================================================================
// Solver type
// =================================================================================================

/// Type of numerical solution
#[derive(Clone, Debug, PartialEq)]
pub enum SolverType {
    /// Integrate in time and report the state at evenly spaced times
    ///
    /// `total_time: None` runs to the model's own time horizon.
    TimeEvolution { total_time: Option<f64>, report_steps: usize },

    /// Only make the initial state consistent (algebraic unknowns and
    /// initial rates)
    ConsistentInitialization,
}

impl SolverType {
    /// Get name identifier
    pub fn name(&self) -> &str {
        match self {
            SolverType::TimeEvolution { .. } => "TimeEvolution",
            SolverType::ConsistentInitialization => "ConsistentInitialization",
        }
    }

    /// Validate that parameters are meaningful
    pub fn validate(&self) -> Result<(), SolverError> {
        match self {
            SolverType::TimeEvolution { total_time, report_steps } => {
                if let Some(t) = total_time
                    && !(*t > 0.0 && t.is_finite())
                {
                    return Err(SolverError::Configuration("total time must be positive and finite".into()));
                }
                if *report_steps == 0 {
                    return Err(SolverError::Configuration("report steps must be greater than 0".into()));
                }
                Ok(())
            }
            SolverType::ConsistentInitialization => Ok(()),
        }
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration for a numerical solver
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfiguration {
    /// Type of solution and its parameters
    pub solver_type: SolverType,

    /// Newton convergence tolerance (max-norm of the scaled update)
    pub tolerance: f64,

    /// Newton iterations per step before the step is rejected
    pub max_iterations: usize,

    /// First step size; defaults to a tenth of the report interval
    pub initial_dt: Option<f64>,

    /// Smallest step before the run is declared failed
    pub min_dt: f64,

    /// Largest step; defaults to the report interval
    pub max_dt: Option<f64>,
}

impl SolverConfiguration {
    /// Create a configuration with default Newton and step controls
    pub fn new(solver_type: SolverType) -> Self {
        Self { solver_type, tolerance: 1e-9, max_iterations: 12, initial_dt: None, min_dt: 1e-12, max_dt: None }
    }

    /// Integrate to a fixed dimensionless time
    pub fn time_evolution(total_time: f64, report_steps: usize) -> Self {
        Self::new(SolverType::TimeEvolution { total_time: Some(total_time), report_steps })
    }

    /// Integrate to the model's natural time horizon
    pub fn to_horizon(report_steps: usize) -> Self {
        Self::new(SolverType::TimeEvolution { total_time: None, report_steps })
    }

    /// Only compute a consistent initial state
    pub fn consistent_initialization() -> Self {
        Self::new(SolverType::ConsistentInitialization)
    }

    pub fn with_tolerance(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.tolerance = tolerance;
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_steps(mut self, initial_dt: Option<f64>, min_dt: f64, max_dt: Option<f64>) -> Self {
        self.initial_dt = initial_dt;
        self.min_dt = min_dt;
        self.max_dt = max_dt;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SolverError> {
        self.solver_type.validate()?;
        if !(self.tolerance > 0.0) {
            return Err(SolverError::Configuration("tolerance must be positive".into()));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::Configuration("maximum iterations must be positive".into()));
        }
        if !(self.min_dt > 0.0) {
            return Err(SolverError::Configuration("minimum step must be positive".into()));
        }
        for (name, dt) in [("initial", self.initial_dt), ("maximum", self.max_dt)] {
            if let Some(dt) = dt
                && dt < self.min_dt
            {
                return Err(SolverError::Configuration(format!("{name} step {dt} is below the minimum step")));
            }
        }
        Ok(())
    }
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// How a run ended
#[derive(Clone, Debug, PartialEq)]
pub enum RunStatus {
    Completed,
    /// The integration could not proceed past `time`
    Failed { time: f64, reason: String },
}

/// Trajectory of a simulation
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Report times (dimensionless)
    pub time_points: Vec<f64>,

    /// State at every report time
    pub trajectory: Vec<DVector<f64>>,

    /// Last accepted state
    pub final_state: DVector<f64>,

    /// Unknown names, in state-vector order
    pub variable_names: Vec<String>,

    pub status: RunStatus,

    /// Solver diagnostics
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    pub fn new(
        time_points: Vec<f64>,
        trajectory: Vec<DVector<f64>>,
        final_state: DVector<f64>,
        variable_names: Vec<String>,
    ) -> Self {
        Self {
            time_points,
            trajectory,
            final_state,
            variable_names,
            status: RunStatus::Completed,
            metadata: HashMap::new(),
        }
    }

    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }

    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Number of stored time points
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variable_names.iter().position(|n| n == name)
    }

    /// Named view of the state at report `i`
    pub fn snapshot(&self, i: usize) -> Option<StateSnapshot> {
        let state = self.trajectory.get(i)?;
        Some(StateSnapshot::new(self.time_points[i], self.variable_names.clone(), state.iter().copied().collect()))
    }

    /// Time series of one named unknown
    pub fn series(&self, name: &str) -> Option<Vec<f64>> {
        let k = self.index_of(name)?;
        Some(self.trajectory.iter().map(|state| state[k]).collect())
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// Numerical method applied to a scenario
pub trait Solver {
    /// Run the method
    ///
    /// Returns `Err` only when the configuration or the scenario is invalid.
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult, SolverError>;

    fn name(&self) -> &'static str;
}
