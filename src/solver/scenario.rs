//! Simulation scenario definition
//!
//! A scenario combines a DAE model with the state it starts from.
use nalgebra::DVector;

use crate::error::SolverError;
use crate::physics::DaeModel;

/// Simulation scenario
///
/// Defines a specific case to simulate:
/// - DAE model (residuals, unknown names and kinds)
/// - Initial state (conditions for differential unknowns, guesses for
///   algebraic ones)
///
/// # Design
///
/// The same scenario can be solved with different configurations.
/// This is the "WHAT to solve" (not "HOW to solve").
///
/// # Examples
///
/// ```rust,ignore
/// let model = CellModel::new(&params)?;
/// let scenario = Scenario::new(Box::new(model));
///
/// let result = BackwardEulerSolver::new().solve(&scenario, &SolverConfiguration::to_horizon(100))?;
/// ```
pub struct Scenario {
    /// Model (equations)
    pub model: Box<dyn DaeModel>,

    /// Starting state
    pub initial: DVector<f64>,
}

impl Scenario {
    /// Create a scenario starting from the model's own initial values
    pub fn new(model: Box<dyn DaeModel>) -> Self {
        let initial = model.initial_values();
        Self { model, initial }
    }

    /// Replace the starting state
    pub fn with_initial(mut self, initial: DVector<f64>) -> Self {
        self.initial = initial;
        self
    }

    /// Verifying scenario content
    pub fn validate(&self) -> Result<(), SolverError> {
        let expected = self.model.unknowns();
        if self.initial.len() != expected {
            return Err(SolverError::Scenario(format!(
                "initial state has {} entries, model '{}' has {} unknowns",
                self.initial.len(),
                self.model.name(),
                expected
            )));
        }
        if self.model.equation_kinds().len() != expected || self.model.variable_names().len() != expected {
            return Err(SolverError::Scenario(format!("model '{}' has an inconsistent layout", self.model.name())));
        }
        if let Some(k) = self.initial.iter().position(|v| !v.is_finite()) {
            return Err(SolverError::Scenario(format!(
                "initial value of '{}' is not finite",
                self.model.variable_names()[k]
            )));
        }
        Ok(())
    }

    /// Get model name
    pub fn get_model_name(&self) -> &str {
        self.model.name()
    }

    /// Number of unknowns
    pub fn unknowns(&self) -> usize {
        self.model.unknowns()
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.get_model_name())
            .field("unknowns", &self.unknowns())
            .field("time horizon", &self.model.time_horizon())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
