//! Residual contract between physical models and solvers
//!
//! This module defines the core API every model exposes to a solver:
//! - `DaeModel`: trait for implicit models `F(t, y, dy/dt) = 0`
//! - `EquationKind`: differential / algebraic classification of each unknown
//!
//! The model provides the "physics" (residuals), the solver provides the
//! "numerics" (how to drive them to zero over time).

use nalgebra::DVector;
use num_dual::Dual64;

use crate::error::ModelResult;

// =================================================================================================
// Equation classification
// =================================================================================================

/// Classification of an unknown inside the DAE system
///
/// Residual `i` is paired with unknown `i`. An unknown is `Differential` when
/// its own time derivative appears in the system (particle and electrolyte
/// concentrations); otherwise it is `Algebraic` (potentials, averages,
/// currents). Initialization solves for `dy/dt` of differential unknowns and
/// for the value of algebraic ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquationKind {
    Differential,
    Algebraic,
}

impl EquationKind {
    pub fn is_differential(self) -> bool {
        matches!(self, EquationKind::Differential)
    }
}

// ==================================================================================================
// DAE Model Trait
// =================================================================================================

/// Trait for implicit differential-algebraic models
///
/// # Responsibility
/// Evaluates the residual `F(t, y, dy/dt)` of a system at a given state.
/// Does NOT solve it (that's the Solver's job).
///
/// # Contract
///
/// - `residual` and `residual_dual` evaluate the same formulas, the second on
///   dual numbers so the solver can build `dF/dy + alpha dF/d(dy/dt)` one
///   column at a time.
/// - The returned vector has length [`unknowns()`](DaeModel::unknowns).
/// - Evaluation is pure: no state is mutated between calls, so a model can be
///   shared across threads.
pub trait DaeModel: Send + Sync {
    /// Number of unknowns (and residuals)
    fn unknowns(&self) -> usize;

    /// Differential/algebraic flag for every unknown, in index order
    fn equation_kinds(&self) -> &[EquationKind];

    /// Stable hierarchical name of every unknown, in index order
    fn variable_names(&self) -> &[String];

    /// Initial values: conditions for differential unknowns, guesses for
    /// algebraic ones
    fn initial_values(&self) -> DVector<f64>;

    /// Residual on plain floats
    fn residual(&self, t: f64, y: &[f64], ydot: &[f64]) -> ModelResult<DVector<f64>>;

    /// Residual on dual numbers (values plus one directional derivative)
    fn residual_dual(&self, t: f64, y: &[Dual64], ydot: &[Dual64]) -> ModelResult<Vec<Dual64>>;

    /// Natural end time of the process, if the model defines one
    fn time_horizon(&self) -> Option<f64> {
        None
    }

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (option)
    fn description(&self) -> Option<&str> {
        None
    }
}

// =================================================================================================
// Tests
// =================================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    /// dy/dt = -y with an algebraic mirror z = 2y
    struct Decay {
        kinds: Vec<EquationKind>,
        names: Vec<String>,
    }

    impl Decay {
        fn new() -> Self {
            Self {
                kinds: vec![EquationKind::Differential, EquationKind::Algebraic],
                names: vec!["y".into(), "z".into()],
            }
        }

        fn check(&self, len: usize) -> ModelResult<()> {
            if len != 2 {
                return Err(ModelError::StateLength { expected: 2, actual: len });
            }
            Ok(())
        }
    }

    impl DaeModel for Decay {
        fn unknowns(&self) -> usize {
            2
        }

        fn equation_kinds(&self) -> &[EquationKind] {
            &self.kinds
        }

        fn variable_names(&self) -> &[String] {
            &self.names
        }

        fn initial_values(&self) -> DVector<f64> {
            DVector::from_vec(vec![1.0, 0.0])
        }

        fn residual(&self, _t: f64, y: &[f64], ydot: &[f64]) -> ModelResult<DVector<f64>> {
            self.check(y.len())?;
            Ok(DVector::from_vec(vec![ydot[0] + y[0], y[1] - 2.0 * y[0]]))
        }

        fn residual_dual(&self, _t: f64, y: &[Dual64], ydot: &[Dual64]) -> ModelResult<Vec<Dual64>> {
            self.check(y.len())?;
            Ok(vec![ydot[0] + y[0], y[1] - y[0] * 2.0])
        }

        fn name(&self) -> &str {
            "Decay"
        }
    }

    #[test]
    fn test_kind_flags() {
        assert!(EquationKind::Differential.is_differential());
        assert!(!EquationKind::Algebraic.is_differential());
    }

    #[test]
    fn test_float_and_dual_residuals_agree() {
        let model = Decay::new();
        let y = [0.7, 1.1];
        let ydot = [-0.3, 0.0];
        let plain = model.residual(0.0, &y, &ydot).unwrap();

        let y_dual: Vec<Dual64> = y.iter().map(|&v| Dual64::from_re(v)).collect();
        let ydot_dual: Vec<Dual64> = ydot.iter().map(|&v| Dual64::from_re(v)).collect();
        let dual = model.residual_dual(0.0, &y_dual, &ydot_dual).unwrap();

        for (a, b) in plain.iter().zip(dual.iter()) {
            assert_eq!(*a, b.re);
        }
    }

    #[test]
    fn test_length_mismatch_is_reported() {
        let model = Decay::new();
        let err = model.residual(0.0, &[1.0], &[0.0]).unwrap_err();
        assert!(matches!(err, ModelError::StateLength { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_default_hooks() {
        let model = Decay::new();
        assert!(model.time_horizon().is_none());
        assert!(model.description().is_none());
        assert_eq!(model.variable_names().len(), model.unknowns());
    }
}
