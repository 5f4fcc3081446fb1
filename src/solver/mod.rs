//! Numerical solvers
//!
//! This module provides the solver side of the residual contract: a
//! [`Scenario`] says WHAT to solve (a [`DaeModel`](crate::physics::DaeModel)
//! and its starting state), a [`SolverConfiguration`] says HOW, and a
//! [`Solver`] implementation does it.
//!
//! # Core Concepts
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - DAE model (residuals, unknown names, differential/algebraic kinds)
//!    - Initial state
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - Solver type (time evolution or consistent initialization only)
//!    - Newton tolerance and iteration limit
//!    - Step-size bounds
//!
//! 3. **Solver** (`Solver` trait) - The numerical method
//!    - Applies the numerical scheme
//!    - Returns a [`SimulationResult`], partial with [`RunStatus::Failed`]
//!      when the integration cannot proceed
//!
//! # Module Organization
//!
//! - **`traits`**: `Solver`, `SolverType`, `SolverConfiguration`,
//!   `SimulationResult`, `RunStatus`
//! - **`scenario`**: `Scenario` and its validation
//! - **`newton`**: damped Newton iteration and dual-number Jacobians
//! - **`initial`**: consistent initialization of algebraic unknowns and rates
//! - **`methods`**: `BackwardEulerSolver`
//!
//! # Quick Start Example
//!
//! ```rust,ignore
//! use intercal_rs::models::CellModel;
//! use intercal_rs::params::ParameterSet;
//! use intercal_rs::solver::{BackwardEulerSolver, Scenario, Solver, SolverConfiguration};
//!
//! let params = ParameterSet::from_toml_str(&std::fs::read_to_string("cell.toml")?)?;
//! let scenario = Scenario::new(Box::new(CellModel::new(&params)?));
//!
//! // run to the end of the programmed (dis)charge, 100 reports
//! let result = BackwardEulerSolver::new().solve(&scenario, &SolverConfiguration::to_horizon(100))?;
//!
//! println!("{:?}", result.status);
//! println!("{:?}", result.series("cell.phi_applied"));
//! ```
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │  Parameter set  │
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Cell model    │  (residuals)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ Scenario        │ ← WHAT to solve
//! │ (model + y0)    │
//! └────────┬────────┘
//!          │
//! ┌────────▼─────────────┐
//! │ Solver Configuration │ ← HOW to solve
//! └────────┬─────────────┘
//!          │
//! ┌────────▼────────┐
//! │ Numerical Solver│ ← The method
//! └────────┬────────┘
//!          │
//! ┌────────▼────────────┐
//! │ Simulation Result   │ ← The solution
//! │ (trajectory + meta) │
//! └─────────────────────┘
//! ```

// =================================================================================================
// Module Declarations
// =================================================================================================
mod initial;
mod methods;
mod newton;
mod scenario;
mod traits;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================
//
// Deciding *when* to hand work off to Rayon is a numerical-execution concern,
// not a physics concern, so it lives here rather than in the models.
//
// The threshold is stored in an AtomicUsize so that it can be changed at
// runtime (useful in benchmarks and tests) without a mutex on every residual
// evaluation.  Relaxed ordering is sufficient: the value is a performance
// hint, not a synchronisation point.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of work items above which particle residuals and Jacobian
/// columns are computed in parallel.
///
/// Each item is a full particle residual or a full dual-number residual
/// evaluation, far heavier than an element-wise update, so the crossover
/// sits at a few dozen items.
const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Runtime-configurable parallel-execution threshold.
///
/// Read via [`parallel_threshold()`], written via [`set_parallel_threshold()`].
static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Return the current parallel-execution threshold.
///
/// Residual assembly and Jacobian construction iterate sequentially over
/// fewer items than this value and switch to Rayon otherwise, but only when
/// the crate is compiled with the `parallel` feature.
///
/// # Example
///
/// ```rust
/// use intercal_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-execution threshold to a new value.
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// # Example
///
/// ```rust
/// use intercal_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(2048);
/// assert_eq!(parallel_threshold(), 2048);
///
/// // Restore so other tests are not affected.
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// RAII guard that saves the current threshold on construction and restores
/// it on drop.
///
/// Only compiled in test builds.  Prevents one test from leaking a modified
/// threshold value into the next.
///
/// ```rust,ignore
/// let _guard = crate::solver::ThresholdGuard::save(50);
/// // threshold is now 50 …
/// // … and is automatically restored when _guard is dropped.
/// ```
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    /// Set the threshold to `new_value` and return a guard that will
    /// restore the previous value on drop.
    pub(crate) fn save(new_value: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        // Bypass the public setter so that restoring to any value (including
        // the original default) never panics.
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{RunStatus, SimulationResult, Solver, SolverConfiguration, SolverType};

pub use scenario::Scenario;

pub use methods::BackwardEulerSolver;

// =================================================================================================
// Tests
// =================================================================================================
