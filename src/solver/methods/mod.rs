//! Numerical methods for solving DAE systems
//!
//! This module contains concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Architecture
//!
//! The separation between the abstract solver interface (`solver::traits`) and
//! concrete implementations (`solver::methods`) keeps the residual contract
//! stable: a new method only needs `DaeModel::residual` and
//! `DaeModel::residual_dual`.
//!
//! # Available Methods
//!
//! - **[`BackwardEulerSolver`]**: adaptive implicit Euler
//!   - Order: First-order O(dt)
//!   - Cost: one dense Jacobian + LU per Newton iteration
//!   - Use: reference integration of the cell model, stiff index-1 systems
//!
//! # Example
//!
//! ```rust,ignore
//! use intercal_rs::solver::{BackwardEulerSolver, Scenario, Solver, SolverConfiguration};
//!
//! let scenario = Scenario::new(Box::new(model));
//! let result = BackwardEulerSolver::new().solve(&scenario, &SolverConfiguration::time_evolution(1.0, 50))?;
//! ```
//!
//! # Performance Considerations
//!
//! - **Rayon parallelization** (feature `parallel`) for Jacobian columns and
//!   particle residuals
//! - **Configurable threshold** via `set_parallel_threshold()`

pub mod backward_euler;

// Re-exports for convenience
pub use backward_euler::BackwardEulerSolver;
