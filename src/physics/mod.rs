//! Residual contract and state bookkeeping
//!
//! This module provides the interface between the battery formulation and any
//! numerical solver.
//!
//! # Core Concepts
//!
//! - **DAE Model** ([`DaeModel`]): evaluates `F(t, y, dy/dt)` for a flat
//!   vector of unknowns, on `f64` or on dual numbers
//! - **Equation kind** ([`EquationKind`]): which unknowns are differential
//! - **Layout** ([`VariableLayout`]): stable hierarchical name of each unknown
//! - **Scalar** ([`Scalar`]): the numeric type formulas are generic over
//!
//! # Architecture
//!
//! Physical models are **separate from numerical solvers**:
//! - The model provides the **residuals** (physics)
//! - The solver provides the **method** to drive them to zero (numerics)
//!
//! # Example
//!
//! ```rust
//! use intercal_rs::physics::{Scalar, one_minus};
//!
//! // A formula written once, usable with f64 and with dual numbers
//! fn ideal_potential<D: Scalar>(y: D) -> D {
//!     (y / one_minus(y)).ln()
//! }
//!
//! assert!(ideal_potential(0.5_f64).abs() < 1e-15);
//! ```

// module declaration
pub mod data;
pub mod scalar;
pub mod traits;

// re-export commonly used types for convenience
pub use data::{StateSnapshot, VariableLayout};
pub use scalar::{Scalar, diff, lift, mean_linear, one_minus, pow, sum};
pub use traits::{DaeModel, EquationKind};
