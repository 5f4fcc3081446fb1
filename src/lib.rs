//! intercal-rs: Porous Intercalation Electrode Model
//!
//! Formulates the differential-algebraic system of a porous battery electrode
//! made of intercalating particles, facing a metal anode across a separator:
//! solid transport and reaction in every particle, ion transport in the
//! electrolyte, and the cell-level current/voltage constraint.
//!
//! # Architecture
//!
//! intercal-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - Models define residuals `F(t, y, dy/dt)` (what to solve)
//!    - Solvers drive them to zero over time (how to solve)
//!
//! 2. **One formula, two number types**
//!    - Every physical formula is generic over [`physics::Scalar`]
//!    - It evaluates on `f64` for residuals and on dual numbers for exact
//!      Jacobian columns
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use intercal_rs::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 1. Describe the cell
//! let mut params = ParameterSet::default();
//! params.material.scheme = SolidScheme::Homogeneous;
//! params.system.profile = CyclingProfile::Galvanostatic { c_rate: 1.0 };
//!
//! // 2. Build the model and the scenario
//! let model = CellModel::new(&params)?;
//! let scenario = Scenario::new(Box::new(model));
//!
//! // 3. Run to the end of the discharge
//! let result = BackwardEulerSolver::new().solve(&scenario, &SolverConfiguration::to_horizon(50))?;
//!
//! // 4. Access results by name
//! let voltage = result.series("cell.phi_applied");
//! println!("{:?} -> {:?}", result.status, voltage.and_then(|v| v.last().copied()));
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`params`]: dimensional parameter sets, validation, non-dimensionalization
//! - [`particles`]: particle size sampling and geometry
//! - [`physics`]: scalar abstraction and the residual contract
//! - [`models`]: thermodynamics, kinetics, solid and electrolyte transport,
//!   cell assembly
//! - [`solver`]: reference DAE solver
//! - [`output`]: result export
//! - [`error`]: error types

pub mod error;
pub mod models;
pub mod output;
pub mod params;
pub mod particles;
pub mod physics;
pub mod solver;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use intercal_rs::prelude::*;
    //! ```
    pub use crate::error::{ConfigError, ExportError, ModelError, SolverError};
    pub use crate::models::CellModel;
    pub use crate::output::{CsvExporter, Exporter};
    pub use crate::params::{
        CellGeometry, ConductionOptions, CyclingProfile, MaterialParams, ParameterSet, ParticleShape, SolidScheme,
        SystemParams,
    };
    pub use crate::physics::{DaeModel, EquationKind};
    pub use crate::solver::{
        BackwardEulerSolver, RunStatus, Scenario, SimulationResult, Solver, SolverConfiguration, SolverType,
    };
}
