//! Physical models of the intercalation cell
//!
//! The cell model implements the [`DaeModel`](crate::physics::DaeModel)
//! contract. The solver only sees residuals; everything physical lives here.
//!
//! # Building blocks
//!
//! ## [`thermodynamics`]: chemical potential of the reduced state
//!
//! Homogeneous free-energy forms for one or two intercalating species, plus
//! the gradient-energy and coherency-strain correction of particles with an
//! internal profile.
//!
//! ## [`kinetics`]: interfacial reaction rate
//!
//! Butler-Volmer, Marcus and coupled ion-electron transfer rates as a
//! function of the overpotential.
//!
//! ## [`solid`]: particle dynamics
//!
//! Reaction-limited particles (one reacting node per grid point) and radially
//! diffusing spheres, each producing `M dc/dt = rhs` and its averages.
//!
//! ## [`electrolyte`]: salt transport across separator and electrode
//!
//! ## [`conduction`]: electronic conduction in the solid phase
//!
//! ## [`open_circuit`]: empirical equilibrium potentials
//!
//! # Assembly
//!
//! [`CellModel`] resolves every registry name once at build time and
//! evaluates all of the above in a single generic residual pass.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod cell;
pub mod conduction;
pub mod electrolyte;
pub mod kinetics;
pub mod open_circuit;
pub mod solid;
pub mod thermodynamics;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use cell::{CellLayout, CellModel};
pub use electrolyte::ElectrolyteTransport;
pub use kinetics::{KINETICS, Kinetics, ReactionInputs};
pub use open_circuit::{OpenCircuitFit, TabulatedFit};
pub use solid::{MassOperator, ParticleModel, RadialGrid};
pub use thermodynamics::{ParticleThermo, THERMODYNAMICS};
