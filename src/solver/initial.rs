//! Consistent initialization
//!
//! A DAE cannot start from arbitrary values: the algebraic unknowns must
//! satisfy their constraints and the rates of the differential unknowns must
//! match the residual. Given `y0`, this solves `F(t0, y, dy/dt) = 0` with the
//! differential values held fixed, for
//!
//! - `dy/dt` of every differential unknown,
//! - `y` of every algebraic unknown.
//!
//! The combined vector `x` stores, at index `k`, whichever of the two is free
//! for unknown `k`.

use log::debug;
use nalgebra::DVector;

use crate::physics::{DaeModel, EquationKind};
use crate::solver::newton::{Newton, NewtonFailure, dual_jacobian};

/// Consistent `(y, dy/dt)` at `t0`
#[derive(Debug, Clone)]
pub(crate) struct ConsistentState {
    pub y: DVector<f64>,
    pub ydot: DVector<f64>,
    pub iterations: usize,
}

fn split(kinds: &[EquationKind], y0: &DVector<f64>, x: &DVector<f64>) -> (DVector<f64>, DVector<f64>) {
    let mut y = y0.clone();
    let mut ydot = DVector::zeros(y0.len());
    for (k, kind) in kinds.iter().enumerate() {
        if kind.is_differential() {
            ydot[k] = x[k];
        } else {
            y[k] = x[k];
        }
    }
    (y, ydot)
}

/// Make `y0` consistent at `t0`
pub(crate) fn consistent_state(
    model: &dyn DaeModel,
    t0: f64,
    y0: &DVector<f64>,
    newton: Newton,
) -> Result<ConsistentState, NewtonFailure> {
    let kinds = model.equation_kinds();
    let x0 = DVector::from_fn(y0.len(), |k, _| if kinds[k].is_differential() { 0.0 } else { y0[k] });

    let (x, iterations) = newton.solve(
        x0,
        |x| {
            let (y, ydot) = split(kinds, y0, x);
            model.residual(t0, y.as_slice(), ydot.as_slice())
        },
        |x| {
            let (y, ydot) = split(kinds, y0, x);
            dual_jacobian(model, t0, y.as_slice(), ydot.as_slice(), |j| {
                if kinds[j].is_differential() { (0.0, 1.0) } else { (1.0, 0.0) }
            })
        },
    )?;

    debug!("consistent initialization of '{}' converged in {} iterations", model.name(), iterations);
    let (y, ydot) = split(kinds, y0, &x);
    Ok(ConsistentState { y, ydot, iterations })
}
