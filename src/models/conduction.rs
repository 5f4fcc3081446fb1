//! Electronic conduction in the solid phase
//!
//! Two optional Ohm's-law chains, both discretized with ghost values at the
//! ends:
//!
//! - **surface conduction** along the carbon coating of one reaction-limited
//!   particle. Both ends touch the volume's solid potential, and the local
//!   conductivity falls off as `exp(-(phi_edge - phi_solid))`. The current
//!   divergence balances the local reaction, `dc/dt / k0`.
//! - **bulk conduction** through the electrode matrix. No electronic current
//!   leaves towards the separator and the current collector sits at
//!   `phi_cathode`.

use crate::physics::{Scalar, diff, lift, mean_linear};

/// Residuals of the surface-conduction chain of one particle
///
/// `phi` holds the node potentials, `rate` the local `dc/dt` (summed over
/// species).
pub fn surface_residual<D: Scalar>(phi: &[D], phi_solid: D, rate: &[D], scond: f64, k0: f64) -> Vec<D> {
    let n = phi.len();
    let dx = 1.0 / n as f64;

    let mut padded = Vec::with_capacity(n + 2);
    padded.push(phi_solid);
    padded.extend_from_slice(phi);
    padded.push(phi_solid);

    let edges = mean_linear(&padded);
    let gradient = diff(&padded);
    let current: Vec<D> = edges
        .iter()
        .zip(&gradient)
        .map(|(&edge, &g)| (-(edge - phi_solid)).exp() * (-scond) * g / dx)
        .collect();

    diff(&current)
        .into_iter()
        .zip(rate)
        .map(|(div, &r)| div / dx - r / k0)
        .collect()
}

/// Residuals of the bulk-conduction chain across the electrode volumes
pub fn bulk_residual<D: Scalar>(phi: &[D], j_plus: &[D], phi_cathode: f64, mcond: f64, epsbeta: f64, dx: f64) -> Vec<D> {
    let n = phi.len();
    let mut padded = Vec::with_capacity(n + 2);
    padded.push(phi[0]);
    padded.extend_from_slice(phi);
    padded.push(lift(phi_cathode));

    let current: Vec<D> = diff(&padded).into_iter().map(|g| g * (-mcond) / dx).collect();
    diff(&current)
        .into_iter()
        .zip(j_plus)
        .map(|(div, &j)| -j * epsbeta + div / dx)
        .collect()
}
