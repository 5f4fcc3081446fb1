//! Electrolyte transport across separator and electrode
//!
//! A binary salt in a porous medium, discretized by finite volumes on the
//! concatenated separator + electrode cells. Cells may differ in width
//! between the two sections; the distance between neighbouring cell centres
//! is the mean of their widths.
//!
//! # Equations (dimensionless)
//!
//! ```text
//! eps dc/dt + epsbeta (1 - t+) j = -d/dx(-eps^brug dc/dx)
//! epsbeta j                      = -d/dx(eps^brug i)
//! i = -(Dp - Dm) dc/dx - (zp Dp + zm Dm) c dphi/dx
//! ```
//!
//! with `j = 0` in the separator.
//!
//! # Boundaries
//!
//! | Side              | Concentration                         | Potential        |
//! |-------------------|---------------------------------------|------------------|
//! | anode (x = 0)     | salt flux `current epsbeta (1 - t+)`  | `phi_applied`    |
//! | current collector | zero gradient                         | zero gradient    |
//!
//! Both are imposed with ghost cells mirroring the neighbouring cell's width.

use crate::params::CellParameters;
use crate::physics::{Scalar, diff, mean_linear};

/// Right-hand sides of the two conservation laws, per cell
#[derive(Debug, Clone)]
pub struct TransportRhs<D> {
    pub mass: Vec<D>,
    pub charge: Vec<D>,
}

/// Residuals of the electrolyte unknowns, per cell
#[derive(Debug, Clone)]
pub struct ElectrolyteResidual<D> {
    pub c: Vec<D>,
    pub phi: Vec<D>,
}

/// Discretized electrolyte of one cell stack
#[derive(Debug, Clone, PartialEq)]
pub struct ElectrolyteTransport {
    n_sep: usize,
    widths: Vec<f64>,
    porosity: Vec<f64>,
    /// `eps^brug` at each of the `n + 1` faces
    effective: Vec<f64>,
    tp: f64,
    diffusion_split: f64,
    migration: f64,
    epsbeta: f64,
}

impl ElectrolyteTransport {
    pub fn new(cell: &CellParameters) -> Self {
        let n = cell.n_sep + cell.n_trode;
        let mut widths = vec![cell.sep_width; cell.n_sep];
        widths.resize(n, cell.trode_width);
        let mut porosity = vec![cell.porosity_sep; cell.n_sep];
        porosity.resize(n, cell.porosity);

        let mut effective: Vec<f64> = porosity.iter().map(|p| p.powf(cell.bruggeman)).collect();
        effective.push(cell.porosity.powf(cell.bruggeman));

        Self {
            n_sep: cell.n_sep,
            widths,
            porosity,
            effective,
            tp: cell.tp,
            diffusion_split: cell.dp - cell.dm,
            migration: cell.zp * cell.dp + cell.zm * cell.dm,
            epsbeta: cell.epsbeta,
        }
    }

    /// Total number of cells
    pub fn volumes(&self) -> usize {
        self.widths.len()
    }

    pub fn separator_volumes(&self) -> usize {
        self.n_sep
    }

    /// A single electrode cell without separator carries no transport
    pub fn is_lumped(&self) -> bool {
        self.n_sep == 0 && self.widths.len() == 1
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    fn padded<D: Scalar>(interior: &[D], first: D, last: D) -> Vec<D> {
        let mut out = Vec::with_capacity(interior.len() + 2);
        out.push(first);
        out.extend_from_slice(interior);
        out.push(last);
        out
    }

    /// Distances between neighbouring centres, ghost cells included
    fn spacings(&self) -> Vec<f64> {
        let n = self.widths.len();
        (0..=n)
            .map(|f| {
                let left = self.widths[f.saturating_sub(1)];
                let right = self.widths[f.min(n - 1)];
                (left + right) / 2.0
            })
            .collect()
    }

    /// Flux divergences for a given state
    pub fn rhs<D: Scalar>(&self, c: &[D], phi: &[D], current: D, phi_applied: D) -> TransportRhs<D> {
        let n = self.widths.len();
        let h = self.spacings();

        let injected = current * (self.epsbeta * (1.0 - self.tp));
        let c_ghost = c[0] + injected * (h[0] / self.effective[0]);
        let c_pad = Self::padded(c, c_ghost, c[n - 1]);
        let phi_pad = Self::padded(phi, phi_applied, phi[n - 1]);

        let dc = diff(&c_pad);
        let dphi = diff(&phi_pad);
        let c_face = mean_linear(&c_pad);

        let salt_flux: Vec<D> = (0..=n).map(|f| dc[f] * (-self.effective[f] / h[f])).collect();
        let charge_flux: Vec<D> = (0..=n)
            .map(|f| {
                let i = dc[f] * (-self.diffusion_split / h[f]) - c_face[f] * dphi[f] * (self.migration / h[f]);
                i * self.effective[f]
            })
            .collect();

        let divergence = |flux: &[D]| -> Vec<D> {
            diff(flux).into_iter().zip(&self.widths).map(|(d, &w)| -d / w).collect()
        };
        TransportRhs { mass: divergence(&salt_flux), charge: divergence(&charge_flux) }
    }

    /// Residuals of every electrolyte cell
    ///
    /// `j_plus` holds the reaction rate of each electrode cell.
    pub fn residual<D: Scalar>(
        &self,
        c: &[D],
        phi: &[D],
        dc: &[D],
        j_plus: &[D],
        current: D,
        phi_applied: D,
    ) -> ElectrolyteResidual<D> {
        if self.is_lumped() {
            return ElectrolyteResidual { c: vec![dc[0]], phi: vec![phi[0] - phi_applied] };
        }

        let rhs = self.rhs(c, phi, current, phi_applied);
        let n = self.widths.len();
        let mut res_c = Vec::with_capacity(n);
        let mut res_phi = Vec::with_capacity(n);
        for k in 0..n {
            let accumulation = dc[k] * self.porosity[k];
            if k < self.n_sep {
                res_c.push(accumulation - rhs.mass[k]);
                res_phi.push(rhs.charge[k]);
            } else {
                let j = j_plus[k - self.n_sep];
                res_c.push(accumulation + j * (self.epsbeta * (1.0 - self.tp)) - rhs.mass[k]);
                res_phi.push(j * self.epsbeta - rhs.charge[k]);
            }
        }
        ElectrolyteResidual { c: res_c, phi: res_phi }
    }
}
