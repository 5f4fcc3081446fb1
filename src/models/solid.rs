//! Solid-phase particle models
//!
//! Every particle contributes `M dc/dt = rhs` for its concentration nodes,
//! one algebraic average per species, and optionally a surface-potential
//! chain. Two families of dynamics exist:
//!
//! - **Reaction-limited** (`ACR`, `homog`, `homog_sdn`): every node reacts
//!   with the electrolyte on its own, driven by the full chemical potential
//!   of [`ParticleThermo`]. The mass operator is the identity.
//! - **Radial diffusion** (`diffn`): Fickian transport on a sphere discretized
//!   with non-uniform control volumes (half-sized at the centre and the
//!   surface), a consistent mass matrix, and reaction at the surface node
//!   only.
//!
//! # Radial control volumes
//!
//! With `N` nodes at `r_k = k dr`, `dr = 1 / (N - 1)`:
//!
//! ```text
//! vol_0     = dr^3 / 24
//! vol_k     = r_k^2 dr + dr^3 / 12
//! vol_(N-1) = (1 - (1 - dr/2)^3) / 3
//! M         = M1 diag(vol),  M1 = tridiag(1/8, 3/4, 1/8), M1[1,0] = M1[N-2,N-1] = 1/4
//! ```
//!
//! Every column of `M1` sums to one, so `sum(M dc/dt)` is the rate of change
//! of the particle's content and the face fluxes telescope to the surface
//! reaction.

use std::sync::Arc;

use nalgebra::DMatrix;

use crate::error::{ConfigResult, ModelError, ModelResult};
use crate::models::conduction::surface_residual;
use crate::models::kinetics::{Kinetics, ReactionInputs};
use crate::models::open_circuit::{OpenCircuitFit, fitted_potential};
use crate::models::thermodynamics::{self, ChemicalPotential, ParticleThermo};
use crate::params::{MaterialParams, ParticleParameters, ReferenceScales, SolidScheme};
use crate::physics::{Scalar, lift, sum};

// =================================================================================================
// Mass operator
// =================================================================================================

/// Left-hand operator applied to `dc/dt`
#[derive(Debug, Clone, PartialEq)]
pub enum MassOperator {
    Identity,
    Dense(DMatrix<f64>),
}

impl MassOperator {
    pub fn apply<D: Scalar>(&self, x: &[D]) -> Vec<D> {
        match self {
            MassOperator::Identity => x.to_vec(),
            MassOperator::Dense(m) => (0..m.nrows())
                .map(|i| {
                    let mut acc = lift::<D>(0.0);
                    for (j, &xj) in x.iter().enumerate() {
                        let mij = m[(i, j)];
                        if mij != 0.0 {
                            acc += xj * mij;
                        }
                    }
                    acc
                })
                .collect(),
        }
    }
}

// =================================================================================================
// Radial grid
// =================================================================================================

/// Control volumes of a unit sphere
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGrid {
    pub dr: f64,
    pub radius: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl RadialGrid {
    /// Grid of `nodes >= 2` nodes from centre to surface
    pub fn new(nodes: usize) -> Self {
        debug_assert!(nodes >= 2, "radial grid needs a centre and a surface node");
        let dr = 1.0 / (nodes - 1) as f64;
        let radius: Vec<f64> = (0..nodes).map(|k| k as f64 * dr).collect();
        let mut volumes: Vec<f64> = radius.iter().map(|r| r * r * dr + dr.powi(3) / 12.0).collect();
        volumes[0] = dr.powi(3) / 24.0;
        volumes[nodes - 1] = (1.0 - (1.0 - dr / 2.0).powi(3)) / 3.0;
        Self { dr, radius, volumes }
    }

    pub fn nodes(&self) -> usize {
        self.radius.len()
    }

    /// Consistent mass matrix `M1 diag(vol)`
    pub fn mass_matrix(&self) -> DMatrix<f64> {
        let n = self.nodes();
        let mut m1 = DMatrix::zeros(n, n);
        for i in 0..n {
            m1[(i, i)] = 0.75;
            if i + 1 < n {
                m1[(i, i + 1)] = 0.125;
                m1[(i + 1, i)] = 0.125;
            }
        }
        m1[(1, 0)] = 0.25;
        m1[(n - 2, n - 1)] = 0.25;
        m1 * DMatrix::from_diagonal(&nalgebra::DVector::from_vec(self.volumes.clone()))
    }

    /// Volume-weighted average of a nodal field
    pub fn average<D: Scalar>(&self, values: &[D]) -> D {
        let total: f64 = self.volumes.iter().sum();
        let weighted: D = values.iter().zip(&self.volumes).map(|(&v, &w)| v * w).sum();
        weighted / total
    }

    /// Diffusive right-hand side with the reaction flux entering at the surface
    pub fn diffusion_rhs<D: Scalar>(&self, c: &[D], ds: f64, surface_flux: D) -> Vec<D> {
        let n = c.len();
        let dr = self.dr;
        let flux = |k: usize| {
            let face = self.radius[k] + dr / 2.0;
            (c[k + 1] - c[k]) * (ds * face * face / dr)
        };
        let mut rhs = Vec::with_capacity(n);
        rhs.push(flux(0));
        for k in 1..n - 1 {
            rhs.push(flux(k) - flux(k - 1));
        }
        rhs.push(surface_flux - flux(n - 2));
        rhs
    }
}

// =================================================================================================
// Particle model
// =================================================================================================

/// Equilibrium potential drop at a radial particle's surface
#[derive(Debug, Clone)]
pub enum Equilibrium {
    /// `T ln(c_lyte / c_surf)`
    Dilute,
    Fitted(Arc<dyn OpenCircuitFit>),
}

/// Scheme-specific part of a particle model
#[derive(Debug, Clone)]
pub enum SolidDynamics {
    Reaction { thermo: ParticleThermo, surface_conduction: bool },
    Radial { grid: RadialGrid, equilibrium: Equilibrium },
}

/// Electrolyte and matrix values seen by a particle
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<D> {
    pub c_lyte: D,
    pub phi_lyte: D,
    /// Solid (matrix) potential of the hosting volume
    pub phi_solid: D,
    pub temperature: f64,
}

/// Unknowns of one particle
#[derive(Debug, Clone, Copy)]
pub struct ParticleView<'a, D> {
    pub c: &'a [D],
    pub c2: Option<&'a [D]>,
    pub cbar: D,
    pub cbar2: Option<D>,
    pub phi: Option<&'a [D]>,
}

/// Time derivatives of one particle's concentration nodes
#[derive(Debug, Clone, Copy)]
pub struct ParticleRates<'a, D> {
    pub dc: &'a [D],
    pub dc2: Option<&'a [D]>,
}

/// Residuals of one particle, grouped like its unknowns
#[derive(Debug, Clone)]
pub struct ParticleResidual<D> {
    pub c: Vec<D>,
    pub c2: Vec<D>,
    pub cbar: D,
    pub cbar2: Option<D>,
    pub phi: Vec<D>,
    /// Rate of change of the particle's average filling, summed over species
    pub filling_rate: D,
}

/// One particle with its resolved models
#[derive(Debug, Clone)]
pub struct ParticleModel {
    pub params: ParticleParameters,
    pub kinetics: Kinetics,
    pub dynamics: SolidDynamics,
    pub mass: MassOperator,
}

impl ParticleModel {
    /// Resolve the models of one particle
    pub fn build(
        material: &MaterialParams,
        params: ParticleParameters,
        scales: &ReferenceScales,
        surface_conduction: bool,
        fit: Option<Arc<dyn OpenCircuitFit>>,
    ) -> ConfigResult<Self> {
        let kinetics = Kinetics::resolve(material, scales)?;
        let dynamics = match material.scheme {
            SolidScheme::RadialDiffusion => {
                // the thermodynamics still has to be a valid one-species model
                thermodynamics::resolve(material, &params, scales)?;
                let grid = RadialGrid::new(params.nodes);
                let equilibrium = fit.map_or(Equilibrium::Dilute, Equilibrium::Fitted);
                SolidDynamics::Radial { grid, equilibrium }
            }
            _ => SolidDynamics::Reaction {
                thermo: thermodynamics::resolve(material, &params, scales)?,
                surface_conduction,
            },
        };
        let mass = match &dynamics {
            SolidDynamics::Radial { grid, .. } => MassOperator::Dense(grid.mass_matrix()),
            SolidDynamics::Reaction { .. } => MassOperator::Identity,
        };
        Ok(Self { params, kinetics, dynamics, mass })
    }

    /// Number of intercalating species
    pub fn species(&self) -> usize {
        match &self.dynamics {
            SolidDynamics::Reaction { thermo, .. } => thermo.species(),
            SolidDynamics::Radial { .. } => 1,
        }
    }

    pub fn nodes(&self) -> usize {
        self.params.nodes
    }

    pub fn has_surface_potential(&self) -> bool {
        matches!(self.dynamics, SolidDynamics::Reaction { surface_conduction: true, .. })
    }

    /// Particle volume in m^3
    pub fn volume(&self) -> f64 {
        self.params.geometry.volume
    }

    /// Average of a nodal field, volume-weighted on a radial grid
    pub fn average<D: Scalar>(&self, values: &[D]) -> D {
        match &self.dynamics {
            SolidDynamics::Radial { grid, .. } => grid.average(values),
            SolidDynamics::Reaction { .. } => sum(values) / values.len() as f64,
        }
    }

    /// Evaluate every residual of this particle
    pub fn residual<D: Scalar>(
        &self,
        state: &ParticleView<'_, D>,
        rates: &ParticleRates<'_, D>,
        env: &Surroundings<D>,
    ) -> ModelResult<ParticleResidual<D>> {
        let mut filling_rate = self.average(rates.dc);
        if let Some(dc2) = rates.dc2 {
            filling_rate += self.average(dc2);
        }

        let (c, c2, phi) = match &self.dynamics {
            SolidDynamics::Reaction { thermo, .. } => self.reaction_residual(thermo, state, rates, env)?,
            SolidDynamics::Radial { grid, equilibrium } => {
                (self.radial_residual(grid, equilibrium, state, rates, env)?, Vec::new(), Vec::new())
            }
        };

        let cbar = state.cbar - self.average(state.c);
        let cbar2 = match (state.cbar2, state.c2) {
            (Some(avg), Some(c2)) => Some(avg - self.average(c2)),
            _ => None,
        };
        Ok(ParticleResidual { c, c2, cbar, cbar2, phi, filling_rate })
    }

    fn reaction_rates<D: Scalar>(
        &self,
        cp: &ChemicalPotential<D>,
        c: &[D],
        other: Option<&[D]>,
        phi_m: &dyn Fn(usize) -> D,
        env: &Surroundings<D>,
    ) -> Vec<D> {
        let mu_o = env.c_lyte.ln() + env.phi_lyte;
        (0..c.len())
            .map(|k| {
                let inputs = ReactionInputs {
                    eta: cp.mu[k] + phi_m(k) - mu_o,
                    c_sld: c[k],
                    c_other: other.map_or(lift::<D>(0.0), |o| o[k]),
                    c_lyte: env.c_lyte,
                    act_r: cp.activity[k],
                    k0: self.params.k0,
                    t: env.temperature,
                };
                self.kinetics.rate(&inputs)
            })
            .collect()
    }

    fn reaction_residual<D: Scalar>(
        &self,
        thermo: &ParticleThermo,
        state: &ParticleView<'_, D>,
        rates: &ParticleRates<'_, D>,
        env: &Surroundings<D>,
    ) -> ModelResult<(Vec<D>, Vec<D>, Vec<D>)> {
        let t = env.temperature;
        let phi_m = |k: usize| state.phi.map_or(env.phi_solid, |phi| phi[k]);

        let (res_c, res_c2) = match (thermo, state.c2, rates.dc2) {
            (ParticleThermo::Pair(pair), Some(c2), Some(dc2)) => {
                let cbar2 = state.cbar2.unwrap_or_else(|| self.average(c2));
                let (cp1, cp2) = pair.potentials(state.c, c2, state.cbar, cbar2, t);
                let r1 = self.reaction_rates(&cp1, state.c, Some(c2), &phi_m, env);
                let r2 = self.reaction_rates(&cp2, c2, Some(state.c), &phi_m, env);
                let res1 = self.mass.apply(rates.dc).into_iter().zip(r1).map(|(d, r)| d - r).collect();
                let res2 = self.mass.apply(dc2).into_iter().zip(r2).map(|(d, r)| d - r).collect();
                (res1, res2)
            }
            (ParticleThermo::Single(single), _, _) => {
                let cp = single.potential(state.c, state.cbar, t);
                let r = self.reaction_rates(&cp, state.c, None, &phi_m, env);
                (self.mass.apply(rates.dc).into_iter().zip(r).map(|(d, r)| d - r).collect(), Vec::new())
            }
            (ParticleThermo::Pair(_), _, _) => {
                return Err(ModelError::StateLength { expected: 2 * state.c.len(), actual: state.c.len() });
            }
        };

        let res_phi = match state.phi {
            Some(phi) => {
                let charge: Vec<D> = match rates.dc2 {
                    Some(dc2) => rates.dc.iter().zip(dc2).map(|(&a, &b)| a + b).collect(),
                    None => rates.dc.to_vec(),
                };
                surface_residual(phi, env.phi_solid, &charge, self.params.scond, self.params.k0)
            }
            None => Vec::new(),
        };
        Ok((res_c, res_c2, res_phi))
    }

    fn radial_residual<D: Scalar>(
        &self,
        grid: &RadialGrid,
        equilibrium: &Equilibrium,
        state: &ParticleView<'_, D>,
        rates: &ParticleRates<'_, D>,
        env: &Surroundings<D>,
    ) -> ModelResult<Vec<D>> {
        let t = env.temperature;
        let c = state.c;
        let c_surf = c[c.len() - 1];

        let delta_phi_eq = match equilibrium {
            Equilibrium::Dilute => (env.c_lyte / c_surf).ln() * t,
            Equilibrium::Fitted(fit) => fitted_potential(fit.as_ref(), c_surf)?,
        };
        let eta = env.phi_solid - env.phi_lyte - delta_phi_eq;
        let rxn = self.kinetics.rate(&ReactionInputs {
            eta,
            c_sld: c_surf,
            c_other: lift::<D>(0.0),
            c_lyte: env.c_lyte,
            act_r: c_surf,
            k0: self.params.k0,
            t,
        });

        let rhs = grid.diffusion_rhs(c, self.params.ds, rxn);
        Ok(self.mass.apply(rates.dc).into_iter().zip(rhs).map(|(lhs, r)| lhs - r).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParticleShape, SystemParams};
    use crate::particles::ParticleGeometry;
    use approx::assert_relative_eq;

    // ── helpers ──

    fn particle_params(nodes: usize, shape: ParticleShape) -> ParticleParameters {
        ParticleParameters {
            volume_index: 0,
            slot: 0,
            geometry: ParticleGeometry::new(shape, 100e-9, 20e-9),
            nodes,
            k0: 2.0,
            kappa: 0.01,
            kappa_2: 0.01,
            kappa_12: 0.0,
            b: 0.5,
            b_2: 0.5,
            omega: 4.0,
            ds: 3.0,
            scond: 1.0,
        }
    }

    fn build(material: MaterialParams, nodes: usize, surface: bool) -> ParticleModel {
        let scales = ReferenceScales::new(&SystemParams::default(), &material);
        let shape = material.shape;
        ParticleModel::build(&material, particle_params(nodes, shape), &scales, surface, None).unwrap()
    }

    fn radial_material() -> MaterialParams {
        MaterialParams { scheme: SolidScheme::RadialDiffusion, shape: ParticleShape::Sphere, ..Default::default() }
    }

    fn env(phi_solid: f64) -> Surroundings<f64> {
        Surroundings { c_lyte: 1.0, phi_lyte: 0.0, phi_solid, temperature: 1.0 }
    }

    #[test]
    fn test_radial_volumes_fill_the_unit_sphere() {
        for n in [2, 3, 7, 20] {
            let grid = RadialGrid::new(n);
            let total: f64 = grid.volumes.iter().sum();
            assert_relative_eq!(total, 1.0 / 3.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_mass_matrix_columns_sum_to_volumes() {
        let grid = RadialGrid::new(6);
        let m = grid.mass_matrix();
        for j in 0..6 {
            let col: f64 = m.column(j).iter().sum();
            assert_relative_eq!(col, grid.volumes[j], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_radial_rhs_sums_to_zero_without_reaction() {
        let grid = RadialGrid::new(8);
        let c: Vec<f64> = (0..8).map(|k| 0.1 + 0.05 * (k as f64).sin().abs()).collect();
        let rhs = grid.diffusion_rhs(&c, 2.5, 0.0);
        assert_relative_eq!(rhs.iter().sum::<f64>(), 0.0, epsilon = 1e-13);
    }

    #[test]
    fn test_radial_rhs_total_equals_surface_flux() {
        let grid = RadialGrid::new(5);
        let c = vec![0.2, 0.25, 0.3, 0.4, 0.5];
        let rhs = grid.diffusion_rhs(&c, 1.0, 0.7);
        assert_relative_eq!(rhs.iter().sum::<f64>(), 0.7, epsilon = 1e-13);
    }

    #[test]
    fn test_uniform_homogeneous_particle_at_equilibrium() {
        // mu_R + phi_solid = 0 at equilibrium with c_lyte = 1, phi_lyte = 0
        let material = MaterialParams {
            scheme: SolidScheme::Homogeneous,
            thermodynamics: "ideal_sln".into(),
            ..Default::default()
        };
        let model = build(material, 1, false);
        let c = [0.3_f64];
        let mu = (0.3_f64 / 0.7).ln();
        let state = ParticleView { c: &c, c2: None, cbar: 0.3, cbar2: None, phi: None };
        let rates = ParticleRates { dc: &[0.0], dc2: None };
        let res = model.residual(&state, &rates, &env(-mu)).unwrap();
        assert_relative_eq!(res.c[0], 0.0, epsilon = 1e-14);
        assert_relative_eq!(res.cbar, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_homogeneous_particle_fills_under_negative_overpotential() {
        let material = MaterialParams {
            scheme: SolidScheme::Homogeneous,
            thermodynamics: "ideal_sln".into(),
            ..Default::default()
        };
        let model = build(material, 1, false);
        let c = [0.1_f64];
        let state = ParticleView { c: &c, c2: None, cbar: 0.1, cbar2: None, phi: None };
        let rates = ParticleRates { dc: &[0.0], dc2: None };
        let res = model.residual(&state, &rates, &env(-5.0)).unwrap();
        // residual = dc/dt - R with R > 0
        assert!(res.c[0] < 0.0);
    }

    #[test]
    fn test_radial_filling_rate_is_volume_weighted() {
        let model = build(radial_material(), 4, false);
        let c = [0.2_f64; 4];
        let dc = [1.0_f64, 0.0, 0.0, 0.0];
        let state = ParticleView { c: &c, c2: None, cbar: 0.2, cbar2: None, phi: None };
        let rates = ParticleRates { dc: &dc, dc2: None };
        let res = model.residual(&state, &rates, &env(0.0)).unwrap();
        let grid = RadialGrid::new(4);
        assert_relative_eq!(res.filling_rate, grid.volumes[0] * 3.0, epsilon = 1e-14);
        assert_relative_eq!(res.cbar, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_surface_conduction_adds_potential_residuals() {
        let model = build(MaterialParams::default(), 3, true);
        assert!(model.has_surface_potential());
        let c = [0.2_f64, 0.2, 0.2];
        let phi = [0.0_f64; 3];
        let dc = [0.0_f64; 3];
        let state = ParticleView { c: &c, c2: None, cbar: 0.2, cbar2: None, phi: Some(&phi) };
        let rates = ParticleRates { dc: &dc, dc2: None };
        let res = model.residual(&state, &rates, &env(0.0)).unwrap();
        assert_eq!(res.phi.len(), 3);
        assert!(res.phi.iter().all(|r| r.abs() < 1e-14));
    }

    #[test]
    fn test_two_species_particle_returns_both_blocks() {
        let material = MaterialParams {
            scheme: SolidScheme::Homogeneous,
            thermodynamics: "graphite_2param".into(),
            ..Default::default()
        };
        let model = build(material, 1, false);
        assert_eq!(model.species(), 2);
        let (c, c2) = ([0.2_f64], [0.3_f64]);
        let state = ParticleView { c: &c, c2: Some(&c2), cbar: 0.2, cbar2: Some(0.3), phi: None };
        let rates = ParticleRates { dc: &[0.5], dc2: Some(&[0.25]) };
        let res = model.residual(&state, &rates, &env(0.0)).unwrap();
        assert_eq!(res.c2.len(), 1);
        assert_relative_eq!(res.filling_rate, 0.75, epsilon = 1e-14);
        assert_relative_eq!(res.cbar2.unwrap(), 0.0, epsilon = 1e-14);
    }
}
