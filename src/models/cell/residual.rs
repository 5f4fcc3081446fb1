//! Residual assembly
//!
//! One generic pass serves both the plain and the dual-number residual.
//! Particle contributions are independent of each other and may be computed
//! in parallel; everything else reads their results by index.

use crate::error::ModelResult;
use crate::models::cell::CellModel;
use crate::models::conduction::bulk_residual;
use crate::models::solid::{ParticleRates, ParticleResidual, ParticleView, Surroundings};
use crate::params::OperatingMode;
use crate::physics::{Scalar, lift};

fn collect_particles<T, F>(count: usize, f: F) -> ModelResult<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> ModelResult<T> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if count >= crate::solver::parallel_threshold() {
            return (0..count).into_par_iter().map(f).collect();
        }
    }
    (0..count).map(f).collect()
}

impl CellModel {
    pub(crate) fn evaluate<D: Scalar>(&self, _t: f64, y: &[D], ydot: &[D]) -> ModelResult<Vec<D>> {
        let l = &self.layout;
        let cell = &self.cell;
        let n_sep = cell.n_sep;
        let mut res = vec![lift::<D>(0.0); l.len()];

        // particles
        let particles: Vec<ParticleResidual<D>> = collect_particles(self.particles.len(), |p| {
            let model = &self.particles[p];
            let slots = &l.particles[p];
            let i = model.params.volume_index;
            let env = Surroundings {
                c_lyte: y[l.lyte_c[n_sep + i]],
                phi_lyte: y[l.lyte_phi[n_sep + i]],
                phi_solid: y[l.volumes[i].phi_solid],
                temperature: cell.temperature,
            };
            let view = ParticleView {
                c: &y[slots.c.clone()],
                c2: slots.c2.clone().map(|r| &y[r]),
                cbar: y[slots.cbar],
                cbar2: slots.cbar2.map(|k| y[k]),
                phi: slots.phi.clone().map(|r| &y[r]),
            };
            let rates = ParticleRates { dc: &ydot[slots.c.clone()], dc2: slots.c2.clone().map(|r| &ydot[r]) };
            model.residual(&view, &rates, &env)
        })?;

        let mut filling = lift::<D>(0.0);
        let mut volume_rates = vec![lift::<D>(0.0); cell.n_trode];
        for (p, (slots, r)) in l.particles.iter().zip(&particles).enumerate() {
            for (k, &v) in slots.c.clone().zip(&r.c) {
                res[k] = v;
            }
            if let Some(c2) = &slots.c2 {
                for (k, &v) in c2.clone().zip(&r.c2) {
                    res[k] = v;
                }
            }
            if let Some(phi) = &slots.phi {
                for (k, &v) in phi.clone().zip(&r.phi) {
                    res[k] = v;
                }
            }
            res[slots.cbar] = r.cbar;
            let mut average = y[slots.cbar];
            if let (Some(k), Some(v)) = (slots.cbar2, r.cbar2) {
                res[k] = v;
                average += y[k];
            }

            filling += average * self.electrode_share[p];
            let i = self.particles[p].params.volume_index;
            volume_rates[i] += r.filling_rate * self.volume_share[p];
        }

        // electrode volumes
        let j_plus: Vec<D> = l.volumes.iter().map(|v| y[v.j_plus]).collect();
        for (v, (&j, rate)) in l.volumes.iter().zip(j_plus.iter().zip(volume_rates)) {
            res[v.j_plus] = j - rate;
        }
        if cell.bulk_conduction {
            let phi: Vec<D> = l.volumes.iter().map(|v| y[v.phi_solid]).collect();
            let bulk = bulk_residual(&phi, &j_plus, cell.phi_cathode, cell.mcond, cell.epsbeta, cell.trode_width);
            for (v, r) in l.volumes.iter().zip(bulk) {
                res[v.phi_solid] = r;
            }
        } else {
            for v in &l.volumes {
                res[v.phi_solid] = y[v.phi_solid] - cell.phi_cathode;
            }
        }

        // electrolyte
        let current = y[l.current];
        let phi_applied = y[l.phi_applied];
        let gather = |src: &[D], idx: &[usize]| -> Vec<D> { idx.iter().map(|&k| src[k]).collect() };
        let lyte = self.electrolyte.residual(
            &gather(y, &l.lyte_c),
            &gather(y, &l.lyte_phi),
            &gather(ydot, &l.lyte_c),
            &j_plus,
            current,
            phi_applied,
        );
        for (&k, v) in l.lyte_c.iter().zip(lyte.c) {
            res[k] = v;
        }
        for (&k, v) in l.lyte_phi.iter().zip(lyte.phi) {
            res[k] = v;
        }

        // cell
        res[l.ffrac] = y[l.ffrac] - filling;
        let delivered: D = j_plus.iter().map(|&j| j * cell.trode_width).sum();
        res[l.current] = current - delivered;
        res[l.phi_applied] = match cell.mode {
            OperatingMode::Galvanostatic { current: set } => current - set,
            OperatingMode::Potentiostatic { potential } => phi_applied - potential,
        };

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::cell::CellModel;
    use crate::params::{
        ConductionOptions, CyclingProfile, MaterialParams, ParameterSet, ParticleShape, SolidScheme, SystemParams,
    };
    use crate::physics::DaeModel;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;
    use num_dual::Dual64;

    // ── helpers ──

    fn params(scheme: SolidScheme, n_trode: usize, n_part: usize) -> ParameterSet {
        let mut system = SystemParams::default();
        system.geometry.n_trode = n_trode;
        system.geometry.n_part = n_part;
        let material = MaterialParams { scheme, ..Default::default() };
        ParameterSet::new(system, material)
    }

    fn model(p: &ParameterSet) -> CellModel {
        let g = &p.system.geometry;
        let lengths = DMatrix::from_fn(g.n_trode, g.n_part, |i, j| 40e-9 + 10e-9 * (i + 2 * j) as f64);
        CellModel::from_parts(p, &lengths).unwrap()
    }

    /// Feasible but non-equilibrium state
    fn perturbed_state(m: &CellModel) -> (Vec<f64>, Vec<f64>) {
        let y0 = m.initial_values();
        let y: Vec<f64> = y0
            .iter()
            .enumerate()
            .map(|(k, &v)| if v > 0.0 { v * (1.0 + 0.1 * ((k % 5) as f64) / 5.0) } else { 0.01 * (k % 3) as f64 })
            .collect();
        let ydot: Vec<f64> = (0..y.len()).map(|k| 1e-3 * ((k % 7) as f64 - 3.0)).collect();
        (y, ydot)
    }

    #[test]
    fn test_layout_counts_every_unknown() {
        let p = params(SolidScheme::Homogeneous, 3, 2);
        let m = model(&p);
        let n_sep = m.parameters().n_sep;
        // electrolyte: 2 per cell; per volume: 2 particles x (c + cbar) + j_plus + phi_solid; cell: 3
        assert_eq!(m.unknowns(), 2 * (n_sep + 3) + 3 * (2 * 2 + 2) + 3);
        assert!(m.layout().variables.index_of("trode.vol2.part1.cbar").is_some());
        assert!(m.layout().variables.index_of("lyte.sep.vol0.phi").is_some());
    }

    #[test]
    fn test_initial_state_of_lumped_cell_at_rest_is_consistent() {
        let mut p = params(SolidScheme::Homogeneous, 1, 1);
        p.system.profile = CyclingProfile::Galvanostatic { c_rate: 0.0 };
        p.system.t_final = Some(10.0);
        p.material.thermodynamics = "ideal_sln".into();
        let m = model(&p);
        let mut y = m.initial_values();
        // place the solid at equilibrium with the electrolyte
        let mu = (0.01_f64 / (1.0 - 0.01)).ln();
        let l = m.layout();
        y[l.phi_applied] = 0.0;
        y[l.volumes[0].phi_solid] = 0.0;
        y[l.lyte_phi[0]] = mu;

        let ydot = vec![0.0; y.len()];
        let res = m.residual(0.0, y.as_slice(), &ydot).unwrap();
        for (k, r) in res.iter().enumerate() {
            if k != l.lyte_phi[0] {
                assert!(r.abs() < 1e-12, "{} = {}", m.variable_names()[k], r);
            }
        }
    }

    #[test]
    fn test_current_residual_is_width_weighted_reaction_sum() {
        let m = model(&params(SolidScheme::ReactionLimited, 4, 2));
        let (y, ydot) = perturbed_state(&m);
        let res = m.residual(0.0, &y, &ydot).unwrap();
        let l = m.layout();
        let w = m.parameters().trode_width;
        let expected = y[l.current] - l.volumes.iter().map(|v| w * y[v.j_plus]).sum::<f64>();
        assert_relative_eq!(res[l.current], expected, epsilon = 1e-14);
    }

    #[test]
    fn test_dual_residual_matches_float_residual() {
        let m = model(&params(SolidScheme::ReactionLimited, 2, 2));
        let (y, ydot) = perturbed_state(&m);
        let plain = m.residual(0.0, &y, &ydot).unwrap();
        let yd: Vec<Dual64> = y.iter().map(|&v| Dual64::from_re(v)).collect();
        let ydd: Vec<Dual64> = ydot.iter().map(|&v| Dual64::from_re(v)).collect();
        let dual = m.residual_dual(0.0, &yd, &ydd).unwrap();
        for (a, b) in plain.iter().zip(&dual) {
            assert_relative_eq!(*a, b.re, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_dual_column_matches_finite_difference() {
        let mut p = params(SolidScheme::RadialDiffusion, 2, 1);
        p.material.shape = ParticleShape::Sphere;
        let m = model(&p);
        let (y, ydot) = perturbed_state(&m);
        let col = m.layout().particles[1].c.end - 1;

        let yd: Vec<Dual64> = y.iter().enumerate().map(|(k, &v)| Dual64::new(v, if k == col { 1.0 } else { 0.0 })).collect();
        let ydd: Vec<Dual64> = ydot.iter().map(|&v| Dual64::from_re(v)).collect();
        let dual = m.residual_dual(0.0, &yd, &ydd).unwrap();

        let h = 1e-7;
        let mut yp = y.clone();
        yp[col] += h;
        let mut ym = y.clone();
        ym[col] -= h;
        let rp = m.residual(0.0, &yp, &ydot).unwrap();
        let rm = m.residual(0.0, &ym, &ydot).unwrap();
        for k in 0..y.len() {
            let fd = (rp[k] - rm[k]) / (2.0 * h);
            assert_relative_eq!(dual[k].eps, fd, epsilon = 1e-5, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_bulk_conduction_replaces_collector_constraint() {
        let mut p = params(SolidScheme::Homogeneous, 3, 1);
        p.system.conduction = ConductionOptions { bulk: true, ..Default::default() };
        let m = model(&p);
        let (mut y, ydot) = perturbed_state(&m);
        let l = m.layout();
        for v in &l.volumes {
            y[v.phi_solid] = 0.0;
            y[v.j_plus] = 0.1;
        }
        let res = m.residual(0.0, &y, &ydot).unwrap();
        let epsbeta = m.parameters().epsbeta;
        for v in &l.volumes {
            assert_relative_eq!(res[v.phi_solid], -0.1 * epsbeta, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_potentiostatic_constraint_pins_applied_potential() {
        let mut p = params(SolidScheme::Homogeneous, 2, 1);
        p.system.profile = CyclingProfile::Potentiostatic { voltage: 0.05 };
        p.system.t_final = Some(10.0);
        let m = model(&p);
        let set = m.parameters().scales.potential(0.05);
        let (mut y, ydot) = perturbed_state(&m);
        let l = m.layout();
        y[l.phi_applied] = set + 0.25;
        let res = m.residual(0.0, &y, &ydot).unwrap();
        assert_relative_eq!(res[l.phi_applied], 0.25, epsilon = 1e-12);
        assert_relative_eq!(m.initial_values()[l.phi_applied], set);
    }

    #[test]
    fn test_state_length_mismatch() {
        let m = model(&params(SolidScheme::Homogeneous, 1, 1));
        let err = m.residual(0.0, &[0.5], &[0.0]).unwrap_err();
        assert!(err.to_string().contains("state length"));
    }
}
