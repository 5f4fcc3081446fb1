//! Porous intercalation electrode against a lithium foil
//!
//! [`CellModel`] assembles the full differential-algebraic system of one
//! cell: a population of particles in every electrode volume, the electrolyte
//! across separator and electrode, and the cell-level constraints that tie
//! them together.
//!
//! # Unknowns
//!
//! | Name                              | Kind         | Meaning                         |
//! |-----------------------------------|--------------|---------------------------------|
//! | `lyte.{sep,trode}.vol{i}.c`       | differential | salt concentration              |
//! | `lyte.{sep,trode}.vol{i}.phi`     | algebraic    | electrolyte potential           |
//! | `trode.vol{i}.part{j}.c{k}`       | differential | solid concentration at node `k` |
//! | `trode.vol{i}.part{j}.c2_{k}`     | differential | second species                  |
//! | `trode.vol{i}.part{j}.cbar`       | algebraic    | particle average                |
//! | `trode.vol{i}.part{j}.phi{k}`     | algebraic    | surface potential               |
//! | `trode.vol{i}.j_plus`             | algebraic    | volume reaction rate            |
//! | `trode.vol{i}.phi_solid`          | algebraic    | matrix potential                |
//! | `cell.ffrac`                      | algebraic    | electrode filling fraction      |
//! | `cell.current`                    | algebraic    | total current                   |
//! | `cell.phi_applied`                | algebraic    | cell potential vs. the anode    |
//!
//! # Construction
//!
//! ```rust,ignore
//! let params = ParameterSet::from_file("cell.toml")?;
//! let model = CellModel::new(&params)?;          // samples particle sizes
//! let model = CellModel::from_parts(&params, &lengths)?; // fixed sizes
//! ```

mod layout;
mod residual;

use std::sync::Arc;

use log::info;
use nalgebra::{DMatrix, DVector};
use num_dual::Dual64;

use crate::error::{ConfigResult, ModelError, ModelResult};
use crate::models::electrolyte::ElectrolyteTransport;
use crate::models::open_circuit::{OpenCircuitFit, TabulatedFit};
use crate::models::solid::ParticleModel;
use crate::params::{CellParameters, OperatingMode, ParameterSet, nondimensionalize};
use crate::particles::sample_lengths;
use crate::physics::{DaeModel, EquationKind};

pub use layout::{CellLayout, ParticleSlots, VolumeSlots};

/// Complete cell model
#[derive(Debug, Clone)]
pub struct CellModel {
    cell: CellParameters,
    particles: Vec<ParticleModel>,
    electrolyte: ElectrolyteTransport,
    layout: CellLayout,
    /// Share of each particle in its volume's reaction rate
    volume_share: Vec<f64>,
    /// Share of each particle in the electrode filling fraction
    electrode_share: Vec<f64>,
    description: String,
}

impl CellModel {
    /// Build from a parameter set, sampling particle sizes
    pub fn new(params: &ParameterSet) -> ConfigResult<Self> {
        params.validate()?;
        let g = &params.system.geometry;
        let lengths = sample_lengths(&params.system.psd, g.n_trode, g.n_part)?;
        Self::from_parts(params, &lengths)
    }

    /// Build from a parameter set and fixed particle lengths \[m\]
    ///
    /// `lengths` has one row per electrode volume and one column per slot.
    pub fn from_parts(params: &ParameterSet, lengths: &DMatrix<f64>) -> ConfigResult<Self> {
        params.validate()?;
        let material = &params.material;
        let (cell, particle_params) = nondimensionalize(&params.system, material, lengths)?;

        let fit: Option<Arc<dyn OpenCircuitFit>> = match &material.ocv_fit {
            Some(table) => Some(Arc::new(TabulatedFit::from_params(table, &cell.scales, cell.cs0)?)),
            None => None,
        };

        let particles = particle_params
            .into_iter()
            .map(|p| ParticleModel::build(material, p, &cell.scales, cell.surface_conduction, fit.clone()))
            .collect::<ConfigResult<Vec<_>>>()?;

        let electrolyte = ElectrolyteTransport::new(&cell);
        let layout = CellLayout::build(&electrolyte, &particles, cell.n_part);

        let mut volume_share = vec![0.0; particles.len()];
        for i in 0..cell.n_trode {
            let range = i * cell.n_part..(i + 1) * cell.n_part;
            let total: f64 = particles[range.clone()].iter().map(|p| p.volume()).sum();
            for k in range {
                volume_share[k] = particles[k].volume() / total;
            }
        }
        let total: f64 = particles.iter().map(|p| p.volume()).sum();
        let electrode_share = particles.iter().map(|p| p.volume() / total).collect();

        let description = format!(
            "{} scheme, {} thermodynamics, {} kinetics, {} separator + {} electrode volumes, {} particles per volume",
            material.scheme.name(),
            material.thermodynamics,
            material.kinetics,
            cell.n_sep,
            cell.n_trode,
            cell.n_part
        );
        info!(
            "built cell model: {} unknowns ({} differential), {}",
            layout.len(),
            layout.variables.differential_count(),
            description
        );

        Ok(Self { cell, particles, electrolyte, layout, volume_share, electrode_share, description })
    }

    pub fn layout(&self) -> &CellLayout {
        &self.layout
    }

    pub fn parameters(&self) -> &CellParameters {
        &self.cell
    }

    pub fn particles(&self) -> &[ParticleModel] {
        &self.particles
    }

    pub fn electrolyte(&self) -> &ElectrolyteTransport {
        &self.electrolyte
    }

    fn check(&self, y: usize, ydot: usize) -> ModelResult<()> {
        let expected = self.layout.len();
        for actual in [y, ydot] {
            if actual != expected {
                return Err(ModelError::StateLength { expected, actual });
            }
        }
        Ok(())
    }
}

impl DaeModel for CellModel {
    fn unknowns(&self) -> usize {
        self.layout.len()
    }

    fn equation_kinds(&self) -> &[EquationKind] {
        self.layout.variables.kinds()
    }

    fn variable_names(&self) -> &[String] {
        self.layout.variables.names()
    }

    fn initial_values(&self) -> DVector<f64> {
        let l = &self.layout;
        let cell = &self.cell;
        let mut y = DVector::zeros(l.len());

        for &k in &l.lyte_c {
            y[k] = 1.0;
        }
        for slots in &l.particles {
            for k in slots.c.clone() {
                y[k] = cell.cs0;
            }
            y[slots.cbar] = cell.cs0;
            if let Some(c2) = &slots.c2 {
                for k in c2.clone() {
                    y[k] = cell.cs0_2;
                }
            }
            if let Some(k) = slots.cbar2 {
                y[k] = cell.cs0_2;
            }
            if let Some(phi) = &slots.phi {
                for k in phi.clone() {
                    y[k] = cell.phi_cathode;
                }
            }
        }
        for v in &l.volumes {
            y[v.phi_solid] = cell.phi_cathode;
        }

        let two_species = self.particles.first().is_some_and(|p| p.species() == 2);
        y[l.ffrac] = if two_species { cell.cs0 + cell.cs0_2 } else { cell.cs0 };
        if let OperatingMode::Potentiostatic { potential } = cell.mode {
            y[l.phi_applied] = potential;
        }
        y
    }

    fn residual(&self, t: f64, y: &[f64], ydot: &[f64]) -> ModelResult<DVector<f64>> {
        self.check(y.len(), ydot.len())?;
        Ok(DVector::from_vec(self.evaluate(t, y, ydot)?))
    }

    fn residual_dual(&self, t: f64, y: &[Dual64], ydot: &[Dual64]) -> ModelResult<Vec<Dual64>> {
        self.check(y.len(), ydot.len())?;
        self.evaluate(t, y, ydot)
    }

    fn time_horizon(&self) -> Option<f64> {
        Some(self.cell.time_horizon)
    }

    fn name(&self) -> &str {
        "Porous intercalation electrode"
    }

    fn description(&self) -> Option<&str> {
        Some(&self.description)
    }
}
