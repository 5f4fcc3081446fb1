//! Placement of the cell's unknowns in the flat state vector
//!
//! Order: electrolyte cells (separator, then electrode), then for every
//! electrode volume its particles followed by the volume's reaction rate and
//! solid potential, then the three cell-level unknowns.

use std::ops::Range;

use crate::models::electrolyte::ElectrolyteTransport;
use crate::models::solid::ParticleModel;
use crate::physics::{EquationKind, VariableLayout};

/// Indices of one particle's unknowns
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSlots {
    pub c: Range<usize>,
    pub c2: Option<Range<usize>>,
    pub cbar: usize,
    pub cbar2: Option<usize>,
    pub phi: Option<Range<usize>>,
}

/// Indices of one electrode volume's coupling unknowns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeSlots {
    pub j_plus: usize,
    pub phi_solid: usize,
}

/// Complete index map of a cell model
#[derive(Debug, Clone)]
pub struct CellLayout {
    pub variables: VariableLayout,
    /// Electrolyte concentration, one per cell, separator first
    pub lyte_c: Vec<usize>,
    pub lyte_phi: Vec<usize>,
    /// Particles in `volume * n_part + slot` order
    pub particles: Vec<ParticleSlots>,
    pub volumes: Vec<VolumeSlots>,
    pub ffrac: usize,
    pub current: usize,
    pub phi_applied: usize,
}

impl CellLayout {
    pub fn build(electrolyte: &ElectrolyteTransport, particles: &[ParticleModel], n_part: usize) -> Self {
        use EquationKind::{Algebraic, Differential};

        let mut vars = VariableLayout::new();
        let n_sep = electrolyte.separator_volumes();
        let mut lyte_c = Vec::with_capacity(electrolyte.volumes());
        let mut lyte_phi = Vec::with_capacity(electrolyte.volumes());
        for k in 0..electrolyte.volumes() {
            let prefix = if k < n_sep { format!("lyte.sep.vol{k}") } else { format!("lyte.trode.vol{}", k - n_sep) };
            lyte_c.push(vars.push(format!("{prefix}.c"), Differential));
            lyte_phi.push(vars.push(format!("{prefix}.phi"), Algebraic));
        }

        let n_trode = electrolyte.volumes() - n_sep;
        let mut slots = Vec::with_capacity(particles.len());
        let mut volumes = Vec::with_capacity(n_trode);
        for i in 0..n_trode {
            for (j, particle) in particles[i * n_part..(i + 1) * n_part].iter().enumerate() {
                let prefix = format!("trode.vol{i}.part{j}.");
                let n = particle.nodes();
                let pair = particle.species() == 2;

                let c = vars.push_block(&format!("{prefix}c"), n, Differential);
                let c2 = pair.then(|| vars.push_block(&format!("{prefix}c2_"), n, Differential));
                let cbar = vars.push(format!("{prefix}cbar"), Algebraic);
                let cbar2 = pair.then(|| vars.push(format!("{prefix}cbar2"), Algebraic));
                let phi = particle
                    .has_surface_potential()
                    .then(|| vars.push_block(&format!("{prefix}phi"), n, Algebraic));
                slots.push(ParticleSlots { c, c2, cbar, cbar2, phi });
            }
            volumes.push(VolumeSlots {
                j_plus: vars.push(format!("trode.vol{i}.j_plus"), Algebraic),
                phi_solid: vars.push(format!("trode.vol{i}.phi_solid"), Algebraic),
            });
        }

        let ffrac = vars.push("cell.ffrac", Algebraic);
        let current = vars.push("cell.current", Algebraic);
        let phi_applied = vars.push("cell.phi_applied", Algebraic);

        Self { variables: vars, lyte_c, lyte_phi, particles: slots, volumes, ffrac, current, phi_applied }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
