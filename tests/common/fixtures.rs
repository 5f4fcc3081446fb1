//! Parameter sets shared by the integration tests

use intercal_rs::params::{
    CyclingProfile, MaterialParams, ParameterSet, ParticleShape, PerSlot, SolidScheme, SystemParams,
};

fn system(n_trode: usize, n_part: usize) -> SystemParams {
    let mut system = SystemParams::default();
    system.geometry.n_trode = n_trode;
    system.geometry.n_part = n_part;
    system
}

/// One homogeneous particle, Butler-Volmer, ideal solution, 1C from 0.01
pub fn single_particle_cell() -> ParameterSet {
    let mut system = system(1, 1);
    system.profile = CyclingProfile::Galvanostatic { c_rate: 1.0 };
    system.cs0 = 0.01;
    let material = MaterialParams {
        scheme: SolidScheme::Homogeneous,
        thermodynamics: "ideal_sln".into(),
        kinetics: "BV".into(),
        ..Default::default()
    };
    ParameterSet::new(system, material)
}

/// Two separator volumes and one electrode volume, no current
pub fn cell_at_rest() -> ParameterSet {
    let mut system = system(1, 1);
    system.geometry.n_sep = Some(2);
    system.profile = CyclingProfile::Galvanostatic { c_rate: 0.0 };
    system.t_final = Some(100.0);
    ParameterSet::new(system, MaterialParams::default())
}

/// One radially diffusing sphere with fast solid diffusion
pub fn radial_cell() -> ParameterSet {
    let mut system = system(1, 1);
    system.psd.mean = 100e-9;
    let mut params = ParameterSet::new(system, MaterialParams::default());
    params.material.scheme = SolidScheme::RadialDiffusion;
    params.material.shape = ParticleShape::Sphere;
    params.material.ds = PerSlot::Uniform(1e-10);
    params
}
