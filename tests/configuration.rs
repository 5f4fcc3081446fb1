//! Parameter loading and rejection of incompatible cells

use intercal_rs::error::{ConfigError, ModelError};
use intercal_rs::models::CellModel;
use intercal_rs::params::{Extrapolation, OcvFitParams, ParameterSet, ParticleShape, SolidScheme};
use intercal_rs::physics::DaeModel;

mod common;

// ── helpers ──

fn build_error(params: &ParameterSet) -> ConfigError {
    CellModel::new(params).expect_err("cell should be rejected")
}

fn table(extrapolation: Extrapolation) -> OcvFitParams {
    OcvFitParams {
        name: "LFP".into(),
        filling: vec![0.2, 0.5, 0.8],
        voltage: vec![3.5, 3.42, 3.3],
        extrapolation,
    }
}

#[test]
fn test_complete_toml_file_builds() {
    let text = r#"
        [system]
        cs0 = 0.02
        profile = { type = "CC", c_rate = 0.5 }

        [system.geometry]
        n_trode = 4
        n_sep = 2
        n_part = 3

        [system.psd]
        mean = 80e-9
        stddev = 10e-9
        seed = 11

        [material]
        scheme = "ACR"
        thermodynamics = "reg_sln"
        kinetics = "BV"
        k0 = [0.1, 0.2, 0.3]
    "#;
    let params = ParameterSet::from_toml_str(text).unwrap();
    let model = CellModel::new(&params).unwrap();
    assert_eq!(model.parameters().n_sep, 2);
    assert_eq!(model.particles().len(), 12);
    assert!(model.variable_names().iter().any(|n| n == "trode.vol3.part2.cbar"));
    assert!(model.time_horizon().unwrap() > 0.0);
}

#[test]
fn test_same_seed_builds_same_cell() {
    let mut params = common::single_particle_cell();
    params.system.geometry.n_trode = 3;
    params.system.geometry.n_part = 2;
    params.system.psd.stddev = 20e-9;
    params.system.psd.seed = 5;
    let a = CellModel::new(&params).unwrap();
    let b = CellModel::new(&params).unwrap();
    let volumes = |m: &CellModel| m.particles().iter().map(|p| p.volume()).collect::<Vec<_>>();
    assert_eq!(volumes(&a), volumes(&b));
}

#[test]
fn test_radial_diffusion_on_c3_particle_is_rejected() {
    let mut params = common::radial_cell();
    params.material.shape = ParticleShape::C3;
    assert!(matches!(build_error(&params), ConfigError::IncompatibleShape { .. }));
}

#[test]
fn test_reaction_limited_sphere_is_rejected() {
    let mut params = common::cell_at_rest();
    params.material.shape = ParticleShape::Sphere;
    assert!(matches!(build_error(&params), ConfigError::IncompatibleShape { .. }));
}

#[test]
fn test_surface_conduction_outside_acr_is_rejected() {
    let mut params = common::single_particle_cell();
    params.system.conduction.surface = true;
    let err = build_error(&params);
    assert!(matches!(err, ConfigError::IncompatibleScheme { required: "ACR", .. }), "{err}");
}

#[test]
fn test_open_circuit_fit_outside_radial_scheme_is_rejected() {
    let mut params = common::single_particle_cell();
    params.material.ocv_fit = Some(table(Extrapolation::Error));
    let err = build_error(&params);
    assert!(matches!(err, ConfigError::IncompatibleScheme { required: "diffn", .. }), "{err}");
}

#[test]
fn test_two_species_material_cannot_diffuse_radially() {
    let mut params = common::radial_cell();
    params.material.thermodynamics = "graphite_2param".into();
    let err = build_error(&params);
    assert!(matches!(err, ConfigError::IncompatibleScheme { feature: "two-species thermodynamics", .. }), "{err}");
}

#[test]
fn test_size_dependent_solution_away_from_reference_temperature() {
    let mut params = common::cell_at_rest();
    params.material.scheme = SolidScheme::HomogeneousSized;
    params.system.t_abs = 310.0;
    assert!(matches!(build_error(&params), ConfigError::TemperatureOutOfRange { .. }));
}

#[test]
fn test_unknown_registry_names() {
    let mut params = common::single_particle_cell();
    params.material.kinetics = "Tafel".into();
    let err = build_error(&params);
    assert!(matches!(err, ConfigError::UnknownModel { kind: "kinetics", ref name } if name == "Tafel"));

    let mut params = common::single_particle_cell();
    params.material.thermodynamics = "no_such_solution".into();
    assert!(matches!(build_error(&params), ConfigError::UnknownModel { kind: "thermodynamic", .. }));
}

#[test]
fn test_invalid_numbers() {
    let mut params = common::single_particle_cell();
    params.material.alpha = 1.2;
    assert!(matches!(build_error(&params), ConfigError::InvalidParameter { name: "alpha", .. }));

    let mut params = common::single_particle_cell();
    params.system.geometry.porosity = 0.0;
    assert!(matches!(build_error(&params), ConfigError::InvalidParameter { name: "porosity", .. }));
}

#[test]
fn test_potentiostatic_run_needs_end_time() {
    let mut params = common::single_particle_cell();
    params.system.profile = intercal_rs::params::CyclingProfile::Potentiostatic { voltage: 3.4 };
    params.system.t_final = None;
    assert!(matches!(build_error(&params), ConfigError::Invalid(_)));
}

#[test]
fn test_fit_must_cover_initial_filling() {
    let mut params = common::radial_cell();
    // particles start at 0.01, below the first tabulated filling
    params.material.ocv_fit = Some(table(Extrapolation::Error));
    let err = build_error(&params);
    assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("LFP")), "{err}");
}

#[test]
fn test_tabulated_fit_fails_outside_its_domain() {
    let mut params = common::radial_cell();
    params.material.ocv_fit = Some(OcvFitParams {
        filling: vec![0.0, 0.5, 0.9],
        voltage: vec![3.5, 3.42, 3.35],
        ..table(Extrapolation::Error)
    });
    let model = CellModel::new(&params).unwrap();
    let mut y = model.initial_values();
    let surface = model.particles()[0].nodes() - 1;
    let k = model.variable_names().iter().position(|n| *n == format!("trode.vol0.part0.c{surface}")).unwrap();
    y[k] = 0.95;
    let ydot = vec![0.0; y.len()];
    let err = model.residual(0.0, y.as_slice(), &ydot).unwrap_err();
    assert!(matches!(err, ModelError::OutOfDomain { ref fit, upper, .. } if fit == "LFP" && upper == 0.9));
}

#[test]
fn test_clamped_fit_evaluates_everywhere() {
    let mut params = common::radial_cell();
    params.material.ocv_fit = Some(table(Extrapolation::Clamp));
    let model = CellModel::new(&params).unwrap();
    let y = model.initial_values();
    let ydot = vec![0.0; y.len()];
    let res = model.residual(0.0, y.as_slice(), &ydot).unwrap();
    assert!(res.iter().all(|r| r.is_finite()));
}
