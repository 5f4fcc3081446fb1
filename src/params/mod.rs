//! Parameter sets
//!
//! A simulation is described by two dimensional parameter blocks:
//!
//! - [`SystemParams`]: cell geometry, electrolyte, size distribution, cycling
//!   protocol, temperature
//! - [`MaterialParams`]: solid scheme, particle shape, model names and their
//!   coefficients
//!
//! Both deserialize from TOML (see [`ParameterSet::from_toml_str`]); every
//! field has a default, so a file only lists what differs.
//!
//! [`ParameterSet::validate`] checks numeric ranges and rejects incompatible
//! combinations of scheme, shape and options before any model is built.
//! [`nondim`] then produces the dimensionless tables the residuals use.

pub mod constants;
pub mod material;
pub mod nondim;
pub mod system;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

pub use material::{
    Extrapolation, MaterialParams, OcvFitParams, ParticleShape, PerSlot, SolidScheme, WettingBoundary,
};
pub use nondim::{CellParameters, OperatingMode, ParticleParameters, ReferenceScales, nondimensionalize};
pub use system::{
    CellGeometry, ConductionOptions, CyclingProfile, ElectrolyteProperties, SizeDistribution, SystemParams,
};

/// Complete dimensional description of a simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub system: SystemParams,
    pub material: MaterialParams,
}

impl ParameterSet {
    pub fn new(system: SystemParams, material: MaterialParams) -> Self {
        Self { system, material }
    }

    /// Parse a TOML document with `[system]` and `[material]` tables
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let params: Self = toml::from_str(text)?;
        Ok(params)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Invalid(format!("cannot read {}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&text)
    }

    /// Check numeric ranges and model compatibility
    pub fn validate(&self) -> ConfigResult<()> {
        self.system.validate()?;
        self.material.validate(self.system.geometry.n_part)?;
        check_compatibility(&self.system, &self.material)
    }
}

/// Reject scheme/shape/option combinations the formulation does not define
pub fn check_compatibility(system: &SystemParams, material: &MaterialParams) -> ConfigResult<()> {
    let scheme = material.scheme;
    let shape = material.shape;

    let shape_ok = match scheme {
        SolidScheme::ReactionLimited | SolidScheme::HomogeneousSized => shape == ParticleShape::C3,
        SolidScheme::RadialDiffusion => shape == ParticleShape::Sphere,
        SolidScheme::Homogeneous => true,
    };
    if !shape_ok {
        return Err(ConfigError::IncompatibleShape {
            scheme: scheme.name().to_string(),
            shape: shape.name().to_string(),
        });
    }

    if system.conduction.surface && scheme != SolidScheme::ReactionLimited {
        return Err(ConfigError::IncompatibleScheme {
            feature: "surface conduction",
            required: "ACR",
            actual: scheme.name().to_string(),
        });
    }

    if material.ocv_fit.is_some() && scheme != SolidScheme::RadialDiffusion {
        return Err(ConfigError::IncompatibleScheme {
            feature: "an open-circuit fit",
            required: "diffn",
            actual: scheme.name().to_string(),
        });
    }

    if scheme == SolidScheme::HomogeneousSized
        && (system.t_abs != constants::T_REF_DEFAULT || system.t_ref != constants::T_REF_DEFAULT)
    {
        return Err(ConfigError::TemperatureOutOfRange {
            model: "size-dependent regular solution",
            reference: constants::T_REF_DEFAULT,
            t_abs: system.t_abs,
            t_ref: system.t_ref,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_is_valid() {
        assert!(ParameterSet::default().validate().is_ok());
    }

    #[test]
    fn test_radial_diffusion_requires_sphere() {
        let material = MaterialParams {
            scheme: SolidScheme::RadialDiffusion,
            shape: ParticleShape::C3,
            ..Default::default()
        };
        let err = check_compatibility(&SystemParams::default(), &material).unwrap_err();
        assert!(matches!(err, ConfigError::IncompatibleShape { .. }));
    }

    #[test]
    fn test_surface_conduction_requires_acr() {
        let mut system = SystemParams::default();
        system.conduction.surface = true;
        let material = MaterialParams { scheme: SolidScheme::Homogeneous, ..Default::default() };
        let err = check_compatibility(&system, &material).unwrap_err();
        assert!(err.to_string().contains("surface conduction"));
    }

    #[test]
    fn test_toml_round_trip_of_partial_file() {
        let text = r#"
            [system]
            cs0 = 0.05
            profile = { type = "CC", c_rate = 2.0 }

            [system.geometry]
            n_trode = 3
            n_part = 2

            [material]
            scheme = "homog"
            kinetics = "Marcus"
            k0 = [0.1, 0.2]
        "#;
        let params = ParameterSet::from_toml_str(text).unwrap();
        assert_eq!(params.system.cs0, 0.05);
        assert_eq!(params.system.geometry.n_trode, 3);
        assert_eq!(params.system.profile, CyclingProfile::Galvanostatic { c_rate: 2.0 });
        assert_eq!(params.material.scheme, SolidScheme::Homogeneous);
        assert_eq!(params.material.k0.at(1), 0.2);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let err = ParameterSet::from_toml_str("[system\ncs0 = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
