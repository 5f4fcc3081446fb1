//! Active-material parameters
//!
//! A [`MaterialParams`] block describes the particles hosted by the electrode:
//! which solid scheme resolves them, which thermodynamic and kinetic models
//! (looked up by name in the registries of [`crate::models`]) apply, and the
//! dimensional coefficients those models need.
//!
//! Coefficients that may differ between particle slots use [`PerSlot`]: a
//! scalar applies to every slot, an array is indexed by slot.
//!
//! ```toml
//! [material]
//! scheme = "ACR"
//! shape = "C3"
//! thermodynamics = "reg_sln"
//! kinetics = "BV"
//! k0 = [0.16, 0.32]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// =================================================================================================
// Enumerations
// =================================================================================================

/// Particle-level discretization scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolidScheme {
    /// Reaction-limited, one reaction per node along the particle surface
    #[serde(rename = "ACR")]
    ReactionLimited,
    /// Single lumped node
    #[serde(rename = "homog")]
    Homogeneous,
    /// Single lumped node, regular-solution parameter derived from size
    #[serde(rename = "homog_sdn")]
    HomogeneousSized,
    /// Radial solid diffusion in a sphere
    #[serde(rename = "diffn")]
    RadialDiffusion,
}

impl SolidScheme {
    pub fn name(self) -> &'static str {
        match self {
            SolidScheme::ReactionLimited => "ACR",
            SolidScheme::Homogeneous => "homog",
            SolidScheme::HomogeneousSized => "homog_sdn",
            SolidScheme::RadialDiffusion => "diffn",
        }
    }

    /// Whether particles carry an internal profile (more than one node)
    pub fn is_structured(self) -> bool {
        matches!(self, SolidScheme::ReactionLimited | SolidScheme::RadialDiffusion)
    }
}

/// Particle shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleShape {
    #[serde(rename = "sphere")]
    Sphere,
    #[serde(rename = "C3")]
    C3,
}

impl ParticleShape {
    pub fn name(self) -> &'static str {
        match self {
            ParticleShape::Sphere => "sphere",
            ParticleShape::C3 => "C3",
        }
    }
}

/// Ghost-node rule of the gradient-energy term at the particle ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WettingBoundary {
    /// Ghost nodes pinned to a wetting concentration
    Fixed { c_wet: f64 },
    /// Ghost nodes offset by a prescribed surface flux `dx * beta`
    Flux { beta: f64, beta_2: f64 },
    /// Two-species natural boundary, flux scaled by local vacancy fraction
    Natural { beta: f64, beta_2: f64 },
}

impl Default for WettingBoundary {
    fn default() -> Self {
        WettingBoundary::Fixed { c_wet: 0.98 }
    }
}

/// Out-of-range behaviour of a tabulated open-circuit fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    /// Evaluating outside the table is an error
    #[default]
    Error,
    /// Clamp to the end values (zero slope outside)
    Clamp,
    /// Extend the end segments linearly
    Linear,
}

/// Empirical open-circuit fit `delta_phi_eq(c_surf)` given as a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcvFitParams {
    pub name: String,
    /// Filling fractions, strictly increasing
    pub filling: Vec<f64>,
    /// Open-circuit potential at each filling fraction \[V\]
    pub voltage: Vec<f64>,
    #[serde(default)]
    pub extrapolation: Extrapolation,
}

// =================================================================================================
// Per-slot values
// =================================================================================================

/// A coefficient shared by every particle slot or given slot by slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerSlot {
    Uniform(f64),
    Slots(Vec<f64>),
}

impl PerSlot {
    /// Value for a slot
    ///
    /// Call [`check`](PerSlot::check) first; an out-of-range slot falls back
    /// to the last entry.
    pub fn at(&self, slot: usize) -> f64 {
        match self {
            PerSlot::Uniform(v) => *v,
            PerSlot::Slots(values) => values.get(slot).or(values.last()).copied().unwrap_or(f64::NAN),
        }
    }

    /// Check an array has exactly one entry per slot
    pub fn check(&self, name: &'static str, slots: usize) -> ConfigResult<()> {
        if let PerSlot::Slots(values) = self
            && values.len() != slots
        {
            return Err(ConfigError::SlotCount { name, expected: slots, actual: values.len() });
        }
        Ok(())
    }

    fn values(&self) -> Vec<f64> {
        match self {
            PerSlot::Uniform(v) => vec![*v],
            PerSlot::Slots(values) => values.clone(),
        }
    }
}

impl From<f64> for PerSlot {
    fn from(value: f64) -> Self {
        PerSlot::Uniform(value)
    }
}

// =================================================================================================
// Material parameters
// =================================================================================================

/// Active-material parameters (dimensional)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialParams {
    pub scheme: SolidScheme,
    pub shape: ParticleShape,
    /// Thermodynamic registry name
    pub thermodynamics: String,
    /// Kinetics registry name
    pub kinetics: String,
    /// Site density \[1/m^3\]
    pub rhos: f64,
    /// Regular-solution parameter \[J\]
    pub omega_a: PerSlot,
    /// Secondary interaction parameters \[J\]
    pub omega_b: f64,
    pub omega_c: f64,
    /// Van der Waals energy of layered two-species materials \[J\]
    pub e_vdw: f64,
    /// Gradient-energy coefficient \[J/m\]
    pub kappa: PerSlot,
    /// Gradient coefficient of the second species \[J/m\]; defaults to `kappa`
    pub kappa_2: Option<f64>,
    /// Cross-gradient coefficient \[J/m\]
    pub kappa_12: f64,
    /// Coherency-strain coefficient \[J/m^3\]
    pub b: f64,
    /// Coherency-strain coefficient of the second species; defaults to `b`
    pub b_2: Option<f64>,
    /// Exchange rate constant \[A/m^2\]
    pub k0: PerSlot,
    /// Symmetry factor
    pub alpha: f64,
    /// Marcus reorganization energy \[J\]
    pub lambda: f64,
    /// Activation energy \[J\]
    pub activation_energy: f64,
    /// Solid diffusivity \[m^2/s\]
    pub ds: PerSlot,
    /// Surface conductivity \[S\]
    pub scond: f64,
    pub wetting: WettingBoundary,
    /// Two-sublattice interaction series of species 1 and 2 (units of kT_ref)
    pub l_series_1: Vec<f64>,
    pub l_series_2: Vec<f64>,
    /// Reference potentials of the two species \[V\]
    pub v_theta: [f64; 2],
    /// Constant offset added to every chemical potential (units of kT_ref)
    pub mu_ref: f64,
    /// Empirical open-circuit fit used by radial-diffusion particles
    pub ocv_fit: Option<OcvFitParams>,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            scheme: SolidScheme::ReactionLimited,
            shape: ParticleShape::C3,
            thermodynamics: "reg_sln".into(),
            kinetics: "BV".into(),
            rhos: 1.3793e28,
            omega_a: PerSlot::Uniform(1.8560e-20),
            omega_b: 0.0,
            omega_c: 0.0,
            e_vdw: 0.0,
            kappa: PerSlot::Uniform(5.0148e-10),
            kappa_2: None,
            kappa_12: 0.0,
            b: 0.1916e9,
            b_2: None,
            k0: PerSlot::Uniform(1.6e-1),
            alpha: 0.5,
            lambda: 3.4113e-20,
            activation_energy: 0.0,
            ds: PerSlot::Uniform(1e-14),
            scond: 1e-4,
            wetting: WettingBoundary::default(),
            l_series_1: vec![3.970_345_83, 0.096_736_99, 1.110_372_91, -0.154_447_68],
            l_series_2: vec![0.945_026_46, 8.021_367_36, 5.354_209_82, -15.212_643_46, -4.008_179_0, 7.622_953_59],
            v_theta: [0.208, 0.06],
            mu_ref: 0.0,
            ocv_fit: None,
        }
    }
}

impl MaterialParams {
    /// Check numeric ranges and per-slot array lengths
    pub fn validate(&self, slots: usize) -> ConfigResult<()> {
        self.omega_a.check("omega_a", slots)?;
        self.kappa.check("kappa", slots)?;
        self.k0.check("k0", slots)?;
        self.ds.check("ds", slots)?;

        if !(self.rhos > 0.0) {
            return Err(ConfigError::InvalidParameter { name: "rhos", value: self.rhos, reason: "must be positive" });
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "alpha",
                value: self.alpha,
                reason: "must lie in (0, 1)",
            });
        }
        if self.kinetics == "Marcus" && !(self.lambda > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "lambda",
                value: self.lambda,
                reason: "Marcus kinetics needs a positive reorganization energy",
            });
        }
        for k0 in self.k0.values() {
            if !(k0 > 0.0) {
                return Err(ConfigError::InvalidParameter { name: "k0", value: k0, reason: "must be positive" });
            }
        }
        if self.scheme == SolidScheme::RadialDiffusion {
            for ds in self.ds.values() {
                if !(ds > 0.0) {
                    return Err(ConfigError::InvalidParameter { name: "ds", value: ds, reason: "must be positive" });
                }
            }
        }
        if let WettingBoundary::Fixed { c_wet } = self.wetting
            && !(c_wet > 0.0 && c_wet < 1.0)
        {
            return Err(ConfigError::InvalidParameter {
                name: "c_wet",
                value: c_wet,
                reason: "must lie in (0, 1)",
            });
        }
        Ok(())
    }

    /// Gradient coefficient of the second species
    pub fn kappa_second(&self, slot: usize) -> f64 {
        self.kappa_2.unwrap_or_else(|| self.kappa.at(slot))
    }

    /// Strain coefficient of the second species
    pub fn b_second(&self) -> f64 {
        self.b_2.unwrap_or(self.b)
    }
}
