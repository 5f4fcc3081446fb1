//! Cell-level parameters: geometry, electrolyte, cycling protocol
//!
//! All values are dimensional (SI) as they appear in a configuration file.
//! Non-dimensionalization happens in [`nondim`](crate::params::nondim).

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::params::constants::T_REF_DEFAULT;

/// Operating constraint applied to the cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CyclingProfile {
    /// Constant current at the given C-rate \[1/h\]
    #[serde(rename = "CC")]
    Galvanostatic { c_rate: f64 },

    /// Constant applied potential \[V\]
    #[serde(rename = "CV")]
    Potentiostatic { voltage: f64 },
}

impl Default for CyclingProfile {
    fn default() -> Self {
        CyclingProfile::Galvanostatic { c_rate: 1.0 }
    }
}

/// Separator and electrode geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellGeometry {
    /// Electrode thickness \[m\]
    pub l_trode: f64,
    /// Separator thickness \[m\]
    pub l_sep: f64,
    /// Electrode control volumes
    pub n_trode: usize,
    /// Separator control volumes; derived from the length ratio when absent
    pub n_sep: Option<usize>,
    /// Particle slots per electrode control volume
    pub n_part: usize,
    /// Electrode porosity
    pub porosity: f64,
    /// Separator porosity
    pub porosity_sep: f64,
    /// Volume fraction of active material in the solid phase
    pub loading: f64,
    /// Bruggeman exponent for effective transport
    pub bruggeman: f64,
}

impl Default for CellGeometry {
    fn default() -> Self {
        Self {
            l_trode: 50e-6,
            l_sep: 25e-6,
            n_trode: 10,
            n_sep: None,
            n_part: 2,
            porosity: 0.4,
            porosity_sep: 1.0,
            loading: 0.69,
            bruggeman: 1.5,
        }
    }
}

impl CellGeometry {
    /// Separator control volumes: explicit, or `ceil(l_sep / l_trode * n_trode)`
    ///
    /// A single-volume electrode without an explicit separator count gets no
    /// separator at all.
    pub fn separator_volumes(&self) -> usize {
        match self.n_sep {
            Some(n) => n,
            None if self.n_trode == 1 => 0,
            None => (self.l_sep / self.l_trode * self.n_trode as f64).ceil() as usize,
        }
    }
}

/// Binary electrolyte properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectrolyteProperties {
    /// Cation charge number
    pub zp: f64,
    /// Anion charge number (magnitude)
    pub zm: f64,
    /// Cation diffusivity \[m^2/s\]
    pub dp: f64,
    /// Anion diffusivity \[m^2/s\]
    pub dm: f64,
    /// Initial salt concentration \[mol/m^3\]
    pub c0: f64,
}

impl Default for ElectrolyteProperties {
    fn default() -> Self {
        Self { zp: 1.0, zm: 1.0, dp: 2.2e-10, dm: 2.94e-10, c0: 1000.0 }
    }
}

/// Particle size distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeDistribution {
    /// Mean particle length \[m\]
    pub mean: f64,
    /// Standard deviation \[m\]; zero gives a uniform population
    pub stddev: f64,
    /// Node spacing inside structured particles \[m\]
    pub solid_disc: f64,
    /// C3 particle thickness \[m\]
    pub thickness: f64,
    /// Seed of the random generator
    pub seed: u64,
}

impl Default for SizeDistribution {
    fn default() -> Self {
        Self { mean: 100e-9, stddev: 0.0, solid_disc: 10e-9, thickness: 20e-9, seed: 0 }
    }
}

/// Optional electronic conduction sub-models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductionOptions {
    /// Potential variation along particle surfaces
    pub surface: bool,
    /// Potential drop along the electrode solid matrix
    pub bulk: bool,
    /// Bulk matrix conductivity \[S/m\]
    pub bulk_conductivity: f64,
}

impl Default for ConductionOptions {
    fn default() -> Self {
        Self { surface: false, bulk: false, bulk_conductivity: 0.1 }
    }
}

/// Cell-level simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemParams {
    pub profile: CyclingProfile,
    /// Initial filling fraction of every particle
    pub cs0: f64,
    /// Initial filling fraction of the second species (two-species materials)
    pub cs0_2: f64,
    /// Target filling fraction defining the galvanostatic time horizon
    pub ff_end: f64,
    /// Explicit end time \[s\]; required for potentiostatic runs
    pub t_final: Option<f64>,
    /// Number of reported time intervals
    pub t_steps: usize,
    /// Absolute temperature \[K\]
    pub t_abs: f64,
    /// Reference temperature \[K\]
    pub t_ref: f64,
    pub geometry: CellGeometry,
    pub electrolyte: ElectrolyteProperties,
    pub psd: SizeDistribution,
    pub conduction: ConductionOptions,
}

impl Default for SystemParams {
    fn default() -> Self {
        Self {
            profile: CyclingProfile::default(),
            cs0: 0.01,
            cs0_2: 0.01,
            ff_end: 0.95,
            t_final: None,
            t_steps: 100,
            t_abs: T_REF_DEFAULT,
            t_ref: T_REF_DEFAULT,
            geometry: CellGeometry::default(),
            electrolyte: ElectrolyteProperties::default(),
            psd: SizeDistribution::default(),
            conduction: ConductionOptions::default(),
        }
    }
}

fn positive(name: &'static str, value: f64) -> ConfigResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::InvalidParameter { name, value, reason: "must be positive" });
    }
    Ok(())
}

fn fraction(name: &'static str, value: f64) -> ConfigResult<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(ConfigError::InvalidParameter { name, value, reason: "must lie in (0, 1)" });
    }
    Ok(())
}

impl SystemParams {
    /// Check numeric ranges
    pub fn validate(&self) -> ConfigResult<()> {
        let g = &self.geometry;
        positive("l_trode", g.l_trode)?;
        if g.l_sep < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "l_sep",
                value: g.l_sep,
                reason: "must not be negative",
            });
        }
        if g.n_trode == 0 {
            return Err(ConfigError::Invalid("electrode needs at least one control volume".into()));
        }
        if g.n_part == 0 {
            return Err(ConfigError::Invalid("each control volume needs at least one particle".into()));
        }
        if g.separator_volumes() > 0 {
            positive("l_sep", g.l_sep)?;
        }
        fraction("porosity", g.porosity)?;
        if !(g.porosity_sep > 0.0 && g.porosity_sep <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "porosity_sep",
                value: g.porosity_sep,
                reason: "must lie in (0, 1]",
            });
        }
        positive("loading", g.loading)?;
        positive("bruggeman", g.bruggeman)?;

        let e = &self.electrolyte;
        positive("zp", e.zp)?;
        positive("zm", e.zm)?;
        positive("dp", e.dp)?;
        positive("dm", e.dm)?;
        positive("c0", e.c0)?;

        positive("psd.mean", self.psd.mean)?;
        if self.psd.stddev < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "psd.stddev",
                value: self.psd.stddev,
                reason: "must not be negative",
            });
        }
        positive("psd.solid_disc", self.psd.solid_disc)?;
        positive("psd.thickness", self.psd.thickness)?;

        fraction("cs0", self.cs0)?;
        fraction("ff_end", self.ff_end)?;
        positive("t_abs", self.t_abs)?;
        positive("t_ref", self.t_ref)?;
        if self.t_steps == 0 {
            return Err(ConfigError::Invalid("t_steps must be at least 1".into()));
        }
        if self.conduction.bulk {
            positive("bulk_conductivity", self.conduction.bulk_conductivity)?;
        }

        match self.profile {
            CyclingProfile::Galvanostatic { c_rate } => {
                if c_rate == 0.0 && self.t_final.is_none() {
                    return Err(ConfigError::Invalid(
                        "a zero-current run needs an explicit t_final".into(),
                    ));
                }
            }
            CyclingProfile::Potentiostatic { .. } => {
                if self.t_final.is_none() {
                    return Err(ConfigError::Invalid("potentiostatic runs need an explicit t_final".into()));
                }
            }
        }
        if let Some(t) = self.t_final {
            positive("t_final", t)?;
        }
        Ok(())
    }
}
