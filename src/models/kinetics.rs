//! Interfacial reaction kinetics
//!
//! A kinetics model gives the net reduction rate at a particle surface as a
//! function of the overpotential `eta` (reduced minus oxidized
//! electrochemical potential, in units of `k T_ref / e`), the local
//! concentrations and the reduced-state activity.
//!
//! All variants share the driving-force split
//!
//! ```text
//! exp(-alpha eta / T) - exp((1 - alpha) eta / T)
//! ```
//!
//! so every rate is exactly zero at `eta = 0` and has the sign of `-eta`.
//!
//! | Name     | Exchange current                                          |
//! |----------|-----------------------------------------------------------|
//! | `BV`     | `k0 c_lyte^(1-a) act_R^a (1 - c)`                         |
//! | `BV_mod01` | `k0 c_lyte^(1-a) (1 - c)^(1-a) c^a exp(E_A - E_A/T)`    |
//! | `Marcus` | `k0 exp(-lambda/4T) c_lyte^((3-2a)/4) c^((1+2a)/4)`, a(c) |
//! | `ICET`   | `k0 c_lyte^(1-a) c^a (1 - c - c_other) exp(E_A - E_A/T)`  |

use crate::error::{ConfigError, ConfigResult};
use crate::params::{MaterialParams, ReferenceScales};
use crate::physics::{Scalar, lift, one_minus, pow};

/// Registered kinetics model names
pub const KINETICS: &[&str] = &["BV", "BV_mod01", "Marcus", "ICET"];

/// Local state at one reacting node
#[derive(Debug, Clone, Copy)]
pub struct ReactionInputs<D> {
    /// Overpotential
    pub eta: D,
    /// Solid concentration of the reacting species
    pub c_sld: D,
    /// Solid concentration of the other species (zero for one-species materials)
    pub c_other: D,
    /// Electrolyte concentration
    pub c_lyte: D,
    /// Activity of the reduced state
    pub act_r: D,
    /// Rate constant
    pub k0: f64,
    /// Temperature
    pub t: f64,
}

/// Reaction kinetics, resolved by name at build time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kinetics {
    ButlerVolmer { alpha: f64 },
    /// Butler-Volmer with a concentration-only exchange current and Arrhenius activation
    ButlerVolmerMod01 { alpha: f64, activation: f64 },
    Marcus { lambda: f64 },
    Icet { alpha: f64, activation: f64 },
}

fn split<D: Scalar>(eta: D, alpha: D, t: f64) -> D {
    (-alpha * eta / t).exp() - (one_minus(alpha) * eta / t).exp()
}

fn bv_current<D: Scalar>(alpha: f64, inp: &ReactionInputs<D>) -> D {
    inp.c_lyte.powf(1.0 - alpha) * inp.act_r.powf(alpha) * one_minus(inp.c_sld) * inp.k0
}

fn mod01_current<D: Scalar>(alpha: f64, activation: f64, inp: &ReactionInputs<D>) -> D {
    let arrhenius = (activation - activation / inp.t).exp();
    inp.c_lyte.powf(1.0 - alpha)
        * one_minus(inp.c_sld).powf(1.0 - alpha)
        * inp.c_sld.powf(alpha)
        * (inp.k0 * arrhenius)
}

impl Kinetics {
    /// Build from the material's registry name
    pub fn resolve(material: &MaterialParams, scales: &ReferenceScales) -> ConfigResult<Self> {
        match material.kinetics.as_str() {
            "BV" => Ok(Kinetics::ButlerVolmer { alpha: material.alpha }),
            "BV_mod01" => Ok(Kinetics::ButlerVolmerMod01 {
                alpha: material.alpha,
                activation: scales.energy(material.activation_energy),
            }),
            "Marcus" => Ok(Kinetics::Marcus { lambda: scales.energy(material.lambda) }),
            "ICET" => Ok(Kinetics::Icet {
                alpha: material.alpha,
                activation: scales.energy(material.activation_energy),
            }),
            other => Err(ConfigError::UnknownModel { kind: "kinetics", name: other.to_string() }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kinetics::ButlerVolmer { .. } => "BV",
            Kinetics::ButlerVolmerMod01 { .. } => "BV_mod01",
            Kinetics::Marcus { .. } => "Marcus",
            Kinetics::Icet { .. } => "ICET",
        }
    }

    /// Net reduction rate
    pub fn rate<D: Scalar>(&self, inp: &ReactionInputs<D>) -> D {
        let t = inp.t;
        match *self {
            Kinetics::ButlerVolmer { alpha } => bv_current(alpha, inp) * split(inp.eta, lift(alpha), t),
            Kinetics::ButlerVolmerMod01 { alpha, activation } => {
                mod01_current(alpha, activation, inp) * split(inp.eta, lift(alpha), t)
            }
            Kinetics::Marcus { lambda } => {
                let alpha = ((inp.c_lyte / inp.c_sld).ln() * (t / lambda) + 1.0) * 0.5;
                let ecd = pow(inp.c_lyte, (-alpha * 2.0 + 3.0) / 4.0)
                    * pow(inp.c_sld, (alpha * 2.0 + 1.0) / 4.0)
                    * (inp.k0 * (-lambda / (4.0 * t)).exp());
                let reorganization = (-inp.eta * inp.eta / (4.0 * t * lambda)).exp();
                ecd * reorganization * split(inp.eta, alpha, t)
            }
            Kinetics::Icet { alpha, activation } => {
                let arrhenius = (activation - activation / t).exp();
                let ecd = inp.c_lyte.powf(1.0 - alpha)
                    * inp.c_sld.powf(alpha)
                    * (one_minus(inp.c_sld) - inp.c_other)
                    * (inp.k0 * arrhenius);
                ecd * split(inp.eta, lift(alpha), t)
            }
        }
    }

    /// Analytic `d rate / d eta` of the Butler-Volmer variants
    ///
    /// Returns `None` for the other variants, whose transfer coefficient or
    /// prefactor depends on `eta`.
    pub fn rate_sensitivity<D: Scalar>(&self, inp: &ReactionInputs<D>) -> Option<D> {
        let (alpha, ecd) = match *self {
            Kinetics::ButlerVolmer { alpha } => (alpha, bv_current(alpha, inp)),
            Kinetics::ButlerVolmerMod01 { alpha, activation } => (alpha, mod01_current(alpha, activation, inp)),
            Kinetics::Marcus { .. } | Kinetics::Icet { .. } => return None,
        };
        let t = inp.t;
        let d_split = (inp.eta * (-alpha / t)).exp() * (-alpha / t)
            - (inp.eta * ((1.0 - alpha) / t)).exp() * ((1.0 - alpha) / t);
        Some(ecd * d_split)
    }
}
