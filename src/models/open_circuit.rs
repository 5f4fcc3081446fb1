//! Open-circuit potential fits
//!
//! Radial-diffusion particles can take their equilibrium potential drop from
//! an empirical fit of the open-circuit potential against the surface
//! filling fraction instead of the dilute-solution expression.
//!
//! A fit is any [`OpenCircuitFit`]: a plain `f64` function returning value
//! and slope. [`fitted_potential`] lifts it onto a [`Scalar`] with the chain
//! rule, so fits never need to be generic themselves.
//!
//! [`TabulatedFit`] interpolates a table linearly and remembers its last
//! lookup, which a Jacobian assembly hits once per column.

use std::sync::Mutex;

use crate::error::{ConfigError, ConfigResult, ModelError, ModelResult};
use crate::params::{Extrapolation, OcvFitParams, ReferenceScales};
use crate::physics::{Scalar, lift};

/// Equilibrium potential as a function of filling fraction
pub trait OpenCircuitFit: Send + Sync + std::fmt::Debug {
    /// Dimensionless potential and its slope at `y`
    fn evaluate(&self, y: f64) -> ModelResult<(f64, f64)>;

    fn name(&self) -> &str;
}

/// Evaluate a fit on any scalar, propagating derivatives through the slope
pub fn fitted_potential<D: Scalar>(fit: &dyn OpenCircuitFit, y: D) -> ModelResult<D> {
    let re = y.re();
    let (value, slope) = fit.evaluate(re)?;
    Ok((y - re) * slope + lift::<D>(value))
}

/// Piecewise-linear fit through tabulated points
#[derive(Debug)]
pub struct TabulatedFit {
    name: String,
    filling: Vec<f64>,
    potential: Vec<f64>,
    extrapolation: Extrapolation,
    last: Mutex<Option<(u64, (f64, f64))>>,
}

impl TabulatedFit {
    /// Build from strictly increasing filling fractions and dimensionless potentials
    pub fn new(
        name: impl Into<String>,
        filling: Vec<f64>,
        potential: Vec<f64>,
        extrapolation: Extrapolation,
    ) -> ConfigResult<Self> {
        if filling.len() < 2 || filling.len() != potential.len() {
            return Err(ConfigError::Invalid(format!(
                "open-circuit table needs at least two points with matching columns, got {} and {}",
                filling.len(),
                potential.len()
            )));
        }
        if filling.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ConfigError::Invalid("open-circuit filling fractions must be strictly increasing".into()));
        }
        Ok(Self { name: name.into(), filling, potential, extrapolation, last: Mutex::new(None) })
    }

    /// Build from a dimensional table (volts), converting with the reference scales
    ///
    /// The potentials are measured from their value at `reference_filling`,
    /// so a cell starting there begins at zero equilibrium drop.
    pub fn from_params(
        params: &OcvFitParams,
        scales: &ReferenceScales,
        reference_filling: f64,
    ) -> ConfigResult<Self> {
        let potential = params.voltage.iter().map(|&v| scales.potential(v)).collect();
        Self::new(params.name.clone(), params.filling.clone(), potential, params.extrapolation)?
            .referenced_to(reference_filling)
    }

    /// Shift every potential so the fit vanishes at `filling`
    pub fn referenced_to(mut self, filling: f64) -> ConfigResult<Self> {
        let (offset, _) = self.interpolate(filling).map_err(|_| {
            ConfigError::Invalid(format!(
                "open-circuit fit '{}' does not cover the reference filling fraction {filling}",
                self.name
            ))
        })?;
        for v in &mut self.potential {
            *v -= offset;
        }
        Ok(self)
    }

    fn segment(&self, k: usize, y: f64) -> (f64, f64) {
        let (x0, x1) = (self.filling[k], self.filling[k + 1]);
        let (v0, v1) = (self.potential[k], self.potential[k + 1]);
        let slope = (v1 - v0) / (x1 - x0);
        (v0 + slope * (y - x0), slope)
    }

    fn interpolate(&self, y: f64) -> ModelResult<(f64, f64)> {
        let n = self.filling.len();
        let (lower, upper) = (self.filling[0], self.filling[n - 1]);
        if y.is_nan() {
            return Ok((f64::NAN, f64::NAN));
        }
        if y < lower || y > upper {
            return match self.extrapolation {
                Extrapolation::Error => {
                    Err(ModelError::OutOfDomain { fit: self.name.clone(), value: y, lower, upper })
                }
                Extrapolation::Clamp if y < lower => Ok((self.potential[0], 0.0)),
                Extrapolation::Clamp => Ok((self.potential[n - 1], 0.0)),
                Extrapolation::Linear if y < lower => Ok(self.segment(0, y)),
                Extrapolation::Linear => Ok(self.segment(n - 2, y)),
            };
        }
        // first k with filling[k + 1] >= y
        let k = self.filling[1..].partition_point(|&x| x < y).min(n - 2);
        Ok(self.segment(k, y))
    }
}

impl OpenCircuitFit for TabulatedFit {
    fn evaluate(&self, y: f64) -> ModelResult<(f64, f64)> {
        let key = y.to_bits();
        if let Ok(last) = self.last.lock()
            && let Some((bits, value)) = *last
            && bits == key
        {
            return Ok(value);
        }
        let value = self.interpolate(y)?;
        if let Ok(mut last) = self.last.lock() {
            *last = Some((key, value));
        }
        Ok(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
