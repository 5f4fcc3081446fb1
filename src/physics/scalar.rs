//! Scalar abstraction for residual formulas
//!
//! Every formula in the crate is written once, generic over [`Scalar`], and
//! evaluated either on plain `f64` (residual values) or on
//! [`num_dual::Dual64`] (residual values plus directional derivatives, used to
//! assemble Jacobians without hand-written derivatives).
//!
//! `Scalar` is a blanket alias over [`DualNum<f64>`]; nothing needs to
//! implement it explicitly.
//!
//! # Writing generic formulas
//!
//! Operator overloads exist for `D op f64` but not for `f64 op D`, so
//! constants go on the right: `y * 2.0`, `-y + 1.0`. Comparisons and
//! branching use the real part, [`DualNum::re`].

use num_dual::DualNum;

/// Numeric type a residual can be evaluated on
pub trait Scalar: DualNum<f64> + Copy + Send + Sync {}

impl<T> Scalar for T where T: DualNum<f64> + Copy + Send + Sync {}

/// Lift a constant into the scalar type
#[inline]
pub fn lift<D: Scalar>(value: f64) -> D {
    D::from(value)
}

/// `1 - y`
#[inline]
pub fn one_minus<D: Scalar>(y: D) -> D {
    -y + 1.0
}

/// `x^p` for a scalar exponent, via `exp(p ln x)`
#[inline]
pub fn pow<D: Scalar>(base: D, exponent: D) -> D {
    (base.ln() * exponent).exp()
}

/// Arithmetic mean of neighbouring entries (face values of a cell field)
pub fn mean_linear<D: Scalar>(values: &[D]) -> Vec<D> {
    values.windows(2).map(|w| (w[0] + w[1]) * 0.5).collect()
}

/// Forward difference `v[i+1] - v[i]`
pub fn diff<D: Scalar>(values: &[D]) -> Vec<D> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Sum of a slice
pub fn sum<D: Scalar>(values: &[D]) -> D {
    values.iter().copied().sum()
}
