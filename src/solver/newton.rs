//! Newton iteration and dual-number Jacobians
//!
//! Every implicit stage of the solver reduces to `G(x) = 0` for some vector
//! `x` assembled from the model's `y` and `dy/dt`. [`Newton`] drives such a
//! system to zero with a dense LU factorization and a backtracking line
//! search; [`dual_jacobian`] builds `dG/dx` column by column from the model's
//! dual-number residual.
//!
//! # Column seeds
//!
//! Column `j` of the Jacobian is obtained by evaluating the residual with
//! derivative part `sy` on `y[j]` and `sd` on `dy/dt[j]`, where
//! `(sy, sd) = seed(j)`:
//!
//! | Stage                      | Differential `j` | Algebraic `j` |
//! |----------------------------|------------------|---------------|
//! | Consistent initialization  | `(0, 1)`         | `(1, 0)`      |
//! | Backward Euler, step `h`   | `(1, 1/h)`       | `(1, 1/h)`    |

use nalgebra::{DMatrix, DVector};
use num_dual::Dual64;
use thiserror::Error;

use crate::error::{ModelError, ModelResult};
use crate::physics::DaeModel;

/// Reasons a Newton solve gives up
#[derive(Debug, Error)]
pub(crate) enum NewtonFailure {
    #[error("singular Jacobian")]
    Singular,

    #[error("non-finite residual")]
    NonFinite,

    #[error("no convergence after {0} iterations")]
    MaxIterations(usize),

    #[error("diverged (residual norm {0:e})")]
    Diverged(f64),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Damped Newton-Raphson on a dense system
#[derive(Debug, Clone, Copy)]
pub(crate) struct Newton {
    pub tolerance: f64,
    pub max_iterations: usize,
}

/// Halvings of the step before the line search accepts any finite point
const MAX_BACKTRACKS: usize = 8;

impl Newton {
    pub(crate) fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self { tolerance, max_iterations }
    }

    /// Solve `G(x) = 0` from `x0`
    ///
    /// Converged when the residual max-norm or the scaled update
    /// `max |dx_i| / (1 + |x_i|)` of an undamped step falls below the
    /// tolerance. Returns the solution and the number of iterations used.
    pub(crate) fn solve<G, J>(
        &self,
        x0: DVector<f64>,
        residual: G,
        jacobian: J,
    ) -> Result<(DVector<f64>, usize), NewtonFailure>
    where
        G: Fn(&DVector<f64>) -> ModelResult<DVector<f64>>,
        J: Fn(&DVector<f64>) -> ModelResult<DMatrix<f64>>,
    {
        let mut x = x0;
        let mut r = residual(&x)?;
        if !all_finite(&r) {
            return Err(NewtonFailure::NonFinite);
        }

        for iteration in 0..self.max_iterations {
            // Check convergence
            if r.amax() < self.tolerance {
                return Ok((x, iteration));
            }
            let norm = r.norm();

            // Solve J * dx = -G
            let jac = jacobian(&x)?;
            let dx = jac.lu().solve(&(-&r)).ok_or(NewtonFailure::Singular)?;
            if !all_finite(&dx) {
                return Err(NewtonFailure::Singular);
            }

            // Backtrack until the residual decreases
            let mut lambda = 1.0;
            let mut accepted = None;
            for _ in 0..=MAX_BACKTRACKS {
                let trial = &x + &dx * lambda;
                match residual(&trial) {
                    Ok(rt) if all_finite(&rt) => {
                        let better = rt.norm() < norm;
                        accepted = Some((trial, rt, lambda));
                        if better {
                            break;
                        }
                    }
                    Ok(_) | Err(ModelError::OutOfDomain { .. }) => {}
                    Err(e) => return Err(e.into()),
                }
                lambda *= 0.5;
            }
            let Some((trial, rt, step)) = accepted else {
                return Err(NewtonFailure::NonFinite);
            };

            let scaled = dx.iter().zip(x.iter()).map(|(d, v)| d.abs() / (1.0 + v.abs())).fold(0.0_f64, f64::max);
            x = trial;
            r = rt;
            // only an undamped step measures the update
            if step == 1.0 && scaled < self.tolerance {
                return Ok((x, iteration + 1));
            }

            // Check for divergence
            if iteration > 10 && norm > 1e10 {
                return Err(NewtonFailure::Diverged(norm));
            }
        }

        if r.amax() < self.tolerance {
            return Ok((x, self.max_iterations));
        }
        Err(NewtonFailure::MaxIterations(self.max_iterations))
    }
}

fn all_finite(v: &DVector<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Jacobian of the model residual along seeded directions
///
/// Column `j` is `dF/dy * seed(j).0 + dF/d(dy/dt) * seed(j).1` restricted to
/// unknown `j`. Columns are independent and are computed in parallel above
/// the solver's threshold when the `parallel` feature is enabled.
pub(crate) fn dual_jacobian<S>(
    model: &dyn DaeModel,
    t: f64,
    y: &[f64],
    ydot: &[f64],
    seed: S,
) -> ModelResult<DMatrix<f64>>
where
    S: Fn(usize) -> (f64, f64) + Send + Sync,
{
    let n = y.len();
    let column = |j: usize| -> ModelResult<Vec<f64>> {
        let (sy, sd) = seed(j);
        let yd: Vec<Dual64> =
            y.iter().enumerate().map(|(k, &v)| Dual64::new(v, if k == j { sy } else { 0.0 })).collect();
        let ydd: Vec<Dual64> =
            ydot.iter().enumerate().map(|(k, &v)| Dual64::new(v, if k == j { sd } else { 0.0 })).collect();
        Ok(model.residual_dual(t, &yd, &ydd)?.iter().map(|r| r.eps).collect())
    };

    let columns: Vec<Vec<f64>> = {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if n >= crate::solver::parallel_threshold() {
                (0..n).into_par_iter().map(column).collect::<ModelResult<_>>()?
            } else {
                (0..n).map(column).collect::<ModelResult<_>>()?
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..n).map(column).collect::<ModelResult<_>>()?
        }
    };

    let mut jac = DMatrix::zeros(n, n);
    for (j, col) in columns.iter().enumerate() {
        if col.len() != n {
            return Err(ModelError::StateLength { expected: n, actual: col.len() });
        }
        jac.column_mut(j).copy_from_slice(col);
    }
    Ok(jac)
}
