//! Adaptive backward Euler for DAE systems
//!
//! # Mathematical Background
//!
//! The model is given in implicit form:
//!
//! ```text
//! F(t, y, dy/dt) = 0
//! ```
//!
//! Backward Euler replaces the derivative by a backward difference and solves
//! for the state at the end of the step:
//!
//! ```text
//! F(t_{n+1}, y_{n+1}, (y_{n+1} - y_n) / h) = 0
//! ```
//!
//! The nonlinear system is solved by Newton iteration with the iteration
//! matrix `dF/dy + (1/h) dF/d(dy/dt)`, built column by column from the
//! model's dual-number residual.
//!
//! # Characteristics
//!
//! - **Order**: First-order accurate
//! - **Stability**: L-stable, suitable for the stiff index-1 systems of
//!   porous-electrode models
//! - **Complexity**: one dense Jacobian and LU factorization per Newton
//!   iteration
//!
//! # Step control
//!
//! - A step whose Newton iteration fails (non-finite residual, singular
//!   matrix, iteration limit) is rejected and retried with half the step.
//! - Steps that converge in few iterations let the next step grow, up to the
//!   maximum step.
//! - Report times are always hit exactly.
//! - Once the step would fall below the minimum step, the run stops and the
//!   trajectory so far is returned with [`RunStatus::Failed`].
//!
//! # Example
//!
//! ```rust,ignore
//! use intercal_rs::solver::{BackwardEulerSolver, Scenario, Solver, SolverConfiguration};
//!
//! let scenario = Scenario::new(Box::new(CellModel::new(&params)?));
//! let result = BackwardEulerSolver::new().solve(&scenario, &SolverConfiguration::to_horizon(100))?;
//! ```

use log::{debug, info, warn};
use nalgebra::DVector;

use crate::error::SolverError;
use crate::physics::DaeModel;
use crate::solver::initial::consistent_state;
use crate::solver::newton::{Newton, NewtonFailure, dual_jacobian};
use crate::solver::{RunStatus, Scenario, SimulationResult, Solver, SolverConfiguration, SolverType};

/// Newton iterations at or below which the next step may grow
const FAST_ITERATIONS: usize = 4;

/// Step growth after a fast step
const GROWTH: f64 = 1.5;

/// Lower bound on the iteration budget of the initialization solve
const INIT_ITERATIONS: usize = 50;

// =================================================================================================
// Backward Euler Solver
// =================================================================================================

/// Adaptive backward Euler solver
///
/// # Algorithm
///
/// 1. Make the initial state consistent (algebraic unknowns and initial rates)
/// 2. For each report interval, take implicit steps until the report time:
///    - Newton-solve `F(t + h, y, (y - y_n)/h) = 0`
///    - On failure halve `h`; on fast convergence grow it
/// 3. Store the state at every report time
#[derive(Debug, Clone, Copy, Default)]
pub struct BackwardEulerSolver;

impl BackwardEulerSolver {
    /// Create a new backward Euler solver
    ///
    /// # Example
    ///
    /// ```rust
    /// use intercal_rs::solver::{BackwardEulerSolver, Solver};
    ///
    /// let solver = BackwardEulerSolver::new();
    /// assert_eq!(solver.name(), "Backward Euler");
    /// ```
    pub fn new() -> Self {
        Self
    }
}

/// One implicit step of size `h` from `(t, y_prev)`
fn implicit_step(
    model: &dyn DaeModel,
    t: f64,
    y_prev: &DVector<f64>,
    h: f64,
    newton: Newton,
) -> Result<(DVector<f64>, usize), NewtonFailure> {
    let t_next = t + h;
    let rate = |y: &DVector<f64>| (y - y_prev) / h;
    newton.solve(
        y_prev.clone(),
        |y| {
            let ydot = rate(y);
            model.residual(t_next, y.as_slice(), ydot.as_slice())
        },
        |y| {
            let ydot = rate(y);
            dual_jacobian(model, t_next, y.as_slice(), ydot.as_slice(), |_| (1.0, 1.0 / h))
        },
    )
}

impl Solver for BackwardEulerSolver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult, SolverError> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        let model = scenario.model.as_ref();
        let names = model.variable_names().to_vec();

        let schedule = match &config.solver_type {
            SolverType::TimeEvolution { total_time, report_steps } => {
                let total_time = total_time.or_else(|| model.time_horizon()).ok_or_else(|| {
                    SolverError::Configuration(format!(
                        "no total time given and model '{}' defines no time horizon",
                        model.name()
                    ))
                })?;
                Some((total_time, *report_steps))
            }
            SolverType::ConsistentInitialization => None,
        };

        // ====== Step 2: Consistent initialization ======

        let init_newton = Newton::new(config.tolerance, config.max_iterations.max(INIT_ITERATIONS));
        let start = match consistent_state(model, 0.0, &scenario.initial, init_newton) {
            Ok(start) => start,
            Err(failure) => {
                warn!("initialization of '{}' failed: {}", model.name(), failure);
                let y0 = scenario.initial.clone();
                let mut result = SimulationResult::new(vec![0.0], vec![y0.clone()], y0, names)
                    .with_status(RunStatus::Failed { time: 0.0, reason: format!("initialization: {failure}") });
                result.add_metadata("solver", self.name());
                return Ok(result);
            }
        };

        let Some((total_time, report_steps)) = schedule else {
            let mut result = SimulationResult::new(vec![0.0], vec![start.y.clone()], start.y, names);
            result.add_metadata("solver", self.name());
            result.add_metadata("initialization iterations", &start.iterations.to_string());
            return Ok(result);
        };

        // ====== Step 3: Setup ======

        let interval = total_time / report_steps as f64;
        let max_dt = config.max_dt.unwrap_or(interval);
        let mut dt = config.initial_dt.unwrap_or(interval / 10.0).min(max_dt);
        let newton = Newton::new(config.tolerance, config.max_iterations);

        let mut time_points = Vec::with_capacity(report_steps + 1);
        let mut trajectory = Vec::with_capacity(report_steps + 1);
        let mut t = 0.0;
        let mut y = start.y;
        time_points.push(t);
        trajectory.push(y.clone());

        let mut accepted = 0usize;
        let mut rejected = 0usize;
        let mut status = RunStatus::Completed;

        // ====== Step 4: Time Integration ======

        'reports: for report in 1..=report_steps {
            let target = if report == report_steps { total_time } else { interval * report as f64 };

            while t < target {
                let remaining = target - t;
                let h = dt.min(remaining);

                match implicit_step(model, t, &y, h, newton) {
                    Ok((next, iterations)) => {
                        t = if h >= remaining { target } else { t + h };
                        y = next;
                        accepted += 1;
                        debug!("t = {t:.6e}: accepted h = {h:.3e} after {iterations} Newton iterations");
                        if iterations <= FAST_ITERATIONS && h >= dt {
                            dt = (dt * GROWTH).min(max_dt);
                        }
                    }
                    Err(failure) => {
                        rejected += 1;
                        dt = 0.5 * h;
                        warn!("t = {t:.6e}: rejected h = {h:.3e} ({failure})");
                        if dt < config.min_dt {
                            warn!("'{}' stopped at t = {t:.6e}: step fell below {:e}", model.name(), config.min_dt);
                            status = RunStatus::Failed { time: t, reason: failure.to_string() };
                            break 'reports;
                        }
                    }
                }
            }

            time_points.push(target);
            trajectory.push(y.clone());
        }

        // ====== Step 5: Build Result ======

        if status == RunStatus::Completed {
            info!(
                "'{}' completed to t = {:.6e} in {} steps ({} rejected)",
                model.name(),
                total_time,
                accepted,
                rejected
            );
        }

        let mut result = SimulationResult::new(time_points, trajectory, y, names).with_status(status);
        result.add_metadata("solver", self.name());
        result.add_metadata("report steps", &report_steps.to_string());
        result.add_metadata("accepted steps", &accepted.to_string());
        result.add_metadata("rejected steps", &rejected.to_string());
        result.add_metadata("total time", &total_time.to_string());
        result.add_metadata("initialization iterations", &start.iterations.to_string());

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "Backward Euler"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
