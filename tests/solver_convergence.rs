//! Convergence tests for the backward Euler solver
//!
//! With the step size pinned, backward Euler is first order: halving the
//! step halves the error at the final time.

use approx::assert_relative_eq;
use intercal_rs::physics::DaeModel;
use intercal_rs::solver::{BackwardEulerSolver, Scenario, Solver, SolverConfiguration};

mod common;
use common::ExponentialDecay;

// ── helpers ──

const RATE: f64 = 0.3;
const TOTAL_TIME: f64 = 5.0;

/// Final value of `y0` with `steps` equal implicit steps over the whole run
fn final_value(steps: usize) -> f64 {
    let scenario = Scenario::new(Box::new(ExponentialDecay::new(3, RATE)));
    let h = TOTAL_TIME / steps as f64;
    let config = SolverConfiguration::time_evolution(TOTAL_TIME, 1).with_steps(Some(h), 1e-12, Some(h));
    let result = BackwardEulerSolver::new().solve(&scenario, &config).unwrap();
    assert!(result.is_complete());
    result.final_state[0]
}

#[test]
fn test_backward_euler_first_order_convergence() {
    let exact = ExponentialDecay::new(3, RATE).exact(TOTAL_TIME);
    let errors: Vec<f64> = [50, 100, 200, 400].iter().map(|&n| (final_value(n) - exact).abs()).collect();

    for pair in errors.windows(2) {
        let ratio = pair[0] / pair[1];
        assert!(ratio > 1.8 && ratio < 2.2, "convergence ratio {ratio} is not first order");
    }
}

#[test]
fn test_backward_euler_matches_discrete_solution() {
    // for a linear decay each step multiplies by 1 / (1 + k h)
    let steps = 40;
    let h = TOTAL_TIME / steps as f64;
    let discrete = (1.0 / (1.0 + RATE * h)).powi(steps as i32);
    assert_relative_eq!(final_value(steps), discrete, max_relative = 1e-6);
}

#[test]
fn test_adaptive_run_keeps_algebraic_constraint() {
    let model = ExponentialDecay::new(4, RATE);
    let exact = model.exact(TOTAL_TIME);
    let scenario = Scenario::new(Box::new(model));
    let config = SolverConfiguration::time_evolution(TOTAL_TIME, 10).with_steps(None, 1e-12, Some(0.01));
    let result = BackwardEulerSolver::new().solve(&scenario, &config).unwrap();

    assert_eq!(result.len(), 11);
    for state in &result.trajectory {
        let sum: f64 = state.iter().take(4).sum();
        assert_relative_eq!(state[4], sum, epsilon = 1e-8);
    }
    assert_relative_eq!(result.final_state[0], exact, max_relative = 0.01);
    assert_eq!(scenario.model.unknowns(), 5);
}
