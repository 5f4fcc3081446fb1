//! Helper functions for integration tests

use intercal_rs::models::CellModel;
use intercal_rs::params::ParameterSet;
use intercal_rs::solver::{BackwardEulerSolver, Scenario, SimulationResult, Solver, SolverConfiguration};

/// Build the cell model of a parameter set into a scenario
pub fn build_scenario(params: &ParameterSet) -> Scenario {
    let model = CellModel::new(params).expect("parameter set should build");
    Scenario::new(Box::new(model))
}

/// Solve a scenario with the backward Euler solver
pub fn run(scenario: &Scenario, config: &SolverConfiguration) -> SimulationResult {
    BackwardEulerSolver::new().solve(scenario, config).expect("configuration should be valid")
}

/// Build and run a parameter set to the model's time horizon
pub fn run_to_horizon(params: &ParameterSet, reports: usize) -> SimulationResult {
    run(&build_scenario(params), &SolverConfiguration::to_horizon(reports))
}

/// Assert that a series never decreases
pub fn assert_monotone_increasing(series: &[f64], message: &str) {
    for (k, pair) in series.windows(2).enumerate() {
        assert!(pair[1] >= pair[0], "{}: value {} -> {} decreases at report {}", message, pair[0], pair[1], k + 1);
    }
}
