//! Example: Galvanostatic Discharge of an LFP-like Electrode
//!
//! Fills a porous electrode of reaction-limited (ACR) particles at constant
//! current and reports the cell voltage along the way.
//!
//! ## Structure
//!
//! **Phase 1 - Setup**
//! - 8 electrode volumes, 3 particles each, log-normal size distribution
//! - Regular-solution thermodynamics, Butler-Volmer kinetics, 1C
//!
//! **Phase 2 - Simulation**
//! - Backward Euler to the time at which the electrode reaches `ff_end`
//!
//! **Phase 3 - Analysis and export**
//! - Voltage at a few filling fractions, run statistics
//! - CSV of the cell-level unknowns in `galvanostatic_discharge.csv`
//!
//! Run with `cargo run --example galvanostatic_discharge --release`.

use intercal_rs::prelude::*;
use intercal_rs::output::{CsvConfig, CsvMetadata};

use std::time::Instant;

// =============================================================================
// Helpers
// =============================================================================

/// Prints a titled section banner to stdout.
fn print_section(title: &str) {
    println!("\n═══════════════════════════════════════════════════════");
    println!("  {title}");
    println!("═══════════════════════════════════════════════════════\n");
}

fn parameters() -> ParameterSet {
    let mut params = ParameterSet::default();

    let system = &mut params.system;
    system.profile = CyclingProfile::Galvanostatic { c_rate: 1.0 };
    system.cs0 = 0.01;
    system.ff_end = 0.95;
    system.geometry.n_trode = 8;
    system.geometry.n_part = 3;
    system.psd.mean = 100e-9;
    system.psd.stddev = 20e-9;
    system.psd.seed = 42;

    let material = &mut params.material;
    material.scheme = SolidScheme::ReactionLimited;
    material.shape = ParticleShape::C3;
    material.thermodynamics = "reg_sln".into();
    material.kinetics = "BV".into();

    params
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ====== Phase 1: Setup ======
    print_section("Setup");

    let params = parameters();
    let model = CellModel::new(&params)?;
    let scales = model.parameters().scales;
    println!("Model       : {}", model.description().unwrap_or("cell"));
    println!("Unknowns    : {}", model.unknowns());
    println!("Diffusion   : td = {:.3} s", scales.td);

    let scenario = Scenario::new(Box::new(model));

    // ====== Phase 2: Simulation ======
    print_section("Simulation");

    let solver = BackwardEulerSolver::new();
    let config = SolverConfiguration::to_horizon(params.system.t_steps);

    let start = Instant::now();
    let result = solver.solve(&scenario, &config)?;
    let elapsed = start.elapsed().as_secs_f64();

    match &result.status {
        RunStatus::Completed => println!("Completed {} reports in {elapsed:.2} s", result.len()),
        RunStatus::Failed { time, reason } => {
            println!("Stopped at t = {:.1} s: {reason}", scales.seconds(*time));
        }
    }
    for key in ["accepted steps", "rejected steps"] {
        if let Some(value) = result.metadata.get(key) {
            println!("{key:<15}: {value}");
        }
    }

    // ====== Phase 3: Analysis ======
    print_section("Voltage");

    let ffrac = result.series("cell.ffrac").ok_or("missing cell.ffrac")?;
    let phi = result.series("cell.phi_applied").ok_or("missing cell.phi_applied")?;
    println!("{:>10} {:>10} {:>12}", "t [s]", "ffrac", "V - V0 [V]");
    let stride = (result.len() / 10).max(1);
    for k in (0..result.len()).step_by(stride) {
        let t = scales.seconds(result.time_points[k]);
        println!("{t:>10.1} {:>10.4} {:>12.5}", ffrac[k], scales.volts(-phi[k]));
    }

    let mut metadata = CsvMetadata::from_result(&result, scenario.get_model_name());
    metadata.add_custom("C-rate", "1");
    metadata.add_custom("td [s]", format!("{:.6}", scales.td));
    let exporter = CsvExporter::new(CsvConfig::default().with_metadata(metadata));
    let columns = ["cell.ffrac", "cell.current", "cell.phi_applied"];
    exporter.export(&result, Some(&columns[..]), None, "galvanostatic_discharge.csv")?;
    println!("\nWrote galvanostatic_discharge.csv");

    Ok(())
}
