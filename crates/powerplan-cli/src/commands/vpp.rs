//! Virtual power plant CLI command

use anyhow::{Context, Result};
use powerplan_algo::vpp::{solve_vpp, VppSolution};
use powerplan_cli::cli::{OutputFormat, SolverArgs};
use powerplan_scenarios::{load_vpp_case, reference_vpp_case, VppCase};
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::{info, warn};

use super::solver_config;

pub fn handle(case_path: Option<&Path>, solver: &SolverArgs, format: OutputFormat) -> Result<()> {
    let case = match case_path {
        Some(path) => load_vpp_case(path)?,
        None => reference_vpp_case(),
    };
    let config = solver_config(solver)?;

    for issue in &case.diagnostics().issues {
        warn!("{issue}");
    }
    info!(
        "solving VPP: {} resources, {} scenarios, {} periods",
        case.resources.len(),
        case.scenarios.len(),
        case.parameters.time_periods
    );

    let solution = solve_vpp(&case.resources, &case.scenarios, &case.parameters, &config)
        .context("solving virtual power plant")?;

    match format {
        OutputFormat::Plain => {
            print!("{}", solution.summary());
            println!();
            print_expected_dispatch(&case, &solution)
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(io::stdout(), &solution)
                .context("serializing VPP result to JSON")?;
            println!();
            Ok(())
        }
    }
}

/// Probability-weighted price, dispatch and bid per period.
fn print_expected_dispatch(case: &VppCase, solution: &VppSolution) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    write!(writer, "PERIOD\tE[PRICE]")?;
    for resource in &solution.resources {
        write!(writer, "\t{}", resource.name)?;
    }
    writeln!(writer, "\tE[BID]")?;

    for t in 0..case.parameters.time_periods {
        let price: f64 = case
            .scenarios
            .iter()
            .map(|s| s.probability * s.prices[t])
            .sum();
        let bid: f64 = solution
            .market_bids
            .iter()
            .map(|b| b.probability * b.bids[t])
            .sum();
        write!(writer, "{}\t{:.2}", t, price)?;
        for resource in &solution.resources {
            write!(writer, "\t{:.2}", resource.expected_power[t])?;
        }
        writeln!(writer, "\t{:.2}", bid)?;
    }
    writer.flush()?;
    Ok(())
}
