//! Unit commitment CLI command

use anyhow::{Context, Result};
use powerplan_algo::uc::{solve_unit_commitment, ConstraintFamily, UcSolution};
use powerplan_cli::cli::{OutputFormat, SolverArgs};
use powerplan_scenarios::{load_uc_case, reference_uc_case, DemandPattern, UcCase};
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::{info, warn};

use super::solver_config;

pub fn handle(
    preset: DemandPattern,
    case_path: Option<&Path>,
    disable: &[ConstraintFamily],
    solver: &SolverArgs,
    format: OutputFormat,
) -> Result<()> {
    let case = match case_path {
        Some(path) => load_uc_case(path)?,
        None => reference_uc_case(preset).context("building reference case")?,
    };
    let constraints = disable
        .iter()
        .fold(case.constraints, |set, family| set.without(*family));
    let config = solver_config(solver)?;

    for issue in &case.diagnostics().issues {
        warn!("{issue}");
    }
    info!(
        "solving unit commitment: {} units, {} periods, {} constraint families",
        case.units.len(),
        case.periods.planning_periods(),
        constraints.len()
    );

    let solution = solve_unit_commitment(&case.units, &case.periods, constraints, &config)
        .context("solving unit commitment")?;

    match format {
        OutputFormat::Plain => {
            print!("{}", solution.summary());
            println!();
            print_schedule(&case, &solution)
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(io::stdout(), &solution)
                .context("serializing unit commitment result to JSON")?;
            println!();
            Ok(())
        }
    }
}

/// One row per planning period; units that are off print `-`.
fn print_schedule(case: &UcCase, solution: &UcSolution) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    write!(writer, "PERIOD\tDEMAND\tRESERVE")?;
    for unit in &solution.units {
        write!(writer, "\t{}", unit.name)?;
    }
    writeln!(writer, "\tCOMMITTED")?;

    for t in 1..case.periods.len() {
        write!(
            writer,
            "{}\t{:.1}\t{:.1}",
            t,
            case.periods.demand(t),
            case.periods.reserve(t)
        )?;
        for unit in &solution.units {
            if unit.committed[t] {
                write!(writer, "\t{:.1}", unit.power[t])?;
            } else {
                write!(writer, "\t-")?;
            }
        }
        writeln!(writer, "\t{}", solution.committed_units(t))?;
    }
    writer.flush()?;
    Ok(())
}
