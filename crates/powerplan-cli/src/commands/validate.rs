//! Case validation CLI command

use anyhow::{bail, Context, Result};
use powerplan_cli::cli::{CaseKind, OutputFormat};
use powerplan_core::Diagnostics;
use powerplan_scenarios::{load_uc_case, load_vpp_case};
use serde::Serialize;
use std::io;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ValidationReport<'a> {
    case: String,
    kind: &'static str,
    valid: bool,
    diagnostics: &'a Diagnostics,
}

pub fn handle(path: &Path, kind: CaseKind, format: OutputFormat) -> Result<()> {
    let (diagnostics, kind_name, detail) = match kind {
        CaseKind::Uc => {
            let case = load_uc_case(path)?;
            let detail = format!(
                "{} units, {} periods, {} constraint families",
                case.units.len(),
                case.periods.planning_periods(),
                case.constraints.len()
            );
            (case.diagnostics(), "uc", detail)
        }
        CaseKind::Vpp => {
            let case = load_vpp_case(path)?;
            let detail = format!(
                "{} resources, {} scenarios, {} periods",
                case.resources.len(),
                case.scenarios.len(),
                case.parameters.time_periods
            );
            (case.diagnostics(), "vpp", detail)
        }
    };

    match format {
        OutputFormat::Plain => {
            println!("Case {} is valid ({detail})", path.display());
            print!("{diagnostics}");
        }
        OutputFormat::Json => {
            let report = ValidationReport {
                case: path.display().to_string(),
                kind: kind_name,
                valid: !diagnostics.has_errors(),
                diagnostics: &diagnostics,
            };
            serde_json::to_writer_pretty(io::stdout(), &report)
                .context("serializing validation report to JSON")?;
            println!();
        }
    }

    if diagnostics.has_errors() {
        bail!(
            "{} cannot be solved as configured: {}",
            path.display(),
            diagnostics.summary()
        );
    }
    Ok(())
}
