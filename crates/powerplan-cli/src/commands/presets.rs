use anyhow::{Context, Result};
use powerplan_cli::cli::OutputFormat;
use powerplan_scenarios::{reference_vpp_case, DemandPattern};
use serde::Serialize;
use std::io::{self, Write};
use tabwriter::TabWriter;

#[derive(Debug, Serialize)]
struct PresetInfo {
    name: String,
    model: &'static str,
    periods: usize,
    peak: f64,
    description: String,
}

pub fn handle(format: OutputFormat) -> Result<()> {
    let presets = collect()?;
    match format {
        OutputFormat::Plain => {
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "PRESET\tMODEL\tPERIODS\tPEAK\tDESCRIPTION")?;
            for preset in &presets {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{:.1}\t{}",
                    preset.name, preset.model, preset.periods, preset.peak, preset.description
                )?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(io::stdout(), &presets)
                .context("serializing preset list to JSON")?;
            println!();
        }
    }
    Ok(())
}

/// Demand patterns report peak demand (MW); the VPP portfolio reports
/// installed capacity (MW).
fn collect() -> Result<Vec<PresetInfo>> {
    let mut presets = Vec::with_capacity(DemandPattern::ALL.len() + 1);
    for pattern in DemandPattern::ALL {
        let horizon = pattern.horizon()?;
        presets.push(PresetInfo {
            name: pattern.name().to_string(),
            model: "uc",
            periods: horizon.planning_periods(),
            peak: horizon.peak_demand(),
            description: pattern.description().to_string(),
        });
    }

    let vpp = reference_vpp_case();
    presets.push(PresetInfo {
        name: "reference_vpp".to_string(),
        model: "vpp",
        periods: vpp.parameters.time_periods,
        peak: vpp.resources.iter().map(|r| r.capacity).sum(),
        description: format!(
            "{} resources, {} price scenarios",
            vpp.resources.len(),
            vpp.scenarios.len()
        ),
    });
    Ok(presets)
}
