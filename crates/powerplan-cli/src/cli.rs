use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use powerplan_algo::mip::SolverBackend;
use powerplan_algo::uc::ConstraintFamily;
use powerplan_scenarios::DemandPattern;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "powerplan",
    author,
    version,
    about = "Unit commitment and virtual power plant scheduling",
    long_about = None
)]
pub struct Cli {
    /// Set the logging level (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve a unit commitment case (cost-minimizing thermal schedule)
    Uc {
        /// Built-in demand pattern for the reference fleet
        #[arg(long, default_value_t = DemandPattern::Example)]
        preset: DemandPattern,
        /// Case file (YAML or JSON) instead of a preset
        #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "preset")]
        case: Option<PathBuf>,
        /// Constraint family to leave out (repeatable)
        #[arg(long = "disable", value_name = "FAMILY")]
        disable: Vec<ConstraintFamily>,
        #[command(flatten)]
        solver: SolverArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Solve a stochastic virtual power plant case (profit-maximizing bids)
    Vpp {
        /// Case file (YAML or JSON); defaults to the reference portfolio
        #[arg(long, value_hint = ValueHint::FilePath)]
        case: Option<PathBuf>,
        #[command(flatten)]
        solver: SolverArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Validate a case file and run the advisory diagnostics
    Validate {
        /// Case file to check
        #[arg(value_hint = ValueHint::FilePath)]
        case: PathBuf,
        /// Model the case is written for
        #[arg(long, value_enum, default_value_t = CaseKind::Uc)]
        kind: CaseKind,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// List the built-in reference cases
    Presets {
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SolverArgs {
    /// MILP backend
    #[arg(long, default_value_t = SolverBackend::Microlp)]
    pub backend: SolverBackend,
    /// Wall-clock limit for the solve, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub time_limit: Option<f64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CaseKind {
    Uc,
    Vpp,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn test_parse_uc_flags() {
        let cli = Cli::parse_from([
            "powerplan",
            "uc",
            "--preset",
            "weekend-24h",
            "--disable",
            "ramp_up",
            "--disable",
            "min-down-time",
            "--time-limit",
            "30",
        ]);
        match cli.command {
            Commands::Uc {
                preset,
                case,
                disable,
                solver,
                format,
            } => {
                assert_eq!(preset, DemandPattern::Weekend24h);
                assert!(case.is_none());
                assert_eq!(
                    disable,
                    vec![ConstraintFamily::RampUp, ConstraintFamily::MinDownTime]
                );
                assert_eq!(solver.time_limit, Some(30.0));
                assert_eq!(solver.backend, SolverBackend::Microlp);
                assert_eq!(format, OutputFormat::Plain);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_family_rejected() {
        assert!(Cli::try_parse_from(["powerplan", "uc", "--disable", "voltage"]).is_err());
    }
}
