use anyhow::Result;
use clap::Parser;
use powerplan_cli::cli::{Cli, Commands};
use std::io;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG directives win over --log-level
    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Commands) -> Result<()> {
    match command {
        Commands::Uc {
            preset,
            case,
            disable,
            solver,
            format,
        } => commands::uc::handle(*preset, case.as_deref(), disable, solver, *format),
        Commands::Vpp {
            case,
            solver,
            format,
        } => commands::vpp::handle(case.as_deref(), solver, *format),
        Commands::Validate { case, kind, format } => {
            commands::validate::handle(case, *kind, *format)
        }
        Commands::Presets { format } => commands::presets::handle(*format),
    }
}
