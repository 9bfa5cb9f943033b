pub mod cli;

pub use cli::{build_cli_command, CaseKind, Cli, Commands, OutputFormat};
