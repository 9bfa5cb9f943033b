pub mod presets;
pub mod uc;
pub mod validate;
pub mod vpp;

use anyhow::{bail, Result};
use powerplan_algo::mip::SolverConfig;
use powerplan_cli::cli::SolverArgs;

/// Solver configuration from the shared `--backend` / `--time-limit` flags.
pub fn solver_config(args: &SolverArgs) -> Result<SolverConfig> {
    if !args.backend.is_available() {
        bail!(
            "solver backend '{}' is not compiled into this build (enable feature solver-{})",
            args.backend,
            args.backend
        );
    }
    let mut config = SolverConfig::default().with_backend(args.backend);
    if let Some(seconds) = args.time_limit {
        if seconds.is_nan() || seconds <= 0.0 {
            bail!("--time-limit must be positive, got {seconds}");
        }
        config = config.with_time_limit(seconds);
    }
    Ok(config)
}
