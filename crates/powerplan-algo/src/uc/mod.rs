//! Unit Commitment (UC)
//!
//! Deterministic MILP deciding which thermal units run, when they start and
//! stop, and how much each produces over a horizon `t = 0..=T`. Period 0 is
//! the fixed initial condition; only `t = 1..=T` is optimized and costed.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UNIT COMMITMENT                                                         │
//! │  ───────────────                                                         │
//! │                                                                          │
//! │  Decide (per unit j, period t):                                          │
//! │    • u[j,t]  committed        (binary)                                   │
//! │    • su[j,t] starting up      (binary)                                   │
//! │    • sd[j,t] shutting down    (binary)                                   │
//! │    • p[j,t]  delivered power  [0, P_max]                                 │
//! │    • p̄[j,t]  available power  [0, P_max]                                 │
//! │                                                                          │
//! │  Minimize:                                                               │
//! │    Σ_j Σ_{t≥1} cU·u + c·p + SU_cost·su + SD_cost·sd                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Constraint families
//!
//! Each family can be switched off through [`ConstraintSet`]:
//!
//! ```text
//!   power_balance        Σ_j p[j,t] = demand_t
//!   reserve_capacity     Σ_j p̄[j,t] ≥ demand_t + reserve_t
//!   logical_consistency  u[t-1] − u[t] + su[t] − sd[t] = 0
//!   generation_limits    P_min·u ≤ p ≤ p̄ ≤ P_max·u
//!                        p̄[t] ≤ p[t-1] + RU·u[t-1] + SU·su[t]
//!                        p̄[t] ≤ P_max·u[t] − (P_max − SD)·sd[t+1]
//!   ramp_up              p[t] − p[t-1] ≤ RU·u[t-1] + SU·su[t]
//!   ramp_down            p[t-1] − p[t] ≤ RD·u[t] + SD·sd[t]
//!   min_up_time          Σ_{k=t-TU+1..t} su[k] ≤ u[t]
//!   min_down_time        Σ_{k=t-TD+1..t} sd[k] ≤ 1 − u[t]
//! ```
//!
//! Units with `U0`/`D0` periods left from before the horizon are pinned on
//! (off) for the first `min(T, U0)` (`min(T, D0)`) periods.
//!
//! ## Example
//!
//! ```no_run
//! use powerplan_algo::mip::SolverConfig;
//! use powerplan_algo::uc::{solve_unit_commitment, ConstraintSet};
//! use powerplan_core::{Horizon, Unit};
//!
//! let units = vec![Unit::new("G1", 10.0, 100.0).with_costs(50.0, 12.0, 30.0, 10.0)];
//! let horizon = Horizon::from_planning(&[40.0, 60.0], &[5.0, 5.0]).unwrap();
//! let solution =
//!     solve_unit_commitment(&units, &horizon, ConstraintSet::all(), &SolverConfig::default())
//!         .unwrap();
//! println!("{}", solution.summary());
//! ```

mod constraints;
mod model;
mod solution;

pub use constraints::{ConstraintFamily, ConstraintSet};
pub use model::{UcModel, UcVariables};
pub use solution::{CostBreakdown, UcSolution, UnitSchedule};

use crate::mip::{GoodLpSolver, SolveStatus, SolverConfig};
use powerplan_core::{Horizon, PlanError, PlanResult, Unit};

/// Build, solve and extract in one call.
///
/// Any non-optimal status becomes the matching [`PlanError`]; no partial
/// schedule is returned.
pub fn solve_unit_commitment(
    units: &[Unit],
    horizon: &Horizon,
    constraints: ConstraintSet,
    config: &SolverConfig,
) -> PlanResult<UcSolution> {
    let mut model = UcModel::build(
        units,
        horizon,
        constraints,
        GoodLpSolver::with_config(config.clone()),
    )?;
    let status = model.solve();
    let detail = || {
        model
            .solver()
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| format!("unit commitment over {} periods", horizon.planning_periods()))
    };
    match status {
        SolveStatus::Optimal => model.extract(),
        SolveStatus::Infeasible => Err(PlanError::Infeasible(detail())),
        SolveStatus::Unbounded => Err(PlanError::Unbounded(detail())),
        SolveStatus::Error => Err(PlanError::Solver(detail())),
    }
}

