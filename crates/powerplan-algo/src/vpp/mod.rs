//! Virtual Power Plant (VPP) scheduling under price uncertainty
//!
//! Two-level stochastic MILP over a portfolio of distributed resources. Every
//! market-price scenario gets its own independent trajectory of resource
//! output, reserve, battery state and market bid; the objective is the
//! probability-weighted profit.
//!
//! ```text
//! maximize  Σ_s π_s Σ_t [ (price_st − fee)·bid_st
//!                         − Σ_r c_r·power_rst          (c_r < 0 for demand response)
//!                         + credit·Σ_{r∈solar,wind} power_rst ]
//!           − Σ_r fixed_r·capacity_r
//!
//! subject to (per scenario s, period t):
//!   Σ_{r≠DR} power − Σ_{r∈DR} power = bid                   market balance
//!   Σ_r reserve ≥ margin · bid                              reserve
//!   power + reserve ≤ capacity·availability_t               non-storage headroom
//!   discharge + reserve ≤ max_discharge, charge ≤ max_charge
//!   power = discharge − charge                              battery link
//!   soc_t = soc_{t-1} + (η·charge_{t-1} − discharge_{t-1}/η) / E
//!   −ramp_down ≤ power_t − power_{t-1} ≤ ramp_up
//! ```
//!
//! The state of charge evolves from the previous period's flows, so the
//! charge and discharge decided in the last period do not show up in any SOC.

mod model;
mod solution;

pub use model::{BatteryVars, VppModel, VppVariables};
pub use solution::{
    expected_series, BatteryAudit, BatterySchedule, FinancialMetrics, ResourceSchedule,
    ScenarioBids, VppSolution,
};

use crate::mip::{GoodLpSolver, SolveStatus, SolverConfig};
use powerplan_core::{DistributedResource, MarketScenario, PlanError, PlanResult, VppParameters};

/// Build, solve and extract in one call; non-optimal statuses become errors.
pub fn solve_vpp(
    resources: &[DistributedResource],
    scenarios: &[MarketScenario],
    params: &VppParameters,
    config: &SolverConfig,
) -> PlanResult<VppSolution> {
    let mut model = VppModel::build(
        resources,
        scenarios,
        params,
        GoodLpSolver::with_config(config.clone()),
    )?;
    let status = model.solve();
    let detail = || {
        model
            .solver()
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "VPP with {} resources and {} scenarios",
                    resources.len(),
                    scenarios.len()
                )
            })
    };
    match status {
        SolveStatus::Optimal => model.extract(),
        SolveStatus::Infeasible => Err(PlanError::Infeasible(detail())),
        SolveStatus::Unbounded => Err(PlanError::Unbounded(detail())),
        SolveStatus::Error => Err(PlanError::Solver(detail())),
    }
}
