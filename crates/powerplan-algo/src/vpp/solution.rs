//! Extraction of VPP schedules and expected financial metrics.

use super::VppModel;
use crate::mip::{MipSolver, SolveStatus, VarGrid, VarId};
use powerplan_core::{
    BatterySpec, DistributedResource, MarketScenario, PlanResult, ResourceKind, VppParameters,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Values below this are treated as zero when counting active periods.
const ACTIVITY_EPS: f64 = 1e-6;

/// Storage trajectory of a battery, outer index scenario, inner index period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySchedule {
    pub soc: Vec<Vec<f64>>,
    pub charge: Vec<Vec<f64>>,
    pub discharge: Vec<Vec<f64>>,
}

/// Solved series of one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchedule {
    pub name: String,
    pub kind: ResourceKind,
    /// Net output per scenario and period
    pub power: Vec<Vec<f64>>,
    /// Reserve provision per scenario and period
    pub reserve: Vec<Vec<f64>>,
    /// Probability-weighted output per period
    pub expected_power: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<BatterySchedule>,
}

impl ResourceSchedule {
    /// Expected energy over the horizon (MWh).
    pub fn expected_energy(&self) -> f64 {
        self.expected_power.iter().sum()
    }
}

/// Market position in one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBids {
    pub scenario: String,
    pub probability: f64,
    pub bids: Vec<f64>,
}

impl ScenarioBids {
    pub fn total(&self) -> f64 {
        self.bids.iter().sum()
    }
}

/// Probability-weighted financial outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub expected_revenue: f64,
    /// Variable and fixed costs net of demand-response incentives
    pub expected_costs: f64,
    pub expected_carbon_credits: f64,
    pub expected_fees: f64,
    pub expected_profit: f64,
    /// `profit / costs`, or 0 when costs are not positive
    pub roi: f64,
}

impl FinancialMetrics {
    /// Evaluate the metrics of a schedule. Pure function of the inputs.
    pub fn evaluate(
        resources: &[DistributedResource],
        scenarios: &[MarketScenario],
        params: &VppParameters,
        power: impl Fn(usize, usize, usize) -> f64,
        bids: impl Fn(usize, usize) -> f64,
    ) -> Self {
        let periods = params.time_periods;
        let mut m = FinancialMetrics::default();

        for (s, scenario) in scenarios.iter().enumerate() {
            let prob = scenario.probability;
            for t in 0..periods {
                let bid = bids(s, t);
                m.expected_revenue += scenario.prices[t] * bid * prob;
                m.expected_fees += params.market_participation_fee * bid * prob;

                for (r, resource) in resources.iter().enumerate() {
                    let p = power(r, s, t);
                    let variable = resource.variable_cost * p * prob;
                    if resource.kind == ResourceKind::DemandResponse {
                        m.expected_costs -= variable;
                    } else {
                        m.expected_costs += variable;
                    }
                    m.expected_costs += resource.fixed_cost * resource.capacity * prob / periods as f64;
                    if resource.kind.is_renewable() {
                        m.expected_carbon_credits += params.renewable_credit * p * prob;
                    }
                }
            }
        }

        m.expected_profit =
            m.expected_revenue - m.expected_costs + m.expected_carbon_credits - m.expected_fees;
        m.roi = if m.expected_costs > 0.0 {
            m.expected_profit / m.expected_costs
        } else {
            0.0
        };
        m
    }
}

/// Energy-balance check of one battery in one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryAudit {
    pub resource: String,
    pub scenario: String,
    pub total_charge: f64,
    pub total_discharge: f64,
    /// `total_charge · efficiency`
    pub discharge_allowance: f64,
    pub soc_min: f64,
    pub soc_max: f64,
    pub charging_periods: usize,
    pub discharging_periods: usize,
}

impl BatteryAudit {
    fn new(
        resource: &str,
        scenario: &str,
        spec: &BatterySpec,
        soc: &[f64],
        charge: &[f64],
        discharge: &[f64],
    ) -> Self {
        let total_charge: f64 = charge.iter().sum();
        Self {
            resource: resource.to_string(),
            scenario: scenario.to_string(),
            total_charge,
            total_discharge: discharge.iter().sum(),
            discharge_allowance: total_charge * spec.efficiency,
            soc_min: soc.iter().copied().fold(f64::INFINITY, f64::min),
            soc_max: soc.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            charging_periods: charge.iter().filter(|c| **c > ACTIVITY_EPS).count(),
            discharging_periods: discharge.iter().filter(|d| **d > ACTIVITY_EPS).count(),
        }
    }

    /// Discharge in excess of what was charged, after losses.
    pub fn excess_discharge(&self) -> f64 {
        (self.total_discharge - self.discharge_allowance).max(0.0)
    }

    /// Discharged more than charged energy allows; the initial state of
    /// charge can account for this.
    pub fn is_violation(&self) -> bool {
        self.excess_discharge() > ACTIVITY_EPS
    }
}

/// Result of a VPP solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VppSolution {
    pub status: SolveStatus,
    pub objective: f64,
    pub resources: Vec<ResourceSchedule>,
    pub market_bids: Vec<ScenarioBids>,
    pub metrics: FinancialMetrics,
    pub battery_audits: Vec<BatteryAudit>,
    pub num_variables: usize,
    pub num_constraints: usize,
    pub solve_time_ms: f64,
}

impl VppSolution {
    pub(crate) fn extract<S: MipSolver>(model: &VppModel<S>) -> PlanResult<Self> {
        let solver = model.solver();
        let vars = model.variables();
        let scenarios = model.scenarios();
        let periods = model.parameters().time_periods;

        let read = |ids: &[VarId]| -> PlanResult<Vec<f64>> {
            ids.iter().map(|v| solver.value(*v)).collect()
        };
        let read_grid = |grid: &VarGrid| -> PlanResult<Vec<Vec<f64>>> {
            (0..grid.rows())
                .map(|s| read(grid.row(s).unwrap_or(&[])))
                .collect()
        };

        let mut resources = Vec::with_capacity(model.resources().len());
        let mut audits = Vec::new();
        for (r, resource) in model.resources().iter().enumerate() {
            let mut power = Vec::with_capacity(scenarios.len());
            let mut reserve = Vec::with_capacity(scenarios.len());
            for s in 0..scenarios.len() {
                power.push(read(vars.power.series(r, s).unwrap_or(&[]))?);
                reserve.push(read(vars.reserve.series(r, s).unwrap_or(&[]))?);
            }
            let expected_power = expected_series(&power, scenarios, periods);

            let battery = match (&resource.battery, &vars.batteries[r]) {
                (Some(spec), Some(bv)) => {
                    let schedule = BatterySchedule {
                        soc: read_grid(&bv.soc)?,
                        charge: read_grid(&bv.charge)?,
                        discharge: read_grid(&bv.discharge)?,
                    };
                    for (s, scenario) in scenarios.iter().enumerate() {
                        audits.push(BatteryAudit::new(
                            &resource.name,
                            &scenario.name,
                            spec,
                            &schedule.soc[s],
                            &schedule.charge[s],
                            &schedule.discharge[s],
                        ));
                    }
                    Some(schedule)
                }
                _ => None,
            };

            resources.push(ResourceSchedule {
                name: resource.name.clone(),
                kind: resource.kind,
                power,
                reserve,
                expected_power,
                battery,
            });
        }

        let bid_values = read_grid(&vars.market_bid)?;
        let market_bids = scenarios
            .iter()
            .zip(&bid_values)
            .map(|(scenario, bids)| ScenarioBids {
                scenario: scenario.name.clone(),
                probability: scenario.probability,
                bids: bids.clone(),
            })
            .collect();

        let metrics = FinancialMetrics::evaluate(
            model.resources(),
            scenarios,
            model.parameters(),
            |r, s, t| resources[r].power[s][t],
            |s, t| bid_values[s][t],
        );

        for audit in &audits {
            if audit.is_violation() {
                warn!(
                    resource = %audit.resource,
                    scenario = %audit.scenario,
                    excess_mwh = audit.excess_discharge(),
                    "battery discharged more energy than it charged"
                );
            }
        }
        info!(
            expected_profit = metrics.expected_profit,
            roi = metrics.roi,
            "extracted VPP results"
        );

        Ok(VppSolution {
            status: SolveStatus::Optimal,
            objective: solver.objective_value()?,
            resources,
            market_bids,
            metrics,
            battery_audits: audits,
            num_variables: solver.num_variables(),
            num_constraints: solver.num_constraints(),
            solve_time_ms: model.solve_time().as_secs_f64() * 1000.0,
        })
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceSchedule> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn summary(&self) -> String {
        let m = &self.metrics;
        let mut s = String::new();
        s.push_str(&format!("Virtual Power Plant Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Status: {}\n", self.status));
        s.push_str(&format!("Expected Revenue: ${:.2}\n", m.expected_revenue));
        s.push_str(&format!("Expected Costs: ${:.2}\n", m.expected_costs));
        s.push_str(&format!("Carbon Credits: ${:.2}\n", m.expected_carbon_credits));
        s.push_str(&format!("Market Fees: ${:.2}\n", m.expected_fees));
        s.push_str(&format!("Expected Profit: ${:.2}\n", m.expected_profit));
        s.push_str(&format!("ROI: {:.1}%\n", m.roi * 100.0));
        s.push_str(&format!(
            "Model: {} variables, {} constraints\n",
            self.num_variables, self.num_constraints
        ));
        s.push_str(&format!("Solve Time: {:.2} ms\n", self.solve_time_ms));

        if !self.resources.is_empty() {
            s.push_str("\nResource Utilization (expected):\n");
            for resource in &self.resources {
                let total = resource.expected_energy();
                let avg = total / resource.expected_power.len().max(1) as f64;
                s.push_str(&format!(
                    "  {}: {:.1} MWh total, {:.1} MW avg\n",
                    resource.name, total, avg
                ));
            }
        }

        if !self.market_bids.is_empty() {
            s.push_str("\nMarket Participation:\n");
            for bids in &self.market_bids {
                let total = bids.total();
                let avg = total / bids.bids.len().max(1) as f64;
                s.push_str(&format!(
                    "  {} (p={}): {:.1} MWh total, {:.1} MW avg\n",
                    bids.scenario, bids.probability, total, avg
                ));
            }
        }

        for audit in self.battery_audits.iter().filter(|a| a.is_violation()) {
            s.push_str(&format!(
                "\n[WARN] {} ({}): {:.1} MWh discharged beyond charged energy\n",
                audit.resource,
                audit.scenario,
                audit.excess_discharge()
            ));
        }

        s
    }
}

/// `Σ_s probability_s · power[s][t]`
pub fn expected_series(power: &[Vec<f64>], scenarios: &[MarketScenario], periods: usize) -> Vec<f64> {
    (0..periods)
        .map(|t| {
            power
                .iter()
                .zip(scenarios)
                .map(|(series, scenario)| scenario.probability * series.get(t).copied().unwrap_or(0.0))
                .sum()
        })
        .collect()
}
