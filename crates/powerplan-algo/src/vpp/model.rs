//! Stochastic VPP MIP builder.

use super::VppSolution;
use crate::mip::{
    GoodLpSolver, LinearExpr, MipSolver, Relation, ScenarioGrid, Sense, SolveStatus, VarGrid,
};
use powerplan_core::{
    validate_vpp, DistributedResource, MarketScenario, PlanResult, ResourceKind, VppParameters,
};
use std::time::Duration;
use tracing::{debug, info};
use web_time::Instant;

/// Storage variables of one battery, indexed by `(scenario, period)`.
#[derive(Debug, Clone)]
pub struct BatteryVars {
    /// State of charge as a fraction of energy capacity
    pub soc: VarGrid,
    pub charge: VarGrid,
    pub discharge: VarGrid,
}

/// Decision variables of the VPP model.
#[derive(Debug, Clone)]
pub struct VppVariables {
    /// Net output per `(resource, scenario, period)`; signed for batteries
    pub power: ScenarioGrid,
    pub reserve: ScenarioGrid,
    /// Energy offered to the market per `(scenario, period)`
    pub market_bid: VarGrid,
    /// Storage variables, `Some` only for battery resources
    pub batteries: Vec<Option<BatteryVars>>,
}

/// A scenario-indexed MIP maximizing expected profit of the portfolio.
#[derive(Debug)]
pub struct VppModel<S: MipSolver = GoodLpSolver> {
    solver: S,
    resources: Vec<DistributedResource>,
    scenarios: Vec<MarketScenario>,
    params: VppParameters,
    vars: VppVariables,
    solve_time: Duration,
}

impl<S: MipSolver> VppModel<S> {
    pub fn build(
        resources: &[DistributedResource],
        scenarios: &[MarketScenario],
        params: &VppParameters,
        mut solver: S,
    ) -> PlanResult<Self> {
        validate_vpp(resources, scenarios, params)?;

        let vars = create_variables(&mut solver, resources, scenarios.len(), params.time_periods);
        let mut model = Self {
            solver,
            resources: resources.to_vec(),
            scenarios: scenarios.to_vec(),
            params: params.clone(),
            vars,
            solve_time: Duration::ZERO,
        };

        let steps: [(&str, fn(&mut Self)); 6] = [
            ("power_balance", Self::add_power_balance),
            ("battery_soc", Self::add_battery_dynamics),
            ("reserve_requirement", Self::add_reserve_requirement),
            ("resource_capacity", Self::add_resource_capacity),
            ("ramp", Self::add_ramp_limits),
            ("objective", Self::set_objective),
        ];
        for (name, step) in steps {
            let before = model.solver.num_constraints();
            step(&mut model);
            debug!(
                family = name,
                added = model.solver.num_constraints() - before,
                "added constraint family"
            );
        }

        info!(
            resources = model.resources.len(),
            scenarios = model.scenarios.len(),
            periods = model.params.time_periods,
            variables = model.solver.num_variables(),
            constraints = model.solver.num_constraints(),
            "built VPP model"
        );
        Ok(model)
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn variables(&self) -> &VppVariables {
        &self.vars
    }

    pub fn resources(&self) -> &[DistributedResource] {
        &self.resources
    }

    pub fn scenarios(&self) -> &[MarketScenario] {
        &self.scenarios
    }

    pub fn parameters(&self) -> &VppParameters {
        &self.params
    }

    pub fn solve(&mut self) -> SolveStatus {
        let start = Instant::now();
        let status = self.solver.solve();
        self.solve_time = start.elapsed();
        status
    }

    pub fn solve_time(&self) -> Duration {
        self.solve_time
    }

    /// Read schedules and derive the financial metrics. Fails unless the last
    /// solve was optimal.
    pub fn extract(&self) -> PlanResult<VppSolution> {
        VppSolution::extract(self)
    }

    fn periods(&self) -> usize {
        self.params.time_periods
    }

    /// Generation minus demand-response curtailment equals the bid.
    fn add_power_balance(&mut self) {
        for s in 0..self.scenarios.len() {
            for t in 0..self.periods() {
                let mut expr = LinearExpr::new();
                for (r, resource) in self.resources.iter().enumerate() {
                    let sign = if resource.kind == ResourceKind::DemandResponse {
                        -1.0
                    } else {
                        1.0
                    };
                    expr.add_term(sign, self.vars.power[(r, s, t)]);
                }
                expr.add_term(-1.0, self.vars.market_bid[(s, t)]);
                self.solver.add_constraint(
                    &format!("power_balance[{s},{t}]"),
                    expr,
                    Relation::Eq,
                    0.0,
                );
            }
        }
    }

    /// SOC recursion driven by the previous period's charge and discharge,
    /// plus the `power = discharge − charge` link.
    fn add_battery_dynamics(&mut self) {
        let periods = self.periods();
        for (r, resource) in self.resources.iter().enumerate() {
            let (Some(spec), Some(bv)) = (&resource.battery, &self.vars.batteries[r]) else {
                continue;
            };
            let charge_gain = spec.efficiency / spec.energy_capacity;
            let discharge_loss = 1.0 / (spec.efficiency * spec.energy_capacity);

            for s in 0..self.scenarios.len() {
                self.solver.add_constraint(
                    &format!("soc_initial[{r},{s}]"),
                    LinearExpr::from(bv.soc[(s, 0)]),
                    Relation::Eq,
                    spec.initial_soc,
                );
                for t in 1..periods {
                    self.solver.add_constraint(
                        &format!("soc[{r},{s},{t}]"),
                        LinearExpr::new()
                            .term(1.0, bv.soc[(s, t)])
                            .term(-1.0, bv.soc[(s, t - 1)])
                            .term(-charge_gain, bv.charge[(s, t - 1)])
                            .term(discharge_loss, bv.discharge[(s, t - 1)]),
                        Relation::Eq,
                        0.0,
                    );
                }
                for t in 0..periods {
                    self.solver.add_constraint(
                        &format!("battery_power[{r},{s},{t}]"),
                        LinearExpr::new()
                            .term(1.0, self.vars.power[(r, s, t)])
                            .term(-1.0, bv.discharge[(s, t)])
                            .term(1.0, bv.charge[(s, t)]),
                        Relation::Eq,
                        0.0,
                    );
                }
            }
        }
    }

    /// `Σ_r reserve ≥ reserve_margin · bid`
    fn add_reserve_requirement(&mut self) {
        for s in 0..self.scenarios.len() {
            for t in 0..self.periods() {
                let mut expr: LinearExpr = (0..self.resources.len())
                    .map(|r| (1.0, self.vars.reserve[(r, s, t)]))
                    .collect();
                expr.add_term(-self.params.reserve_margin, self.vars.market_bid[(s, t)]);
                self.solver.add_constraint(
                    &format!("reserve_requirement[{s},{t}]"),
                    expr,
                    Relation::Ge,
                    0.0,
                );
            }
        }
    }

    /// Headroom shared between energy and reserve.
    fn add_resource_capacity(&mut self) {
        let periods = self.periods();
        for (r, resource) in self.resources.iter().enumerate() {
            for s in 0..self.scenarios.len() {
                for t in 0..periods {
                    let reserve = self.vars.reserve[(r, s, t)];
                    match (&resource.battery, &self.vars.batteries[r]) {
                        (Some(spec), Some(bv)) => {
                            self.solver.add_constraint(
                                &format!("discharge_capacity[{r},{s},{t}]"),
                                LinearExpr::new()
                                    .term(1.0, bv.discharge[(s, t)])
                                    .term(1.0, reserve),
                                Relation::Le,
                                spec.max_discharge_rate,
                            );
                            self.solver.add_constraint(
                                &format!("charge_capacity[{r},{s},{t}]"),
                                LinearExpr::from(bv.charge[(s, t)]),
                                Relation::Le,
                                spec.max_charge_rate,
                            );
                        }
                        _ => {
                            self.solver.add_constraint(
                                &format!("capacity[{r},{s},{t}]"),
                                LinearExpr::new()
                                    .term(1.0, self.vars.power[(r, s, t)])
                                    .term(1.0, reserve),
                                Relation::Le,
                                resource.max_available(t),
                            );
                        }
                    }
                }
            }
        }
    }

    /// Ramp limits per scenario trajectory.
    fn add_ramp_limits(&mut self) {
        let periods = self.periods();
        for (r, resource) in self.resources.iter().enumerate() {
            for s in 0..self.scenarios.len() {
                for t in 1..periods {
                    let now = self.vars.power[(r, s, t)];
                    let prev = self.vars.power[(r, s, t - 1)];
                    self.solver.add_constraint(
                        &format!("ramp_up[{r},{s},{t}]"),
                        LinearExpr::new().term(1.0, now).term(-1.0, prev),
                        Relation::Le,
                        resource.ramp_up,
                    );
                    self.solver.add_constraint(
                        &format!("ramp_down[{r},{s},{t}]"),
                        LinearExpr::new().term(1.0, prev).term(-1.0, now),
                        Relation::Le,
                        resource.ramp_down,
                    );
                }
            }
        }
    }

    /// Expected revenue minus costs plus renewable credits minus fees.
    ///
    /// Fixed costs do not depend on any decision and enter as a constant.
    fn set_objective(&mut self) {
        let periods = self.periods();
        let fee = self.params.market_participation_fee;
        let credit = self.params.renewable_credit;
        let mut objective = LinearExpr::new();

        for (s, scenario) in self.scenarios.iter().enumerate() {
            let prob = scenario.probability;
            for t in 0..periods {
                let bid = self.vars.market_bid[(s, t)];
                objective.add_term(prob * scenario.prices[t], bid);
                objective.add_term(-prob * fee, bid);

                for (r, resource) in self.resources.iter().enumerate() {
                    let power = self.vars.power[(r, s, t)];
                    let cost = prob * resource.variable_cost;
                    if resource.kind == ResourceKind::DemandResponse {
                        objective.add_term(cost, power);
                    } else {
                        objective.add_term(-cost, power);
                    }
                    if resource.kind.is_renewable() {
                        objective.add_term(prob * credit, power);
                    }
                    objective.add_constant(
                        -resource.fixed_cost * resource.capacity * prob / periods as f64,
                    );
                }
            }
        }
        self.solver.set_objective(Sense::Maximize, objective);
    }
}

fn create_variables<S: MipSolver>(
    solver: &mut S,
    resources: &[DistributedResource],
    scenarios: usize,
    periods: usize,
) -> VppVariables {
    let n = resources.len();
    let power = ScenarioGrid::build(n, scenarios, periods, |r, s, t| {
        let (lower, upper) = resources[r].power_bounds(t);
        solver.add_continuous(lower, upper, &format!("power[{},{s},{t}]", resources[r].name))
    });
    let reserve = ScenarioGrid::build(n, scenarios, periods, |r, s, t| {
        solver.add_continuous(
            0.0,
            resources[r].reserve_limit(t),
            &format!("reserve[{},{s},{t}]", resources[r].name),
        )
    });

    let bid_limit: f64 = resources.iter().map(|r| r.capacity).sum();
    let market_bid = VarGrid::build(scenarios, periods, |s, t| {
        solver.add_continuous(0.0, bid_limit, &format!("market_bid[{s},{t}]"))
    });

    let batteries = resources
        .iter()
        .map(|resource| {
            let spec = resource.battery.as_ref().filter(|_| resource.is_battery())?;
            let name = &resource.name;
            Some(BatteryVars {
                soc: VarGrid::build(scenarios, periods, |s, t| {
                    solver.add_continuous(spec.min_soc, spec.max_soc, &format!("soc[{name},{s},{t}]"))
                }),
                charge: VarGrid::build(scenarios, periods, |s, t| {
                    solver.add_continuous(0.0, spec.max_charge_rate, &format!("charge[{name},{s},{t}]"))
                }),
                discharge: VarGrid::build(scenarios, periods, |s, t| {
                    solver.add_continuous(
                        0.0,
                        spec.max_discharge_rate,
                        &format!("discharge[{name},{s},{t}]"),
                    )
                }),
            })
        })
        .collect();

    VppVariables {
        power,
        reserve,
        market_bid,
        batteries,
    }
}
