//! Unit commitment MIP builder.

use super::{CostBreakdown, ConstraintFamily, ConstraintSet, UcSolution, UnitSchedule};
use crate::mip::{GoodLpSolver, LinearExpr, MipSolver, Relation, Sense, SolveStatus, VarGrid};
use powerplan_core::{validate_units, Horizon, PlanResult, Unit};
use std::time::Duration;
use tracing::{debug, info};
use web_time::Instant;

/// Decision variables, one row per unit and one column per period `0..=T`.
#[derive(Debug, Clone)]
pub struct UcVariables {
    /// Committed
    pub u: VarGrid,
    /// Starting up
    pub su: VarGrid,
    /// Shutting down
    pub sd: VarGrid,
    /// Delivered power
    pub p: VarGrid,
    /// Available-power ceiling
    pub p_bar: VarGrid,
}

/// A fully specified unit commitment MIP bound to its solver.
///
/// Building never mutates the inputs; the model keeps its own copy of the
/// fleet and horizon for result extraction.
#[derive(Debug)]
pub struct UcModel<S: MipSolver = GoodLpSolver> {
    solver: S,
    units: Vec<Unit>,
    horizon: Horizon,
    vars: UcVariables,
    solve_time: Duration,
}

impl<S: MipSolver> UcModel<S> {
    /// Validate the fleet, then create variables, initial-state fixings, the
    /// enabled constraint families and the cost objective.
    pub fn build(
        units: &[Unit],
        horizon: &Horizon,
        constraints: ConstraintSet,
        mut solver: S,
    ) -> PlanResult<Self> {
        validate_units(units)?;

        let vars = create_variables(&mut solver, units, horizon);
        let mut model = Self {
            solver,
            units: units.to_vec(),
            horizon: horizon.clone(),
            vars,
            solve_time: Duration::ZERO,
        };

        model.fix_initial_state();
        model.set_objective();
        for family in constraints.enabled() {
            let before = model.solver.num_constraints();
            match family {
                ConstraintFamily::PowerBalance => model.add_power_balance(),
                ConstraintFamily::ReserveCapacity => model.add_reserve_capacity(),
                ConstraintFamily::LogicalConsistency => model.add_logical_consistency(),
                ConstraintFamily::GenerationLimits => model.add_generation_limits(),
                ConstraintFamily::RampUp => model.add_ramp_up(),
                ConstraintFamily::RampDown => model.add_ramp_down(),
                ConstraintFamily::MinUpTime => model.add_min_up_time(),
                ConstraintFamily::MinDownTime => model.add_min_down_time(),
            }
            debug!(
                family = %family,
                added = model.solver.num_constraints() - before,
                "added constraint family"
            );
        }

        info!(
            units = model.units.len(),
            periods = model.horizon.planning_periods(),
            variables = model.solver.num_variables(),
            constraints = model.solver.num_constraints(),
            families = %constraints,
            "built unit commitment model"
        );
        Ok(model)
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn variables(&self) -> &UcVariables {
        &self.vars
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    /// Solve once and report the terminal status.
    pub fn solve(&mut self) -> SolveStatus {
        let start = Instant::now();
        let status = self.solver.solve();
        self.solve_time = start.elapsed();
        status
    }

    /// Wall-clock time of the last solve.
    pub fn solve_time(&self) -> Duration {
        self.solve_time
    }

    /// Read the schedule and cost breakdown. Fails unless the last solve was optimal.
    pub fn extract(&self) -> PlanResult<UcSolution> {
        let periods = self.horizon.len();
        let mut schedules = Vec::with_capacity(self.units.len());
        let mut total = CostBreakdown::default();

        for (j, unit) in self.units.iter().enumerate() {
            let mut schedule = UnitSchedule::new(unit.name.clone(), periods);
            for t in 0..periods {
                schedule.committed[t] = self.solver.value(self.vars.u[(j, t)])? > 0.5;
                schedule.startup[t] = self.solver.value(self.vars.su[(j, t)])? > 0.5;
                schedule.shutdown[t] = self.solver.value(self.vars.sd[(j, t)])? > 0.5;
                schedule.power[t] = self.solver.value(self.vars.p[(j, t)])?;
                schedule.available_power[t] = self.solver.value(self.vars.p_bar[(j, t)])?;
            }
            schedule.cost = CostBreakdown::for_schedule(unit, &schedule);
            total += schedule.cost;
            schedules.push(schedule);
        }

        Ok(UcSolution {
            status: SolveStatus::Optimal,
            objective: self.solver.objective_value()?,
            cost: total,
            units: schedules,
            demand: self.horizon.periods().iter().map(|p| p.demand).collect(),
            reserve: self.horizon.periods().iter().map(|p| p.reserve).collect(),
            num_variables: self.solver.num_variables(),
            num_constraints: self.solver.num_constraints(),
            solve_time_ms: self.solve_time.as_secs_f64() * 1000.0,
        })
    }

    fn planning(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.horizon.planning_periods()
    }

    fn fix_initial_state(&mut self) {
        for (j, unit) in self.units.iter().enumerate() {
            let init = &unit.initial;
            let fixings = [
                ("u", self.vars.u[(j, 0)], f64::from(u8::from(init.committed))),
                ("su", self.vars.su[(j, 0)], f64::from(u8::from(init.starting_up))),
                ("sd", self.vars.sd[(j, 0)], f64::from(u8::from(init.shutting_down))),
                ("p", self.vars.p[(j, 0)], init.power),
            ];
            for (label, var, value) in fixings {
                self.solver.add_constraint(
                    &format!("initial_{label}[{j}]"),
                    LinearExpr::from(var),
                    Relation::Eq,
                    value,
                );
            }
        }
    }

    /// Minimize fixed, energy, startup and shutdown cost over `t = 1..=T`.
    fn set_objective(&mut self) {
        let mut objective = LinearExpr::new();
        for (j, unit) in self.units.iter().enumerate() {
            for t in self.planning() {
                objective.add_term(unit.fixed_cost, self.vars.u[(j, t)]);
                objective.add_term(unit.variable_cost, self.vars.p[(j, t)]);
                objective.add_term(unit.startup_cost, self.vars.su[(j, t)]);
                objective.add_term(unit.shutdown_cost, self.vars.sd[(j, t)]);
            }
        }
        self.solver.set_objective(Sense::Minimize, objective);
    }

    /// `Σ_j p[j,t] = demand_t`
    fn add_power_balance(&mut self) {
        for t in self.planning() {
            let expr = (0..self.units.len())
                .map(|j| (1.0, self.vars.p[(j, t)]))
                .collect();
            self.solver.add_constraint(
                &format!("power_balance[{t}]"),
                expr,
                Relation::Eq,
                self.horizon.demand(t),
            );
        }
    }

    /// `Σ_j p̄[j,t] ≥ demand_t + reserve_t`
    fn add_reserve_capacity(&mut self) {
        for t in self.planning() {
            let expr = (0..self.units.len())
                .map(|j| (1.0, self.vars.p_bar[(j, t)]))
                .collect();
            self.solver.add_constraint(
                &format!("reserve_capacity[{t}]"),
                expr,
                Relation::Ge,
                self.horizon.demand(t) + self.horizon.reserve(t),
            );
        }
    }

    /// `u[t-1] − u[t] + su[t] − sd[t] = 0`
    fn add_logical_consistency(&mut self) {
        for j in 0..self.units.len() {
            for t in self.planning() {
                let expr = LinearExpr::new()
                    .term(1.0, self.vars.u[(j, t - 1)])
                    .term(-1.0, self.vars.u[(j, t)])
                    .term(1.0, self.vars.su[(j, t)])
                    .term(-1.0, self.vars.sd[(j, t)]);
                self.solver.add_constraint(
                    &format!("logical[{j},{t}]"),
                    expr,
                    Relation::Eq,
                    0.0,
                );
            }
        }
    }

    fn add_generation_limits(&mut self) {
        let last = self.horizon.planning_periods();
        for (j, unit) in self.units.iter().enumerate() {
            let v = &self.vars;
            for t in 0..=last {
                // P_min·u ≤ p ≤ p̄ ≤ P_max·u
                self.solver.add_constraint(
                    &format!("gen_min[{j},{t}]"),
                    LinearExpr::new()
                        .term(1.0, v.p[(j, t)])
                        .term(-unit.p_min, v.u[(j, t)]),
                    Relation::Ge,
                    0.0,
                );
                self.solver.add_constraint(
                    &format!("gen_below_ceiling[{j},{t}]"),
                    LinearExpr::new()
                        .term(1.0, v.p[(j, t)])
                        .term(-1.0, v.p_bar[(j, t)]),
                    Relation::Le,
                    0.0,
                );
                self.solver.add_constraint(
                    &format!("gen_max[{j},{t}]"),
                    LinearExpr::new()
                        .term(1.0, v.p_bar[(j, t)])
                        .term(-unit.p_max, v.u[(j, t)]),
                    Relation::Le,
                    0.0,
                );

                // p̄[t] ≤ p[t-1] + RU·u[t-1] + SU·su[t]
                if t >= 1 {
                    self.solver.add_constraint(
                        &format!("gen_ramp_ceiling[{j},{t}]"),
                        LinearExpr::new()
                            .term(1.0, v.p_bar[(j, t)])
                            .term(-1.0, v.p[(j, t - 1)])
                            .term(-unit.ramp_up, v.u[(j, t - 1)])
                            .term(-unit.startup_ramp, v.su[(j, t)]),
                        Relation::Le,
                        0.0,
                    );
                }

                // p̄[t] ≤ P_max·u[t] − P_max·sd[t+1] + SD·sd[t+1]
                if t < last {
                    self.solver.add_constraint(
                        &format!("gen_shutdown_ceiling[{j},{t}]"),
                        LinearExpr::new()
                            .term(1.0, v.p_bar[(j, t)])
                            .term(-unit.p_max, v.u[(j, t)])
                            .term(unit.p_max - unit.shutdown_ramp, v.sd[(j, t + 1)]),
                        Relation::Le,
                        0.0,
                    );
                }
            }
        }
    }

    /// `p[t] − p[t-1] ≤ RU·u[t-1] + SU·su[t]`
    fn add_ramp_up(&mut self) {
        for (j, unit) in self.units.iter().enumerate() {
            for t in self.planning() {
                let v = &self.vars;
                self.solver.add_constraint(
                    &format!("ramp_up[{j},{t}]"),
                    LinearExpr::new()
                        .term(1.0, v.p[(j, t)])
                        .term(-1.0, v.p[(j, t - 1)])
                        .term(-unit.ramp_up, v.u[(j, t - 1)])
                        .term(-unit.startup_ramp, v.su[(j, t)]),
                    Relation::Le,
                    0.0,
                );
            }
        }
    }

    /// `p[t-1] − p[t] ≤ RD·u[t] + SD·sd[t]`
    fn add_ramp_down(&mut self) {
        for (j, unit) in self.units.iter().enumerate() {
            for t in self.planning() {
                let v = &self.vars;
                self.solver.add_constraint(
                    &format!("ramp_down[{j},{t}]"),
                    LinearExpr::new()
                        .term(1.0, v.p[(j, t - 1)])
                        .term(-1.0, v.p[(j, t)])
                        .term(-unit.ramp_down, v.u[(j, t)])
                        .term(-unit.shutdown_ramp, v.sd[(j, t)]),
                    Relation::Le,
                    0.0,
                );
            }
        }
    }

    /// Force `u = 1` for the remaining must-stay-on periods, then require any
    /// startup in the trailing `TU` window to keep the unit on.
    fn add_min_up_time(&mut self) {
        let last = self.horizon.planning_periods();
        for (j, unit) in self.units.iter().enumerate() {
            let forced = last.min(unit.initial.must_stay_on as usize);
            for t in 1..=forced {
                self.solver.add_constraint(
                    &format!("min_up_initial[{j},{t}]"),
                    LinearExpr::from(self.vars.u[(j, t)]),
                    Relation::Eq,
                    1.0,
                );
            }
            for t in forced + 1..=last {
                let mut expr: LinearExpr = window(t, unit.min_up)
                    .map(|k| (1.0, self.vars.su[(j, k)]))
                    .collect();
                expr.add_term(-1.0, self.vars.u[(j, t)]);
                self.solver.add_constraint(
                    &format!("min_up[{j},{t}]"),
                    expr,
                    Relation::Le,
                    0.0,
                );
            }
        }
    }

    /// Symmetric to [`Self::add_min_up_time`] with shutdowns keeping the unit off.
    fn add_min_down_time(&mut self) {
        let last = self.horizon.planning_periods();
        for (j, unit) in self.units.iter().enumerate() {
            let forced = last.min(unit.initial.must_stay_off as usize);
            for t in 1..=forced {
                self.solver.add_constraint(
                    &format!("min_down_initial[{j},{t}]"),
                    LinearExpr::from(self.vars.u[(j, t)]),
                    Relation::Eq,
                    0.0,
                );
            }
            for t in forced + 1..=last {
                let mut expr: LinearExpr = window(t, unit.min_down)
                    .map(|k| (1.0, self.vars.sd[(j, k)]))
                    .collect();
                expr.add_term(1.0, self.vars.u[(j, t)]);
                self.solver.add_constraint(
                    &format!("min_down[{j},{t}]"),
                    expr,
                    Relation::Le,
                    1.0,
                );
            }
        }
    }
}

/// Periods `max(1, t − len + 1)..=t`; empty when `len` is 0.
fn window(t: usize, len: u32) -> std::ops::RangeInclusive<usize> {
    let start = (t + 1).saturating_sub(len as usize).max(1);
    start..=t
}

fn create_variables<S: MipSolver>(solver: &mut S, units: &[Unit], horizon: &Horizon) -> UcVariables {
    let n = units.len();
    let periods = horizon.len();
    let u = VarGrid::build(n, periods, |j, t| solver.add_binary(&format!("u[{j},{t}]")));
    let su = VarGrid::build(n, periods, |j, t| solver.add_binary(&format!("su[{j},{t}]")));
    let sd = VarGrid::build(n, periods, |j, t| solver.add_binary(&format!("sd[{j},{t}]")));
    let p = VarGrid::build(n, periods, |j, t| {
        solver.add_continuous(0.0, units[j].p_max, &format!("p[{j},{t}]"))
    });
    let p_bar = VarGrid::build(n, periods, |j, t| {
        solver.add_continuous(0.0, units[j].p_max, &format!("p_bar[{j},{t}]"))
    });
    UcVariables { u, su, sd, p, p_bar }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerplan_core::InitialState;

    fn two_units() -> Vec<Unit> {
        vec![
            Unit::new("A", 10.0, 100.0)
                .with_costs(100.0, 10.0, 50.0, 20.0)
                .with_ramps(60.0, 60.0, 40.0, 40.0)
                .with_min_times(2, 2)
                .with_initial(InitialState::online(50.0).with_must_stay_on(1)),
            Unit::new("B", 5.0, 50.0)
                .with_costs(50.0, 30.0, 10.0, 10.0)
                .with_min_times(3, 1),
        ]
    }

    fn horizon() -> Horizon {
        Horizon::from_planning(&[60.0, 80.0, 70.0], &[5.0, 5.0, 5.0]).unwrap()
    }

    #[test]
    fn test_window() {
        assert_eq!(window(5, 3), 3..=5);
        assert_eq!(window(2, 3), 1..=2);
        assert_eq!(window(4, 1), 4..=4);
        assert!(window(4, 0).is_empty());
    }

    #[test]
    fn test_variable_layout() {
        let model = UcModel::build(&two_units(), &horizon(), ConstraintSet::none(), GoodLpSolver::new())
            .unwrap();
        // 5 variables per unit per period, 4 periods including t=0
        assert_eq!(model.solver().num_variables(), 2 * 4 * 5);
        // initial fixings only
        assert_eq!(model.solver().num_constraints(), 2 * 4);
        let p_b = model.solver().variable(model.variables().p[(1, 2)]).unwrap();
        assert_eq!(p_b.name, "p[1,2]");
        assert_eq!(p_b.upper, 50.0);
    }

    #[test]
    fn test_family_counts() {
        let units = two_units();
        let h = horizon();
        let count = |family: ConstraintFamily| {
            let model = UcModel::build(&units, &h, ConstraintSet::none().with(family), GoodLpSolver::new())
                .unwrap();
            model.solver().num_constraints() - 8
        };

        assert_eq!(count(ConstraintFamily::PowerBalance), 3);
        assert_eq!(count(ConstraintFamily::ReserveCapacity), 3);
        assert_eq!(count(ConstraintFamily::LogicalConsistency), 6);
        // 3 limits for t=0..=3, ramp ceiling for t=1..=3, shutdown ceiling for t=0..=2
        assert_eq!(count(ConstraintFamily::GenerationLimits), 2 * (3 * 4 + 3 + 3));
        assert_eq!(count(ConstraintFamily::RampUp), 6);
        assert_eq!(count(ConstraintFamily::RampDown), 6);
        // unit A: 1 forced + 2 windows, unit B: 3 windows
        assert_eq!(count(ConstraintFamily::MinUpTime), 6);
        assert_eq!(count(ConstraintFamily::MinDownTime), 6);
    }

    #[test]
    fn test_objective_skips_initial_period() {
        let model = UcModel::build(&two_units(), &horizon(), ConstraintSet::all(), GoodLpSolver::new())
            .unwrap();
        let (sense, objective) = model.solver().objective().unwrap();
        assert_eq!(sense, Sense::Minimize);
        assert_eq!(objective.len(), 2 * 3 * 4);
        let u0 = model.variables().u[(0, 0)];
        assert!(objective.terms().iter().all(|(_, v)| *v != u0));
    }

    #[test]
    fn test_min_up_window_coefficients() {
        let model = UcModel::build(
            &two_units(),
            &horizon(),
            ConstraintSet::none().with(ConstraintFamily::MinUpTime),
            GoodLpSolver::new(),
        )
        .unwrap();
        let v = model.variables();
        let c = model.solver().constraint("min_up[1,3]").unwrap();
        assert_eq!(
            c.expr.terms(),
            &[
                (1.0, v.su[(1, 1)]),
                (1.0, v.su[(1, 2)]),
                (1.0, v.su[(1, 3)]),
                (-1.0, v.u[(1, 3)])
            ]
        );
        assert!(model.solver().constraint("min_up_initial[0,1]").is_some());
        assert!(model.solver().constraint("min_up[0,1]").is_none());
    }

    #[test]
    fn test_shutdown_ceiling_coefficients() {
        let model = UcModel::build(
            &two_units(),
            &horizon(),
            ConstraintSet::none().with(ConstraintFamily::GenerationLimits),
            GoodLpSolver::new(),
        )
        .unwrap();
        let v = model.variables();
        let c = model.solver().constraint("gen_shutdown_ceiling[0,1]").unwrap();
        assert_eq!(
            c.expr.terms(),
            &[
                (1.0, v.p_bar[(0, 1)]),
                (-100.0, v.u[(0, 1)]),
                (40.0, v.sd[(0, 2)])
            ]
        );
        assert!(model.solver().constraint("gen_shutdown_ceiling[0,3]").is_none());
        assert!(model.solver().constraint("gen_ramp_ceiling[0,0]").is_none());
    }

    #[test]
    fn test_must_stay_off_forces_unit_off() {
        let units = vec![Unit::new("C", 10.0, 100.0)
            .with_costs(100.0, 10.0, 50.0, 20.0)
            .with_min_times(1, 2)
            .with_initial(InitialState::offline().with_must_stay_off(2))];
        let model = UcModel::build(
            &units,
            &horizon(),
            ConstraintSet::none().with(ConstraintFamily::MinDownTime),
            GoodLpSolver::new(),
        )
        .unwrap();
        let v = model.variables();
        let solver = model.solver();

        for t in 1..=2 {
            let c = solver.constraint(&format!("min_down_initial[0,{t}]")).unwrap();
            assert_eq!(c.expr.terms(), &[(1.0, v.u[(0, t)])]);
            assert_eq!(c.relation, Relation::Eq);
            assert_eq!(c.rhs, 0.0);
            assert!(solver.constraint(&format!("min_down[0,{t}]")).is_none());
        }
        assert!(solver.constraint("min_down_initial[0,3]").is_none());

        let window_row = solver.constraint("min_down[0,3]").unwrap();
        assert_eq!(
            window_row.expr.terms(),
            &[(1.0, v.sd[(0, 2)]), (1.0, v.sd[(0, 3)]), (1.0, v.u[(0, 3)])]
        );
        assert_eq!(window_row.rhs, 1.0);
        assert_eq!(solver.constraints_with_prefix("min_down").count(), 3);
    }

    #[test]
    fn test_must_stay_on_truncated_at_horizon() {
        let units = vec![Unit::new("D", 10.0, 100.0)
            .with_costs(100.0, 10.0, 50.0, 20.0)
            .with_min_times(2, 1)
            .with_initial(InitialState::online(50.0).with_must_stay_on(10))];
        let model = UcModel::build(
            &units,
            &horizon(),
            ConstraintSet::none().with(ConstraintFamily::MinUpTime),
            GoodLpSolver::new(),
        )
        .unwrap();
        let solver = model.solver();

        assert_eq!(solver.constraints_with_prefix("min_up_initial[0,").count(), 3);
        for t in 1..=3 {
            let c = solver.constraint(&format!("min_up_initial[0,{t}]")).unwrap();
            assert_eq!(c.rhs, 1.0);
        }
        assert_eq!(solver.constraints_with_prefix("min_up[").count(), 0);
    }

    #[test]
    fn test_invalid_unit_rejected_before_build() {
        let mut units = two_units();
        units[1].p_max = -1.0;
        let err = UcModel::build(&units, &horizon(), ConstraintSet::all(), GoodLpSolver::new())
            .unwrap_err();
        assert!(err.to_string().contains("unit 'B'"));
    }

    #[test]
    fn test_extract_requires_solve() {
        let model = UcModel::build(&two_units(), &horizon(), ConstraintSet::all(), GoodLpSolver::new())
            .unwrap();
        assert!(model.extract().is_err());
    }
}
