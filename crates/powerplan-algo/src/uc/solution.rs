//! Unit commitment results.

use crate::mip::SolveStatus;
use powerplan_core::Unit;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Operating cost split by component, over the planning periods only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Commitment (no-load) cost
    pub fixed: f64,
    /// Energy cost
    pub variable: f64,
    pub startup: f64,
    pub shutdown: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.fixed + self.variable + self.startup + self.shutdown
    }

    /// Cost of one unit's schedule; period 0 is the initial condition and is not charged.
    pub fn for_schedule(unit: &Unit, schedule: &UnitSchedule) -> Self {
        let mut cost = CostBreakdown::default();
        for t in 1..schedule.len() {
            if schedule.committed[t] {
                cost.fixed += unit.fixed_cost;
            }
            if schedule.startup[t] {
                cost.startup += unit.startup_cost;
            }
            if schedule.shutdown[t] {
                cost.shutdown += unit.shutdown_cost;
            }
            cost.variable += unit.variable_cost * schedule.power[t];
        }
        cost
    }
}

impl Add for CostBreakdown {
    type Output = CostBreakdown;

    fn add(mut self, rhs: CostBreakdown) -> CostBreakdown {
        self += rhs;
        self
    }
}

impl AddAssign for CostBreakdown {
    fn add_assign(&mut self, rhs: CostBreakdown) {
        self.fixed += rhs.fixed;
        self.variable += rhs.variable;
        self.startup += rhs.startup;
        self.shutdown += rhs.shutdown;
    }
}

/// Solved trajectory of one unit over `t = 0..=T`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSchedule {
    pub name: String,
    pub committed: Vec<bool>,
    pub startup: Vec<bool>,
    pub shutdown: Vec<bool>,
    /// Delivered power (MW)
    pub power: Vec<f64>,
    /// Available-power ceiling (MW)
    pub available_power: Vec<f64>,
    pub cost: CostBreakdown,
}

impl UnitSchedule {
    pub fn new(name: impl Into<String>, periods: usize) -> Self {
        Self {
            name: name.into(),
            committed: vec![false; periods],
            startup: vec![false; periods],
            shutdown: vec![false; periods],
            power: vec![0.0; periods],
            available_power: vec![0.0; periods],
            cost: CostBreakdown::default(),
        }
    }

    /// Number of periods including `t = 0`.
    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    pub fn startups(&self) -> usize {
        self.startup.iter().skip(1).filter(|s| **s).count()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdown.iter().skip(1).filter(|s| **s).count()
    }

    /// Planning periods the unit is committed.
    pub fn hours_online(&self) -> usize {
        self.committed.iter().skip(1).filter(|c| **c).count()
    }

    /// Energy over the planning periods (MWh).
    pub fn energy(&self) -> f64 {
        self.power.iter().skip(1).sum()
    }
}

/// Result of a unit commitment solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UcSolution {
    pub status: SolveStatus,
    /// Objective value reported by the solver
    pub objective: f64,
    /// Aggregate cost recomputed from the schedule
    pub cost: CostBreakdown,
    pub units: Vec<UnitSchedule>,
    /// Demand per period, `t = 0..=T`
    pub demand: Vec<f64>,
    /// Reserve requirement per period, `t = 0..=T`
    pub reserve: Vec<f64>,
    pub num_variables: usize,
    pub num_constraints: usize,
    pub solve_time_ms: f64,
}

impl UcSolution {
    pub fn total_cost(&self) -> f64 {
        self.cost.total()
    }

    pub fn planning_periods(&self) -> usize {
        self.demand.len().saturating_sub(1)
    }

    pub fn unit(&self, name: &str) -> Option<&UnitSchedule> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Total delivered power at `t`.
    pub fn generation(&self, t: usize) -> f64 {
        self.units.iter().filter_map(|u| u.power.get(t)).sum()
    }

    /// Total available-power ceiling at `t`.
    pub fn available_capacity(&self, t: usize) -> f64 {
        self.units.iter().filter_map(|u| u.available_power.get(t)).sum()
    }

    /// Units committed at `t`.
    pub fn committed_units(&self, t: usize) -> usize {
        self.units
            .iter()
            .filter(|u| u.committed.get(t).copied().unwrap_or(false))
            .count()
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Unit Commitment Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Status: {}\n", self.status));
        s.push_str(&format!("Total Cost: ${:.2}\n", self.total_cost()));
        s.push_str(&format!("  Fixed: ${:.2}\n", self.cost.fixed));
        s.push_str(&format!("  Variable: ${:.2}\n", self.cost.variable));
        s.push_str(&format!("  Startup: ${:.2}\n", self.cost.startup));
        s.push_str(&format!("  Shutdown: ${:.2}\n", self.cost.shutdown));
        s.push_str(&format!(
            "Model: {} variables, {} constraints\n",
            self.num_variables, self.num_constraints
        ));
        s.push_str(&format!("Solve Time: {:.2} ms\n", self.solve_time_ms));

        if !self.units.is_empty() {
            s.push_str("\nUnits:\n");
            for unit in &self.units {
                s.push_str(&format!(
                    "  {}: {} h online, {} startups, {} shutdowns, {:.1} MWh, ${:.2}\n",
                    unit.name,
                    unit.hours_online(),
                    unit.startups(),
                    unit.shutdowns(),
                    unit.energy(),
                    unit.cost.total()
                ));
            }
        }

        s
    }
}
