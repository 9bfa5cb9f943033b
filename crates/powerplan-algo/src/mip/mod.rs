//! Solver abstraction for mixed-integer linear programs.
//!
//! Model builders talk to a [`MipSolver`]: they create variables, add linear
//! constraints built as [`LinearExpr`] accumulators, set the objective and
//! call `solve()` once. Values can be read back only after the solve
//! reported [`SolveStatus::Optimal`].
//!
//! ```text
//! build ──▶ add_continuous / add_binary ──▶ add_constraint ──▶ set_objective
//!                                                                 │
//!          value(var) ◀── Optimal ◀── solve() ◀───────────────────┘
//! ```
//!
//! [`GoodLpSolver`] is the bundled implementation. It records the model as
//! plain data and translates it to `good_lp` when solving, using the pure-Rust
//! `microlp` backend by default or HiGHS with the `solver-highs` feature.

mod backend;
mod expr;
mod grid;

pub use backend::{GoodLpSolver, SolverBackend, SolverConfig};
pub use expr::{LinearExpr, VarId};
pub use grid::{ScenarioGrid, VarGrid};

use powerplan_core::PlanResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Constraint sense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    Le,
    Eq,
    Ge,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Le => "<=",
            Relation::Eq => "=",
            Relation::Ge => ">=",
        })
    }
}

/// Objective direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// Terminal status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Optimal solution found.
    Optimal,
    /// Constraints are jointly unsatisfiable.
    Infeasible,
    /// Objective can be improved without limit.
    Unbounded,
    /// Backend failure, time limit or numerical trouble.
    Error,
}

impl SolveStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::Error => write!(f, "error"),
        }
    }
}

/// Handle to a constraint, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub usize);

/// Kind of a decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Continuous,
    Binary,
}

/// A variable as recorded by the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct VarSpec {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
}

/// A linear constraint `expr (relation) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpec {
    pub name: String,
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl ConstraintSpec {
    /// Whether an assignment satisfies the constraint within `tol`.
    pub fn is_satisfied(&self, value: impl Fn(VarId) -> f64, tol: f64) -> bool {
        let lhs = self.expr.evaluate(value);
        match self.relation {
            Relation::Le => lhs <= self.rhs + tol,
            Relation::Eq => (lhs - self.rhs).abs() <= tol,
            Relation::Ge => lhs >= self.rhs - tol,
        }
    }
}

/// Interface the model builders program against.
///
/// A solver instance belongs to exactly one model build; builders take it by
/// value so it cannot be shared between two of them.
pub trait MipSolver {
    /// Create a continuous variable in `[lower, upper]`; infinite bounds are allowed.
    fn add_continuous(&mut self, lower: f64, upper: f64, name: &str) -> VarId;

    /// Create a `{0, 1}` variable.
    fn add_binary(&mut self, name: &str) -> VarId;

    fn add_constraint(
        &mut self,
        name: &str,
        expr: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) -> ConstraintId;

    fn set_objective(&mut self, sense: Sense, expr: LinearExpr);

    /// Solve once; blocks until the backend reports a terminal status.
    fn solve(&mut self) -> SolveStatus;

    /// Status of the last solve, `None` before `solve()`.
    fn status(&self) -> Option<SolveStatus>;

    /// Solved value of `var`. Fails unless the last solve was optimal.
    fn value(&self, var: VarId) -> PlanResult<f64>;

    /// Objective value at the optimum. Fails unless the last solve was optimal.
    fn objective_value(&self) -> PlanResult<f64>;

    fn num_variables(&self) -> usize;

    fn num_constraints(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_and_success() {
        assert_eq!(SolveStatus::Optimal.to_string(), "optimal");
        assert_eq!(SolveStatus::Infeasible.to_string(), "infeasible");
        assert!(SolveStatus::Optimal.is_success());
        assert!(!SolveStatus::Error.is_success());
    }

    #[test]
    fn test_constraint_satisfaction() {
        let x = VarId::new(0);
        let c = ConstraintSpec {
            name: "cap".into(),
            expr: LinearExpr::from(x),
            relation: Relation::Le,
            rhs: 10.0,
        };
        assert!(c.is_satisfied(|_| 10.0 + 1e-9, 1e-6));
        assert!(!c.is_satisfied(|_| 10.1, 1e-6));
    }
}
