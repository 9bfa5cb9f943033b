//! `good_lp` binding of the solver abstraction.

use super::{
    ConstraintId, ConstraintSpec, LinearExpr, MipSolver, Relation, Sense, SolveStatus, VarId,
    VarKind, VarSpec,
};
use good_lp::variable::{UnsolvedProblem, VariableDefinition};
use good_lp::{
    variable, Constraint, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, Variable,
};
use powerplan_core::{PlanError, PlanResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};
use web_time::Instant;

/// MILP engine used by [`GoodLpSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// Pure-Rust simplex with branch and bound
    #[default]
    Microlp,
    /// HiGHS (feature `solver-highs`)
    Highs,
}

impl SolverBackend {
    /// Whether the backend was compiled into this build.
    pub fn is_available(self) -> bool {
        match self {
            SolverBackend::Microlp => cfg!(feature = "solver-microlp"),
            SolverBackend::Highs => cfg!(feature = "solver-highs"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolverBackend::Microlp => "microlp",
            SolverBackend::Highs => "highs",
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "microlp" => Ok(SolverBackend::Microlp),
            "highs" => Ok(SolverBackend::Highs),
            other => Err(format!("unknown solver backend '{other}' (expected microlp or highs)")),
        }
    }
}

/// Solver configuration, fixed before `solve()`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub backend: SolverBackend,
    /// Wall-clock limit; exceeding it is reported as [`SolveStatus::Error`]
    #[serde(default)]
    pub time_limit_seconds: Option<f64>,
}

impl SolverConfig {
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }
}

/// [`MipSolver`] that records the model and solves it through `good_lp`.
///
/// The recorded variables and constraints stay inspectable, which is what
/// the builder tests use to check constraint counts and coefficients.
#[derive(Debug, Clone, Default)]
pub struct GoodLpSolver {
    config: SolverConfig,
    variables: Vec<VarSpec>,
    constraints: Vec<ConstraintSpec>,
    objective: Option<(Sense, LinearExpr)>,
    status: Option<SolveStatus>,
    values: Vec<f64>,
    objective_value: f64,
    solve_time: Duration,
    message: Option<String>,
}

impl GoodLpSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn variables(&self) -> &[VarSpec] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> Option<&VarSpec> {
        self.variables.get(var.index())
    }

    pub fn constraints(&self) -> &[ConstraintSpec] {
        &self.constraints
    }

    /// Look up a constraint by name.
    pub fn constraint(&self, name: &str) -> Option<&ConstraintSpec> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Constraints whose name starts with `prefix`.
    pub fn constraints_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a ConstraintSpec> {
        self.constraints
            .iter()
            .filter(move |c| c.name.starts_with(prefix))
    }

    pub fn objective(&self) -> Option<(Sense, &LinearExpr)> {
        self.objective.as_ref().map(|(sense, expr)| (*sense, expr))
    }

    pub fn solve_time(&self) -> Duration {
        self.solve_time
    }

    /// Backend message attached to a non-optimal status.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn push_variable(&mut self, spec: VarSpec) -> VarId {
        self.variables.push(spec);
        VarId(self.variables.len() - 1)
    }

    fn run(&self) -> Result<Vec<f64>, ResolutionError> {
        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = self
            .variables
            .iter()
            .map(|spec| problem.add(definition(spec)))
            .collect();

        let (sense, objective) = match &self.objective {
            Some((sense, expr)) => (*sense, to_expression(expr, &vars)),
            None => (Sense::Minimize, Expression::from(0.0)),
        };
        let constraints: Vec<Constraint> = self
            .constraints
            .iter()
            .map(|c| to_constraint(c, &vars))
            .collect();

        let unsolved = match sense {
            Sense::Minimize => problem.minimise(objective),
            Sense::Maximize => problem.maximise(objective),
        };

        match self.config.backend {
            SolverBackend::Microlp => solve_microlp(unsolved, constraints, &vars),
            SolverBackend::Highs => {
                solve_highs(unsolved, constraints, &vars, self.config.time_limit_seconds)
            }
        }
    }
}

impl MipSolver for GoodLpSolver {
    fn add_continuous(&mut self, lower: f64, upper: f64, name: &str) -> VarId {
        self.push_variable(VarSpec {
            name: name.to_string(),
            kind: VarKind::Continuous,
            lower,
            upper,
        })
    }

    fn add_binary(&mut self, name: &str) -> VarId {
        self.push_variable(VarSpec {
            name: name.to_string(),
            kind: VarKind::Binary,
            lower: 0.0,
            upper: 1.0,
        })
    }

    fn add_constraint(
        &mut self,
        name: &str,
        expr: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) -> ConstraintId {
        self.constraints.push(ConstraintSpec {
            name: name.to_string(),
            expr,
            relation,
            rhs,
        });
        ConstraintId(self.constraints.len() - 1)
    }

    fn set_objective(&mut self, sense: Sense, expr: LinearExpr) {
        self.objective = Some((sense, expr));
    }

    fn solve(&mut self) -> SolveStatus {
        self.values.clear();
        self.message = None;

        info!(
            backend = %self.config.backend,
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            "solving MIP"
        );
        let start = Instant::now();
        let outcome = self.run();
        self.solve_time = start.elapsed();

        let status = match outcome {
            Ok(values) => match self.config.time_limit_seconds {
                Some(limit) if self.solve_time.as_secs_f64() > limit => {
                    self.message = Some(format!(
                        "time limit of {limit}s exceeded after {:.2?}",
                        self.solve_time
                    ));
                    SolveStatus::Error
                }
                _ => {
                    self.objective_value = self
                        .objective
                        .as_ref()
                        .map(|(_, expr)| expr.evaluate(|v| values[v.index()]))
                        .unwrap_or(0.0);
                    self.values = values;
                    SolveStatus::Optimal
                }
            },
            Err(ResolutionError::Infeasible) => SolveStatus::Infeasible,
            Err(ResolutionError::Unbounded) => SolveStatus::Unbounded,
            Err(err) => {
                self.message = Some(err.to_string());
                SolveStatus::Error
            }
        };

        if status.is_success() {
            info!(
                objective = self.objective_value,
                elapsed = ?self.solve_time,
                "MIP solved to optimality"
            );
        } else {
            warn!(
                %status,
                message = self.message.as_deref().unwrap_or(""),
                elapsed = ?self.solve_time,
                "MIP solve did not reach optimality"
            );
        }
        self.status = Some(status);
        status
    }

    fn status(&self) -> Option<SolveStatus> {
        self.status
    }

    fn value(&self, var: VarId) -> PlanResult<f64> {
        match self.status {
            Some(SolveStatus::Optimal) => self.values.get(var.index()).copied().ok_or_else(|| {
                PlanError::Other(format!("variable x{} does not belong to this model", var.0))
            }),
            Some(status) => Err(PlanError::NotSolved(format!("last solve was {status}"))),
            None => Err(PlanError::NotSolved("model has not been solved".into())),
        }
    }

    fn objective_value(&self) -> PlanResult<f64> {
        match self.status {
            Some(SolveStatus::Optimal) => Ok(self.objective_value),
            Some(status) => Err(PlanError::NotSolved(format!("last solve was {status}"))),
            None => Err(PlanError::NotSolved("model has not been solved".into())),
        }
    }

    fn num_variables(&self) -> usize {
        self.variables.len()
    }

    fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

fn definition(spec: &VarSpec) -> VariableDefinition {
    let def = variable().name(spec.name.clone());
    match spec.kind {
        VarKind::Binary => def.binary(),
        VarKind::Continuous => {
            let def = if spec.lower.is_finite() {
                def.min(spec.lower)
            } else {
                def
            };
            if spec.upper.is_finite() {
                def.max(spec.upper)
            } else {
                def
            }
        }
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant_value());
    for &(coef, var) in expr.terms() {
        out += coef * vars[var.index()];
    }
    out
}

fn to_constraint(spec: &ConstraintSpec, vars: &[Variable]) -> Constraint {
    let lhs = to_expression(&spec.expr, vars);
    match spec.relation {
        Relation::Le => good_lp::constraint::leq(lhs, spec.rhs),
        Relation::Eq => good_lp::constraint::eq(lhs, spec.rhs),
        Relation::Ge => good_lp::constraint::geq(lhs, spec.rhs),
    }
}

fn solve_with<M>(
    mut model: M,
    constraints: Vec<Constraint>,
    vars: &[Variable],
) -> Result<Vec<f64>, ResolutionError>
where
    M: SolverModel<Error = ResolutionError>,
{
    debug!(constraints = constraints.len(), "loading constraints into backend");
    for constraint in constraints {
        model.add_constraint(constraint);
    }
    let solution = model.solve()?;
    require_optimal(solution.status())?;
    Ok(vars.iter().map(|v| solution.value(*v)).collect())
}

/// Backends may stop early and still hand back an incumbent; only a proven
/// optimum counts as solved.
fn require_optimal(status: SolutionStatus) -> Result<(), ResolutionError> {
    match status {
        SolutionStatus::Optimal => Ok(()),
        SolutionStatus::TimeLimit => Err(ResolutionError::Str(
            "backend stopped at a limit before proving optimality".into(),
        )),
        SolutionStatus::GapLimit => Err(ResolutionError::Str(
            "backend stopped at the MIP gap limit before proving optimality".into(),
        )),
    }
}

#[cfg(feature = "solver-microlp")]
fn solve_microlp(
    problem: UnsolvedProblem,
    constraints: Vec<Constraint>,
    vars: &[Variable],
) -> Result<Vec<f64>, ResolutionError> {
    solve_with(
        problem.using(good_lp::solvers::microlp::microlp),
        constraints,
        vars,
    )
}

#[cfg(not(feature = "solver-microlp"))]
fn solve_microlp(
    _problem: UnsolvedProblem,
    _constraints: Vec<Constraint>,
    _vars: &[Variable],
) -> Result<Vec<f64>, ResolutionError> {
    Err(ResolutionError::Str(
        "microlp backend not compiled in (enable feature solver-microlp)".into(),
    ))
}

#[cfg(feature = "solver-highs")]
fn solve_highs(
    problem: UnsolvedProblem,
    constraints: Vec<Constraint>,
    vars: &[Variable],
    time_limit: Option<f64>,
) -> Result<Vec<f64>, ResolutionError> {
    let mut model = problem.using(good_lp::solvers::highs::highs);
    if let Some(limit) = time_limit {
        model = model.set_time_limit(limit);
    }
    solve_with(model, constraints, vars)
}

#[cfg(not(feature = "solver-highs"))]
fn solve_highs(
    _problem: UnsolvedProblem,
    _constraints: Vec<Constraint>,
    _vars: &[Variable],
    _time_limit: Option<f64>,
) -> Result<Vec<f64>, ResolutionError> {
    Err(ResolutionError::Str(
        "HiGHS backend not compiled in (enable feature solver-highs)".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_guarded_before_solve() {
        let mut solver = GoodLpSolver::new();
        let x = solver.add_continuous(0.0, 1.0, "x");
        assert!(matches!(solver.value(x), Err(PlanError::NotSolved(_))));
        assert!(solver.objective_value().is_err());
        assert_eq!(solver.status(), None);
    }

    #[test]
    fn test_records_model() {
        let mut solver = GoodLpSolver::new();
        let x = solver.add_continuous(0.0, 10.0, "x");
        let y = solver.add_binary("y");
        solver.add_constraint("link", LinearExpr::new().term(1.0, x).term(-10.0, y), Relation::Le, 0.0);
        assert_eq!(solver.num_variables(), 2);
        assert_eq!(solver.num_constraints(), 1);
        assert_eq!(solver.variable(y).map(|v| v.kind), Some(VarKind::Binary));
        assert_eq!(solver.constraint("link").map(|c| c.relation), Some(Relation::Le));
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("HiGHS".parse::<SolverBackend>(), Ok(SolverBackend::Highs));
        assert_eq!("microlp".parse::<SolverBackend>(), Ok(SolverBackend::Microlp));
        assert!("cplex".parse::<SolverBackend>().is_err());
    }

    #[test]
    fn test_incomplete_backend_status_rejected() {
        assert!(require_optimal(SolutionStatus::Optimal).is_ok());
        for status in [SolutionStatus::TimeLimit, SolutionStatus::GapLimit] {
            let err = require_optimal(status).unwrap_err();
            assert!(err.to_string().contains("before proving optimality"));
        }
    }

    #[cfg(feature = "solver-microlp")]
    #[test]
    fn test_small_mip() {
        // max 3x + 2y  s.t.  x + y <= 4,  x <= 3 * b,  b binary, cost of b = 1
        let mut solver = GoodLpSolver::new();
        let x = solver.add_continuous(0.0, f64::INFINITY, "x");
        let y = solver.add_continuous(0.0, 3.0, "y");
        let b = solver.add_binary("b");
        solver.add_constraint("sum", LinearExpr::new().term(1.0, x).term(1.0, y), Relation::Le, 4.0);
        solver.add_constraint("gate", LinearExpr::new().term(1.0, x).term(-3.0, b), Relation::Le, 0.0);
        solver.set_objective(
            Sense::Maximize,
            LinearExpr::new().term(3.0, x).term(2.0, y).term(-1.0, b),
        );

        assert_eq!(solver.solve(), SolveStatus::Optimal);
        assert!((solver.value(x).unwrap() - 3.0).abs() < 1e-6);
        assert!((solver.value(y).unwrap() - 1.0).abs() < 1e-6);
        assert!((solver.value(b).unwrap() - 1.0).abs() < 1e-6);
        assert!((solver.objective_value().unwrap() - 10.0).abs() < 1e-6);
    }

    #[cfg(feature = "solver-microlp")]
    #[test]
    fn test_infeasible_reported_as_status() {
        let mut solver = GoodLpSolver::new();
        let x = solver.add_continuous(0.0, 5.0, "x");
        solver.add_constraint("too_much", LinearExpr::from(x), Relation::Ge, 10.0);
        solver.set_objective(Sense::Minimize, LinearExpr::from(x));

        assert_eq!(solver.solve(), SolveStatus::Infeasible);
        assert!(matches!(solver.value(x), Err(PlanError::NotSolved(_))));
    }

    #[cfg(feature = "solver-microlp")]
    #[test]
    fn test_unbounded_reported_as_status() {
        let mut solver = GoodLpSolver::new();
        let x = solver.add_continuous(0.0, f64::INFINITY, "x");
        solver.set_objective(Sense::Maximize, LinearExpr::from(x));

        assert_eq!(solver.solve(), SolveStatus::Unbounded);
    }

    #[cfg(not(feature = "solver-highs"))]
    #[test]
    fn test_missing_backend_is_an_error_status() {
        let mut solver =
            GoodLpSolver::with_config(SolverConfig::default().with_backend(SolverBackend::Highs));
        let x = solver.add_continuous(0.0, 1.0, "x");
        solver.set_objective(Sense::Minimize, LinearExpr::from(x));
        assert_eq!(solver.solve(), SolveStatus::Error);
        assert!(solver.message().unwrap_or("").contains("not compiled"));
    }
}
