//! Advisory pre-solve diagnostics.
//!
//! These checks flag configurations that are valid but likely to produce an
//! infeasible or degenerate model: not enough capacity for the peak, must-run
//! output above the load, ramp limits that cannot follow the first period.
//! They never block a build; the solver remains the authority on feasibility.
//!
//! # Example
//!
//! ```
//! use powerplan_core::diagnostics::{check_unit_commitment, Severity};
//! use powerplan_core::{Horizon, Unit};
//!
//! let units = vec![Unit::new("G1", 0.0, 100.0)];
//! let horizon = Horizon::from_planning(&[150.0], &[0.0]).unwrap();
//!
//! let diag = check_unit_commitment(&units, &horizon);
//! assert_eq!(diag.error_count(), 1);
//! assert_eq!(diag.issues[0].severity, Severity::Error);
//! ```

use crate::market::VppParameters;
use crate::period::Horizon;
use crate::resource::{DistributedResource, ResourceKind};
use crate::unit::Unit;
use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Model may still solve but is suspicious
    Warning,
    /// Model is certain to be infeasible as configured
    Error,
}

/// A single diagnostic issue
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping (e.g., "adequacy", "ramp", "storage")
    pub category: String,
    pub message: String,
    /// Optional entity reference (e.g., "unit 'G1'", "period 3")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues for one configuration
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn issues_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    pub fn summary(&self) -> String {
        let warnings = self.warning_count();
        let errors = self.error_count();

        match (warnings, errors) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (0, e) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (w, e) => format!(
                "{} warning{}, {} error{}",
                w,
                if w == 1 { "" } else { "s" },
                e,
                if e == 1 { "" } else { "s" }
            ),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

/// Adequacy checks for a unit commitment case.
pub fn check_unit_commitment(units: &[Unit], horizon: &Horizon) -> Diagnostics {
    let mut diag = Diagnostics::new();
    let fleet_max: f64 = units.iter().map(|u| u.p_max).sum();

    for t in 1..horizon.len() {
        let entity = format!("period {t}");
        let demand = horizon.demand(t);
        let required = demand + horizon.reserve(t);
        if fleet_max < demand {
            diag.add_error_with_entity(
                "adequacy",
                &format!("fleet capacity {fleet_max:.1} MW is below demand {demand:.1} MW"),
                &entity,
            );
        } else if fleet_max < required {
            diag.add_error_with_entity(
                "adequacy",
                &format!(
                    "fleet capacity {fleet_max:.1} MW is below demand plus reserve {required:.1} MW"
                ),
                &entity,
            );
        }
    }

    // Units forced on at the start of the horizon cannot drop below P_min.
    for unit in units.iter().filter(|u| u.initial.must_stay_on > 0) {
        let horizon_end = (unit.initial.must_stay_on as usize).min(horizon.planning_periods());
        for t in 1..=horizon_end {
            if unit.p_min > horizon.demand(t) {
                diag.add_warning_with_entity(
                    "must_run",
                    &format!(
                        "p_min {:.1} MW exceeds demand {:.1} MW in period {t} while the unit must stay on",
                        unit.p_min,
                        horizon.demand(t)
                    ),
                    &unit_entity(unit),
                );
                break;
            }
        }
    }

    // First-period reach from the initial state.
    let reach: f64 = units
        .iter()
        .map(|u| {
            if u.initial.committed {
                (u.initial.power + u.ramp_up).min(u.p_max)
            } else if u.initial.must_stay_off > 0 {
                0.0
            } else {
                u.startup_ramp.min(u.p_max)
            }
        })
        .sum();
    let first = horizon.demand(1);
    if reach < first {
        diag.add_warning_with_entity(
            "ramp",
            &format!(
                "units can reach at most {reach:.1} MW from the initial state, demand is {first:.1} MW"
            ),
            "period 1",
        );
    }

    diag
}

/// Portfolio checks for a VPP case.
pub fn check_vpp_portfolio(resources: &[DistributedResource], params: &VppParameters) -> Diagnostics {
    let mut diag = Diagnostics::new();

    let has_storage = resources.iter().any(|r| r.kind == ResourceKind::Battery);
    if !has_storage && resources.iter().all(|r| r.kind.is_renewable()) {
        diag.add_warning(
            "storage",
            "portfolio is renewable-only without storage; bids follow availability exactly",
        );
    }

    for resource in resources {
        if let Some(profile) = &resource.availability_profile {
            let horizon = &profile[..params.time_periods.min(profile.len())];
            if !horizon.is_empty() && horizon.iter().all(|a| *a == 0.0) {
                diag.add_warning_with_entity(
                    "availability",
                    "resource is unavailable in every period",
                    &format!("resource '{}'", resource.name),
                );
            }
        }
    }

    if params.reserve_margin > 0.0 && resources.iter().all(|r| r.capacity == 0.0) {
        diag.add_warning(
            "reserve",
            "reserve margin is set but the portfolio has no capacity",
        );
    }

    diag
}

fn unit_entity(unit: &Unit) -> String {
    if unit.name.is_empty() {
        "unit".to_string()
    } else {
        format!("unit '{}'", unit.name)
    }
}
