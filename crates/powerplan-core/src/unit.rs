//! Thermal generating units.
//!
//! A [`Unit`] carries its operating limits, cost coefficients and the
//! [`InitialState`] at `t = 0`. Field names follow descriptive snake_case;
//! the short keys used by legacy unit tables (`P_min`, `cU`, `TU`, `u0`, ...)
//! are accepted as aliases when deserializing.

use crate::error::ConfigError;
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-9;

/// Operating state of a unit at `t = 0`, before the planning horizon.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InitialState {
    /// Unit is committed at `t = 0`
    #[serde(alias = "u0", deserialize_with = "flag", default)]
    pub committed: bool,
    /// Unit is starting up at `t = 0`
    #[serde(alias = "su0", deserialize_with = "flag", default)]
    pub starting_up: bool,
    /// Unit is shutting down at `t = 0`
    #[serde(alias = "sd0", deserialize_with = "flag", default)]
    pub shutting_down: bool,
    /// Output at `t = 0` (MW)
    #[serde(alias = "p0", default)]
    pub power: f64,
    /// Periods the unit must still stay on at the start of the horizon
    #[serde(alias = "U0", default)]
    pub must_stay_on: u32,
    /// Periods the unit must still stay off at the start of the horizon
    #[serde(alias = "D0", default)]
    pub must_stay_off: u32,
}

impl InitialState {
    /// Unit online at `t = 0` producing `power`.
    pub fn online(power: f64) -> Self {
        Self {
            committed: true,
            power,
            ..Self::default()
        }
    }

    /// Unit offline at `t = 0`.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_must_stay_on(mut self, periods: u32) -> Self {
        self.must_stay_on = periods;
        self
    }

    pub fn with_must_stay_off(mut self, periods: u32) -> Self {
        self.must_stay_off = periods;
        self
    }
}

/// Accepts `true`/`false` as well as the `0`/`1` integers of legacy tables.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(v) => Err(D::Error::custom(format!("expected 0 or 1, got {v}"))),
    }
}

/// A thermal generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default)]
    pub name: String,
    /// Minimum stable output when committed (MW)
    #[serde(alias = "P_min")]
    pub p_min: f64,
    /// Maximum output (MW)
    #[serde(alias = "P_max")]
    pub p_max: f64,
    /// Cost of being committed ($/h)
    #[serde(alias = "cU")]
    pub fixed_cost: f64,
    /// Energy cost ($/MWh)
    #[serde(alias = "c")]
    pub variable_cost: f64,
    /// Output reachable in the startup period (MW)
    #[serde(alias = "SU")]
    pub startup_ramp: f64,
    /// Output the unit may hold in the period before shutting down (MW)
    #[serde(alias = "SD")]
    pub shutdown_ramp: f64,
    #[serde(alias = "SU_cost")]
    pub startup_cost: f64,
    #[serde(alias = "SD_cost")]
    pub shutdown_cost: f64,
    /// Ramp-up limit (MW/period)
    #[serde(alias = "RU")]
    pub ramp_up: f64,
    /// Ramp-down limit (MW/period)
    #[serde(alias = "RD")]
    pub ramp_down: f64,
    /// Minimum up time (periods)
    #[serde(alias = "TU")]
    pub min_up: u32,
    /// Minimum down time (periods)
    #[serde(alias = "TD")]
    pub min_down: u32,
    #[serde(flatten)]
    pub initial: InitialState,
}

impl Unit {
    /// Create a unit with output limits and zero costs, ramps and dwell times.
    ///
    /// Ramps default to `p_max`, which leaves them non-binding.
    pub fn new(name: impl Into<String>, p_min: f64, p_max: f64) -> Self {
        Self {
            name: name.into(),
            p_min,
            p_max,
            fixed_cost: 0.0,
            variable_cost: 0.0,
            startup_ramp: p_max,
            shutdown_ramp: p_max,
            startup_cost: 0.0,
            shutdown_cost: 0.0,
            ramp_up: p_max,
            ramp_down: p_max,
            min_up: 0,
            min_down: 0,
            initial: InitialState::offline(),
        }
    }

    pub fn with_costs(mut self, fixed: f64, variable: f64, startup: f64, shutdown: f64) -> Self {
        self.fixed_cost = fixed;
        self.variable_cost = variable;
        self.startup_cost = startup;
        self.shutdown_cost = shutdown;
        self
    }

    /// Set the startup/shutdown capability and the per-period ramp limits.
    pub fn with_ramps(mut self, startup: f64, shutdown: f64, up: f64, down: f64) -> Self {
        self.startup_ramp = startup;
        self.shutdown_ramp = shutdown;
        self.ramp_up = up;
        self.ramp_down = down;
        self
    }

    pub fn with_min_times(mut self, min_up: u32, min_down: u32) -> Self {
        self.min_up = min_up;
        self.min_down = min_down;
        self
    }

    pub fn with_initial(mut self, initial: InitialState) -> Self {
        self.initial = initial;
        self
    }

    /// Check limits, costs and the initial-state invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let entity = self.label();
        let non_negative = [
            ("p_min", self.p_min),
            ("p_max", self.p_max),
            ("fixed_cost", self.fixed_cost),
            ("variable_cost", self.variable_cost),
            ("startup_ramp", self.startup_ramp),
            ("shutdown_ramp", self.shutdown_ramp),
            ("startup_cost", self.startup_cost),
            ("shutdown_cost", self.shutdown_cost),
            ("ramp_up", self.ramp_up),
            ("ramp_down", self.ramp_down),
            ("initial power", self.initial.power),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    &entity,
                    field,
                    format!("{value} must be finite and non-negative"),
                ));
            }
        }

        if self.p_max <= 0.0 {
            return Err(ConfigError::invalid(&entity, "p_max", "must be positive"));
        }
        if self.p_min > self.p_max {
            return Err(ConfigError::invalid(
                &entity,
                "p_min",
                format!("{} exceeds p_max {}", self.p_min, self.p_max),
            ));
        }

        self.validate_initial(&entity)
    }

    fn validate_initial(&self, entity: &str) -> Result<(), ConfigError> {
        let s = &self.initial;
        if s.committed && s.power + EPS < self.p_min {
            return Err(ConfigError::invalid(
                entity,
                "initial power",
                format!("{} is below p_min {} for a committed unit", s.power, self.p_min),
            ));
        }
        if s.power > self.p_max + EPS {
            return Err(ConfigError::invalid(
                entity,
                "initial power",
                format!("{} exceeds p_max {}", s.power, self.p_max),
            ));
        }
        if !s.committed && s.power.abs() > EPS {
            return Err(ConfigError::invalid(
                entity,
                "initial power",
                format!("{} must be 0 for an uncommitted unit", s.power),
            ));
        }
        if s.committed && s.starting_up {
            return Err(ConfigError::inconsistent(
                entity,
                "initial state cannot be committed and starting up",
            ));
        }
        if s.committed && s.shutting_down {
            return Err(ConfigError::inconsistent(
                entity,
                "initial state cannot be committed and shutting down",
            ));
        }
        if s.starting_up && s.shutting_down {
            return Err(ConfigError::inconsistent(
                entity,
                "initial state cannot be starting up and shutting down",
            ));
        }
        if s.must_stay_on > 0 && s.must_stay_off > 0 {
            return Err(ConfigError::inconsistent(
                entity,
                format!(
                    "must_stay_on ({}) and must_stay_off ({}) cannot both be set",
                    s.must_stay_on, s.must_stay_off
                ),
            ));
        }
        if s.must_stay_on > 0 && !s.committed {
            return Err(ConfigError::inconsistent(
                entity,
                "must_stay_on requires the unit to be committed at t=0",
            ));
        }
        if s.must_stay_off > 0 && s.committed {
            return Err(ConfigError::inconsistent(
                entity,
                "must_stay_off requires the unit to be offline at t=0",
            ));
        }
        Ok(())
    }

    fn label(&self) -> String {
        if self.name.is_empty() {
            "unit".to_string()
        } else {
            format!("unit '{}'", self.name)
        }
    }
}

/// Validate a fleet: non-empty, unique names, every unit valid.
pub fn validate_units(units: &[Unit]) -> Result<(), ConfigError> {
    if units.is_empty() {
        return Err(ConfigError::Empty { what: "units" });
    }
    let mut seen = std::collections::HashSet::new();
    for unit in units {
        if !unit.name.is_empty() && !seen.insert(unit.name.as_str()) {
            return Err(ConfigError::Duplicate {
                what: "unit",
                name: unit.name.clone(),
            });
        }
        unit.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_unit() -> Unit {
        Unit::new("G1", 50.0, 200.0)
            .with_costs(500.0, 15.0, 70.0, 50.0)
            .with_ramps(70.0, 50.0, 60.0, 40.0)
            .with_min_times(2, 2)
    }

    #[test]
    fn test_valid_offline_unit() {
        assert!(base_unit().validate().is_ok());
    }

    #[test]
    fn test_committed_unit_below_p_min_rejected() {
        let unit = base_unit().with_initial(InitialState::online(20.0));
        let err = unit.validate().unwrap_err();
        assert_eq!(err.field(), Some("initial power"));
        assert_eq!(err.entity(), Some("unit 'G1'"));
    }

    #[test]
    fn test_offline_unit_with_output_rejected() {
        let mut unit = base_unit();
        unit.initial.power = 10.0;
        assert!(unit.validate().is_err());
    }

    #[test]
    fn test_committed_and_starting_up_rejected() {
        let mut unit = base_unit().with_initial(InitialState::online(100.0));
        unit.initial.starting_up = true;
        assert!(matches!(
            unit.validate(),
            Err(ConfigError::Inconsistent { .. })
        ));
    }

    #[test]
    fn test_committed_and_shutting_down_rejected() {
        let mut unit = base_unit().with_initial(InitialState::online(100.0));
        unit.initial.shutting_down = true;
        assert!(unit.validate().is_err());
    }

    #[test]
    fn test_dwell_requirements_must_match_state() {
        let both = base_unit().with_initial(
            InitialState::online(100.0)
                .with_must_stay_on(2)
                .with_must_stay_off(1),
        );
        assert!(both.validate().is_err());

        let on_while_off = base_unit().with_initial(InitialState::offline().with_must_stay_on(2));
        assert!(on_while_off.validate().is_err());

        let off_while_on =
            base_unit().with_initial(InitialState::online(100.0).with_must_stay_off(2));
        assert!(off_while_on.validate().is_err());

        let ok = base_unit().with_initial(InitialState::online(100.0).with_must_stay_on(5));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let unit = Unit::new("bad", 0.0, -10.0);
        let err = unit.validate().unwrap_err();
        assert_eq!(err.field(), Some("p_max"));
    }

    #[test]
    fn test_p_min_above_p_max_rejected() {
        let unit = Unit::new("bad", 120.0, 100.0);
        assert_eq!(unit.validate().unwrap_err().field(), Some("p_min"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let units = vec![base_unit(), base_unit()];
        assert!(matches!(
            validate_units(&units),
            Err(ConfigError::Duplicate { .. })
        ));
        assert!(matches!(
            validate_units(&[]),
            Err(ConfigError::Empty { .. })
        ));
    }

    #[test]
    fn test_deserialize_short_keys() {
        let json = r#"{
            "name": "Unit 1", "P_min": 80, "P_max": 300, "cU": 800, "c": 5,
            "SU": 100, "SD": 80, "SU_cost": 100, "SD_cost": 80,
            "RU": 50, "RD": 30, "TU": 2, "TD": 2,
            "u0": 1, "su0": 0, "sd0": 0, "p0": 120, "U0": 2, "D0": 0
        }"#;
        let unit: Unit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.p_max, 300.0);
        assert_eq!(unit.min_up, 2);
        assert!(unit.initial.committed);
        assert_eq!(unit.initial.must_stay_on, 2);
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn test_deserialize_rejects_non_binary_flag() {
        let json = r#"{
            "P_min": 0, "P_max": 10, "cU": 0, "c": 0, "SU": 10, "SD": 10,
            "SU_cost": 0, "SD_cost": 0, "RU": 10, "RD": 10, "TU": 0, "TD": 0,
            "u0": 2
        }"#;
        assert!(serde_json::from_str::<Unit>(json).is_err());
    }
}
