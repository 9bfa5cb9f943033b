//! Distributed energy resources aggregated by a virtual power plant.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Technology of a distributed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Solar,
    Wind,
    Battery,
    DemandResponse,
    EvCharging,
}

impl ResourceKind {
    /// Solar and wind earn renewable credits.
    pub fn is_renewable(self) -> bool {
        matches!(self, ResourceKind::Solar | ResourceKind::Wind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Solar => "solar",
            ResourceKind::Wind => "wind",
            ResourceKind::Battery => "battery",
            ResourceKind::DemandResponse => "demand_response",
            ResourceKind::EvCharging => "ev_charging",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage parameters carried by battery resources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatterySpec {
    /// Stored energy at 100% state of charge (MWh)
    pub energy_capacity: f64,
    pub min_soc: f64,
    pub max_soc: f64,
    pub initial_soc: f64,
    /// Applied once on charge and once on discharge
    pub efficiency: f64,
    pub max_charge_rate: f64,
    pub max_discharge_rate: f64,
}

impl BatterySpec {
    fn validate(&self, entity: &str) -> Result<(), ConfigError> {
        if !self.energy_capacity.is_finite() || self.energy_capacity <= 0.0 {
            return Err(ConfigError::invalid(
                entity,
                "energy_capacity",
                format!("{} must be positive", self.energy_capacity),
            ));
        }
        for (field, value) in [
            ("min_soc", self.min_soc),
            ("max_soc", self.max_soc),
            ("initial_soc", self.initial_soc),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    entity,
                    field,
                    format!("{value} must lie in [0, 1]"),
                ));
            }
        }
        if self.min_soc > self.max_soc {
            return Err(ConfigError::inconsistent(
                entity,
                format!("min_soc {} exceeds max_soc {}", self.min_soc, self.max_soc),
            ));
        }
        if self.initial_soc < self.min_soc || self.initial_soc > self.max_soc {
            return Err(ConfigError::invalid(
                entity,
                "initial_soc",
                format!(
                    "{} outside [{}, {}]",
                    self.initial_soc, self.min_soc, self.max_soc
                ),
            ));
        }
        if !(self.efficiency > 0.0 && self.efficiency <= 1.0) {
            return Err(ConfigError::invalid(
                entity,
                "efficiency",
                format!("{} must lie in (0, 1]", self.efficiency),
            ));
        }
        for (field, value) in [
            ("max_charge_rate", self.max_charge_rate),
            ("max_discharge_rate", self.max_discharge_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    entity,
                    field,
                    format!("{value} must be finite and non-negative"),
                ));
            }
        }
        Ok(())
    }
}

/// A distributed resource in the VPP portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedResource {
    pub name: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: ResourceKind,
    /// Rated power (MW)
    pub capacity: f64,
    /// $/MWh; for demand response this is the incentive earned per MWh curtailed
    pub variable_cost: f64,
    /// $/MW per horizon, spread evenly over the periods
    pub fixed_cost: f64,
    /// Fraction of `capacity` available in each period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_profile: Option<Vec<f64>>,
    pub ramp_up: f64,
    pub ramp_down: f64,
    #[serde(flatten)]
    pub battery: Option<BatterySpec>,
}

impl DistributedResource {
    pub fn new(name: impl Into<String>, kind: ResourceKind, capacity: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            capacity,
            variable_cost: 0.0,
            fixed_cost: 0.0,
            availability_profile: None,
            ramp_up: capacity,
            ramp_down: capacity,
            battery: None,
        }
    }

    /// Battery resource; its power rating follows the larger of the two rates.
    pub fn battery(name: impl Into<String>, spec: BatterySpec) -> Self {
        let capacity = spec.max_charge_rate.max(spec.max_discharge_rate);
        let mut resource = Self::new(name, ResourceKind::Battery, capacity);
        resource.battery = Some(spec);
        resource
    }

    pub fn with_costs(mut self, variable: f64, fixed: f64) -> Self {
        self.variable_cost = variable;
        self.fixed_cost = fixed;
        self
    }

    pub fn with_ramps(mut self, up: f64, down: f64) -> Self {
        self.ramp_up = up;
        self.ramp_down = down;
        self
    }

    pub fn with_availability(mut self, profile: Vec<f64>) -> Self {
        self.availability_profile = Some(profile);
        self
    }

    pub fn is_battery(&self) -> bool {
        self.kind == ResourceKind::Battery
    }

    /// Power the resource can deliver in period `t`.
    pub fn max_available(&self, t: usize) -> f64 {
        match &self.availability_profile {
            Some(profile) => self.capacity * profile.get(t).copied().unwrap_or(0.0),
            None => self.capacity,
        }
    }

    /// Bounds of the `power` variable in period `t`.
    ///
    /// Batteries are signed: negative values charge, positive discharge.
    pub fn power_bounds(&self, t: usize) -> (f64, f64) {
        match (&self.battery, self.kind) {
            (Some(b), ResourceKind::Battery) => (-b.max_charge_rate, b.max_discharge_rate),
            _ => (0.0, self.max_available(t)),
        }
    }

    /// Upper bound of the `reserve` variable in period `t`.
    pub fn reserve_limit(&self, t: usize) -> f64 {
        match (&self.battery, self.kind) {
            (Some(b), ResourceKind::Battery) => b.max_discharge_rate,
            _ => self.max_available(t),
        }
    }

    /// Check values, the battery block and profile coverage of `periods`.
    pub fn validate(&self, periods: usize) -> Result<(), ConfigError> {
        let entity = format!("resource '{}'", self.name);
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid("resource", "name", "cannot be empty"));
        }
        for (field, value) in [
            ("capacity", self.capacity),
            ("fixed_cost", self.fixed_cost),
            ("ramp_up", self.ramp_up),
            ("ramp_down", self.ramp_down),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    &entity,
                    field,
                    format!("{value} must be finite and non-negative"),
                ));
            }
        }
        if !self.variable_cost.is_finite() {
            return Err(ConfigError::invalid(&entity, "variable_cost", "must be finite"));
        }

        if let Some(profile) = &self.availability_profile {
            if profile.len() < periods {
                return Err(ConfigError::ProfileTooShort {
                    entity,
                    field: "availability_profile",
                    len: profile.len(),
                    required: periods,
                });
            }
            if let Some((t, v)) = profile
                .iter()
                .enumerate()
                .find(|(_, v)| !(0.0..=1.0).contains(*v))
            {
                return Err(ConfigError::invalid(
                    &entity,
                    "availability_profile",
                    format!("value {v} at period {t} must lie in [0, 1]"),
                ));
            }
        }

        match (self.kind, &self.battery) {
            (ResourceKind::Battery, Some(spec)) => spec.validate(&entity),
            (ResourceKind::Battery, None) => Err(ConfigError::inconsistent(
                entity,
                "battery resource is missing its storage parameters",
            )),
            (_, Some(_)) => Err(ConfigError::inconsistent(
                entity,
                format!("{} resource cannot carry storage parameters", self.kind),
            )),
            (_, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> BatterySpec {
        BatterySpec {
            energy_capacity: 80.0,
            min_soc: 0.1,
            max_soc: 0.9,
            initial_soc: 0.5,
            efficiency: 0.9,
            max_charge_rate: 20.0,
            max_discharge_rate: 15.0,
        }
    }

    #[test]
    fn test_bounds_follow_availability() {
        let solar = DistributedResource::new("pv", ResourceKind::Solar, 50.0)
            .with_availability(vec![0.0, 0.5, 1.0]);
        assert_eq!(solar.power_bounds(1), (0.0, 25.0));
        assert_eq!(solar.reserve_limit(2), 50.0);

        let dr = DistributedResource::new("dr", ResourceKind::DemandResponse, 15.0);
        assert_eq!(dr.max_available(7), 15.0);
    }

    #[test]
    fn test_battery_bounds_are_signed() {
        let battery = DistributedResource::battery("bess", spec());
        assert_eq!(battery.power_bounds(0), (-20.0, 15.0));
        assert_eq!(battery.reserve_limit(0), 15.0);
        assert_eq!(battery.capacity, 20.0);
        assert!(battery.validate(24).is_ok());
    }

    #[test]
    fn test_initial_soc_outside_window_rejected() {
        let mut s = spec();
        s.initial_soc = 0.95;
        let err = DistributedResource::battery("bess", s)
            .validate(24)
            .unwrap_err();
        assert_eq!(err.field(), Some("initial_soc"));
    }

    #[test]
    fn test_zero_efficiency_rejected() {
        let mut s = spec();
        s.efficiency = 0.0;
        let err = DistributedResource::battery("bess", s).validate(1).unwrap_err();
        assert_eq!(err.field(), Some("efficiency"));
    }

    #[test]
    fn test_short_profile_rejected() {
        let wind = DistributedResource::new("wind", ResourceKind::Wind, 30.0)
            .with_availability(vec![0.5; 12]);
        assert!(matches!(
            wind.validate(24),
            Err(ConfigError::ProfileTooShort { len: 12, required: 24, .. })
        ));
    }

    #[test]
    fn test_battery_kind_requires_spec() {
        let resource = DistributedResource::new("bess", ResourceKind::Battery, 10.0);
        assert!(resource.validate(4).is_err());

        let mut solar = DistributedResource::new("pv", ResourceKind::Solar, 10.0);
        solar.battery = Some(spec());
        assert!(solar.validate(4).is_err());
    }

    #[test]
    fn test_deserialize_flat_battery_fields() {
        let json = r#"{
            "name": "Battery_Storage_1", "type": "battery", "capacity": 20.0,
            "energy_capacity": 80.0, "variable_cost": 2.0, "fixed_cost": 3.0,
            "min_soc": 0.1, "max_soc": 0.9, "initial_soc": 0.5, "efficiency": 0.9,
            "max_charge_rate": 20.0, "max_discharge_rate": 20.0,
            "ramp_up": 20.0, "ramp_down": 20.0, "owner": "Utility_Company"
        }"#;
        let resource: DistributedResource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.kind, ResourceKind::Battery);
        assert_eq!(resource.battery.map(|b| b.energy_capacity), Some(80.0));

        let json = r#"{
            "name": "EV", "type": "ev_charging", "capacity": 10.0,
            "variable_cost": 25.0, "fixed_cost": 1.0, "ramp_up": 5.0, "ramp_down": 5.0
        }"#;
        let resource: DistributedResource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.kind, ResourceKind::EvCharging);
        assert!(resource.battery.is_none());
    }
}
