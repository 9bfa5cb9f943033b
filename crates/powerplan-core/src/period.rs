//! Demand and reserve requirements over the planning horizon.
//!
//! Index `0` is the fixed initial condition and is never optimized;
//! indices `1..=T` are the planning periods.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Requirements for one period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimePeriod {
    /// Load to serve (MW)
    pub demand: f64,
    /// Spare capacity required above demand (MW)
    #[serde(default)]
    pub reserve: f64,
}

impl TimePeriod {
    pub fn new(demand: f64, reserve: f64) -> Self {
        Self { demand, reserve }
    }
}

/// Validated sequence of periods `t = 0..=T` with `T >= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TimePeriod>", into = "Vec<TimePeriod>")]
pub struct Horizon {
    periods: Vec<TimePeriod>,
}

impl Horizon {
    /// Build from all periods including the initial one at index 0.
    pub fn new(periods: Vec<TimePeriod>) -> Result<Self, ConfigError> {
        if periods.len() < 2 {
            return Err(ConfigError::invalid(
                "horizon",
                "periods",
                format!(
                    "{} entries given; need the initial period plus at least one planning period",
                    periods.len()
                ),
            ));
        }
        for (t, period) in periods.iter().enumerate() {
            let entity = format!("period {t}");
            if !period.demand.is_finite() || period.demand < 0.0 {
                return Err(ConfigError::invalid(
                    entity,
                    "demand",
                    format!("{} must be finite and non-negative", period.demand),
                ));
            }
            if !period.reserve.is_finite() || period.reserve < 0.0 {
                return Err(ConfigError::invalid(
                    entity,
                    "reserve",
                    format!("{} must be finite and non-negative", period.reserve),
                ));
            }
        }
        Ok(Self { periods })
    }

    /// Build from planning-period series; an empty initial period is prepended.
    pub fn from_planning(demand: &[f64], reserve: &[f64]) -> Result<Self, ConfigError> {
        if demand.len() != reserve.len() {
            return Err(ConfigError::ProfileTooShort {
                entity: "horizon".to_string(),
                field: "reserve",
                len: reserve.len(),
                required: demand.len(),
            });
        }
        let periods = std::iter::once(TimePeriod::default())
            .chain(
                demand
                    .iter()
                    .zip(reserve)
                    .map(|(&d, &r)| TimePeriod::new(d, r)),
            )
            .collect();
        Self::new(periods)
    }

    /// Number of planning periods `T`.
    pub fn planning_periods(&self) -> usize {
        self.periods.len() - 1
    }

    /// Number of indices `T + 1`, including the initial period.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn periods(&self) -> &[TimePeriod] {
        &self.periods
    }

    pub fn get(&self, t: usize) -> Option<&TimePeriod> {
        self.periods.get(t)
    }

    pub fn demand(&self, t: usize) -> f64 {
        self.periods[t].demand
    }

    pub fn reserve(&self, t: usize) -> f64 {
        self.periods[t].reserve
    }

    /// Largest `demand + reserve` over the planning periods.
    pub fn peak_requirement(&self) -> f64 {
        self.periods[1..]
            .iter()
            .map(|p| p.demand + p.reserve)
            .fold(0.0, f64::max)
    }

    pub fn peak_demand(&self) -> f64 {
        self.periods[1..].iter().map(|p| p.demand).fold(0.0, f64::max)
    }

    pub fn min_demand(&self) -> f64 {
        self.periods[1..]
            .iter()
            .map(|p| p.demand)
            .fold(f64::INFINITY, f64::min)
    }
}

impl TryFrom<Vec<TimePeriod>> for Horizon {
    type Error = ConfigError;

    fn try_from(periods: Vec<TimePeriod>) -> Result<Self, Self::Error> {
        Horizon::new(periods)
    }
}

impl From<Horizon> for Vec<TimePeriod> {
    fn from(horizon: Horizon) -> Self {
        horizon.periods
    }
}
