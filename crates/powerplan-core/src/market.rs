//! Market price scenarios and global VPP parameters.

use crate::error::ConfigError;
use crate::resource::DistributedResource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tolerance on the sum of scenario probabilities.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// One probability-weighted realization of market prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketScenario {
    pub name: String,
    pub probability: f64,
    /// Price per period ($/MWh)
    pub prices: Vec<f64>,
}

impl MarketScenario {
    pub fn new(name: impl Into<String>, probability: f64, prices: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            probability,
            prices,
        }
    }
}

/// Global parameters of a VPP optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VppParameters {
    /// Number of periods `T`
    pub time_periods: usize,
    /// Reserve required per MW bid
    pub reserve_margin: f64,
    /// Fee per MW bid per period
    pub market_participation_fee: f64,
    /// Credit per MWh from solar and wind
    pub renewable_credit: f64,
    /// $/t CO2; informational, not part of the objective
    #[serde(default)]
    pub carbon_price: f64,
}

impl Default for VppParameters {
    fn default() -> Self {
        Self {
            time_periods: 24,
            reserve_margin: 0.15,
            market_participation_fee: 0.5,
            renewable_credit: 15.0,
            carbon_price: 30.0,
        }
    }
}

impl VppParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_periods == 0 {
            return Err(ConfigError::invalid(
                "vpp parameters",
                "time_periods",
                "must be at least 1",
            ));
        }
        for (field, value) in [
            ("reserve_margin", self.reserve_margin),
            ("market_participation_fee", self.market_participation_fee),
            ("renewable_credit", self.renewable_credit),
            ("carbon_price", self.carbon_price),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    "vpp parameters",
                    field,
                    format!("{value} must be finite and non-negative"),
                ));
            }
        }
        Ok(())
    }
}

/// Validate the scenario set: unique names, probabilities in `(0, 1]`
/// summing to 1, and a price for every period.
pub fn validate_scenarios(scenarios: &[MarketScenario], periods: usize) -> Result<(), ConfigError> {
    if scenarios.is_empty() {
        return Err(ConfigError::Empty {
            what: "market scenarios",
        });
    }
    let mut seen = HashSet::new();
    for scenario in scenarios {
        let entity = format!("scenario '{}'", scenario.name);
        if !seen.insert(scenario.name.as_str()) {
            return Err(ConfigError::Duplicate {
                what: "scenario",
                name: scenario.name.clone(),
            });
        }
        if !(scenario.probability > 0.0 && scenario.probability <= 1.0) {
            return Err(ConfigError::invalid(
                entity,
                "probability",
                format!("{} must lie in (0, 1]", scenario.probability),
            ));
        }
        if scenario.prices.len() < periods {
            return Err(ConfigError::ProfileTooShort {
                entity,
                field: "prices",
                len: scenario.prices.len(),
                required: periods,
            });
        }
        if let Some(price) = scenario.prices.iter().find(|p| !p.is_finite()) {
            return Err(ConfigError::invalid(
                entity,
                "prices",
                format!("{price} is not finite"),
            ));
        }
    }
    let sum: f64 = scenarios.iter().map(|s| s.probability).sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(ConfigError::ProbabilitySum { sum });
    }
    Ok(())
}

/// Validate a complete VPP configuration before any variable is created.
pub fn validate_vpp(
    resources: &[DistributedResource],
    scenarios: &[MarketScenario],
    params: &VppParameters,
) -> Result<(), ConfigError> {
    params.validate()?;
    if resources.is_empty() {
        return Err(ConfigError::Empty { what: "resources" });
    }
    let mut seen = HashSet::new();
    for resource in resources {
        if !seen.insert(resource.name.as_str()) {
            return Err(ConfigError::Duplicate {
                what: "resource",
                name: resource.name.clone(),
            });
        }
        resource.validate(params.time_periods)?;
    }
    validate_scenarios(scenarios, params.time_periods)
}
