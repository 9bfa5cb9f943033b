use anyhow::{Context, Result};
use powerplan_algo::uc::ConstraintSet;
use powerplan_core::{
    check_unit_commitment, check_vpp_portfolio, validate_units, validate_vpp, Diagnostics,
    DistributedResource, Horizon, MarketScenario, Unit, VppParameters,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A unit commitment case: fleet, periods `t = 0..=T` and enabled families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UcCase {
    pub units: Vec<Unit>,
    pub periods: Horizon,
    #[serde(default)]
    pub constraints: ConstraintSet,
}

impl UcCase {
    pub fn new(units: Vec<Unit>, periods: Horizon) -> Self {
        Self {
            units,
            periods,
            constraints: ConstraintSet::all(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_units(&self.units).context("validating units")
    }

    /// Advisory pre-solve checks.
    pub fn diagnostics(&self) -> Diagnostics {
        check_unit_commitment(&self.units, &self.periods)
    }
}

/// A VPP case: portfolio, price scenarios and market parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VppCase {
    pub resources: Vec<DistributedResource>,
    pub scenarios: Vec<MarketScenario>,
    #[serde(default)]
    pub parameters: VppParameters,
}

impl VppCase {
    pub fn validate(&self) -> Result<()> {
        validate_vpp(&self.resources, &self.scenarios, &self.parameters)
            .context("validating VPP case")
    }

    pub fn diagnostics(&self) -> Diagnostics {
        check_vpp_portfolio(&self.resources, &self.parameters)
    }
}

/// Load and validate a unit commitment case from YAML or JSON.
pub fn load_uc_case(path: &Path) -> Result<UcCase> {
    let case: UcCase = load_document(path, "unit commitment case")?;
    case.validate()
        .with_context(|| format!("invalid case '{}'", path.display()))?;
    Ok(case)
}

/// Load and validate a VPP case from YAML or JSON.
pub fn load_vpp_case(path: &Path) -> Result<VppCase> {
    let case: VppCase = load_document(path, "VPP case")?;
    case.validate()
        .with_context(|| format!("invalid case '{}'", path.display()))?;
    Ok(case)
}

/// Format follows the extension; anything else is tried as YAML, then JSON.
fn load_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {what} '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).with_context(|| format!("parsing {what} yaml"))
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).with_context(|| format!("parsing {what} json"))
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .with_context(|| format!("parsing {what}")),
    }
}
