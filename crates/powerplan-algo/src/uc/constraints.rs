//! Selection of unit commitment constraint families.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One independently toggleable family of UC constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    /// Total output equals demand
    PowerBalance,
    /// Available capacity covers demand plus reserve
    ReserveCapacity,
    /// Commitment transitions match startup/shutdown indicators
    LogicalConsistency,
    /// Output limits and ramp-coupled availability ceilings
    GenerationLimits,
    RampUp,
    RampDown,
    MinUpTime,
    MinDownTime,
}

impl ConstraintFamily {
    pub const ALL: [ConstraintFamily; 8] = [
        ConstraintFamily::PowerBalance,
        ConstraintFamily::ReserveCapacity,
        ConstraintFamily::LogicalConsistency,
        ConstraintFamily::GenerationLimits,
        ConstraintFamily::RampUp,
        ConstraintFamily::RampDown,
        ConstraintFamily::MinUpTime,
        ConstraintFamily::MinDownTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintFamily::PowerBalance => "power_balance",
            ConstraintFamily::ReserveCapacity => "reserve_capacity",
            ConstraintFamily::LogicalConsistency => "logical_consistency",
            ConstraintFamily::GenerationLimits => "generation_limits",
            ConstraintFamily::RampUp => "ramp_up",
            ConstraintFamily::RampDown => "ramp_down",
            ConstraintFamily::MinUpTime => "min_up_time",
            ConstraintFamily::MinDownTime => "min_down_time",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstraintFamily {
    type Err = String;

    /// Accepts snake_case or kebab-case names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ConstraintFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown constraint family '{s}' (expected one of: {})",
                    ConstraintFamily::ALL.map(|f| f.as_str()).join(", ")
                )
            })
    }
}

/// The set of enabled families, consumed by the UC builder as one policy.
///
/// Serializes as the list of enabled family names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<ConstraintFamily>", into = "Vec<ConstraintFamily>")]
pub struct ConstraintSet {
    bits: u8,
}

impl ConstraintSet {
    pub fn all() -> Self {
        ConstraintFamily::ALL.into_iter().collect()
    }

    pub fn none() -> Self {
        Self { bits: 0 }
    }

    pub fn with(mut self, family: ConstraintFamily) -> Self {
        self.bits |= family.bit();
        self
    }

    pub fn without(mut self, family: ConstraintFamily) -> Self {
        self.bits &= !family.bit();
        self
    }

    pub fn contains(&self, family: ConstraintFamily) -> bool {
        self.bits & family.bit() != 0
    }

    /// Enabled families in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = ConstraintFamily> + '_ {
        ConstraintFamily::ALL
            .into_iter()
            .filter(move |f| self.contains(*f))
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<ConstraintFamily> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = ConstraintFamily>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

impl From<Vec<ConstraintFamily>> for ConstraintSet {
    fn from(families: Vec<ConstraintFamily>) -> Self {
        families.into_iter().collect()
    }
}

impl From<ConstraintSet> for Vec<ConstraintFamily> {
    fn from(set: ConstraintSet) -> Self {
        set.enabled().collect()
    }
}

impl fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.enabled()).finish()
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.enabled().map(|fam| fam.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_and_none() {
        assert_eq!(ConstraintSet::all().len(), 8);
        assert!(ConstraintSet::none().is_empty());
        assert_eq!(ConstraintSet::default(), ConstraintSet::all());
    }

    #[test]
    fn test_toggle() {
        let set = ConstraintSet::all().without(ConstraintFamily::RampDown);
        assert!(!set.contains(ConstraintFamily::RampDown));
        assert!(set.contains(ConstraintFamily::RampUp));
        assert_eq!(set.len(), 7);
        assert!(set.with(ConstraintFamily::RampDown) == ConstraintSet::all());
    }

    #[test]
    fn test_parse_family_names() {
        assert_eq!(
            "min-up-time".parse::<ConstraintFamily>(),
            Ok(ConstraintFamily::MinUpTime)
        );
        assert_eq!(
            "power_balance".parse::<ConstraintFamily>(),
            Ok(ConstraintFamily::PowerBalance)
        );
        assert!("transmission".parse::<ConstraintFamily>().is_err());
    }

    #[test]
    fn test_serde_as_list() {
        let set = ConstraintSet::none()
            .with(ConstraintFamily::PowerBalance)
            .with(ConstraintFamily::MinDownTime);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["power_balance","min_down_time"]"#);
        let back: ConstraintSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_display() {
        let set = ConstraintSet::none()
            .with(ConstraintFamily::RampUp)
            .with(ConstraintFamily::PowerBalance);
        assert_eq!(set.to_string(), "power_balance, ramp_up");
        assert_eq!(ConstraintSet::none().to_string(), "none");
    }
}
