//! Unified error types for the powerplan workspace
//!
//! [`PlanError`] is the error every public operation returns. Input problems
//! detected before a model is built are reported as [`ConfigError`], which
//! always names the offending entity and, where there is one, the field.
//!
//! # Example
//!
//! ```ignore
//! use powerplan_core::{PlanError, PlanResult};
//!
//! fn plan(path: &str) -> PlanResult<()> {
//!     let case = load_case(path)?;
//!     solve_unit_commitment(&case.units, &case.horizon, case.constraints, &config)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Malformed or logically inconsistent input, detected before any variable
/// is created.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A single field carries a value outside its domain
    #[error("{entity}: invalid {field}: {reason}")]
    InvalidValue {
        entity: String,
        field: &'static str,
        reason: String,
    },

    /// Fields that are individually valid but contradict each other
    #[error("{entity}: {reason}")]
    Inconsistent { entity: String, reason: String },

    /// A required collection is empty
    #[error("no {what} configured")]
    Empty { what: &'static str },

    /// Scenario probabilities do not form a distribution
    #[error("scenario probabilities sum to {sum}, expected 1")]
    ProbabilitySum { sum: f64 },

    /// A per-period series does not cover the planning horizon
    #[error("{entity}: {field} has {len} entries, {required} required")]
    ProfileTooShort {
        entity: String,
        field: &'static str,
        len: usize,
        required: usize,
    },

    /// Two entities share a name
    #[error("duplicate {what} '{name}'")]
    Duplicate { what: &'static str, name: String },
}

impl ConfigError {
    pub fn invalid(
        entity: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            entity: entity.into(),
            field,
            reason: reason.into(),
        }
    }

    pub fn inconsistent(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Inconsistent {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Name of the entity the error refers to, if any.
    pub fn entity(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidValue { entity, .. }
            | ConfigError::Inconsistent { entity, .. }
            | ConfigError::ProfileTooShort { entity, .. } => Some(entity),
            ConfigError::Duplicate { name, .. } => Some(name),
            ConfigError::Empty { .. } | ConfigError::ProbabilitySum { .. } => None,
        }
    }

    /// Name of the offending field, if the error concerns a single field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigError::InvalidValue { field, .. } | ConfigError::ProfileTooShort { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}

/// Unified error type for all planning operations.
#[derive(Error, Debug)]
pub enum PlanError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Input rejected before model construction
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Solver proved the constraints jointly unsatisfiable
    #[error("Model infeasible: {0}")]
    Infeasible(String),

    /// Solver found the objective unbounded
    #[error("Model unbounded: {0}")]
    Unbounded(String),

    /// Backend failure, time limit or numerical trouble
    #[error("Solver error: {0}")]
    Solver(String),

    /// Values were requested from a model without an optimal solution
    #[error("No optimal solution available: {0}")]
    NotSolved(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using PlanError.
pub type PlanResult<T> = Result<T, PlanError>;

impl From<anyhow::Error> for PlanError {
    fn from(err: anyhow::Error) -> Self {
        PlanError::Other(err.to_string())
    }
}

impl From<String> for PlanError {
    fn from(s: String) -> Self {
        PlanError::Other(s)
    }
}

impl From<&str> for PlanError {
    fn from(s: &str) -> Self {
        PlanError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_entity_and_field() {
        let err = ConfigError::invalid("Unit 2", "p_max", "must be positive");
        assert_eq!(err.entity(), Some("Unit 2"));
        assert_eq!(err.field(), Some("p_max"));
        assert!(err.to_string().contains("Unit 2"));
        assert!(err.to_string().contains("p_max"));
    }

    #[test]
    fn test_config_error_wraps_into_plan_error() {
        fn validate() -> PlanResult<()> {
            Err::<(), _>(ConfigError::ProbabilitySum { sum: 0.9 })?;
            Ok(())
        }

        let err = validate().unwrap_err();
        assert!(matches!(err, PlanError::Config(ConfigError::ProbabilitySum { .. })));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_error_display() {
        let err = PlanError::Solver("time limit of 5s exceeded".into());
        assert!(err.to_string().contains("Solver error"));
        assert!(err.to_string().contains("time limit"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlanError = io_err.into();
        assert!(matches!(err, PlanError::Io(_)));
    }
}
