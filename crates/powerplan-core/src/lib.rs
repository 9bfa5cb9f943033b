//! # powerplan-core: Entity Configuration
//!
//! Strongly typed, validated inputs for power scheduling models:
//!
//! - [`Unit`] / [`InitialState`]: thermal generators for unit commitment
//! - [`TimePeriod`] / [`Horizon`]: demand and reserve over `t = 0..=T`
//! - [`DistributedResource`] / [`BatterySpec`]: assets of a virtual power plant
//! - [`MarketScenario`] / [`VppParameters`]: stochastic prices and market rules
//!
//! Validation fails fast with a [`ConfigError`] naming the offending entity
//! and field. Model builders in `powerplan-algo` call it before creating any
//! variable, so an invalid configuration never reaches a solver.
//!
//! ## Quick Start
//!
//! ```
//! use powerplan_core::{validate_units, Horizon, InitialState, Unit};
//!
//! let units = vec![
//!     Unit::new("G1", 80.0, 300.0)
//!         .with_costs(800.0, 5.0, 100.0, 80.0)
//!         .with_initial(InitialState::online(120.0)),
//!     Unit::new("G2", 50.0, 200.0).with_costs(500.0, 15.0, 70.0, 50.0),
//! ];
//! let horizon = Horizon::from_planning(&[230.0, 250.0], &[10.0, 10.0]).unwrap();
//!
//! validate_units(&units).unwrap();
//! assert_eq!(horizon.planning_periods(), 2);
//! ```

pub mod diagnostics;
pub mod error;
pub mod market;
pub mod period;
pub mod resource;
pub mod unit;

pub use diagnostics::{
    check_unit_commitment, check_vpp_portfolio, DiagnosticIssue, Diagnostics, Severity,
};
pub use error::{ConfigError, PlanError, PlanResult};
pub use market::{validate_scenarios, validate_vpp, MarketScenario, VppParameters};
pub use period::{Horizon, TimePeriod};
pub use resource::{BatterySpec, DistributedResource, ResourceKind};
pub use unit::{validate_units, InitialState, Unit};
