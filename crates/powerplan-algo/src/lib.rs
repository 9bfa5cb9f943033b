//! # powerplan-algo: Scheduling Models
//!
//! Mixed-integer models for power scheduling, built against a small solver
//! abstraction:
//!
//! | Module | Model | Objective |
//! |--------|-------|-----------|
//! | [`uc`] | Deterministic unit commitment of thermal units | Minimize operating cost |
//! | [`vpp`] | Stochastic virtual power plant over price scenarios | Maximize expected profit |
//!
//! ## Architecture
//!
//! - **[`mip::MipSolver`]**: variable creation, linear constraints, objective, one-shot solve
//! - **[`mip::LinearExpr`]**: ordered coefficient/variable accumulator handed to the solver
//! - **[`mip::GoodLpSolver`]**: `good_lp` binding (pure-Rust `microlp` by default, HiGHS optional)
//! - **Builders** ([`uc::UcModel`], [`vpp::VppModel`]): validate inputs, then create
//!   variables, constraints and objective against a solver they own
//! - **Extraction** ([`uc::UcSolution`], [`vpp::VppSolution`]): read values after an
//!   optimal solve and derive costs and financial metrics
//!
//! Every run owns a fresh solver; models are never reused across runs.
//!
//! ## Example
//!
//! ```no_run
//! use powerplan_algo::mip::SolverConfig;
//! use powerplan_algo::vpp::solve_vpp;
//! use powerplan_core::{DistributedResource, MarketScenario, ResourceKind, VppParameters};
//!
//! let resources = vec![DistributedResource::new("wind", ResourceKind::Wind, 30.0)];
//! let scenarios = vec![MarketScenario::new("base", 1.0, vec![40.0, 55.0])];
//! let params = VppParameters { time_periods: 2, ..VppParameters::default() };
//!
//! let solution = solve_vpp(&resources, &scenarios, &params, &SolverConfig::default()).unwrap();
//! println!("expected profit: {:.2}", solution.metrics.expected_profit);
//! ```

pub mod mip;
pub mod uc;
pub mod vpp;

pub use mip::{GoodLpSolver, MipSolver, SolveStatus, SolverBackend, SolverConfig};
pub use uc::{solve_unit_commitment, ConstraintFamily, ConstraintSet, UcSolution};
pub use vpp::{solve_vpp, FinancialMetrics, VppSolution};
