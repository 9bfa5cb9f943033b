//! Case files and built-in reference data for the scheduling models.
//!
//! A case bundles everything one model run needs. Cases load from YAML or
//! JSON; unit fields accept both descriptive names (`p_min`, `startup_cost`)
//! and the short algebraic keys (`P_min`, `SU_cost`, `u0`, `TU`).

pub mod case;
pub mod presets;

pub use case::{load_uc_case, load_vpp_case, UcCase, VppCase};
pub use presets::{
    reference_resources, reference_scenarios, reference_uc_case, reference_units,
    reference_vpp_case, DemandPattern,
};
