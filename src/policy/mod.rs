//! Policy snapshot store for the timesheet engine.
//!
//! Holds immutable, time-bounded compensation policy data: rate codes,
//! their per-band amounts, and the enterprise-agreement version each is
//! derived from. Resolution is a sorted-interval lookup so historical
//! timesheets retain the rate in force when they were created.

mod loader;
mod types;

pub use loader::PolicyLoader;
pub use types::{
    PolicySnapshot, PolicyVersion, RateAmount, RateBand, RateCodeDef, RateCodesConfig,
};
