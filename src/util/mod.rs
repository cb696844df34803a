//! Utility types shared across the crate.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`Value`] - Dynamically typed attribute values
//! - [`PerfCounters`] - Named counters bumped by variability checks
//! - Math type re-exports from glam
//! - [`init_tracing`] - Global subscriber setup for applications

mod error;
mod logging;
mod math;
pub mod perf;
mod value;

pub use error::*;
pub use logging::*;
pub use math::*;
pub use perf::PerfCounters;
pub use value::*;
