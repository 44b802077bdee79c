//! Metrics for the lease coordinator, recorded through the `metrics` facade.
//!
//! Nothing is exported unless the host installs a recorder.

pub mod meter;

// Re-export commonly used items
pub use meter::*;
