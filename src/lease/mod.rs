//! Lease coordination: tasks multiplexed onto one external grant.

pub mod coordinator;
pub mod counters;
pub mod grant;
pub mod task;
pub mod telemetry;


// Re-export main types
pub use coordinator::LeaseCoordinator;
pub use counters::{Counters, Snapshot};
pub use grant::GrantStatus;
pub use task::{Task, TaskId};
