// Shared test support code.
// This module provides doubles and recorders that all test files can use.

pub mod environment;
pub mod outcome;

pub use environment::FakeEnvironment;
pub use outcome::{tracked_task, tracked_work, Outcome};
