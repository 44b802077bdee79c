//! Application wiring.

#[allow(clippy::module_inception)]
pub mod app;

#[cfg(test)]
mod app_test;

pub use app::{App, DemoReport};
