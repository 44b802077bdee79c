#[cfg(test)]
mod tests;

#[cfg(test)]
pub use tests::support;

pub mod app;
pub mod config;
pub mod deferred;
pub mod environment;
pub mod lease;
pub mod lifecycle;
pub mod metrics;
pub mod shutdown;
