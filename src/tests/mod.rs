//! Cross-module tests for leasekeeper.
//!
//! Unit tests live next to the code they cover; this module holds the shared
//! support code and end-to-end scenarios wiring the coordinator to the
//! simulated platform and the lifecycle adapter.


pub mod support;
