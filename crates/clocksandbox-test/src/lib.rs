//! ClockSandbox Test Harness - Scenarios and cross-crate validation
//!
//! This crate provides:
//! - Scenario builders mirroring the reference studies
//!   (ideal vs. each noise model, triangular consensus)
//! - Scenario reports (pairwise and consensus metrics against the reference)
//! - Property tests spanning clocks, engine, and analysis

pub mod harness;
pub mod properties;

pub use harness::*;
