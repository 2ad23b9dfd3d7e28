//! ClockSandbox Analysis - Simulation and statistical comparison of clocks
//!
//! This crate implements:
//! - Lock-step simulation of clock ensembles on a shared virtual grid
//! - Pairwise comparison metrics (offset, spread, drift)
//! - Fractional-frequency derivation
//! - Overlapping Allan deviation
//! - Inverse-variance consensus across noisy clocks

pub mod adev;
pub mod compare;
pub mod consensus;
pub mod engine;
pub mod frequency;
pub mod grid;
pub mod stats;

pub use adev::*;
pub use compare::*;
pub use consensus::*;
pub use engine::*;
pub use frequency::*;
