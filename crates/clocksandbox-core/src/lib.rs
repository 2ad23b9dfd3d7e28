//! ClockSandbox Core - Fundamental types shared by clocks and analysis
//!
//! This crate defines:
//! - The error taxonomy (SandboxError)
//! - Clock model tags (ClockKind)
//! - Aligned time-series bundles (TimeSeries)

pub mod error;
pub mod kind;
pub mod series;

pub use error::*;
pub use kind::*;
pub use series::*;
