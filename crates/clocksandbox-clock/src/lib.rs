//! ClockSandbox Clocks - Clock capability and noise models
//!
//! This crate implements:
//! - The Clock trait (tick / read_time / uncertainty / metadata)
//! - IdealClock: perfect reference
//! - WhiteFrequencyClock: white fractional-frequency noise
//! - RandomWalkFrequencyClock: random-walk fractional-frequency noise
//! - FlickerFrequencyClock: IIR-filtered, flicker-like frequency noise
//!
//! Every noisy clock owns a seeded generator; identical seeds and identical
//! tick sequences give bit-identical trajectories.

pub mod clock;
pub mod config;
pub mod flicker;
pub mod noise;
pub mod random_walk;
pub mod white;

pub use clock::*;
pub use config::*;
pub use flicker::FlickerFrequencyClock;
pub use noise::GaussianNoise;
pub use random_walk::RandomWalkFrequencyClock;
pub use white::WhiteFrequencyClock;
