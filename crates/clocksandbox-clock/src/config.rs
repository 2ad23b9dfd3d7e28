//! Declarative clock construction

use serde::Serialize;

use clocksandbox_core::{ClockKind, SandboxResult};

use crate::flicker::{DEFAULT_POLE, DEFAULT_SIGMA_W};
use crate::random_walk::DEFAULT_SIGMA_RW;
use crate::white::DEFAULT_SIGMA_Y;
use crate::{
    Clock, FlickerFrequencyClock, IdealClock, RandomWalkFrequencyClock, WhiteFrequencyClock,
};

/// Parameters for one clock, validated when built
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ClockConfig {
    Ideal,
    WhiteFrequency { sigma_y: f64, seed: u64 },
    RandomWalkFrequency { sigma_rw: f64, seed: u64 },
    FlickerFrequency { sigma_w: f64, a: f64, seed: u64 },
}

impl ClockConfig {
    /// White frequency noise with the default scale
    pub fn white(seed: u64) -> Self {
        ClockConfig::WhiteFrequency {
            sigma_y: DEFAULT_SIGMA_Y,
            seed,
        }
    }

    /// Random-walk frequency noise with the default scale
    pub fn random_walk(seed: u64) -> Self {
        ClockConfig::RandomWalkFrequency {
            sigma_rw: DEFAULT_SIGMA_RW,
            seed,
        }
    }

    /// Flicker-like frequency noise with the default drive and pole
    pub fn flicker(seed: u64) -> Self {
        ClockConfig::FlickerFrequency {
            sigma_w: DEFAULT_SIGMA_W,
            a: DEFAULT_POLE,
            seed,
        }
    }

    pub fn kind(&self) -> ClockKind {
        match self {
            ClockConfig::Ideal => ClockKind::Ideal,
            ClockConfig::WhiteFrequency { .. } => ClockKind::WhiteFrequency,
            ClockConfig::RandomWalkFrequency { .. } => ClockKind::RandomWalkFrequency,
            ClockConfig::FlickerFrequency { .. } => ClockKind::FlickerFrequency,
        }
    }

    /// Instantiate the clock
    pub fn build(&self) -> SandboxResult<Box<dyn Clock>> {
        let clock: Box<dyn Clock> = match *self {
            ClockConfig::Ideal => Box::new(IdealClock::new()),
            ClockConfig::WhiteFrequency { sigma_y, seed } => {
                Box::new(WhiteFrequencyClock::new(sigma_y, seed)?)
            }
            ClockConfig::RandomWalkFrequency { sigma_rw, seed } => {
                Box::new(RandomWalkFrequencyClock::new(sigma_rw, seed)?)
            }
            ClockConfig::FlickerFrequency { sigma_w, a, seed } => {
                Box::new(FlickerFrequencyClock::new(sigma_w, a, seed)?)
            }
        };
        Ok(clock)
    }
}
