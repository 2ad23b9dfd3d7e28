//! Clock model tags

use std::fmt;

use serde::Serialize;

/// Noise model of a simulated clock.
///
/// The tag travels with every series a clock produces so that analysis can
/// tell the ideal reference apart from the noisy clocks it is compared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClockKind {
    /// Perfect timekeeper, zero noise
    Ideal,
    /// White fractional-frequency noise
    WhiteFrequency,
    /// Random-walk fractional-frequency noise
    RandomWalkFrequency,
    /// IIR-filtered white noise approximating flicker frequency noise
    FlickerFrequency,
}

impl ClockKind {
    /// Get the model name
    pub fn name(&self) -> &'static str {
        match self {
            ClockKind::Ideal => "IdealClock",
            ClockKind::WhiteFrequency => "WhiteFreqClock",
            ClockKind::RandomWalkFrequency => "RandomWalkFreqClock",
            ClockKind::FlickerFrequency => "FlickerLikeFreqClock",
        }
    }

    /// Get all kinds
    pub fn all() -> &'static [ClockKind] {
        &[
            ClockKind::Ideal,
            ClockKind::WhiteFrequency,
            ClockKind::RandomWalkFrequency,
            ClockKind::FlickerFrequency,
        ]
    }

    /// Whether this kind serves as the noiseless reference
    pub fn is_reference(&self) -> bool {
        matches!(self, ClockKind::Ideal)
    }
}

impl fmt::Display for ClockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
