//! Clock capability and the ideal reference clock

use serde::Serialize;

use clocksandbox_core::ClockKind;

/// Time register advancing in virtual time.
///
/// Readout is elapsed time in seconds since epoch 0. Implementations own
/// their latent state and random generator exclusively.
/// INVARIANT: `read_time()` never decreases; `tick(dt)` with `dt <= 0`
/// changes nothing and consumes no random draw.
pub trait Clock: Send {
    /// Advance the clock by `dt` seconds of reference time
    fn tick(&mut self, dt: f64);

    /// Elapsed time in seconds
    fn read_time(&self) -> f64;

    /// Characteristic instability referenced at τ = 1 s, in seconds.
    /// Derived from static parameters, never from the trajectory.
    fn uncertainty(&self) -> f64;

    /// Descriptive record for reporting
    fn metadata(&self) -> ClockMetadata;

    /// Model tag
    fn kind(&self) -> ClockKind {
        self.metadata().kind
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn tick(&mut self, dt: f64) {
        (**self).tick(dt)
    }

    fn read_time(&self) -> f64 {
        (**self).read_time()
    }

    fn uncertainty(&self) -> f64 {
        (**self).uncertainty()
    }

    fn metadata(&self) -> ClockMetadata {
        (**self).metadata()
    }

    fn kind(&self) -> ClockKind {
        (**self).kind()
    }
}

/// Fixed description of a clock: model tag plus named parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockMetadata {
    pub kind: ClockKind,
    pub description: &'static str,
    pub parameters: Vec<(&'static str, f64)>,
}

impl ClockMetadata {
    pub fn new(kind: ClockKind, description: &'static str) -> Self {
        ClockMetadata {
            kind,
            description,
            parameters: Vec::new(),
        }
    }

    /// Attach a named parameter
    pub fn with_parameter(mut self, name: &'static str, value: f64) -> Self {
        self.parameters.push((name, value));
        self
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }
}

/// Perfect timekeeper, the reference for every comparison
#[derive(Debug, Clone, Default)]
pub struct IdealClock {
    elapsed_time: f64,
}

impl IdealClock {
    /// Create an ideal clock at epoch 0
    pub fn new() -> Self {
        IdealClock::default()
    }
}

impl Clock for IdealClock {
    fn tick(&mut self, dt: f64) {
        if !(dt > 0.0) {
            return;
        }
        self.elapsed_time += dt;
    }

    fn read_time(&self) -> f64 {
        self.elapsed_time
    }

    fn uncertainty(&self) -> f64 {
        0.0
    }

    fn metadata(&self) -> ClockMetadata {
        ClockMetadata::new(ClockKind::Ideal, "Perfect reference clock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ideal_clock_advance() {
        let mut clock = IdealClock::new();
        assert_eq!(clock.read_time(), 0.0);

        for _ in 0..10 {
            clock.tick(0.5);
        }
        assert_eq!(clock.read_time(), 5.0);
        assert_eq!(clock.uncertainty(), 0.0);
    }

    #[test]
    fn test_ideal_clock_ignores_non_positive_step() {
        let mut clock = IdealClock::new();
        clock.tick(1.0);
        clock.tick(0.0);
        clock.tick(-3.0);
        clock.tick(f64::NAN);
        assert_eq!(clock.read_time(), 1.0);
    }

    #[test]
    fn test_boxed_clock_delegates() {
        let mut clock: Box<dyn Clock> = Box::new(IdealClock::new());
        clock.tick(2.0);
        assert_eq!(clock.read_time(), 2.0);
        assert_eq!(clock.kind(), ClockKind::Ideal);
        assert!(clock.metadata().parameters.is_empty());
    }
}
