//! Random-walk fractional-frequency clock

use clocksandbox_core::{ClockKind, SandboxResult};

use crate::noise::{validate_scale, GaussianNoise};
use crate::{Clock, ClockMetadata};

/// Default `sigma_rw` per √s
pub const DEFAULT_SIGMA_RW: f64 = 1e-14;

/// Clock whose fractional frequency performs a random walk.
///
/// Each tick adds `N(0, sigma_rw * sqrt(dt))` to the latent frequency offset
/// `y`, then integrates `dt * (1 + y)`. The walk is not mean-reverting.
#[derive(Debug, Clone)]
pub struct RandomWalkFrequencyClock {
    elapsed_time: f64,
    /// Latent fractional-frequency offset
    y: f64,
    sigma_rw: f64,
    noise: GaussianNoise,
}

impl RandomWalkFrequencyClock {
    pub fn new(sigma_rw: f64, seed: u64) -> SandboxResult<Self> {
        Ok(RandomWalkFrequencyClock {
            elapsed_time: 0.0,
            y: 0.0,
            sigma_rw: validate_scale("sigma_rw", sigma_rw)?,
            noise: GaussianNoise::new(seed),
        })
    }

    pub fn sigma_rw(&self) -> f64 {
        self.sigma_rw
    }

    /// Current latent fractional-frequency offset
    pub fn frequency_offset(&self) -> f64 {
        self.y
    }

    pub fn seed(&self) -> u64 {
        self.noise.seed()
    }
}

impl Default for RandomWalkFrequencyClock {
    fn default() -> Self {
        RandomWalkFrequencyClock {
            elapsed_time: 0.0,
            y: 0.0,
            sigma_rw: DEFAULT_SIGMA_RW,
            noise: GaussianNoise::new(0),
        }
    }
}

impl Clock for RandomWalkFrequencyClock {
    fn tick(&mut self, dt: f64) {
        if !(dt > 0.0) {
            return;
        }
        self.y += self.noise.sample(self.sigma_rw * dt.sqrt());
        self.elapsed_time += dt * (1.0 + self.y);
    }

    fn read_time(&self) -> f64 {
        self.elapsed_time
    }

    fn uncertainty(&self) -> f64 {
        self.sigma_rw
    }

    fn metadata(&self) -> ClockMetadata {
        ClockMetadata::new(
            ClockKind::RandomWalkFrequency,
            "Fractional frequency performs a random walk",
        )
        .with_parameter("sigma_rw_per_sqrt_s", self.sigma_rw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_walk_accumulates_offset() {
        let mut clock = RandomWalkFrequencyClock::new(1e-6, 9).unwrap();
        let mut reference = GaussianNoise::new(9);
        let mut y = 0.0;
        let mut elapsed = 0.0;

        for _ in 0..50 {
            clock.tick(2.0);
            y += reference.sample(1e-6 * 2.0_f64.sqrt());
            elapsed += 2.0 * (1.0 + y);
        }

        assert_eq!(clock.frequency_offset(), y);
        assert_eq!(clock.read_time(), elapsed);
    }

    #[test]
    fn test_random_walk_reproducible() {
        let mut a = RandomWalkFrequencyClock::new(2e-14, 2).unwrap();
        let mut b = RandomWalkFrequencyClock::new(2e-14, 2).unwrap();
        for _ in 0..500 {
            a.tick(1.0);
            b.tick(1.0);
            assert_eq!(a.read_time(), b.read_time());
        }
    }

    #[test]
    fn test_random_walk_non_positive_step_is_noop() {
        let mut clock = RandomWalkFrequencyClock::new(1e-6, 1).unwrap();
        clock.tick(1.0);
        let (t, y) = (clock.read_time(), clock.frequency_offset());
        clock.tick(-1.0);
        clock.tick(0.0);
        assert_eq!(clock.read_time(), t);
        assert_eq!(clock.frequency_offset(), y);
    }

    #[test]
    fn test_random_walk_metadata() {
        let clock = RandomWalkFrequencyClock::default();
        assert_eq!(clock.kind(), ClockKind::RandomWalkFrequency);
        assert_eq!(
            clock.metadata().parameter("sigma_rw_per_sqrt_s"),
            Some(DEFAULT_SIGMA_RW)
        );
    }
}
