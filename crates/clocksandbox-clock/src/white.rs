//! White fractional-frequency noise clock

use clocksandbox_core::{ClockKind, SandboxResult};

use crate::noise::{validate_scale, GaussianNoise};
use crate::{Clock, ClockMetadata};

/// Default `sigma_y` at τ = 1 s
pub const DEFAULT_SIGMA_Y: f64 = 1e-12;

/// Clock whose fractional frequency is redrawn independently every tick.
///
/// Each tick integrates `dt * (1 + y)` with `y ~ N(0, sigma_y / sqrt(dt))`,
/// so the instability referenced at τ = 1 s does not depend on the step size.
/// No frequency state carries over between ticks.
#[derive(Debug, Clone)]
pub struct WhiteFrequencyClock {
    elapsed_time: f64,
    sigma_y: f64,
    noise: GaussianNoise,
}

impl WhiteFrequencyClock {
    /// Create a clock with noise scale `sigma_y` and a reproducibility seed
    pub fn new(sigma_y: f64, seed: u64) -> SandboxResult<Self> {
        Ok(WhiteFrequencyClock {
            elapsed_time: 0.0,
            sigma_y: validate_scale("sigma_y", sigma_y)?,
            noise: GaussianNoise::new(seed),
        })
    }

    pub fn sigma_y(&self) -> f64 {
        self.sigma_y
    }

    pub fn seed(&self) -> u64 {
        self.noise.seed()
    }
}

impl Default for WhiteFrequencyClock {
    fn default() -> Self {
        WhiteFrequencyClock {
            elapsed_time: 0.0,
            sigma_y: DEFAULT_SIGMA_Y,
            noise: GaussianNoise::new(0),
        }
    }
}

impl Clock for WhiteFrequencyClock {
    fn tick(&mut self, dt: f64) {
        if !(dt > 0.0) {
            return;
        }
        let y = self.noise.sample(self.sigma_y / dt.sqrt());
        self.elapsed_time += dt * (1.0 + y);
    }

    fn read_time(&self) -> f64 {
        self.elapsed_time
    }

    fn uncertainty(&self) -> f64 {
        // RMS time error over 1 s ≈ sigma_y for small y
        self.sigma_y
    }

    fn metadata(&self) -> ClockMetadata {
        ClockMetadata::new(ClockKind::WhiteFrequency, "White fractional-frequency noise")
            .with_parameter("sigma_y_tau1s", self.sigma_y)
    }
}
