//! Flicker-like fractional-frequency clock (first-order IIR on white noise)

use clocksandbox_core::{ClockKind, SandboxError, SandboxResult};

use crate::noise::{validate_scale, GaussianNoise};
use crate::{Clock, ClockMetadata};

/// Default white-noise drive at τ = 1 s
pub const DEFAULT_SIGMA_W: f64 = 5e-12;
/// Default IIR pole
pub const DEFAULT_POLE: f64 = 1e-3;

/// Clock with low-pass filtered white frequency noise.
///
/// Per tick: `n ~ N(0, sigma_w / sqrt(dt))`, `y = (1 - a) * y + a * n`,
/// then `elapsed += dt * (1 + y)`.
#[derive(Debug, Clone)]
pub struct FlickerFrequencyClock {
    elapsed_time: f64,
    /// Filtered fractional-frequency state
    y: f64,
    sigma_w: f64,
    /// IIR pole, strictly inside (0, 1)
    a: f64,
    noise: GaussianNoise,
}

impl FlickerFrequencyClock {
    pub fn new(sigma_w: f64, a: f64, seed: u64) -> SandboxResult<Self> {
        if !(a > 0.0 && a < 1.0) {
            return Err(SandboxError::invalid_parameter(format!(
                "a must be between 0 and 1 (exclusive), got {}",
                a
            )));
        }
        Ok(FlickerFrequencyClock {
            elapsed_time: 0.0,
            y: 0.0,
            sigma_w: validate_scale("sigma_w", sigma_w)?,
            a,
            noise: GaussianNoise::new(seed),
        })
    }

    pub fn sigma_w(&self) -> f64 {
        self.sigma_w
    }

    pub fn pole(&self) -> f64 {
        self.a
    }

    /// Current filtered fractional-frequency offset
    pub fn frequency_offset(&self) -> f64 {
        self.y
    }

    pub fn seed(&self) -> u64 {
        self.noise.seed()
    }
}

impl Default for FlickerFrequencyClock {
    fn default() -> Self {
        FlickerFrequencyClock {
            elapsed_time: 0.0,
            y: 0.0,
            sigma_w: DEFAULT_SIGMA_W,
            a: DEFAULT_POLE,
            noise: GaussianNoise::new(0),
        }
    }
}

impl Clock for FlickerFrequencyClock {
    fn tick(&mut self, dt: f64) {
        if !(dt > 0.0) {
            return;
        }
        let n = self.noise.sample(self.sigma_w / dt.sqrt());
        self.y = (1.0 - self.a) * self.y + self.a * n;
        self.elapsed_time += dt * (1.0 + self.y);
    }

    fn read_time(&self) -> f64 {
        self.elapsed_time
    }

    fn uncertainty(&self) -> f64 {
        self.sigma_w
    }

    fn metadata(&self) -> ClockMetadata {
        ClockMetadata::new(
            ClockKind::FlickerFrequency,
            "IIR-approximated flicker-like fractional-frequency noise",
        )
        .with_parameter("sigma_w_tau1s", self.sigma_w)
        .with_parameter("a", self.a)
    }
}
