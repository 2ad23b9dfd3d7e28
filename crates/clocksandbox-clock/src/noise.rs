//! Seeded Gaussian noise source owned by each noisy clock

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use clocksandbox_core::{SandboxError, SandboxResult};

/// Per-clock standard-normal generator.
///
/// Never shared between clocks: identical seeds and identical call sequences
/// reproduce identical samples.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    rng: StdRng,
    seed: u64,
}

impl GaussianNoise {
    pub fn new(seed: u64) -> Self {
        GaussianNoise {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this source was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw one sample from Normal(0, std_dev)
    pub fn sample(&mut self, std_dev: f64) -> f64 {
        // Box-Muller; u1 in (0, 1] keeps the log finite
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        std_dev * z
    }
}

/// Check that a noise scale is finite and non-negative
pub(crate) fn validate_scale(name: &str, value: f64) -> SandboxResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(SandboxError::invalid_parameter(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )));
    }
    Ok(value)
}
