//! Overlapping Allan deviation
//!
//! Frequency-stability statistic σ_y(τ) computed from a fractional-frequency
//! series. The estimator sits behind [`AllanEstimator`] so the consensus
//! estimator can be driven by any implementation.

use serde::Serialize;
use tracing::debug;

use clocksandbox_core::{SandboxError, SandboxResult};

use crate::grid::positive_step;

/// Deviations per averaging time, with 1-σ uncertainties
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AdevEstimate {
    /// Averaging times (s)
    pub taus: Vec<f64>,
    /// σ_y(τ)
    pub adev: Vec<f64>,
    /// 1-σ uncertainty of each σ_y(τ)
    pub adev_uncertainty: Vec<f64>,
}

impl AdevEstimate {
    pub fn len(&self) -> usize {
        self.taus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taus.is_empty()
    }

    /// Iterate `(tau, adev, uncertainty)` triples
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.taus
            .iter()
            .zip(&self.adev)
            .zip(&self.adev_uncertainty)
            .map(|((t, a), e)| (*t, *a, *e))
    }
}

/// Allan-deviation estimator over fractional-frequency data.
///
/// `rate` is samples per second. When `taus` is `None` the estimator chooses
/// its own ladder. Taus it cannot resolve are left out of the estimate.
pub trait AllanEstimator {
    fn estimate(&self, y: &[f64], rate: f64, taus: Option<&[f64]>) -> SandboxResult<AdevEstimate>;
}

/// Overlapping Allan deviation over all `N - 2m` second differences of phase
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlappingAdev;

impl OverlappingAdev {
    /// Averaging factors for the requested taus, or the octave ladder
    fn averaging_factors(phase_len: usize, rate: f64, taus: Option<&[f64]>) -> Vec<usize> {
        let fits = |m: usize| m >= 1 && 2 * m < phase_len;

        let mut factors: Vec<usize> = match taus {
            None => std::iter::successors(Some(1usize), |m| m.checked_mul(2))
                .take_while(|m| fits(*m))
                .collect(),
            Some(taus) => taus
                .iter()
                .map(|tau| (tau * rate).round())
                .filter(|m| *m >= 1.0 && *m < phase_len as f64)
                .map(|m| m as usize)
                .filter(|m| fits(*m))
                .collect(),
        };
        factors.sort_unstable();
        factors.dedup();

        if let Some(taus) = taus {
            if factors.len() < taus.len() {
                debug!(
                    requested = taus.len(),
                    kept = factors.len(),
                    "dropped or merged taus outside the resolvable range"
                );
            }
        }
        factors
    }
}

impl AllanEstimator for OverlappingAdev {
    fn estimate(&self, y: &[f64], rate: f64, taus: Option<&[f64]>) -> SandboxResult<AdevEstimate> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(SandboxError::invalid_argument(format!(
                "rate must be positive, got {}",
                rate
            )));
        }
        let tau0 = 1.0 / rate;
        if y.len() < 2 {
            return Err(SandboxError::InsufficientData {
                required: 2,
                actual: y.len(),
            });
        }

        // Integrate frequency into phase (seconds)
        let mut phase = Vec::with_capacity(y.len() + 1);
        phase.push(0.0);
        let mut x = 0.0;
        for v in y {
            x += v * tau0;
            phase.push(x);
        }

        let mut estimate = AdevEstimate::default();
        for m in Self::averaging_factors(phase.len(), rate, taus) {
            let n = phase.len() - 2 * m;
            let sum: f64 = (0..n)
                .map(|i| {
                    let d = phase[i + 2 * m] - 2.0 * phase[i + m] + phase[i];
                    d * d
                })
                .sum();
            let tau = m as f64 * tau0;
            let adev = (sum / (2.0 * tau * tau * n as f64)).sqrt();

            estimate.taus.push(tau);
            estimate.adev.push(adev);
            estimate.adev_uncertainty.push(adev / (n as f64).sqrt());
        }
        Ok(estimate)
    }
}

/// Overlapping Allan deviation of `y` sampled every `dt` seconds
pub fn overlapping_adev(y: &[f64], dt: f64, taus: Option<&[f64]>) -> SandboxResult<AdevEstimate> {
    overlapping_adev_with(&OverlappingAdev, y, dt, taus)
}

/// Same as [`overlapping_adev`] with a caller-supplied estimator
pub fn overlapping_adev_with<E: AllanEstimator + ?Sized>(
    estimator: &E,
    y: &[f64],
    dt: f64,
    taus: Option<&[f64]>,
) -> SandboxResult<AdevEstimate> {
    let dt = positive_step(dt)?;
    if let Some(taus) = taus {
        if let Some(tau) = taus.iter().find(|t| !(**t > 0.0)) {
            return Err(SandboxError::invalid_argument(format!(
                "taus must be positive, got {}",
                tau
            )));
        }
    }
    estimator.estimate(y, 1.0 / dt, taus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clocksandbox_clock::GaussianNoise;

    #[test]
    fn test_constant_frequency_has_zero_deviation() {
        let y = vec![1e-9; 64];
        let est = overlapping_adev(&y, 1.0, None).unwrap();
        assert!(!est.is_empty());
        for (_, adev, err) in est.iter() {
            assert!(adev.abs() < 1e-20);
            assert!(err.abs() < 1e-20);
        }
    }

    #[test]
    fn test_octave_ladder() {
        // 10 samples -> 11 phase points -> m in {1, 2, 4}
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let est = overlapping_adev(&y, 0.5, None).unwrap();
        assert_eq!(est.taus, vec![0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_alternating_frequency() {
        // y alternates ±1: at m = 1 every second difference is ±2·tau0
        let y: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let est = overlapping_adev(&y, 1.0, Some(&[1.0])).unwrap();
        assert_eq!(est.taus, vec![1.0]);
        assert!((est.adev[0] - 2.0f64.sqrt()).abs() < 1e-12);
        assert!((est.adev_uncertainty[0] - 2.0f64.sqrt() / 19.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_white_noise_scales_as_inverse_root_tau() {
        let mut noise = GaussianNoise::new(42);
        let y: Vec<f64> = (0..20_000).map(|_| noise.sample(1e-11)).collect();
        let est = overlapping_adev(&y, 1.0, Some(&[1.0, 100.0])).unwrap();

        assert!((est.adev[0] / 1e-11 - 1.0).abs() < 0.05, "adev(1) {}", est.adev[0]);
        let ratio = est.adev[0] / est.adev[1];
        assert!((ratio - 10.0).abs() < 2.5, "ratio {}", ratio);
    }

    #[test]
    fn test_unresolvable_taus_are_dropped() {
        let y = vec![0.0; 10];
        let est = overlapping_adev(&y, 1.0, Some(&[0.2, 3.0, 3.2, 50.0])).unwrap();
        assert_eq!(est.taus, vec![3.0]);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            overlapping_adev(&[0.0; 10], 1.0, Some(&[1.0, 0.0])),
            Err(SandboxError::InvalidArgument(_))
        ));
        assert!(matches!(
            overlapping_adev(&[0.0; 10], 0.0, None),
            Err(SandboxError::InvalidArgument(_))
        ));
        assert!(matches!(
            overlapping_adev(&[0.0], 1.0, None),
            Err(SandboxError::InsufficientData { .. })
        ));
    }
}
