//! Consensus estimator - fuses noisy clocks with inverse-variance weights
//!
//! Each input series is reduced to its fractional-frequency series, a
//! stability statistic is taken from it, and the series are averaged with
//! weights proportional to the reciprocal of that statistic (squared, for
//! Allan deviation).

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, warn};

use clocksandbox_core::{SandboxError, SandboxResult, TimeSeries, TIME_KEY};

use crate::adev::{overlapping_adev_with, AllanEstimator, OverlappingAdev};
use crate::frequency::fractional_frequency_from_time;
use crate::grid::{positive_step, spacings, uniform_step};
use crate::stats::sample_variance;

/// Floor applied to non-positive variances before inversion
pub const VARIANCE_FLOOR: f64 = 1e-24;

/// How per-clock weights are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WeightingMethod {
    /// Reciprocal sample variance of the fractional-frequency series
    #[default]
    InverseFrequencyVariance,
    /// Reciprocal squared overlapping Allan deviation at a single tau
    InverseAdevAtTau,
}

impl WeightingMethod {
    /// Get the method tag
    pub fn tag(&self) -> &'static str {
        match self {
            WeightingMethod::InverseFrequencyVariance => "inv_var_frac",
            WeightingMethod::InverseAdevAtTau => "inv_oadev_tau",
        }
    }
}

impl fmt::Display for WeightingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for WeightingMethod {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inv_var_frac" => Ok(WeightingMethod::InverseFrequencyVariance),
            "inv_oadev_tau" => Ok(WeightingMethod::InverseAdevAtTau),
            other => Err(SandboxError::UnknownMethod(other.to_string())),
        }
    }
}

/// Consensus configuration
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
pub struct ConsensusParams {
    pub method: WeightingMethod,
    /// Sampling step; inferred from a uniform grid when absent
    pub dt: Option<f64>,
    /// Averaging time, required by [`WeightingMethod::InverseAdevAtTau`]
    pub tau: Option<f64>,
}

impl ConsensusParams {
    /// Inverse fractional-frequency variance weighting
    pub fn inverse_variance() -> Self {
        ConsensusParams::default()
    }

    /// Inverse Allan variance weighting at `tau`
    pub fn inverse_adev(tau: f64) -> Self {
        ConsensusParams {
            method: WeightingMethod::InverseAdevAtTau,
            dt: None,
            tau: Some(tau),
        }
    }

    /// Use an explicit sampling step
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Build from a method tag
    pub fn from_tag(tag: &str, dt: Option<f64>, tau: Option<f64>) -> SandboxResult<Self> {
        Ok(ConsensusParams {
            method: tag.parse()?,
            dt,
            tau,
        })
    }

    fn required_tau(&self) -> SandboxResult<Option<f64>> {
        match self.method {
            WeightingMethod::InverseFrequencyVariance => Ok(None),
            WeightingMethod::InverseAdevAtTau => match self.tau {
                Some(tau) if tau.is_finite() && tau > 0.0 => Ok(Some(tau)),
                Some(tau) => Err(SandboxError::invalid_argument(format!(
                    "tau must be positive, got {}",
                    tau
                ))),
                None => Err(SandboxError::invalid_argument(format!(
                    "method '{}' requires tau",
                    self.method
                ))),
            },
        }
    }
}

/// Statistic behind one input's weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightDiagnostic {
    pub key: String,
    /// Fractional-frequency variance, or σ_y(τ)
    pub statistic: f64,
    /// Whether the implied variance was floored to [`VARIANCE_FLOOR`]
    pub floored: bool,
}

/// Audit trail of a consensus computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusDetail {
    /// Effective sampling step (s)
    pub dt: f64,
    /// Averaging time used for Allan weighting
    pub tau: Option<f64>,
    /// One entry per input, in input order
    pub inputs: Vec<WeightDiagnostic>,
}

/// Fused series and the weights that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusResult {
    pub time: Vec<f64>,
    pub consensus: Vec<f64>,
    /// Normalized weights, one per input key
    pub weights: Vec<f64>,
    pub method: WeightingMethod,
    pub detail: ConsensusDetail,
}

/// Fuse `keys` from `series` with the built-in Allan estimator
pub fn consensus_weighted_average<K: AsRef<str>>(
    series: &TimeSeries,
    keys: &[K],
    params: &ConsensusParams,
) -> SandboxResult<ConsensusResult> {
    consensus_weighted_average_with(series, keys, params, &OverlappingAdev)
}

/// Fuse `keys` from `series`, using `estimator` for Allan weighting.
///
/// Keys must name noisy clock series: the grid, unknown keys, duplicates,
/// and ideal reference series are rejected.
pub fn consensus_weighted_average_with<K, E>(
    series: &TimeSeries,
    keys: &[K],
    params: &ConsensusParams,
    estimator: &E,
) -> SandboxResult<ConsensusResult>
where
    K: AsRef<str>,
    E: AllanEstimator + ?Sized,
{
    let inputs = select_inputs(series, keys)?;
    let tau = params.required_tau()?;
    let explicit_dt = params.dt.map(positive_step).transpose()?;

    let time = series.time();
    if time.len() < 2 {
        return Err(SandboxError::InsufficientData {
            required: 2,
            actual: time.len(),
        });
    }
    spacings(time)?;
    let dt = match explicit_dt {
        Some(dt) => dt,
        None => uniform_step(time)?,
    };

    let mut diagnostics = Vec::with_capacity(inputs.len());
    let mut inverse = Vec::with_capacity(inputs.len());
    for (key, values) in &inputs {
        let y = fractional_frequency_from_time(time, values, Some(dt))?;
        let (statistic, variance) = match tau {
            None => {
                let var = sample_variance(&y);
                (var, var)
            }
            Some(tau) => {
                let adev = adev_at(estimator, &y, dt, tau)?;
                (adev, adev * adev)
            }
        };

        let floored = variance <= 0.0;
        let variance = if floored {
            warn!(key = %key, variance, "variance floored to {:e}", VARIANCE_FLOOR);
            VARIANCE_FLOOR
        } else {
            variance
        };

        inverse.push(1.0 / variance);
        diagnostics.push(WeightDiagnostic {
            key: key.to_string(),
            statistic,
            floored,
        });
    }

    let total: f64 = inverse.iter().sum();
    let weights: Vec<f64> = inverse.iter().map(|w| w / total).collect();
    let weight_sum: f64 = weights.iter().sum();

    let consensus = (0..time.len())
        .map(|k| {
            inputs
                .iter()
                .zip(&weights)
                .map(|((_, values), w)| w * values[k])
                .sum::<f64>()
                / weight_sum
        })
        .collect();

    debug!(method = %params.method, dt, ?weights, "consensus weights");

    Ok(ConsensusResult {
        time: time.to_vec(),
        consensus,
        weights,
        method: params.method,
        detail: ConsensusDetail {
            dt,
            tau,
            inputs: diagnostics,
        },
    })
}

/// Resolve and validate the keys to fuse
fn select_inputs<'a, K: AsRef<str>>(
    series: &'a TimeSeries,
    keys: &'a [K],
) -> SandboxResult<Vec<(&'a str, &'a [f64])>> {
    if keys.is_empty() {
        return Err(SandboxError::invalid_argument("no series keys to fuse"));
    }

    let mut seen = HashSet::new();
    keys.iter()
        .map(|key| {
            let key = key.as_ref();
            if key == TIME_KEY {
                return Err(SandboxError::invalid_argument(
                    "the time grid cannot be fused",
                ));
            }
            let entry = series.entry(key).ok_or_else(|| {
                SandboxError::invalid_argument(format!("unknown series key '{}'", key))
            })?;
            if entry.kind.map_or(false, |k| k.is_reference()) {
                return Err(SandboxError::invalid_argument(format!(
                    "'{}' is the ideal reference and cannot be fused",
                    key
                )));
            }
            if !seen.insert(key) {
                return Err(SandboxError::invalid_argument(format!(
                    "duplicate series key '{}'",
                    key
                )));
            }
            Ok((key, entry.values.as_slice()))
        })
        .collect()
}

/// σ_y at `tau` from the estimator
fn adev_at<E: AllanEstimator + ?Sized>(
    estimator: &E,
    y: &[f64],
    dt: f64,
    tau: f64,
) -> SandboxResult<f64> {
    let estimate = overlapping_adev_with(estimator, y, dt, Some(&[tau]))?;
    estimate
        .adev
        .first()
        .copied()
        .ok_or(SandboxError::InsufficientData {
            required: 2 * ((tau / dt).round() as usize).max(1),
            actual: y.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clocksandbox_core::ClockKind;

    fn bundle() -> TimeSeries {
        let mut ts = TimeSeries::uniform(4, 1.0);
        ts.insert("ref", Some(ClockKind::Ideal), vec![0.0, 1.0, 2.0, 3.0, 4.0])
            .unwrap();
        // y = [0, 0.1, 0, 0.1]
        ts.insert(
            "a",
            Some(ClockKind::WhiteFrequency),
            vec![0.0, 1.0, 2.1, 3.1, 4.2],
        )
        .unwrap();
        // y = [0, 0.2, 0, 0.2]
        ts.insert(
            "b",
            Some(ClockKind::WhiteFrequency),
            vec![0.0, 1.0, 2.2, 3.2, 4.4],
        )
        .unwrap();
        ts
    }

    #[test]
    fn test_inverse_variance_weights() {
        let ts = bundle();
        let result =
            consensus_weighted_average(&ts, &["a", "b"], &ConsensusParams::default()).unwrap();

        // var(b) = 4 var(a) -> weights 4/5, 1/5
        assert!((result.weights[0] - 0.8).abs() < 1e-9);
        assert!((result.weights[1] - 0.2).abs() < 1e-9);
        assert!((result.weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);

        let ratio = result.detail.inputs[1].statistic / result.detail.inputs[0].statistic;
        assert!((ratio - 4.0).abs() < 1e-9);
        assert_eq!(result.detail.dt, 1.0);
        assert_eq!(result.method, WeightingMethod::InverseFrequencyVariance);

        let expected_last = 0.8 * 4.2 + 0.2 * 4.4;
        assert!((result.consensus[4] - expected_last).abs() < 1e-9);
        assert_eq!(result.time, ts.time());
    }

    #[test]
    fn test_zero_variance_is_floored() {
        let mut ts = TimeSeries::uniform(3, 1.0);
        ts.insert("flat", Some(ClockKind::WhiteFrequency), vec![0.0, 1.0, 2.0, 3.0])
            .unwrap();
        ts.insert("also", None, vec![0.0, 1.0, 2.0, 3.0]).unwrap();

        let result =
            consensus_weighted_average(&ts, &["flat", "also"], &ConsensusParams::default())
                .unwrap();
        assert_eq!(result.weights, vec![0.5, 0.5]);
        assert!(result.detail.inputs.iter().all(|d| d.floored));
    }

    #[test]
    fn test_rejects_reference_time_and_unknown_keys() {
        let ts = bundle();
        let params = ConsensusParams::default();
        for keys in [vec!["ref", "a"], vec!["time"], vec!["zzz"], vec!["a", "a"]] {
            assert!(matches!(
                consensus_weighted_average(&ts, &keys, &params),
                Err(SandboxError::InvalidArgument(_))
            ));
        }
        let empty: [&str; 0] = [];
        assert!(consensus_weighted_average(&ts, &empty, &params).is_err());
    }

    #[test]
    fn test_unknown_method_tag() {
        assert_eq!(
            ConsensusParams::from_tag("inv_var", None, None),
            Err(SandboxError::UnknownMethod("inv_var".to_string()))
        );
        assert_eq!(
            "inv_oadev_tau".parse::<WeightingMethod>(),
            Ok(WeightingMethod::InverseAdevAtTau)
        );
    }

    #[test]
    fn test_adev_method_requires_tau() {
        let ts = bundle();
        let params = ConsensusParams {
            method: WeightingMethod::InverseAdevAtTau,
            dt: None,
            tau: None,
        };
        assert!(matches!(
            consensus_weighted_average(&ts, &["a", "b"], &params),
            Err(SandboxError::InvalidArgument(_))
        ));
        assert!(matches!(
            consensus_weighted_average(&ts, &["a", "b"], &ConsensusParams::inverse_adev(-1.0)),
            Err(SandboxError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_adev_weights_and_detail() {
        let ts = bundle();
        let result =
            consensus_weighted_average(&ts, &["a", "b"], &ConsensusParams::inverse_adev(1.0))
                .unwrap();

        // b's frequency excursions are twice a's -> adev doubles, weight quarters
        let (a, b) = (&result.detail.inputs[0], &result.detail.inputs[1]);
        assert!((b.statistic / a.statistic - 2.0).abs() < 1e-9);
        assert!((result.weights[0] - 0.8).abs() < 1e-9);
        assert_eq!(result.detail.tau, Some(1.0));
    }

    #[test]
    fn test_adev_tau_too_long_for_data() {
        let ts = bundle();
        assert!(matches!(
            consensus_weighted_average(&ts, &["a"], &ConsensusParams::inverse_adev(100.0)),
            Err(SandboxError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_grid_preconditions() {
        let mut ts = TimeSeries::new(vec![0.0, 1.0, 1.0]);
        ts.insert("a", None, vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(
            consensus_weighted_average(&ts, &["a"], &ConsensusParams::default()).unwrap_err(),
            SandboxError::NonMonotonicGrid { index: 1 }
        );

        let mut ts = TimeSeries::new(vec![0.0, 1.0, 3.0]);
        ts.insert("a", None, vec![0.0, 1.0, 3.0]).unwrap();
        assert_eq!(
            consensus_weighted_average(&ts, &["a"], &ConsensusParams::default()).unwrap_err(),
            SandboxError::AmbiguousStep
        );
        // An explicit step that the grid does not follow
        assert!(matches!(
            consensus_weighted_average(&ts, &["a"], &ConsensusParams::default().with_dt(1.0)),
            Err(SandboxError::InconsistentSpacing { .. })
        ));
    }

    struct FixedEstimator(f64);

    impl AllanEstimator for FixedEstimator {
        fn estimate(
            &self,
            _y: &[f64],
            _rate: f64,
            taus: Option<&[f64]>,
        ) -> SandboxResult<crate::adev::AdevEstimate> {
            let taus = taus.unwrap_or(&[1.0]).to_vec();
            Ok(crate::adev::AdevEstimate {
                adev: vec![self.0; taus.len()],
                adev_uncertainty: vec![0.0; taus.len()],
                taus,
            })
        }
    }

    #[test]
    fn test_custom_estimator_is_used() {
        let ts = bundle();
        let result = consensus_weighted_average_with(
            &ts,
            &["a", "b"],
            &ConsensusParams::inverse_adev(1.0),
            &FixedEstimator(0.0),
        )
        .unwrap();
        assert_eq!(result.weights, vec![0.5, 0.5]);
        assert!(result.detail.inputs.iter().all(|d| d.floored && d.statistic == 0.0));
    }
}
