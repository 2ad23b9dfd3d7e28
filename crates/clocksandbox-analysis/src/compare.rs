//! Pairwise clock comparison metrics

use serde::Serialize;

use clocksandbox_core::{SandboxError, SandboxResult, TimeSeries};

use crate::stats::{mean, sample_std};

/// Offset statistics of series B relative to series A (`diff = B - A`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonMetrics {
    /// Mean of the offset (s)
    pub mean_offset_s: f64,
    /// Sample standard deviation of the offset (s)
    pub std_offset_s: f64,
    /// Largest absolute offset (s)
    pub max_abs_error_s: f64,
    /// Offset change over the run divided by its span (s/s)
    pub final_drift_rate_s_per_s: f64,
}

impl ComparisonMetrics {
    /// Named values in reporting order
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("mean_offset_s", self.mean_offset_s),
            ("std_offset_s", self.std_offset_s),
            ("max_abs_error_s", self.max_abs_error_s),
            ("final_drift_rate_s_per_s", self.final_drift_rate_s_per_s),
        ]
    }
}

/// Compare two elapsed-time series sampled on a shared grid
pub fn compare_clocks(time: &[f64], a: &[f64], b: &[f64]) -> SandboxResult<ComparisonMetrics> {
    for series in [a, b] {
        if series.len() != time.len() {
            return Err(SandboxError::LengthMismatch {
                expected: time.len(),
                actual: series.len(),
            });
        }
    }
    if time.is_empty() {
        return Err(SandboxError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    let diff: Vec<f64> = a.iter().zip(b).map(|(a, b)| b - a).collect();
    let last = diff.len() - 1;

    let span = time[last] - time[0];
    let final_drift_rate_s_per_s = if span > 0.0 {
        (diff[last] - diff[0]) / span
    } else {
        0.0
    };

    Ok(ComparisonMetrics {
        mean_offset_s: mean(&diff),
        std_offset_s: sample_std(&diff),
        max_abs_error_s: max_abs(&diff),
        final_drift_rate_s_per_s,
    })
}

/// Largest magnitude; NaN if any sample is NaN
fn max_abs(values: &[f64]) -> f64 {
    if values.iter().any(|d| d.is_nan()) {
        return f64::NAN;
    }
    values.iter().fold(0.0, |acc, d| acc.max(d.abs()))
}

/// Two labelled elapsed-time series on a common grid
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub label_a: String,
    pub label_b: String,
    pub time: Vec<f64>,
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

impl Comparison {
    pub fn new(
        label_a: impl Into<String>,
        label_b: impl Into<String>,
        time: Vec<f64>,
        a: Vec<f64>,
        b: Vec<f64>,
    ) -> Self {
        Comparison {
            label_a: label_a.into(),
            label_b: label_b.into(),
            time,
            a,
            b,
        }
    }

    /// Pull two series out of a bundle, labelled by their keys
    pub fn from_series(series: &TimeSeries, key_a: &str, key_b: &str) -> SandboxResult<Self> {
        Ok(Self::new(
            key_a,
            key_b,
            series.time().to_vec(),
            series.series(key_a)?.to_vec(),
            series.series(key_b)?.to_vec(),
        ))
    }

    /// Metrics of B relative to A
    pub fn measure(&self) -> SandboxResult<ComparisonMetrics> {
        compare_clocks(&self.time, &self.a, &self.b)
    }
}
