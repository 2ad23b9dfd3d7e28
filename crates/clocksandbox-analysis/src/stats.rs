//! Descriptive statistics over sample slices

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with divisor `n - 1`; 0 with fewer than two samples
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64
}

/// Sample standard deviation with divisor `n - 1`
pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}
