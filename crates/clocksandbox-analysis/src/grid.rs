//! Time grid integrity checks

use clocksandbox_core::{SandboxError, SandboxResult};

/// Relative tolerance for deciding a grid is uniform when no step is given
pub const UNIFORM_GRID_RTOL: f64 = 1e-9;

/// Consecutive spacings of a strictly increasing grid
pub fn spacings(time: &[f64]) -> SandboxResult<Vec<f64>> {
    time.windows(2)
        .enumerate()
        .map(|(index, w)| {
            let dt = w[1] - w[0];
            // NaN spacing counts as non-increasing
            if dt > 0.0 {
                Ok(dt)
            } else {
                Err(SandboxError::NonMonotonicGrid { index })
            }
        })
        .collect()
}

/// Check that `value` is within `rtol` of `reference`, relative to `reference`
pub fn close_to(value: f64, reference: f64, rtol: f64) -> bool {
    (value - reference).abs() <= rtol * reference.abs()
}

/// Infer the step of a uniform grid.
///
/// Fails with `AmbiguousStep` when any spacing departs from the first by more
/// than [`UNIFORM_GRID_RTOL`].
pub fn uniform_step(time: &[f64]) -> SandboxResult<f64> {
    let steps = spacings(time)?;
    let first = *steps.first().ok_or(SandboxError::InsufficientData {
        required: 2,
        actual: time.len(),
    })?;
    if steps.iter().all(|s| close_to(*s, first, UNIFORM_GRID_RTOL)) {
        Ok(first)
    } else {
        Err(SandboxError::AmbiguousStep)
    }
}

/// Validate an explicitly supplied step
pub fn positive_step(dt: f64) -> SandboxResult<f64> {
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(SandboxError::invalid_argument(format!(
            "dt must be positive, got {}",
            dt
        )))
    }
}
