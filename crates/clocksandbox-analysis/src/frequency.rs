//! Fractional-frequency derivation from elapsed-time samples

use clocksandbox_core::{SandboxError, SandboxResult};

use crate::grid::{close_to, positive_step, spacings};

/// Relative tolerance between an expected step and the grid's spacings
pub const SPACING_RTOL: f64 = 1e-6;

/// Fractional frequency `y[k] = Δelapsed[k] / Δt[k] - 1`.
///
/// The result is one sample shorter than the input. When `dt` is supplied,
/// every grid spacing must match it within [`SPACING_RTOL`] and `dt` is used
/// as the denominator.
pub fn fractional_frequency_from_time(
    time: &[f64],
    elapsed: &[f64],
    dt: Option<f64>,
) -> SandboxResult<Vec<f64>> {
    if time.len() != elapsed.len() {
        return Err(SandboxError::ShapeMismatch {
            time: time.len(),
            series: elapsed.len(),
        });
    }
    if time.len() < 2 {
        return Err(SandboxError::InsufficientData {
            required: 2,
            actual: time.len(),
        });
    }

    let steps = spacings(time)?;

    let y = match dt {
        None => elapsed
            .windows(2)
            .zip(&steps)
            .map(|(w, step)| (w[1] - w[0]) / step - 1.0)
            .collect(),
        Some(dt) => {
            let dt = positive_step(dt)?;
            if let Some((index, actual)) = steps
                .iter()
                .enumerate()
                .find(|(_, s)| !close_to(**s, dt, SPACING_RTOL))
            {
                return Err(SandboxError::InconsistentSpacing {
                    index,
                    expected: dt,
                    actual: *actual,
                });
            }
            elapsed.windows(2).map(|w| (w[1] - w[0]) / dt - 1.0).collect()
        }
    };
    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_rate_offset() {
        let t = [0.0, 1.0, 2.0, 3.0];
        let x = [0.0, 1.001, 2.002, 3.003];
        let y = fractional_frequency_from_time(&t, &x, None).unwrap();
        assert_eq!(y.len(), 3);
        for v in y {
            assert!((v - 1e-3).abs() < 1e-12);
        }
    }

    #[test]
    fn test_non_uniform_grid_uses_each_spacing() {
        let t = [0.0, 1.0, 3.0];
        let x = [0.0, 1.0, 3.0];
        assert_eq!(
            fractional_frequency_from_time(&t, &x, None).unwrap(),
            vec![0.0, 0.0]
        );
    }

    #[test]
    fn test_shape_and_length_errors() {
        assert_eq!(
            fractional_frequency_from_time(&[0.0, 1.0], &[0.0], None),
            Err(SandboxError::ShapeMismatch { time: 2, series: 1 })
        );
        assert_eq!(
            fractional_frequency_from_time(&[0.0], &[0.0], None),
            Err(SandboxError::InsufficientData {
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_non_monotonic_grid() {
        assert_eq!(
            fractional_frequency_from_time(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0], None),
            Err(SandboxError::NonMonotonicGrid { index: 1 })
        );
    }

    #[test]
    fn test_expected_step_must_match() {
        let t = [0.0, 1.0, 2.0, 3.5];
        let x = [0.0, 1.0, 2.0, 3.5];
        let err = fractional_frequency_from_time(&t, &x, Some(1.0)).unwrap_err();
        assert!(matches!(
            err,
            SandboxError::InconsistentSpacing { index: 2, .. }
        ));

        // Within tolerance
        let t = [0.0, 1.0, 2.000_000_1];
        assert!(fractional_frequency_from_time(&t, &t, Some(1.0)).is_ok());

        assert!(matches!(
            fractional_frequency_from_time(&t, &t, Some(0.0)),
            Err(SandboxError::InvalidArgument(_))
        ));
    }
}
