//! Error types for ClockSandbox

use thiserror::Error;

/// Validation failures raised by clocks, the simulation engine, and analysis.
///
/// Every variant is a synchronous, non-retryable rejection of the offending
/// call. Nothing is mutated before the check fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SandboxError {
    // Argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown weighting method: {0}")]
    UnknownMethod(String),

    // Alignment errors
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Shape mismatch: time grid has {time} samples, series has {series}")]
    ShapeMismatch { time: usize, series: usize },

    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    // Time grid errors
    #[error("Time grid is not strictly increasing at index {index}")]
    NonMonotonicGrid { index: usize },

    #[error("Grid spacing {actual} at index {index} does not match step {expected}")]
    InconsistentSpacing {
        index: usize,
        expected: f64,
        actual: f64,
    },

    #[error("Time grid is not uniform and no step was supplied")]
    AmbiguousStep,
}

/// Result type for ClockSandbox operations
pub type SandboxResult<T> = Result<T, SandboxError>;

impl SandboxError {
    /// Shorthand for an [`SandboxError::InvalidArgument`]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SandboxError::InvalidArgument(msg.into())
    }

    /// Shorthand for an [`SandboxError::InvalidParameter`]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        SandboxError::InvalidParameter(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SandboxError::LengthMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Length mismatch: expected 3, got 2");

        let err = SandboxError::invalid_parameter("a must be between 0 and 1");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: a must be between 0 and 1"
        );
    }
}
