//! Setup-time validation errors

use thiserror::Error;

/// Invalid initialization input. Always raised before any device resource is
/// allocated, so a run that fails here never starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The three parallel arrays do not have the same length
    #[error("array lengths differ: {positions} positions, {velocities} velocities, {masses} masses")]
    LengthMismatch {
        positions: usize,
        velocities: usize,
        masses: usize,
    },
    /// A mass was zero, negative or NaN
    #[error("body {index} has non-positive mass {mass}")]
    NonPositiveMass { index: usize, mass: f32 },
    /// A position or velocity component was NaN or infinite
    #[error("body {index} has a non-finite {quantity}")]
    NonFinite {
        index: usize,
        quantity: &'static str,
    },
    /// Randomized generation options were out of range
    #[error("invalid scatter configuration: {0}")]
    InvalidScatter(String),
    /// A physics constant was unusable (negative, non-finite, zero `dt`)
    #[error("invalid physics parameters: {0}")]
    InvalidParams(String),
    /// The particle state was already transferred to a backend
    #[error("particle state was already uploaded for this run")]
    AlreadyUploaded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_body() {
        let err = ConfigurationError::NonPositiveMass {
            index: 3,
            mass: -1.0,
        };
        assert_eq!(err.to_string(), "body 3 has non-positive mass -1");

        let err = ConfigurationError::LengthMismatch {
            positions: 2,
            velocities: 2,
            masses: 1,
        };
        assert_eq!(
            err.to_string(),
            "array lengths differ: 2 positions, 2 velocities, 1 masses"
        );
    }
}
