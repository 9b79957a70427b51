//! Estimator error types.
//!
//! Only argument validation is an error. Sparse or degenerate grid points
//! are reported as rows without a band, never through this type.

use thiserror::Error;

/// Errors returned by the kernel shock estimator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    /// Arguments were rejected before any weighting was performed.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
}

/// Reason an estimator call was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidArgument {
    #[error("series length mismatch: x has {x} observations, y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("observation series are empty")]
    EmptyInput,

    #[error("kernel bandwidth must be positive and finite, got {0}")]
    Bandwidth(f64),

    #[error("bootstrap resample count must be at least 1")]
    NoResamples,

    #[error("minimum effective sample size must be at least 1")]
    NoMinEffN,
}

impl EstimatorError {
    /// Whether this error came from argument validation.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

pub type EstimatorResult<T> = Result<T, EstimatorError>;
