//! Errors raised while preparing series and running the analysis.

use liqstress_kernel::EstimatorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StressError {
    #[error(transparent)]
    Estimator(#[from] EstimatorError),

    #[error("invalid shock grid: {0}")]
    InvalidGrid(String),

    #[error("invalid rolling window: window {window}, min_periods {min_periods}")]
    InvalidWindow { window: usize, min_periods: usize },

    #[error("no observations to analyse")]
    NoObservations,

    #[error("curve task failed: {0}")]
    Task(String),
}

pub type StressResult<T> = Result<T, StressError>;
