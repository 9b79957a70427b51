//! Kernel shock estimator.
//!
//! This crate maps price shocks to expected liquidation volume:
//! - Gaussian kernel weighting around each queried shock
//! - Effective sample size guard against sparse regions
//! - Weighted bootstrap interquartile band
//! - Call-scoped, seeded generators for reproducible output
//!
//! No I/O. Inputs are two aligned, already-cleaned series.

mod bootstrap;
mod curve;
mod error;
mod estimator;
mod seed;
pub mod weights;

pub use bootstrap::{nan_percentile, weighted_bootstrap, Quartiles};
pub use curve::{Band, CurveRow, ShockCurve};
pub use error::{EstimatorError, EstimatorResult, InvalidArgument};
pub use estimator::{
    estimate, KernelShockEstimator, DEFAULT_MIN_EFF_N, DEFAULT_N_BOOT, DEFAULT_SEED,
};
pub use seed::{call_rng, point_rng, SeedStrategy};
