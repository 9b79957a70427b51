//! Configuration for stress curve analysis.
//!
//! This module provides:
//! - Kernel estimator settings (bandwidth, resampling, seeding)
//! - Cumulative shock window settings
//! - Shock grid bounds
//! - Named profiles and TOML loading

mod stress;

pub use stress::{CumulativeConfig, GridConfig, KernelConfig, StressConfig};
