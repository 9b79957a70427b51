//! Liquidation stress analysis.
//!
//! This crate provides everything between collected data and the estimator:
//! - Stress configuration with profiles and TOML loading
//! - Daily liquidation counts, daily returns and their date join
//! - One-day and cumulative shock series
//! - Shock grid construction
//! - Down-day vs up-day liquidation asymmetry
//! - Stress analysis orchestration producing a serializable report

mod analysis;
mod asymmetry;
pub mod config;
mod error;
pub mod features;
mod grid;

pub use analysis::{StressAnalysis, StressReport, SupportPoint};
pub use asymmetry::{AsymmetrySummary, SideSummary};
pub use config::{CumulativeConfig, GridConfig, KernelConfig, StressConfig};
pub use error::{StressError, StressResult};
pub use features::{
    DailyLiquidationCount, DailyPrice, DailyReturn, LiquidationEvent, MergedDay, ShockObservation,
    StressInput,
};
pub use grid::{ShockGrid, MAX_GRID_POINTS};
