//! Stress analysis configuration with profile support.
//!
//! Provides centralized configuration for the estimator, the cumulative
//! shock window and the evaluation grid, with profiles for quick
//! exploration and thorough reporting.

use anyhow::Context;
use liqstress_kernel::{KernelShockEstimator, SeedStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure containing all analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressConfig {
    /// Profile name (for logging/identification)
    #[serde(default = "default_profile_name")]
    pub profile: String,

    /// One-day kernel estimator settings
    #[serde(default)]
    pub kernel: KernelConfig,

    /// Multi-day cumulative shock settings
    #[serde(default)]
    pub cumulative: CumulativeConfig,

    /// Shock grid the curves are evaluated on
    #[serde(default)]
    pub grid: GridConfig,
}

fn default_profile_name() -> String {
    "default".to_string()
}

/// Kernel estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Gaussian bandwidth for one-day returns
    #[serde(default = "default_sigma")]
    pub sigma: f64,

    /// Bootstrap resamples per grid point
    #[serde(default = "default_n_boot")]
    pub n_boot: usize,

    /// Minimum effective sample size for an estimate
    #[serde(default = "default_min_eff_n")]
    pub min_eff_n: usize,

    /// Generator seed
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Generator scoping across grid points
    #[serde(default)]
    pub seed_strategy: SeedStrategy,
}

fn default_sigma() -> f64 {
    0.012
}
fn default_n_boot() -> usize {
    200
}
fn default_min_eff_n() -> usize {
    8
}
fn default_seed() -> u64 {
    42
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            sigma: default_sigma(),
            n_boot: default_n_boot(),
            min_eff_n: default_min_eff_n(),
            seed: default_seed(),
            seed_strategy: SeedStrategy::default(),
        }
    }
}

impl KernelConfig {
    /// Estimator for one-day shocks.
    pub fn estimator(&self) -> KernelShockEstimator {
        self.estimator_with_sigma(self.sigma)
    }

    /// Estimator sharing these resampling settings with another bandwidth.
    pub fn estimator_with_sigma(&self, sigma: f64) -> KernelShockEstimator {
        KernelShockEstimator::new(sigma)
            .with_resamples(self.n_boot)
            .with_min_eff_n(self.min_eff_n)
            .with_seed(self.seed)
            .with_seed_strategy(self.seed_strategy)
    }
}

/// Cumulative (multi-day) shock settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeConfig {
    /// Trailing window length in days
    #[serde(default = "default_window")]
    pub window: usize,

    /// Minimum returns in the window before a sum is produced
    #[serde(default = "default_min_periods")]
    pub min_periods: usize,

    /// Gaussian bandwidth for cumulative returns
    #[serde(default = "default_cumulative_sigma")]
    pub sigma: f64,
}

fn default_window() -> usize {
    7
}
fn default_min_periods() -> usize {
    3
}
fn default_cumulative_sigma() -> f64 {
    0.020
}

impl Default for CumulativeConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            min_periods: default_min_periods(),
            sigma: default_cumulative_sigma(),
        }
    }
}

/// Fixed-step shock grid, `start` inclusive, `stop` exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_start")]
    pub start: f64,

    #[serde(default = "default_grid_stop")]
    pub stop: f64,

    #[serde(default = "default_grid_step")]
    pub step: f64,
}

fn default_grid_start() -> f64 {
    -0.30
}
fn default_grid_stop() -> f64 {
    -0.04
}
fn default_grid_step() -> f64 {
    0.005
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start: default_grid_start(),
            stop: default_grid_stop(),
            step: default_grid_step(),
        }
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            profile: default_profile_name(),
            kernel: KernelConfig::default(),
            cumulative: CumulativeConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

impl StressConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Few resamples for fast exploratory runs.
    pub fn quick() -> Self {
        Self {
            profile: "quick".to_string(),
            kernel: KernelConfig {
                n_boot: 50,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Many resamples and a stricter support requirement for reporting.
    pub fn thorough() -> Self {
        Self {
            profile: "thorough".to_string(),
            kernel: KernelConfig {
                n_boot: 1000,
                min_eff_n: 12,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Look up a built-in profile by name.
    pub fn load_profile(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default()),
            "quick" | "fast" => Some(Self::quick()),
            "thorough" | "report" => Some(Self::thorough()),
            _ => None,
        }
    }

    /// Get profile from environment variable STRESS_PROFILE, or default.
    /// Supported values: default, quick, thorough
    pub fn from_env() -> Self {
        let profile = std::env::var("STRESS_PROFILE").unwrap_or_else(|_| "default".to_string());
        Self::load_profile(&profile).unwrap_or_else(|| {
            tracing::warn!(profile = %profile, "Unknown profile, using default");
            Self::default()
        })
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        tracing::info!(profile = %self.profile, "Stress configuration loaded");
        tracing::info!(
            sigma = self.kernel.sigma,
            n_boot = self.kernel.n_boot,
            min_eff_n = self.kernel.min_eff_n,
            seed = self.kernel.seed,
            strategy = ?self.kernel.seed_strategy,
            "Kernel estimator"
        );
        tracing::info!(
            window = self.cumulative.window,
            min_periods = self.cumulative.min_periods,
            sigma = self.cumulative.sigma,
            "Cumulative shock"
        );
        tracing::info!(
            start = self.grid.start,
            stop = self.grid.stop,
            step = self.grid.step,
            "Shock grid"
        );
    }
}
