//! Stress analysis orchestration.
//!
//! Turns merged daily observations into two stress curves over the
//! configured grid:
//! - one-day shocks (same-day return against liquidation count)
//! - cumulative shocks (trailing-window return sum against liquidation count)
//!
//! and summarizes liquidation asymmetry between down and up days.

use liqstress_kernel::{KernelShockEstimator, ShockCurve};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::asymmetry::AsymmetrySummary;
use crate::config::StressConfig;
use crate::error::{StressError, StressResult};
use crate::features::{
    cumulative_shocks, one_day_shocks, split_series, MergedDay, ShockObservation,
};
use crate::grid::ShockGrid;

/// Effective support at one shock across both curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportPoint {
    pub shock: f64,
    #[serde(rename = "effN")]
    pub eff_n: usize,
}

/// Complete analysis output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressReport {
    /// Merged days used for the one-day curve
    pub observations: usize,
    /// Days with a trailing-window sum, used for the cumulative curve
    pub cumulative_observations: usize,
    pub one_day: ShockCurve,
    pub cumulative: ShockCurve,
    /// Larger effN of the two curves at each grid shock
    pub support: Vec<SupportPoint>,
    pub asymmetry: AsymmetrySummary,
    /// Down-day mean liquidations over the up-day mean
    pub down_up_mean_ratio: Option<f64>,
}

impl StressReport {
    fn new(
        days: &[MergedDay],
        cumulative_observations: usize,
        one_day: ShockCurve,
        cumulative: ShockCurve,
    ) -> Self {
        let support = support_profile(&one_day, &cumulative);
        let asymmetry = AsymmetrySummary::from_days(days);
        Self {
            observations: days.len(),
            cumulative_observations,
            one_day,
            cumulative,
            support,
            down_up_mean_ratio: asymmetry.mean_ratio(),
            asymmetry,
        }
    }
}

fn support_profile(one_day: &ShockCurve, cumulative: &ShockCurve) -> Vec<SupportPoint> {
    one_day
        .iter()
        .zip(cumulative.iter())
        .map(|(a, b)| SupportPoint {
            shock: a.shock,
            eff_n: a.eff_n.max(b.eff_n),
        })
        .collect()
}

/// Fit one curve, or an all-underdetermined one when no observation survived.
fn fit_curve(
    estimator: &KernelShockEstimator,
    observations: &[ShockObservation],
    grid: &[f64],
) -> StressResult<ShockCurve> {
    if observations.is_empty() {
        warn!(points = grid.len(), "No observations, every grid point is underdetermined");
        return Ok(estimator.underdetermined(grid)?);
    }
    let (x, y) = split_series(observations);
    Ok(estimator.estimate(&x, &y, grid)?)
}

/// Runs both stress curves with one configuration.
#[derive(Debug, Clone)]
pub struct StressAnalysis {
    config: StressConfig,
}

impl StressAnalysis {
    pub fn new(config: StressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    pub fn grid(&self) -> StressResult<ShockGrid> {
        ShockGrid::from_config(&self.config.grid)
    }

    fn one_day_estimator(&self) -> KernelShockEstimator {
        self.config.kernel.estimator()
    }

    fn cumulative_estimator(&self) -> KernelShockEstimator {
        self.config.kernel.estimator_with_sigma(self.config.cumulative.sigma)
    }

    fn cumulative_observations(&self, days: &[MergedDay]) -> StressResult<Vec<ShockObservation>> {
        let cumulative = &self.config.cumulative;
        cumulative_shocks(days, cumulative.window, cumulative.min_periods)
    }

    /// One-day stress curve over every merged day.
    pub fn one_day_curve(&self, days: &[MergedDay], grid: &ShockGrid) -> StressResult<ShockCurve> {
        fit_curve(&self.one_day_estimator(), &one_day_shocks(days), grid.points())
    }

    /// Cumulative-shock stress curve over the days with a trailing-window sum.
    pub fn cumulative_curve(
        &self,
        days: &[MergedDay],
        grid: &ShockGrid,
    ) -> StressResult<ShockCurve> {
        let observations = self.cumulative_observations(days)?;
        fit_curve(&self.cumulative_estimator(), &observations, grid.points())
    }

    /// Evaluate both curves sequentially.
    #[instrument(skip_all, fields(days = days.len(), profile = %self.config.profile))]
    pub fn run(&self, days: &[MergedDay]) -> StressResult<StressReport> {
        if days.is_empty() {
            return Err(StressError::NoObservations);
        }
        let grid = self.grid()?;
        let cumulative_obs = self.cumulative_observations(days)?;

        let one_day = self.one_day_curve(days, &grid)?;
        let cumulative = fit_curve(&self.cumulative_estimator(), &cumulative_obs, grid.points())?;

        let report = StressReport::new(days, cumulative_obs.len(), one_day, cumulative);
        log_report(&report);
        Ok(report)
    }

    /// Evaluate both curves on the blocking pool, each with its own generator.
    ///
    /// Output is identical to [`StressAnalysis::run`].
    #[instrument(skip_all, fields(days = days.len(), profile = %self.config.profile))]
    pub async fn run_concurrent(&self, days: &[MergedDay]) -> StressResult<StressReport> {
        if days.is_empty() {
            return Err(StressError::NoObservations);
        }
        let grid = self.grid()?;
        let one_day_obs = one_day_shocks(days);
        let cumulative_obs = self.cumulative_observations(days)?;
        let cumulative_len = cumulative_obs.len();

        let grid1 = grid.points().to_vec();
        let gridc = grid1.clone();
        let est1 = self.one_day_estimator();
        let estc = self.cumulative_estimator();

        let one_day = tokio::task::spawn_blocking(move || fit_curve(&est1, &one_day_obs, &grid1));
        let cumulative =
            tokio::task::spawn_blocking(move || fit_curve(&estc, &cumulative_obs, &gridc));

        let (one_day, cumulative) =
            tokio::try_join!(one_day, cumulative).map_err(|e| StressError::Task(e.to_string()))?;

        let report = StressReport::new(days, cumulative_len, one_day?, cumulative?);
        log_report(&report);
        Ok(report)
    }
}

fn log_report(report: &StressReport) {
    for (label, curve) in [("one_day", &report.one_day), ("cumulative", &report.cumulative)] {
        let peak = curve.peak();
        info!(
            curve = label,
            points = curve.len(),
            supported = curve.supported().count(),
            peak_shock = peak.map(|r| r.shock),
            peak_est = peak.and_then(|r| r.est()),
            "Stress curve ready"
        );
    }
    info!(
        down_days = report.asymmetry.down.days,
        up_days = report.asymmetry.up.days,
        down_mean = report.asymmetry.down.mean,
        up_mean = report.asymmetry.up.mean,
        mean_ratio = report.down_up_mean_ratio,
        "Liquidation asymmetry"
    );
}
