//! Series preparation for stress curve estimation.
//!
//! Aggregates raw liquidation events into daily counts, derives daily
//! returns from closing prices, and joins the two on UTC date so the
//! estimator receives aligned, missing-free pairs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::error::{StressError, StressResult};

/// A single liquidation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidationEvent {
    pub timestamp: DateTime<Utc>,
    pub chain: String,
    pub asset: String,
}

/// Liquidations per UTC day, chain and asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLiquidationCount {
    pub date: NaiveDate,
    pub chain: String,
    pub asset: String,
    pub liq_cnt: u64,
}

/// Daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPrice {
    pub date: NaiveDate,
    pub price: f64,
}

/// Daily closing price with its simple return against the previous close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub price: f64,
    /// `None` for the first day of the series
    pub ret: Option<f64>,
}

/// A day with both a return and a liquidation count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedDay {
    pub date: NaiveDate,
    pub chain: String,
    pub asset: String,
    pub liq_cnt: u64,
    pub price: f64,
    pub ret: f64,
}

/// Shock/outcome pair fed to the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShockObservation {
    pub date: NaiveDate,
    pub shock: f64,
    pub outcome: f64,
}

/// Count liquidations per (UTC date, chain, asset), sorted by that key.
pub fn daily_liquidation_counts(events: &[LiquidationEvent]) -> Vec<DailyLiquidationCount> {
    let mut counts: BTreeMap<(NaiveDate, &str, &str), u64> = BTreeMap::new();
    for e in events {
        *counts
            .entry((e.timestamp.date_naive(), e.chain.as_str(), e.asset.as_str()))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((date, chain, asset), liq_cnt)| DailyLiquidationCount {
            date,
            chain: chain.to_string(),
            asset: asset.to_string(),
            liq_cnt,
        })
        .collect()
}

/// Simple returns `p_t / p_{t-1} - 1` in series order.
///
/// A zero previous close yields `None` rather than an infinite return.
pub fn daily_returns(prices: &[DailyPrice]) -> Vec<DailyReturn> {
    let mut prev: Option<f64> = None;
    prices
        .iter()
        .map(|p| {
            let ret = prev.filter(|&q| q != 0.0).map(|q| p.price / q - 1.0);
            prev = Some(p.price);
            DailyReturn { date: p.date, price: p.price, ret }
        })
        .collect()
}

/// Inner join of returns and liquidation counts on date.
///
/// Count order is preserved. A date appearing several times in `returns`
/// joins with every matching count. Days whose return is missing or not
/// finite are dropped.
pub fn merge_returns_with_counts(
    returns: &[DailyReturn],
    counts: &[DailyLiquidationCount],
) -> Vec<MergedDay> {
    let mut by_date: HashMap<NaiveDate, Vec<&DailyReturn>> = HashMap::new();
    for r in returns {
        by_date.entry(r.date).or_default().push(r);
    }

    let merged: Vec<MergedDay> = counts
        .iter()
        .flat_map(|c| {
            by_date
                .get(&c.date)
                .into_iter()
                .flatten()
                .filter_map(move |r| {
                    let ret = r.ret.filter(|v| v.is_finite())?;
                    Some(MergedDay {
                        date: c.date,
                        chain: c.chain.clone(),
                        asset: c.asset.clone(),
                        liq_cnt: c.liq_cnt,
                        price: r.price,
                        ret,
                    })
                })
        })
        .collect();

    debug!(
        returns = returns.len(),
        counts = counts.len(),
        merged = merged.len(),
        "Merged returns with liquidation counts"
    );
    merged
}

/// Trailing window sums.
///
/// Element `i` sums `values[i + 1 - window ..= i]` (clipped at the start)
/// once at least `min_periods` values are in the window.
pub fn rolling_sum(
    values: &[f64],
    window: usize,
    min_periods: usize,
) -> StressResult<Vec<Option<f64>>> {
    if window == 0 || min_periods == 0 || min_periods > window {
        return Err(StressError::InvalidWindow { window, min_periods });
    }

    Ok((0..values.len())
        .map(|i| {
            let lo = (i + 1).saturating_sub(window);
            let slice = &values[lo..=i];
            (slice.len() >= min_periods).then(|| slice.iter().sum())
        })
        .collect())
}

/// One-day shock observations: same-day return against liquidation count.
pub fn one_day_shocks(days: &[MergedDay]) -> Vec<ShockObservation> {
    days.iter()
        .map(|d| ShockObservation {
            date: d.date,
            shock: d.ret,
            outcome: d.liq_cnt as f64,
        })
        .collect()
}

/// Cumulative shock observations: trailing-window return sum against the
/// window's last-day liquidation count, in date order.
///
/// Days without enough history for a window sum are dropped.
pub fn cumulative_shocks(
    days: &[MergedDay],
    window: usize,
    min_periods: usize,
) -> StressResult<Vec<ShockObservation>> {
    let mut sorted: Vec<&MergedDay> = days.iter().collect();
    sorted.sort_by_key(|d| d.date);

    let rets: Vec<f64> = sorted.iter().map(|d| d.ret).collect();
    let sums = rolling_sum(&rets, window, min_periods)?;

    Ok(sorted
        .into_iter()
        .zip(sums)
        .filter_map(|(d, sum)| {
            sum.map(|shock| ShockObservation {
                date: d.date,
                shock,
                outcome: d.liq_cnt as f64,
            })
        })
        .collect())
}

/// Split observations into estimator inputs.
pub fn split_series(observations: &[ShockObservation]) -> (Vec<f64>, Vec<f64>) {
    observations.iter().map(|o| (o.shock, o.outcome)).unzip()
}

/// Raw collector output: closing prices and liquidation events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StressInput {
    #[serde(default)]
    pub prices: Vec<DailyPrice>,
    #[serde(default)]
    pub liquidations: Vec<LiquidationEvent>,
    /// Keep only events on this chain (case-insensitive)
    #[serde(default)]
    pub chain: Option<String>,
    /// Keep only events for this asset (case-insensitive)
    #[serde(default)]
    pub asset: Option<String>,
}

impl StressInput {
    /// Filter events, aggregate, compute returns and join.
    pub fn merged_days(&self) -> Vec<MergedDay> {
        let matches = |want: &Option<String>, have: &str| {
            want.as_deref().map_or(true, |w| w.eq_ignore_ascii_case(have))
        };

        let events: Vec<LiquidationEvent> = self
            .liquidations
            .iter()
            .filter(|e| matches(&self.chain, &e.chain) && matches(&self.asset, &e.asset))
            .cloned()
            .collect();

        let counts = daily_liquidation_counts(&events);
        let returns = daily_returns(&self.prices);
        merge_returns_with_counts(&returns, &counts)
    }
}
