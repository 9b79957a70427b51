//! Liquidation asymmetry between down days and up days.

use serde::{Deserialize, Serialize};

use crate::features::MergedDay;

/// Liquidation count statistics for one side of the market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    /// Number of days on this side
    pub days: usize,
    /// Total liquidations over those days
    pub total: u64,
    /// Mean daily liquidations, `None` with no days
    pub mean: Option<f64>,
    /// Median daily liquidations, `None` with no days
    pub median: Option<f64>,
}

impl SideSummary {
    fn from_counts(mut counts: Vec<u64>) -> Self {
        let days = counts.len();
        let total: u64 = counts.iter().sum();
        if days == 0 {
            return Self { days, total, mean: None, median: None };
        }

        counts.sort_unstable();
        let mid = days / 2;
        let median = if days % 2 == 0 {
            (counts[mid - 1] as f64 + counts[mid] as f64) / 2.0
        } else {
            counts[mid] as f64
        };

        Self {
            days,
            total,
            mean: Some(total as f64 / days as f64),
            median: Some(median),
        }
    }
}

/// Down days (`ret < 0`) against up days (`ret >= 0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsymmetrySummary {
    pub down: SideSummary,
    pub up: SideSummary,
}

impl AsymmetrySummary {
    pub fn from_days(days: &[MergedDay]) -> Self {
        let (down, up): (Vec<&MergedDay>, Vec<&MergedDay>) = days.iter().partition(|d| d.ret < 0.0);

        Self {
            down: SideSummary::from_counts(down.iter().map(|d| d.liq_cnt).collect()),
            up: SideSummary::from_counts(up.iter().map(|d| d.liq_cnt).collect()),
        }
    }

    /// Down-day mean over up-day mean, when both are defined and the
    /// up-day mean is positive.
    pub fn mean_ratio(&self) -> Option<f64> {
        let down = self.down.mean?;
        let up = self.up.mean.filter(|&m| m > 0.0)?;
        Some(down / up)
    }
}
