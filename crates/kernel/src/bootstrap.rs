//! Weighted bootstrap of the kernel-weighted mean.
//!
//! Indices are drawn with replacement with probability `w_i / sum(w)`.
//! Each resample mean is weighted by the original weights of the drawn
//! indices, not by weights renormalized within the resample.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::warn;

/// Interquartile range of a bootstrap distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub p25: f64,
    pub p75: f64,
}

/// Run `n_boot` weighted resamples of `y` and return the 25th and 75th
/// percentiles of the resample means.
///
/// Returns `None` when the weights cannot form a sampling distribution
/// (all zero, or containing NaN).
pub fn weighted_bootstrap<R>(
    y: &[f64],
    w: &[f64],
    n_boot: usize,
    rng: &mut R,
) -> Option<Quartiles>
where
    R: Rng + ?Sized,
{
    let dist = match WeightedIndex::new(w) {
        Ok(dist) => dist,
        Err(e) => {
            warn!(error = %e, "Weights do not form a sampling distribution");
            return None;
        }
    };

    let n = y.len();
    let mut means = Vec::with_capacity(n_boot);

    for _ in 0..n_boot {
        let mut num = 0.0;
        let mut den = 0.0;
        for _ in 0..n {
            let j = dist.sample(rng);
            num += w[j] * y[j];
            den += w[j];
        }
        // Drawn indices always carry positive weight, den > 0
        means.push(if den == 0.0 { f64::NAN } else { num / den });
    }

    Some(Quartiles {
        p25: nan_percentile(&means, 25.0),
        p75: nan_percentile(&means, 75.0),
    })
}

/// Percentile with linear interpolation between closest ranks, ignoring
/// NaN values. Returns NaN if no finite-comparable values remain.
///
/// `q` is in percent, `0.0..=100.0`.
pub fn nan_percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
