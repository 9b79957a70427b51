//! Gaussian kernel weights and effective sample size.

/// Normalized weight an observation must exceed to count toward effN.
pub const RELEVANCE_THRESHOLD: f64 = 0.1;

/// Kernel weights of every observation relative to a query shock.
///
/// `w_i = exp(-(x_i - g)^2 / (2 sigma^2))`. Order of `x` is irrelevant.
pub fn gaussian_weights(x: &[f64], query: f64, sigma: f64) -> Vec<f64> {
    let denom = 2.0 * sigma * sigma;
    x.iter()
        .map(|&xi| {
            let d = xi - query;
            (-(d * d) / denom).exp()
        })
        .collect()
}

/// Number of observations whose weight, normalized by the largest weight,
/// exceeds [`RELEVANCE_THRESHOLD`].
///
/// When every weight underflows to zero the maximum is replaced by 1, so
/// the count is 0 instead of a division by zero.
pub fn effective_n(weights: &[f64]) -> usize {
    let max = weights.iter().copied().fold(0.0_f64, f64::max);
    let scale = if max == 0.0 { 1.0 } else { max };

    weights
        .iter()
        .filter(|&&w| w / scale > RELEVANCE_THRESHOLD)
        .count()
}

/// Weighted arithmetic mean over index pairs.
///
/// Returns `None` if the total weight is zero.
pub fn weighted_mean<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (num, den) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(num, den), (w, y)| (num + w * y, den + w));

    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_at_query_is_one() {
        let w = gaussian_weights(&[-0.08, -0.06], -0.08, 0.02);
        assert!((w[0] - 1.0).abs() < 1e-12);
        // One sigma away: exp(-0.5)
        assert!((w[1] - (-0.5_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_effective_n_threshold() {
        // 0.1 itself does not pass, the comparison is strict
        assert_eq!(effective_n(&[1.0, 0.5, 0.1, 0.05]), 2);
        // Normalization is relative to the maximum, not to 1
        assert_eq!(effective_n(&[0.02, 0.01, 0.001]), 2);
    }

    #[test]
    fn test_effective_n_all_underflow() {
        let w = gaussian_weights(&[-0.10, -0.08], 5.0, 0.02);
        assert!(w.iter().all(|&v| v == 0.0));
        assert_eq!(effective_n(&w), 0);
    }

    #[test]
    fn test_weighted_mean() {
        let mean = weighted_mean([(1.0, 10.0), (3.0, 20.0)]).unwrap();
        assert!((mean - 17.5).abs() < 1e-12);
        assert_eq!(weighted_mean([(0.0, 10.0)]), None);
    }
}
