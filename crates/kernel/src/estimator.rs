//! Gaussian kernel regression of outcomes on shocks with a weighted
//! bootstrap band.
//!
//! For every grid shock `g`:
//! - weight each observation by `exp(-(x_i - g)^2 / (2 sigma^2))`
//! - count observations above the relevance threshold (effN)
//! - if effN is below `min_eff_n` or the weights sum to zero, emit an
//!   underdetermined row
//! - otherwise emit the weighted mean and the interquartile range of
//!   `n_boot` weighted bootstrap means

use rand::Rng;
use tracing::{debug, instrument, trace};

use crate::bootstrap::weighted_bootstrap;
use crate::curve::{Band, CurveRow, ShockCurve};
use crate::error::{EstimatorResult, InvalidArgument};
use crate::seed::{call_rng, point_rng, SeedStrategy};
use crate::weights::{effective_n, gaussian_weights, weighted_mean};

/// Default bootstrap resample count.
pub const DEFAULT_N_BOOT: usize = 200;
/// Default minimum effective sample size for an estimate.
pub const DEFAULT_MIN_EFF_N: usize = 8;
/// Default generator seed.
pub const DEFAULT_SEED: u64 = 42;

/// Kernel shock estimator parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelShockEstimator {
    /// Gaussian kernel bandwidth, in shock units
    pub sigma: f64,
    /// Bootstrap resamples per grid point
    pub n_boot: usize,
    /// Minimum effN required to report an estimate
    pub min_eff_n: usize,
    /// Generator seed
    pub seed: u64,
    /// Generator scoping across grid points
    pub seed_strategy: SeedStrategy,
}

impl KernelShockEstimator {
    /// Estimator with the given bandwidth and default resampling settings.
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma,
            n_boot: DEFAULT_N_BOOT,
            min_eff_n: DEFAULT_MIN_EFF_N,
            seed: DEFAULT_SEED,
            seed_strategy: SeedStrategy::Shared,
        }
    }

    pub fn with_resamples(mut self, n_boot: usize) -> Self {
        self.n_boot = n_boot;
        self
    }

    pub fn with_min_eff_n(mut self, min_eff_n: usize) -> Self {
        self.min_eff_n = min_eff_n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_seed_strategy(mut self, strategy: SeedStrategy) -> Self {
        self.seed_strategy = strategy;
        self
    }

    /// Check parameters and series lengths.
    pub fn validate(&self, x_len: usize, y_len: usize) -> EstimatorResult<()> {
        if x_len != y_len {
            return Err(InvalidArgument::LengthMismatch { x: x_len, y: y_len }.into());
        }
        if x_len == 0 {
            return Err(InvalidArgument::EmptyInput.into());
        }
        self.validate_parameters()
    }

    fn validate_parameters(&self) -> EstimatorResult<()> {
        if !(self.sigma > 0.0 && self.sigma.is_finite()) {
            return Err(InvalidArgument::Bandwidth(self.sigma).into());
        }
        if self.n_boot == 0 {
            return Err(InvalidArgument::NoResamples.into());
        }
        if self.min_eff_n == 0 {
            return Err(InvalidArgument::NoMinEffN.into());
        }
        Ok(())
    }

    /// Evaluate the stress curve over `grid`.
    ///
    /// The generator is created here from `seed` and dropped on return, so
    /// identical arguments reproduce identical output.
    #[instrument(skip_all, fields(observations = x.len(), points = grid.len(), sigma = self.sigma))]
    pub fn estimate(&self, x: &[f64], y: &[f64], grid: &[f64]) -> EstimatorResult<ShockCurve> {
        self.validate(x.len(), y.len())?;

        let curve = match self.seed_strategy {
            SeedStrategy::Shared => {
                let mut rng = call_rng(self.seed);
                self.evaluate_grid(x, y, grid, &mut rng)
            }
            SeedStrategy::PerPoint => {
                let mut curve = ShockCurve::with_capacity(grid.len());
                for (i, &g) in grid.iter().enumerate() {
                    let mut rng = point_rng(self.seed, i);
                    curve.push(self.evaluate_point(x, y, g, &mut rng));
                }
                curve
            }
        };

        debug!(
            supported = curve.supported().count(),
            strategy = ?self.seed_strategy,
            "Stress curve evaluated"
        );
        Ok(curve)
    }

    /// Curve for a grid with no observations behind it.
    ///
    /// Every row is underdetermined with an effN of zero. Parameters are
    /// still validated.
    pub fn underdetermined(&self, grid: &[f64]) -> EstimatorResult<ShockCurve> {
        self.validate_parameters()?;

        let mut curve = ShockCurve::with_capacity(grid.len());
        for &shock in grid {
            curve.push(CurveRow { shock, band: None, eff_n: 0 });
        }
        Ok(curve)
    }

    /// Evaluate the stress curve with a caller-owned generator.
    ///
    /// `seed` and `seed_strategy` are ignored; `rng` is advanced through the
    /// grid in order.
    pub fn estimate_with_rng<R>(
        &self,
        x: &[f64],
        y: &[f64],
        grid: &[f64],
        rng: &mut R,
    ) -> EstimatorResult<ShockCurve>
    where
        R: Rng + ?Sized,
    {
        self.validate(x.len(), y.len())?;
        Ok(self.evaluate_grid(x, y, grid, rng))
    }

    fn evaluate_grid<R>(&self, x: &[f64], y: &[f64], grid: &[f64], rng: &mut R) -> ShockCurve
    where
        R: Rng + ?Sized,
    {
        let mut curve = ShockCurve::with_capacity(grid.len());
        for &g in grid {
            curve.push(self.evaluate_point(x, y, g, rng));
        }
        curve
    }

    fn evaluate_point<R>(&self, x: &[f64], y: &[f64], shock: f64, rng: &mut R) -> CurveRow
    where
        R: Rng + ?Sized,
    {
        let w = gaussian_weights(x, shock, self.sigma);
        let eff_n = effective_n(&w);
        let total: f64 = w.iter().sum();

        if eff_n < self.min_eff_n || total == 0.0 {
            trace!(shock, eff_n, "Underdetermined grid point");
            return CurveRow { shock, band: None, eff_n };
        }

        let band = weighted_mean(w.iter().copied().zip(y.iter().copied())).and_then(|est| {
            weighted_bootstrap(y, &w, self.n_boot, rng).map(|q| Band {
                est,
                p25: q.p25,
                p75: q.p75,
            })
        });

        CurveRow { shock, band, eff_n }
    }
}

/// Evaluate a stress curve with explicit parameters.
///
/// Shorthand for [`KernelShockEstimator`] with the shared seed strategy.
pub fn estimate(
    x: &[f64],
    y: &[f64],
    grid: &[f64],
    sigma: f64,
    n_boot: usize,
    min_eff_n: usize,
    seed: u64,
) -> EstimatorResult<ShockCurve> {
    KernelShockEstimator::new(sigma)
        .with_resamples(n_boot)
        .with_min_eff_n(min_eff_n)
        .with_seed(seed)
        .estimate(x, y, grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimatorError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const X: [f64; 4] = [-0.10, -0.08, -0.08, -0.05];
    const Y: [f64; 4] = [20.0, 22.0, 18.0, 10.0];

    /// Deterministic spread of daily returns around zero.
    fn synthetic_returns(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| ((i * 37) % 101) as f64 / 1000.0 - 0.05).collect();
        let y: Vec<f64> = x.iter().map(|r| (30.0 - 400.0 * r).max(0.0).round()).collect();
        (x, y)
    }

    #[test]
    fn test_dense_point_estimate() {
        let curve = estimate(&X, &Y, &[-0.08], 0.02, 200, 2, 42).unwrap();
        let row = curve.rows()[0];

        assert!(row.eff_n >= 2);
        let est = row.est().unwrap();
        // Dominated by the two -0.08 observations (mean 20)
        assert!((est - 20.0).abs() < 1.5, "est = {est}");
        assert!(row.p25().unwrap() <= row.p75().unwrap());
    }

    #[test]
    fn test_far_point_is_underdetermined() {
        let curve = estimate(&X, &Y, &[5.0], 0.02, 200, 8, 42).unwrap();
        let row = curve.rows()[0];

        assert_eq!(row.eff_n, 0);
        assert_eq!(row.shock, 5.0);
        assert!(row.band.is_none());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = estimate(&X[..3], &Y, &[-0.08], 0.02, 200, 8, 42).unwrap_err();
        assert_eq!(
            err,
            EstimatorError::InvalidArgument(InvalidArgument::LengthMismatch { x: 3, y: 4 })
        );
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let cases = [
            (KernelShockEstimator::new(0.0), InvalidArgument::Bandwidth(0.0)),
            (KernelShockEstimator::new(-0.01), InvalidArgument::Bandwidth(-0.01)),
            (KernelShockEstimator::new(0.02).with_resamples(0), InvalidArgument::NoResamples),
            (KernelShockEstimator::new(0.02).with_min_eff_n(0), InvalidArgument::NoMinEffN),
        ];
        for (est, expected) in cases {
            assert_eq!(est.estimate(&X, &Y, &[-0.08]).unwrap_err(), EstimatorError::from(expected));
        }

        let nan = KernelShockEstimator::new(f64::NAN).estimate(&X, &Y, &[-0.08]);
        assert!(matches!(
            nan,
            Err(EstimatorError::InvalidArgument(InvalidArgument::Bandwidth(_)))
        ));

        let empty = KernelShockEstimator::new(0.02).estimate(&[], &[], &[-0.08]);
        assert_eq!(empty.unwrap_err(), EstimatorError::from(InvalidArgument::EmptyInput));
    }

    #[test]
    fn test_deterministic_output() {
        let (x, y) = synthetic_returns(120);
        let grid: Vec<f64> = (0..20).map(|i| -0.06 + i as f64 * 0.005).collect();
        let est = KernelShockEstimator::new(0.012);

        let a = est.estimate(&x, &y, &grid).unwrap();
        let b = est.estimate(&x, &y, &grid).unwrap();

        assert_eq!(a.len(), b.len());
        for (ra, rb) in a.iter().zip(b.iter()) {
            assert_eq!(ra.eff_n, rb.eff_n);
            let bits = |r: &CurveRow| {
                r.band.map(|b| (b.est.to_bits(), b.p25.to_bits(), b.p75.to_bits()))
            };
            assert_eq!(bits(ra), bits(rb));
        }
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn test_row_count_and_order() {
        let (x, y) = synthetic_returns(80);
        // Unsorted with a duplicate
        let grid = [-0.02, -0.30, 0.01, -0.02, 4.0];
        let curve = KernelShockEstimator::new(0.012).estimate(&x, &y, &grid).unwrap();

        assert_eq!(curve.len(), grid.len());
        for (row, g) in curve.iter().zip(grid) {
            assert_eq!(row.shock, g);
        }
        // Same shock, same weights; only the resampling differs
        assert_eq!(curve.rows()[0].eff_n, curve.rows()[3].eff_n);
        assert_eq!(curve.rows()[0].est(), curve.rows()[3].est());
    }

    #[test]
    fn test_null_triple_consistency() {
        let (x, y) = synthetic_returns(60);
        let grid: Vec<f64> = (0..40).map(|i| -0.20 + i as f64 * 0.01).collect();
        let curve = KernelShockEstimator::new(0.01).estimate(&x, &y, &grid).unwrap();

        for row in &curve {
            let present = [row.est(), row.p25(), row.p75()].iter().filter(|v| v.is_some()).count();
            assert!(present == 0 || present == 3);
        }
        assert!(curve.supported().count() > 0);
        assert!(curve.supported().count() < curve.len());
    }

    #[test]
    fn test_eff_n_monotone_in_sigma() {
        let (x, y) = synthetic_returns(90);
        let grid = [-0.12, -0.05, 0.0, 0.03, 0.2];
        let sigmas = [0.001, 0.005, 0.01, 0.02, 0.05, 0.2, 1.0];

        let curves: Vec<ShockCurve> = sigmas
            .iter()
            .map(|&s| {
                KernelShockEstimator::new(s)
                    .with_resamples(5)
                    .estimate(&x, &y, &grid)
                    .unwrap()
            })
            .collect();

        for pair in curves.windows(2) {
            for (narrow, wide) in pair[0].iter().zip(pair[1].iter()) {
                assert!(wide.eff_n >= narrow.eff_n, "shock {}", narrow.shock);
            }
        }
    }

    #[test]
    fn test_single_observation() {
        let grid = [-0.2, -0.05, 0.0, 0.1, 50.0];
        let curve = estimate(&[-0.05], &[12.0], &grid, 0.02, 50, 2, 42).unwrap();

        for row in &curve {
            assert!(row.band.is_none());
            assert!(row.eff_n <= 1);
        }
        // The observation itself always clears the threshold unless it underflows
        assert_eq!(curve.rows()[1].eff_n, 1);
        assert_eq!(curve.rows()[4].eff_n, 0);
    }

    #[test]
    fn test_constant_outcome() {
        let (x, _) = synthetic_returns(70);
        let y = vec![7.0; x.len()];
        let grid: Vec<f64> = (0..15).map(|i| -0.08 + i as f64 * 0.01).collect();
        let curve = KernelShockEstimator::new(0.015).estimate(&x, &y, &grid).unwrap();

        assert!(curve.supported().count() > 0);
        for row in curve.supported() {
            let band = row.band.unwrap();
            assert!((band.est - 7.0).abs() < 1e-9);
            assert!((band.p25 - 7.0).abs() < 1e-9);
            assert!((band.p75 - 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_caller_owned_rng_matches_seed() {
        let (x, y) = synthetic_returns(50);
        let grid = [-0.03, 0.0, 0.02];
        let est = KernelShockEstimator::new(0.01).with_seed(9);

        let seeded = est.estimate(&x, &y, &grid).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let passed = est.estimate_with_rng(&x, &y, &grid, &mut rng).unwrap();

        assert_eq!(seeded, passed);
    }

    #[test]
    fn test_underdetermined_curve() {
        let grid = [-0.30, -0.10, 0.0];
        let curve = KernelShockEstimator::new(0.02).underdetermined(&grid).unwrap();

        assert_eq!(curve.len(), grid.len());
        for (row, g) in curve.iter().zip(grid) {
            assert_eq!(row.shock, g);
            assert_eq!(row.eff_n, 0);
            assert!(row.band.is_none());
        }

        let err = KernelShockEstimator::new(0.0).underdetermined(&grid).unwrap_err();
        assert_eq!(err, EstimatorError::from(InvalidArgument::Bandwidth(0.0)));
    }

    #[test]
    fn test_per_point_rows_are_independent() {
        let (x, y) = synthetic_returns(100);
        let est = KernelShockEstimator::new(0.01).with_seed_strategy(SeedStrategy::PerPoint);

        // The first point differs (supported vs far away), the second must not
        let a = est.estimate(&x, &y, &[-0.02, 0.01]).unwrap();
        let b = est.estimate(&x, &y, &[9.0, 0.01]).unwrap();

        assert!(a.rows()[0].is_supported());
        assert!(!b.rows()[0].is_supported());
        assert_eq!(a.rows()[1], b.rows()[1]);
    }
}
