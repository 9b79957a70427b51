//! Shock grid construction.

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::error::{StressError, StressResult};

/// Upper bound on the number of points a fixed-step grid may hold.
pub const MAX_GRID_POINTS: usize = 100_000;

/// Ordered shock levels a stress curve is evaluated at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShockGrid {
    points: Vec<f64>,
}

impl ShockGrid {
    /// Half-open fixed-step range `[start, stop)`.
    ///
    /// Produces `ceil((stop - start) / step)` points `start + i * step`.
    /// A step pointing away from `stop` gives an empty grid. More than
    /// [`MAX_GRID_POINTS`] points is an error.
    pub fn arange(start: f64, stop: f64, step: f64) -> StressResult<Self> {
        if !(start.is_finite() && stop.is_finite()) {
            return Err(StressError::InvalidGrid(format!(
                "bounds must be finite, got [{start}, {stop})"
            )));
        }
        if step == 0.0 || !step.is_finite() {
            return Err(StressError::InvalidGrid(format!(
                "step must be finite and non-zero, got {step}"
            )));
        }

        let n = ((stop - start) / step).ceil();
        let n = if n <= 0.0 {
            0
        } else if n.is_finite() && n <= MAX_GRID_POINTS as f64 {
            n as usize
        } else {
            return Err(StressError::InvalidGrid(format!(
                "step {step} over [{start}, {stop}) exceeds {MAX_GRID_POINTS} points"
            )));
        };

        Ok(Self {
            points: (0..n).map(|i| start + i as f64 * step).collect(),
        })
    }

    pub fn from_config(config: &GridConfig) -> StressResult<Self> {
        Self::arange(config.start, config.stop, config.step)
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arange_half_open() {
        let grid = ShockGrid::arange(0.0, 1.0, 0.25).unwrap();
        assert_eq!(grid.points(), &[0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_arange_descending() {
        let grid = ShockGrid::arange(0.0, -1.0, -0.5).unwrap();
        assert_eq!(grid.points(), &[0.0, -0.5]);
    }

    #[test]
    fn test_wrong_direction_is_empty() {
        assert!(ShockGrid::arange(0.0, 1.0, -0.1).unwrap().is_empty());
        assert!(ShockGrid::arange(0.5, 0.5, 0.1).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_step() {
        let zero = ShockGrid::arange(0.0, 1.0, 0.0);
        assert!(matches!(zero, Err(StressError::InvalidGrid(_))));
        assert!(ShockGrid::arange(0.0, 1.0, f64::NAN).is_err());
        assert!(ShockGrid::arange(f64::NEG_INFINITY, 1.0, 0.1).is_err());
    }

    #[test]
    fn test_point_count_is_bounded() {
        for step in [1e-300, 1e-12, 1e-6] {
            let result = ShockGrid::arange(-0.30, -0.04, step);
            assert!(matches!(result, Err(StressError::InvalidGrid(_))), "step {step}");
        }
        // Away from stop stays empty however small the step
        assert!(ShockGrid::arange(-0.30, -0.04, -1e-300).unwrap().is_empty());

        let grid = ShockGrid::arange(0.0, MAX_GRID_POINTS as f64, 1.0).unwrap();
        assert_eq!(grid.len(), MAX_GRID_POINTS);
    }

    #[test]
    fn test_default_config_grid() {
        let grid = ShockGrid::from_config(&GridConfig::default()).unwrap();
        let points = grid.points();

        assert_eq!(points[0], -0.30);
        assert!((points[1] + 0.295).abs() < 1e-12);
        assert!(grid.len() >= 52);
        assert!(points.windows(2).all(|w| w[1] > w[0]));
        assert!(points.iter().all(|&p| p < -0.04 + 1e-9));
    }
}
