//! Stress curve result table.

use serde::{Deserialize, Serialize, Serializer};

/// Point estimate with its bootstrap interquartile band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Kernel-weighted mean of the outcome
    pub est: f64,
    /// 25th percentile of the bootstrap means
    pub p25: f64,
    /// 75th percentile of the bootstrap means
    pub p75: f64,
}

/// One evaluated grid point.
///
/// `band` is `None` when the point is underdetermined. `eff_n` is always set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveRow {
    /// Grid value, echoed unchanged
    pub shock: f64,
    pub band: Option<Band>,
    /// Observations with normalized kernel weight above the relevance threshold
    pub eff_n: usize,
}

impl CurveRow {
    pub fn est(&self) -> Option<f64> {
        self.band.map(|b| b.est)
    }

    pub fn p25(&self) -> Option<f64> {
        self.band.map(|b| b.p25)
    }

    pub fn p75(&self) -> Option<f64> {
        self.band.map(|b| b.p75)
    }

    /// Whether enough evidence supported an estimate at this shock.
    pub fn is_supported(&self) -> bool {
        self.band.is_some()
    }
}

/// Flat record layout consumed by reporting.
#[derive(Serialize, Deserialize)]
struct RowRecord {
    shock: f64,
    est: Option<f64>,
    p25: Option<f64>,
    p75: Option<f64>,
    #[serde(rename = "effN")]
    eff_n: usize,
}

impl Serialize for CurveRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RowRecord {
            shock: self.shock,
            est: self.est(),
            p25: self.p25(),
            p75: self.p75(),
            eff_n: self.eff_n,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CurveRow {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let r = RowRecord::deserialize(deserializer)?;
        let band = match (r.est, r.p25, r.p75) {
            (Some(est), Some(p25), Some(p75)) => Some(Band { est, p25, p75 }),
            (None, None, None) => None,
            _ => {
                return Err(serde::de::Error::custom(
                    "est, p25 and p75 must be all null or all present",
                ))
            }
        };
        Ok(Self { shock: r.shock, band, eff_n: r.eff_n })
    }
}

/// Estimator output: one row per grid point, in grid order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShockCurve {
    rows: Vec<CurveRow>,
}

impl ShockCurve {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self { rows: Vec::with_capacity(n) }
    }

    pub(crate) fn push(&mut self, row: CurveRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CurveRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CurveRow> {
        self.rows.iter()
    }

    /// Rows that carry an estimate.
    pub fn supported(&self) -> impl Iterator<Item = &CurveRow> {
        self.rows.iter().filter(|r| r.is_supported())
    }

    /// Row with the largest point estimate, if any row is supported.
    pub fn peak(&self) -> Option<&CurveRow> {
        self.supported()
            .max_by(|a, b| a.est().unwrap_or(f64::NAN).total_cmp(&b.est().unwrap_or(f64::NAN)))
    }
}

impl<'a> IntoIterator for &'a ShockCurve {
    type Item = &'a CurveRow;
    type IntoIter = std::slice::Iter<'a, CurveRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
