//! polar.rs — Boat class performance
//!
//! Boat speed through the water as a function of true wind angle and true
//! wind speed, bilinear-interpolated over a table and clamped at its edges.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Speed table: `speeds[i][j]` is knots at `tws[i]` knots of wind and
/// `twa[j]` degrees off the wind. Both axes ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarTable {
    pub twa: Vec<f64>,
    pub tws: Vec<f64>,
    pub speeds: Vec<Vec<f64>>,
}

impl Default for PolarTable {
    /// Generic single-handed dinghy.
    fn default() -> Self {
        Self {
            twa: vec![0.0, 30.0, 45.0, 60.0, 90.0, 120.0, 150.0, 180.0],
            tws: vec![0.0, 6.0, 12.0, 20.0],
            speeds: vec![
                vec![0.0; 8],
                vec![0.0, 2.0, 3.5, 4.0, 4.3, 4.2, 3.8, 3.3],
                vec![0.0, 3.0, 5.0, 5.6, 6.0, 6.3, 6.0, 5.2],
                vec![0.0, 3.5, 5.8, 6.4, 7.0, 7.8, 8.0, 7.0],
            ],
        }
    }
}

impl PolarTable {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ascending = |axis: &[f64]| !axis.is_empty() && axis.windows(2).all(|w| w[0] < w[1]);
        if !ascending(&self.twa) {
            return Err(ConfigError::InvalidPolar { reason: "twa must be non-empty and ascending".into() });
        }
        if !ascending(&self.tws) {
            return Err(ConfigError::InvalidPolar { reason: "tws must be non-empty and ascending".into() });
        }
        if self.speeds.len() != self.tws.len() {
            return Err(ConfigError::InvalidPolar {
                reason: format!("{} speed rows for {} wind speeds", self.speeds.len(), self.tws.len()),
            });
        }
        if let Some(row) = self.speeds.iter().find(|r| r.len() != self.twa.len()) {
            return Err(ConfigError::InvalidPolar {
                reason: format!("speed row has {} entries, expected {}", row.len(), self.twa.len()),
            });
        }
        if self.speeds.iter().flatten().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(ConfigError::InvalidPolar { reason: "speeds must be finite and non-negative".into() });
        }
        Ok(())
    }

    /// Boat speed in knots. `twa` is taken as an absolute angle off the wind.
    pub fn speed(&self, twa: f64, tws: f64) -> f64 {
        let (i0, i1, fi) = bracket(&self.tws, tws);
        let (j0, j1, fj) = bracket(&self.twa, twa.abs().min(180.0));
        let at = |i: usize, j: usize| self.speeds[i][j];
        let low = at(i0, j0) + (at(i0, j1) - at(i0, j0)) * fj;
        let high = at(i1, j0) + (at(i1, j1) - at(i1, j0)) * fj;
        low + (high - low) * fi
    }
}

/// Indices either side of `v` and the fraction between them, clamped.
fn bracket(axis: &[f64], v: f64) -> (usize, usize, f64) {
    let last = axis.len() - 1;
    if v <= axis[0] {
        return (0, 0, 0.0);
    }
    if v >= axis[last] {
        return (last, last, 0.0);
    }
    let hi = axis.iter().position(|a| *a > v).unwrap_or(last);
    let lo = hi - 1;
    (lo, hi, (v - axis[lo]) / (axis[hi] - axis[lo]))
}

// ── Boat class ────────────────────────────────────────────────────────────────

fn default_upwind() -> f64 {
    45.0
}

fn default_downwind() -> f64 {
    150.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoatClass {
    /// Close-hauled angle off the wind, degrees.
    #[serde(default = "default_upwind")]
    pub upwind_relative: f64,
    /// Best running angle off the wind, degrees.
    #[serde(default = "default_downwind")]
    pub downwind_relative: f64,
    #[serde(default)]
    pub polar: PolarTable,
}

impl Default for BoatClass {
    fn default() -> Self {
        Self { upwind_relative: default_upwind(), downwind_relative: default_downwind(), polar: PolarTable::default() }
    }
}

impl BoatClass {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = 0.0 < self.upwind_relative
            && self.upwind_relative < 90.0
            && 90.0 < self.downwind_relative
            && self.downwind_relative < 180.0;
        if !ok {
            return Err(ConfigError::InvalidPolar {
                reason: format!(
                    "upwind/downwind angles {}/{} out of range",
                    self.upwind_relative, self.downwind_relative
                ),
            });
        }
        self.polar.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_points_are_exact() {
        let p = PolarTable::default();
        assert_eq!(p.speed(45.0, 12.0), 5.0);
        assert_eq!(p.speed(-45.0, 12.0), 5.0);
        assert_eq!(p.speed(150.0, 20.0), 8.0);
        assert_eq!(p.speed(0.0, 12.0), 0.0);
    }

    #[test]
    fn bilinear_between_rows_and_columns() {
        let p = PolarTable::default();
        // halfway 6..12 kn at 45°: (3.5 + 5.0) / 2
        assert!((p.speed(45.0, 9.0) - 4.25).abs() < 1e-12);
        // 75° at 12 kn: halfway 5.6..6.0
        assert!((p.speed(75.0, 12.0) - 5.8).abs() < 1e-12);
    }

    #[test]
    fn clamps_outside_table() {
        let p = PolarTable::default();
        assert_eq!(p.speed(90.0, 35.0), 7.0);
        assert_eq!(p.speed(90.0, -3.0), 0.0);
        assert_eq!(p.speed(200.0, 12.0), 5.2);
    }

    #[test]
    fn malformed_tables_are_rejected() {
        let mut p = PolarTable::default();
        p.speeds[2].pop();
        assert!(matches!(p.validate(), Err(ConfigError::InvalidPolar { .. })));

        let mut q = PolarTable::default();
        q.twa.swap(1, 2);
        assert!(q.validate().is_err());

        let class = BoatClass { upwind_relative: 95.0, ..Default::default() };
        assert!(class.validate().is_err());
        assert!(BoatClass::default().validate().is_ok());
    }
}
