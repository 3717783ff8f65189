//! angle.rs — Normalized bearing arithmetic
//!
//! Every `Angle` holds degrees in the half-open range `[-180, 180)`. The
//! range is enforced on construction and after every arithmetic operation,
//! so callers never see an un-normalized value.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A bearing or relative angle in degrees, normalized to `[-180, 180)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Angle(f64);

/// Fold any finite degree value into `[-180, 180)`.
///
/// Values already in range are returned untouched so that
/// `normalize(normalize(a)) == normalize(a)` holds bit for bit.
pub fn normalize(degrees: f64) -> f64 {
    if (-180.0..180.0).contains(&degrees) {
        return degrees;
    }
    let folded = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid may round up to the divisor for tiny negative inputs
    if folded >= 180.0 {
        folded - 360.0
    } else {
        folded
    }
}

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn new(degrees: f64) -> Self {
        Self(normalize(degrees))
    }

    pub fn from_radians(radians: f64) -> Self {
        Self::new(radians.to_degrees())
    }

    /// Degrees in `[-180, 180)`.
    pub fn degrees(self) -> f64 {
        self.0
    }

    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    /// Compass bearing in `[0, 360)`.
    pub fn bearing(self) -> f64 {
        let b = if self.0 < 0.0 { self.0 + 360.0 } else { self.0 };
        if b >= 360.0 {
            0.0
        } else {
            b
        }
    }

    /// Signed shortest-path difference `self - reference`, itself normalized.
    /// Positive means `self` lies clockwise (to the right) of `reference`.
    pub fn diff(self, reference: Angle) -> Angle {
        Angle::new(self.0 - reference.0)
    }

    /// Magnitude of the shortest-path difference, in `[0, 180]`.
    pub fn abs_diff(self, other: Angle) -> f64 {
        self.diff(other).0.abs()
    }

    /// True when `self` is clockwise of `reference` by the shortest path.
    pub fn is_right_of(self, reference: Angle) -> bool {
        self.diff(reference).0 > 0.0
    }

    /// True when `self` is anticlockwise of `reference` by the shortest path.
    pub fn is_left_of(self, reference: Angle) -> bool {
        self.diff(reference).0 < 0.0
    }

    /// The opposite bearing.
    pub fn reciprocal(self) -> Angle {
        Angle::new(self.0 + 180.0)
    }
}

impl From<f64> for Angle {
    fn from(degrees: f64) -> Self {
        Angle::new(degrees)
    }
}

impl From<Angle> for f64 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle::new(self.0 + rhs.0)
    }
}

impl Add<f64> for Angle {
    type Output = Angle;
    fn add(self, rhs: f64) -> Angle {
        Angle::new(self.0 + rhs)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle::new(self.0 - rhs.0)
    }
}

impl Sub<f64> for Angle {
    type Output = Angle;
    fn sub(self, rhs: f64) -> Angle {
        Angle::new(self.0 - rhs)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle::new(-self.0)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.bearing().round() as u32 % 360;
        write!(f, "{whole}°")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 12] = [
        0.0, 12.34, -12.34, 179.9, -180.0, 180.0, 270.0, -270.0, 359.5, 725.0, -1085.25, 1e-17,
    ];

    #[test]
    fn normalized_range_is_half_open() {
        for &a in &SAMPLES {
            let n = Angle::new(a).degrees();
            assert!((-180.0..180.0).contains(&n), "{a} -> {n}");
        }
        assert_eq!(Angle::new(180.0).degrees(), -180.0);
        assert_eq!(Angle::new(-180.0).degrees(), -180.0);
    }

    #[test]
    fn normalize_is_idempotent() {
        for &a in &SAMPLES {
            let once = normalize(a);
            assert_eq!(normalize(once), once);
        }
    }

    #[test]
    fn full_turn_is_invisible() {
        for &a in &SAMPLES {
            let diff = Angle::new(a + 360.0).abs_diff(Angle::new(a));
            assert!(diff < 1e-9, "{a}: {diff}");
        }
    }

    #[test]
    fn shortest_path_difference() {
        let a = Angle::new(170.0);
        let b = Angle::new(-170.0);
        assert!((a.diff(b).degrees() - -20.0).abs() < 1e-12);
        assert!((b.diff(a).degrees() - 20.0).abs() < 1e-12);
        assert!((a.abs_diff(b) - 20.0).abs() < 1e-12);
        for &x in &SAMPLES {
            for &y in &SAMPLES {
                assert!(Angle::new(x).abs_diff(Angle::new(y)) <= 180.0);
            }
        }
    }

    #[test]
    fn relative_comparisons() {
        let heading = Angle::new(350.0);
        assert!(Angle::new(5.0).is_right_of(heading));
        assert!(Angle::new(340.0).is_left_of(heading));
        assert!(!heading.is_left_of(heading));
    }

    #[test]
    fn arithmetic_stays_normalized() {
        let a = Angle::new(150.0) + Angle::new(60.0);
        assert!((a.degrees() - -150.0).abs() < 1e-12);
        let b = Angle::new(-150.0) - 60.0;
        assert!((b.degrees() - 150.0).abs() < 1e-12);
        assert_eq!((-Angle::new(-180.0)).degrees(), -180.0);
        assert!((Angle::new(45.0).reciprocal().degrees() - -135.0).abs() < 1e-12);
    }

    #[test]
    fn bearing_display() {
        assert_eq!(Angle::new(-45.0).to_string(), "315°");
        assert_eq!(Angle::new(-0.2).to_string(), "0°");
        assert!((Angle::new(-90.0).bearing() - 270.0).abs() < 1e-12);
    }
}
