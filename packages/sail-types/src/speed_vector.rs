//! speed_vector.rs — Polar speed vectors (speed + direction)
//!
//! Addition and subtraction go through Cartesian components using the
//! compass convention: x = speed·sin(direction) (east), y = speed·cos(direction)
//! (north). Speed is never negative; a negative scale flips the direction.

use serde::{Deserialize, Serialize};

use crate::angle::Angle;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpeedVector {
    speed: f64,
    direction: Angle,
}

impl SpeedVector {
    pub fn new(speed: f64, direction: Angle) -> Self {
        if speed < 0.0 {
            Self { speed: -speed, direction: direction.reciprocal() }
        } else {
            Self { speed, direction }
        }
    }

    pub fn zero() -> Self {
        Self { speed: 0.0, direction: Angle::ZERO }
    }

    /// Build from east (x) and north (y) components.
    pub fn from_components(x: f64, y: f64) -> Self {
        let speed = x.hypot(y);
        if speed == 0.0 {
            return Self::zero();
        }
        Self { speed, direction: Angle::from_radians(x.atan2(y)) }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn direction(&self) -> Angle {
        self.direction
    }

    /// East component.
    pub fn x(&self) -> f64 {
        self.speed * self.direction.radians().sin()
    }

    /// North component.
    pub fn y(&self) -> f64 {
        self.speed * self.direction.radians().cos()
    }

    pub fn plus(&self, other: &SpeedVector) -> SpeedVector {
        SpeedVector::from_components(self.x() + other.x(), self.y() + other.y())
    }

    pub fn sub(&self, other: &SpeedVector) -> SpeedVector {
        SpeedVector::from_components(self.x() - other.x(), self.y() - other.y())
    }

    pub fn scale(&self, factor: f64) -> SpeedVector {
        SpeedVector::new(self.speed * factor, self.direction)
    }

    /// Same speed, direction rotated by `offset`.
    pub fn rotate(&self, offset: Angle) -> SpeedVector {
        SpeedVector { speed: self.speed, direction: self.direction + offset }
    }

    /// Signed difference `self.direction - other.direction`.
    pub fn degrees_diff(&self, other: &SpeedVector) -> Angle {
        self.direction.diff(other.direction)
    }

    /// Signed difference `self.direction - angle`.
    pub fn degrees_diff_angle(&self, angle: Angle) -> Angle {
        self.direction.diff(angle)
    }

    pub fn is_finite(&self) -> bool {
        self.speed.is_finite() && self.direction.degrees().is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_through_components() {
        let v = SpeedVector::new(100.0, Angle::new(0.0)).plus(&SpeedVector::new(100.0, Angle::new(90.0)));
        assert!((v.speed() - 100.0 * 2f64.sqrt()).abs() < 1e-7);
        assert!((v.direction().degrees() - 45.0).abs() < 1e-7);
    }

    #[test]
    fn sub_opposite_doubles() {
        let v = SpeedVector::new(100.0, Angle::new(0.0)).sub(&SpeedVector::new(100.0, Angle::new(180.0)));
        assert!((v.speed() - 200.0).abs() < 1e-7);
        assert!(v.direction().abs_diff(Angle::ZERO) < 1e-7);
    }

    #[test]
    fn negative_scale_flips_direction() {
        let v = SpeedVector::new(4.0, Angle::new(30.0)).scale(-0.5);
        assert!((v.speed() - 2.0).abs() < 1e-12);
        assert!((v.direction().degrees() - -150.0).abs() < 1e-12);
    }

    #[test]
    fn cancelling_vectors_have_zero_speed() {
        let a = SpeedVector::new(3.0, Angle::new(10.0));
        let v = a.sub(&a);
        assert!(v.speed() < 1e-12);
        assert!(v.speed() >= 0.0);
    }

    #[test]
    fn direction_difference() {
        let a = SpeedVector::new(1.0, Angle::new(10.0));
        let b = SpeedVector::new(5.0, Angle::new(350.0));
        assert!((a.degrees_diff(&b).degrees() - 20.0).abs() < 1e-12);
        assert!((b.degrees_diff_angle(Angle::new(20.0)).degrees() - -30.0).abs() < 1e-12);
    }
}
