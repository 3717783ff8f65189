//! location.rs — Scenario-local positions (metres, x = east, y = north)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::angle::Angle;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

/// Distance and bearing from one location to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistancePolar {
    pub distance: f64,
    pub bearing: Angle,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Location) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Distance and compass bearing from `self` to `other`.
    pub fn to(&self, other: &Location) -> DistancePolar {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        DistancePolar {
            distance: dx.hypot(dy),
            bearing: Angle::from_radians(dx.atan2(dy)),
        }
    }

    /// New location `distance` metres away along `bearing`.
    pub fn moved(&self, distance: f64, bearing: Angle) -> Location {
        let r = bearing.radians();
        Location::new(self.x + distance * r.sin(), self.y + distance * r.cos())
    }

    /// Shift in place by east/north deltas.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_and_distance() {
        let p = Location::new(12.1, 52.1);
        let d = p.to(&Location::new(0.0, 64.2));
        assert!((d.distance - 12.1 * 2f64.sqrt()).abs() < 1e-9);
        assert!((d.bearing.bearing() - 315.0).abs() < 1e-9);
    }

    #[test]
    fn moved_then_measured_back() {
        let p = Location::new(3.0, 4.0);
        let q = p.moved(10.0, Angle::new(90.0));
        assert!((q.x - 13.0).abs() < 1e-12);
        assert!((q.y - 4.0).abs() < 1e-9);
        assert!((p.distance_to(&q) - 10.0).abs() < 1e-9);
    }
}
