//! course.rs — Marks, legs and rounding geometry
//!
//! Leg `n` runs from the previous mark (or the course start for leg 0) to
//! mark `n`. A boat whose leg index equals the number of marks has finished.

use sail_types::{Angle, Location, TurnDirection};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::polar::BoatClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// Mark left to port: the boat turns anticlockwise around it.
    Port,
    Starboard,
}

impl Rounding {
    pub fn turn_direction(self) -> TurnDirection {
        match self {
            Rounding::Port => TurnDirection::Port,
            Rounding::Starboard => TurnDirection::Starboard,
        }
    }
}

/// Corridor either side of the wind axis through a windward mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpwindChannel {
    pub inner_offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub name: String,
    pub location: Location,
    pub rounding: Rounding,
    /// Rounding trigger radius, metres.
    pub zone: f64,
    pub upwind_channel: Option<UpwindChannel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegKind {
    Upwind,
    Reach,
    Downwind,
}

/// Classify a leg bearing against the wind it is sailed in.
pub fn classify_leg(bearing: Angle, wind: Angle, class: &BoatClass) -> LegKind {
    let off = bearing.abs_diff(wind);
    if off < class.upwind_relative {
        LegKind::Upwind
    } else if off > class.downwind_relative {
        LegKind::Downwind
    } else {
        LegKind::Reach
    }
}

#[derive(Debug, Clone)]
pub struct Course {
    pub start: Location,
    pub marks: Vec<Mark>,
}

impl Course {
    pub fn new(start: Location, marks: Vec<Mark>) -> Result<Self, ConfigError> {
        if marks.is_empty() {
            return Err(ConfigError::EmptyCourse);
        }
        Ok(Self { start, marks })
    }

    pub fn leg_count(&self) -> usize {
        self.marks.len()
    }

    pub fn mark(&self, leg: usize) -> Option<&Mark> {
        self.marks.get(leg)
    }

    /// Where leg `leg` starts.
    pub fn leg_origin(&self, leg: usize) -> Location {
        match leg {
            0 => self.start,
            n => self.marks.get(n - 1).map_or(self.start, |m| m.location),
        }
    }

    pub fn leg_bearing(&self, leg: usize) -> Option<Angle> {
        let mark = self.mark(leg)?;
        Some(self.leg_origin(leg).to(&mark.location).bearing)
    }

    pub fn leg_kind(&self, leg: usize, mean_wind: Angle, class: &BoatClass) -> Option<LegKind> {
        self.leg_bearing(leg).map(|b| classify_leg(b, mean_wind, class))
    }

    /// Heading to take after rounding the mark of `leg`, turning the
    /// rounding side's way from `heading`. `None` when `leg` is the last.
    pub fn rounding_heading(
        &self,
        leg: usize,
        heading: Angle,
        wind: Angle,
        mean_wind: Angle,
        class: &BoatClass,
    ) -> Option<Angle> {
        let mark = self.mark(leg)?;
        let next = self.mark(leg + 1)?;
        let direction = mark.rounding.turn_direction();
        let first_met = |off: f64| {
            let a = wind - off;
            let b = wind + off;
            if direction.sweep(heading, a) <= direction.sweep(heading, b) {
                a
            } else {
                b
            }
        };
        Some(match self.leg_kind(leg + 1, mean_wind, class)? {
            LegKind::Upwind => first_met(class.upwind_relative),
            LegKind::Downwind => first_met(class.downwind_relative),
            LegKind::Reach => mark.location.to(&next.location).bearing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(name: &str, x: f64, y: f64) -> Mark {
        Mark { name: name.into(), location: Location::new(x, y), rounding: Rounding::Port, zone: 5.0, upwind_channel: None }
    }

    fn windward_leeward() -> Course {
        Course::new(
            Location::new(0.0, 0.0),
            vec![mark("windward", 0.0, 500.0), mark("leeward", 0.0, 0.0), mark("reach", 400.0, 100.0)],
        )
        .unwrap()
    }

    #[test]
    fn legs_classified_against_mean_wind() {
        let c = windward_leeward();
        let class = BoatClass::default();
        let north = Angle::ZERO;
        assert_eq!(c.leg_kind(0, north, &class), Some(LegKind::Upwind));
        assert_eq!(c.leg_kind(1, north, &class), Some(LegKind::Downwind));
        assert_eq!(c.leg_kind(2, north, &class), Some(LegKind::Reach));
        assert_eq!(c.leg_kind(3, north, &class), None);
        assert_eq!(c.leg_origin(2), Location::new(0.0, 0.0));
    }

    #[test]
    fn windward_rounding_bears_away_to_nearest_gybe() {
        let c = windward_leeward();
        let class = BoatClass::default();
        let heading = Angle::new(-45.0);
        let h = c.rounding_heading(0, heading, Angle::ZERO, Angle::ZERO, &class).unwrap();
        assert!((h.degrees() - -150.0).abs() < 1e-9);
    }

    #[test]
    fn leeward_rounding_heads_up_to_first_close_hauled() {
        let mut c = windward_leeward();
        let class = BoatClass::default();
        c.marks[1].location = Location::new(0.0, 0.0);
        c.marks[2] = mark("windward 2", 0.0, 500.0);
        // running on port gybe toward the leeward mark, port rounding turns anticlockwise
        let h = c.rounding_heading(1, Angle::new(150.0), Angle::ZERO, Angle::ZERO, &class).unwrap();
        assert!((h.degrees() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn reach_rounding_points_at_next_mark() {
        let c = windward_leeward();
        let h = c.rounding_heading(1, Angle::new(180.0), Angle::ZERO, Angle::ZERO, &BoatClass::default()).unwrap();
        assert!((h.degrees() - 75.963_756_532_073_53).abs() < 1e-9);
        assert!(c.rounding_heading(2, Angle::ZERO, Angle::ZERO, Angle::ZERO, &BoatClass::default()).is_none());
    }

    #[test]
    fn empty_course_is_rejected() {
        assert!(matches!(Course::new(Location::default(), vec![]), Err(ConfigError::EmptyCourse)));
    }
}
