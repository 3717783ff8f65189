//! boat_sim.rs — Boat state and straight-line motion
//!
//! A boat is either sailing straight (speed from the class polar, plus water
//! drift) or executing a manoeuvre handed over by the tactics engine. While a
//! manoeuvre is in progress the tactics engine is not consulted.

use std::collections::VecDeque;

use sail_types::{Angle, Location, SpeedVector, KNOTS_TO_METRES_PER_SECOND};
use serde::{Deserialize, Serialize};

use crate::polar::BoatClass;
use crate::turn_kinematics::Turn;

// ── Tactical flags ────────────────────────────────────────────────────────────

/// Per-boat tactical behaviour switches. All off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalFlags {
    pub upwind_sail_on_best_tack: bool,
    pub upwind_tack_if_headed: bool,
    pub upwind_bear_away_if_headed: bool,
    pub upwind_luff_up_if_lifted: bool,
    pub downwind_sail_on_best_gybe: bool,
    pub downwind_gybe_if_lifted: bool,
    pub downwind_luff_up_if_lifted: bool,
    pub downwind_bear_away_if_headed: bool,
}

// ── Boat state ────────────────────────────────────────────────────────────────

/// A turn in progress. Rounding turns move the boat to its next leg when done.
#[derive(Debug, Clone)]
pub struct Manoeuvre {
    pub turn: Turn,
    pub rounding: bool,
}

#[derive(Debug, Clone)]
pub struct Boat {
    pub name: String,
    pub location: Location,
    pub heading: Angle,
    /// Index of the mark being sailed to.
    pub leg: usize,
    pub flags: TacticalFlags,
    pub manoeuvre: Option<Manoeuvre>,
    track: VecDeque<Location>,
    track_length: usize,
}

impl Boat {
    pub fn new(name: impl Into<String>, location: Location, heading: Angle) -> Self {
        Self {
            name: name.into(),
            location,
            heading,
            leg: 0,
            flags: TacticalFlags::default(),
            manoeuvre: None,
            track: VecDeque::new(),
            track_length: 0,
        }
    }

    pub fn with_leg(mut self, leg: usize) -> Self {
        self.leg = leg;
        self
    }

    pub fn with_flags(mut self, flags: TacticalFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Keep up to `len` past positions (0 disables the track).
    pub fn with_track_length(mut self, len: usize) -> Self {
        self.track_length = len;
        self.track.truncate(len);
        self
    }

    pub fn is_turning(&self) -> bool {
        self.manoeuvre.is_some()
    }

    /// Oldest first.
    pub fn track(&self) -> impl Iterator<Item = &Location> {
        self.track.iter()
    }

    /// Signed wind angle relative to the heading; positive is wind over the
    /// starboard side.
    pub fn relative_wind(&self, wind: &SpeedVector) -> Angle {
        wind.direction() - self.heading
    }

    /// Speed through the water, knots.
    pub fn speed_knots(&self, wind: &SpeedVector, class: &BoatClass) -> f64 {
        class.polar.speed(self.relative_wind(wind).degrees().abs(), wind.speed())
    }

    /// Metres travelled through the water in one second on the current heading.
    pub fn metres_per_second(&self, wind: &SpeedVector, class: &BoatClass) -> f64 {
        self.speed_knots(wind, class) * KNOTS_TO_METRES_PER_SECOND
    }

    /// One second of straight-line sailing.
    pub fn sail_straight(&mut self, wind: &SpeedVector, class: &BoatClass) {
        let distance = self.metres_per_second(wind, class);
        let next = self.location.moved(distance, self.heading);
        self.move_to(next);
    }

    /// Water moves the boat along the reciprocal of the direction it comes from.
    pub fn drift(&mut self, water: &SpeedVector) {
        if water.speed() > 0.0 {
            let metres = water.speed() * KNOTS_TO_METRES_PER_SECOND;
            let bearing = water.direction().reciprocal();
            let r = bearing.radians();
            self.location.translate(metres * r.sin(), metres * r.cos());
        }
    }

    /// Record the current location in the track, then relocate.
    pub fn move_to(&mut self, next: Location) {
        if self.track_length > 0 {
            if self.track.len() == self.track_length {
                self.track.pop_front();
            }
            self.track.push_back(self.location);
        }
        self.location = next;
    }
}
