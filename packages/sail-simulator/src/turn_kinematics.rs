//! turn_kinematics.rs — Heading changes as speed-dependent arcs
//!
//! A turn is fixed when it starts: archetype, radius, per-second rotation and
//! duration are all derived from the heading, target, direction, boat speed
//! and local wind at that moment. Each simulated second the boat rotates one
//! step and moves along the chord of that step, so every vertex lies on the
//! arc. Water drift is the caller's business.

use sail_types::{Angle, Location, TurnDirection, KNOTS_TO_METRES_PER_SECOND};
use serde::{Deserialize, Serialize};

/// Sweeps smaller than this are treated as no turn at all.
const DEGENERATE_SWEEP: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Tack,
    Gybe,
    BearAway,
    LuffUp,
}

/// Radius model: `radius = max(v - speed_loss, 0)² / grip` metres, `v` in knots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnProfile {
    pub speed_loss: f64,
    pub grip: f64,
    pub min_duration: u32,
}

impl TurnKind {
    pub fn profile(self) -> TurnProfile {
        match self {
            TurnKind::Tack => TurnProfile { speed_loss: 0.4, grip: 97.65, min_duration: 2 },
            TurnKind::Gybe => TurnProfile { speed_loss: 0.0, grip: 65.0, min_duration: 2 },
            TurnKind::BearAway => TurnProfile { speed_loss: 0.0, grip: 75.0, min_duration: 1 },
            TurnKind::LuffUp => TurnProfile { speed_loss: 0.6, grip: 80.0, min_duration: 1 },
        }
    }

    /// Archetype of turning `direction` from `from` to `to` with the wind
    /// coming from `wind`.
    pub fn classify(from: Angle, to: Angle, direction: TurnDirection, wind: Angle) -> TurnKind {
        let sweep = direction.sweep(from, to);
        let passes = |through: Angle| {
            let s = direction.sweep(from, through);
            s > 0.0 && s <= sweep
        };
        if passes(wind) {
            TurnKind::Tack
        } else if passes(wind.reciprocal()) {
            TurnKind::Gybe
        } else if to.abs_diff(wind) < from.abs_diff(wind) {
            TurnKind::LuffUp
        } else {
            TurnKind::BearAway
        }
    }
}

impl TurnProfile {
    /// Boat speed through the turn, knots.
    pub fn turn_speed(&self, knots: f64) -> f64 {
        (knots - self.speed_loss).max(0.0)
    }

    pub fn radius(&self, knots: f64) -> f64 {
        self.turn_speed(knots).powi(2) / self.grip
    }
}

/// Heading and location after one second of turning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnStep {
    pub heading: Angle,
    pub location: Location,
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct Turn {
    kind: TurnKind,
    direction: TurnDirection,
    target: Angle,
    radius: f64,
    /// Degrees per second, unsigned.
    step: f64,
    duration: u32,
    elapsed: u32,
}

impl Turn {
    pub fn start(
        heading: Angle,
        target: Angle,
        direction: TurnDirection,
        knots: f64,
        wind: Angle,
    ) -> Self {
        let kind = TurnKind::classify(heading, target, direction, wind);
        let profile = kind.profile();
        let sweep = direction.sweep(heading, target);

        if sweep < DEGENERATE_SWEEP {
            return Self { kind, direction, target, radius: 0.0, step: 0.0, duration: 0, elapsed: 0 };
        }

        let radius = profile.radius(knots);
        let per_second = profile.turn_speed(knots) * KNOTS_TO_METRES_PER_SECOND;
        let arc = radius * sweep.to_radians();
        let needed = if per_second > 0.0 { (arc / per_second).ceil() as u32 } else { 0 };
        let duration = needed.max(profile.min_duration);

        Self { kind, direction, target, radius, step: sweep / f64::from(duration), duration, elapsed: 0 }
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    pub fn direction(&self) -> TurnDirection {
        self.direction
    }

    pub fn target(&self) -> Angle {
        self.target
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whole seconds the turn takes.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance one second from `heading` at `location`.
    pub fn advance(&mut self, heading: Angle, location: Location) -> TurnStep {
        if self.is_complete() {
            return TurnStep { heading, location, complete: true };
        }
        let signed = self.direction.sign() * self.step;
        let chord = 2.0 * self.radius * (self.step / 2.0).to_radians().sin();
        let location = location.moved(chord, heading + signed / 2.0);
        self.elapsed += 1;
        TurnStep { heading: heading + signed, location, complete: self.is_complete() }
    }
}
