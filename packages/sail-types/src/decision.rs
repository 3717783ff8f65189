//! decision.rs — Per-tick tactical decisions
//!
//! A boat produces exactly one `Decision` per evaluated second. Importance is a
//! logging hint only: it never changes which rule controls the boat.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::angle::Angle;

/// Direction of a heading change: Port = anticlockwise, Starboard = clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnDirection {
    Port,
    Starboard,
}

impl TurnDirection {
    /// +1 for clockwise, -1 for anticlockwise.
    pub fn sign(self) -> f64 {
        match self {
            TurnDirection::Port => -1.0,
            TurnDirection::Starboard => 1.0,
        }
    }

    /// The shortest way round from `from` to `to`. A half-turn goes to port.
    pub fn shortest(from: Angle, to: Angle) -> Self {
        if to.diff(from).degrees() > 0.0 {
            TurnDirection::Starboard
        } else {
            TurnDirection::Port
        }
    }

    /// Degrees swept turning this way from `from` to `to`, in `[0, 360)`.
    pub fn sweep(self, from: Angle, to: Angle) -> f64 {
        let clockwise = to.diff(from).bearing();
        match self {
            TurnDirection::Starboard => clockwise,
            TurnDirection::Port => {
                if clockwise == 0.0 {
                    0.0
                } else {
                    360.0 - clockwise
                }
            }
        }
    }
}

impl fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnDirection::Port => f.write_str("PORT"),
            TurnDirection::Starboard => f.write_str("STARBOARD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Importance {
    Major,
    Minor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    SailOn {
        reason: String,
    },
    Turn {
        target: Angle,
        direction: TurnDirection,
        importance: Importance,
        reason: String,
    },
    MarkRounding {
        target: Angle,
        direction: TurnDirection,
        mark: String,
        reason: String,
    },
}

impl Decision {
    pub fn sail_on(reason: impl Into<String>) -> Self {
        Decision::SailOn { reason: reason.into() }
    }

    pub fn turn(
        target: Angle,
        direction: TurnDirection,
        importance: Importance,
        reason: impl Into<String>,
    ) -> Self {
        Decision::Turn { target, direction, importance, reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        match self {
            Decision::SailOn { reason }
            | Decision::Turn { reason, .. }
            | Decision::MarkRounding { reason, .. } => reason,
        }
    }

    /// Heading and direction to hand to turn kinematics, if any.
    pub fn turn_target(&self) -> Option<(Angle, TurnDirection)> {
        match self {
            Decision::SailOn { .. } => None,
            Decision::Turn { target, direction, .. }
            | Decision::MarkRounding { target, direction, .. } => Some((*target, *direction)),
        }
    }

    /// Roundings always surface; SAILON never does.
    pub fn importance(&self) -> Importance {
        match self {
            Decision::SailOn { .. } => Importance::Minor,
            Decision::Turn { importance, .. } => *importance,
            Decision::MarkRounding { .. } => Importance::Major,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::SailOn { .. } => f.write_str("SAILON"),
            Decision::Turn { target, direction, .. } => write!(f, "TURN to {target} {direction}"),
            Decision::MarkRounding { target, direction, mark, .. } => {
                write!(f, "MARKROUNDING {mark} to {target} {direction}")
            }
        }
    }
}
