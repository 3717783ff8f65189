//! events.rs — Log events produced by the simulation core
//!
//! Events are appended to a sink in the order they are produced. Sinks own
//! formatting and display; they never call back into the core.

use serde::{Deserialize, Serialize};

use crate::angle::Angle;
use crate::decision::{Decision, Importance};
use crate::location::Location;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    BoatPosition {
        second: u64,
        boat: String,
        location: Location,
        heading: Angle,
    },
    Decision {
        second: u64,
        boat: String,
        decision: Decision,
        reason: String,
    },
    FlowShift {
        second: u64,
        /// "wind" or "water"
        field: String,
        mean_direction: Angle,
    },
}

impl LogEvent {
    pub fn second(&self) -> u64 {
        match self {
            LogEvent::BoatPosition { second, .. }
            | LogEvent::Decision { second, .. }
            | LogEvent::FlowShift { second, .. } => *second,
        }
    }

    /// Whether a filtered log should surface this event.
    pub fn is_major(&self) -> bool {
        match self {
            LogEvent::BoatPosition { .. } => false,
            LogEvent::Decision { decision, .. } => decision.importance() == Importance::Major,
            LogEvent::FlowShift { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::TurnDirection;

    #[test]
    fn filtering_hint() {
        let pos = LogEvent::BoatPosition {
            second: 3,
            boat: "Laser 1".into(),
            location: Location::new(1.0, 2.0),
            heading: Angle::new(45.0),
        };
        assert!(!pos.is_major());
        assert_eq!(pos.second(), 3);

        let luff = Decision::turn(Angle::new(10.0), TurnDirection::Starboard, Importance::Minor, "luff up");
        let minor = LogEvent::Decision { second: 4, boat: "Laser 1".into(), reason: luff.reason().into(), decision: luff };
        assert!(!minor.is_major());

        let shift = LogEvent::FlowShift { second: 5, field: "wind".into(), mean_direction: Angle::new(5.0) };
        assert!(shift.is_major());
    }

    #[test]
    fn json_shape() {
        let shift = LogEvent::FlowShift { second: 60, field: "wind".into(), mean_direction: Angle::new(-10.0) };
        let json = serde_json::to_value(&shift).unwrap();
        assert_eq!(json["type"], "flow_shift");
        assert_eq!(json["mean_direction"], -10.0);
    }
}
