//! # sail-types
//!
//! Shared sailing primitives and event structures for the race training
//! simulator.
//!
//! These types are used by:
//! - `sail-simulator`: flow sampling, tactics, turn kinematics, the clock
//! - log sinks and host applications: consuming positions, decisions and
//!   flow-shift events without calling back into the core
//!
//! ## Conventions
//!
//! - **Angles**: degrees, always normalized to `[-180, 180)`. Bearings are
//!   compass style (0 = north, 90 = east) and rendered `[0, 360)` for display.
//! - **Locations**: scenario-local metres, x = east, y = north.
//! - **Flow direction**: the bearing a flow comes *from* (wind convention).
//! - **Speeds**: knots for wind and boat polars; metres for distances.

pub mod angle;
pub mod decision;
pub mod events;
pub mod location;
pub mod speed_vector;

pub use angle::Angle;
pub use decision::{Decision, Importance, TurnDirection};
pub use events::LogEvent;
pub use location::{DistancePolar, Location};
pub use speed_vector::SpeedVector;

/// Metres travelled in one second at one knot.
pub const KNOTS_TO_METRES_PER_SECOND: f64 = 0.514_444;
