//! # sail-simulator
//!
//! Dinghy racing training simulator. Boats sail a course of marks through
//! spatially varying wind and water; a rule-based tactics engine decides when
//! to tack, gybe, luff, bear away or round, and turns are executed as
//! speed-dependent arcs.
//!
//! Layering, leaf first:
//! - `area`, `polar`, `course`: static geometry and boat performance
//! - `flow_shifts`, `flow_field`: wind and water, sampled anywhere on the area
//! - `boat_sim`, `turn_kinematics`, `tactics`: per-boat state and behaviour
//! - `simulation`: one session advanced a second at a time into a `LogSink`
//! - `clock`: tokio driver that runs batches of seconds on a shared session
//! - `config`, `scenarios`: scenario.toml loading and built-in presets

pub mod area;
pub mod boat_sim;
pub mod clock;
pub mod config;
pub mod course;
pub mod error;
pub mod flow_field;
pub mod flow_shifts;
pub mod log_sink;
pub mod polar;
pub mod scenarios;
pub mod simulation;
pub mod tactics;
pub mod turn_kinematics;

pub use boat_sim::{Boat, TacticalFlags};
pub use clock::{ClockConfig, ClockStatus, ErrorPolicy, SimulationClock};
pub use config::{Scenario, ScenarioFile, SimulationSettings};
pub use error::{ConfigError, SimError};
pub use flow_field::FlowField;
pub use log_sink::{JsonLinesSink, LogSink, MajorOnly, MemoryLog, TracingSink};
pub use simulation::Simulation;
