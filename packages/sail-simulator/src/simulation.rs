//! simulation.rs — One simulation session, advanced a second at a time
//!
//! Per simulated second:
//! 1. advance wind and water, logging a flow shift when a mean moves enough
//! 2. for each boat in order: continue its turn, or ask tactics and either
//!    start a turn or sail straight; then apply water drift
//! 3. log the decision (if tactics was asked) and the new position
//!
//! Events already logged are never rolled back: a failing second leaves
//! everything before the failing boat in place.

use sail_types::{Decision, LogEvent};
use tracing::debug;

use crate::boat_sim::{Boat, Manoeuvre};
use crate::config::Scenario;
use crate::error::SimError;
use crate::flow_field::FlowField;
use crate::log_sink::LogSink;
use crate::tactics::{self, TacticsContext};
use crate::turn_kinematics::Turn;

pub struct Simulation {
    scenario: Scenario,
    wind: FlowField,
    water: FlowField,
    boats: Vec<Boat>,
    second: u64,
    sink: Box<dyn LogSink>,
}

impl Simulation {
    pub fn new(scenario: Scenario, sink: Box<dyn LogSink>) -> Self {
        Self {
            wind: scenario.wind.clone(),
            water: scenario.water.clone(),
            boats: scenario.boats.clone(),
            scenario,
            second: 0,
            sink,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Simulated seconds since the start (or last reset).
    pub fn second(&self) -> u64 {
        self.second
    }

    pub fn boats(&self) -> &[Boat] {
        &self.boats
    }

    pub fn wind(&self) -> &FlowField {
        &self.wind
    }

    pub fn water(&self) -> &FlowField {
        &self.water
    }

    /// Every boat has rounded its last mark.
    pub fn all_finished(&self) -> bool {
        let legs = self.scenario.course.leg_count();
        self.boats.iter().all(|b| b.leg >= legs && !b.is_turning())
    }

    /// Back to the scenario's starting state with an empty log.
    pub fn reset(&mut self) {
        self.wind = self.scenario.wind.clone();
        self.water = self.scenario.water.clone();
        self.boats = self.scenario.boats.clone();
        self.second = 0;
        self.sink.clear();
    }

    /// Run `seconds` consecutive seconds, stopping at the first failure.
    /// Returns the simulated second reached.
    pub fn run_batch(&mut self, seconds: u32) -> Result<u64, SimError> {
        for _ in 0..seconds {
            self.step()?;
        }
        Ok(self.second)
    }

    /// Advance exactly one simulated second.
    pub fn step(&mut self) -> Result<(), SimError> {
        self.second += 1;
        let second = self.second;
        let Self { scenario, wind, water, boats, sink, .. } = self;

        for field in [&mut *wind, &mut *water] {
            if let Some(mean_direction) = field.advance(second) {
                sink.record(&LogEvent::FlowShift { second, field: field.name().to_string(), mean_direction });
            }
        }

        for boat in boats.iter_mut() {
            let local_wind = wind.sample(&boat.location);
            let local_water = water.sample(&boat.location);

            if boat.manoeuvre.is_none() {
                let ctx = TacticsContext {
                    wind: local_wind,
                    mean_wind: wind.mean_direction(),
                    course: &scenario.course,
                    class: &scenario.class,
                    second,
                };
                let decision = tactics::decide(boat, &ctx)?;
                if let Some((target, direction)) = decision.turn_target() {
                    let knots = boat.speed_knots(&local_wind, &scenario.class);
                    let turn = Turn::start(boat.heading, target, direction, knots, local_wind.direction());
                    debug!("{} starts {:?} over {}s, r={:.2}m", boat.name, turn.kind(), turn.duration(), turn.radius());
                    let rounding = matches!(decision, Decision::MarkRounding { .. });
                    boat.manoeuvre = Some(Manoeuvre { turn, rounding });
                }
                sink.record(&LogEvent::Decision {
                    second,
                    boat: boat.name.clone(),
                    reason: decision.reason().to_string(),
                    decision,
                });
            }

            let turned = boat
                .manoeuvre
                .as_mut()
                .map(|m| (m.turn.advance(boat.heading, boat.location), m.rounding));
            match turned {
                Some((step, rounding)) => {
                    boat.heading = step.heading;
                    boat.move_to(step.location);
                    if step.complete {
                        boat.manoeuvre = None;
                        if rounding {
                            boat.leg += 1;
                        }
                    }
                }
                None => boat.sail_straight(&local_wind, &scenario.class),
            }
            boat.drift(&local_water);

            sink.record(&LogEvent::BoatPosition {
                second,
                boat: boat.name.clone(),
                location: boat.location,
                heading: boat.heading,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sail_types::Importance;

    use super::*;
    use crate::log_sink::MemoryLog;
    use crate::scenarios;

    fn windward_leeward() -> (Simulation, MemoryLog) {
        let log = MemoryLog::new();
        let scenario = scenarios::preset("windward-leeward").unwrap();
        (Simulation::new(scenario, Box::new(log.clone())), log)
    }

    #[test]
    fn every_boat_logs_a_position_each_second() {
        let (mut sim, log) = windward_leeward();
        let boats = sim.boats().len();
        assert_eq!(sim.run_batch(10).unwrap(), 10);
        let positions = log.events().iter().filter(|e| matches!(e, LogEvent::BoatPosition { .. })).count();
        assert_eq!(positions, 10 * boats);
        assert!(log.events().windows(2).all(|w| w[0].second() <= w[1].second()));
    }

    #[test]
    fn reset_restores_the_start() {
        let (mut sim, log) = windward_leeward();
        let start: Vec<_> = sim.boats().iter().map(|b| (b.location, b.heading)).collect();
        sim.run_batch(30).unwrap();
        assert_ne!(sim.boats()[0].location, start[0].0);
        sim.reset();
        assert_eq!(sim.second(), 0);
        assert!(log.is_empty());
        let again: Vec<_> = sim.boats().iter().map(|b| (b.location, b.heading)).collect();
        assert_eq!(again, start);
    }

    #[test]
    fn replays_identically_after_reset() {
        let log = MemoryLog::new();
        let scenario = scenarios::preset("oscillating").unwrap();
        let mut sim = Simulation::new(scenario, Box::new(log.clone()));
        sim.run_batch(400).unwrap();
        let first = log.events();
        sim.reset();
        sim.run_batch(400).unwrap();
        assert_eq!(log.events(), first);
        assert!(first.iter().any(|e| matches!(e, LogEvent::FlowShift { .. })));
    }

    #[test]
    fn turning_boats_are_not_asked_for_decisions() {
        let (mut sim, log) = windward_leeward();
        sim.run_batch(1200).unwrap();
        let events = log.events();
        let decided = |boat: &str, at: u64| {
            events
                .iter()
                .any(|e| matches!(e, LogEvent::Decision { boat: b, second, .. } if b == boat && *second == at))
        };
        // tacks and gybes take at least two seconds
        let mut tacks = 0;
        for e in &events {
            if let LogEvent::Decision { second, boat, decision: Decision::Turn { importance: Importance::Major, .. }, .. } = e {
                tacks += 1;
                assert!(!decided(boat, second + 1), "{boat} consulted mid-tack at {}", second + 1);
            }
        }
        assert!(tacks > 0);
    }

    #[test]
    fn boats_round_and_finish() {
        let (mut sim, log) = windward_leeward();
        let mut seconds = 0;
        while !sim.all_finished() && seconds < 3600 {
            sim.step().unwrap();
            seconds += 1;
        }
        assert!(sim.all_finished(), "still racing after {seconds}s");
        let roundings = log
            .events()
            .iter()
            .filter(|e| matches!(e, LogEvent::Decision { decision: Decision::MarkRounding { .. }, .. }))
            .count();
        assert_eq!(roundings, sim.boats().len() * sim.scenario().course.leg_count());
    }

    #[test]
    fn water_drift_moves_a_boat_downstream() {
        let log = MemoryLog::new();
        let mut scenario = scenarios::preset("tidal-gradient").unwrap();
        scenario.boats.truncate(1);
        let start = scenario.boats[0].location;
        let mut still = scenario.clone();
        still.water = FlowField::calm("water", still.bounds);
        let mut tidal = Simulation::new(scenario, Box::new(log.clone()));
        let mut calm = Simulation::new(still, Box::new(MemoryLog::new()));
        tidal.step().unwrap();
        calm.step().unwrap();
        let drift = tidal.boats()[0].location.distance_to(&calm.boats()[0].location);
        assert!(drift > 0.0);
        assert_ne!(tidal.boats()[0].location, start);
    }
}
