//! End-to-end runs through the public API: scenario text in, log events out.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use sail_simulator::{scenarios, JsonLinesSink, MajorOnly, MemoryLog, Scenario, Simulation};
use sail_types::{Decision, LogEvent, TurnDirection};

const SINGLE_BEAT: &str = r#"
    name = "single beat"

    [area]
    west = -50
    south = -20
    width = 100
    height = 120

    [[wind]]
    type = "constant"
    speed = 12
    direction = 0

    [course]
    start = { x = 0, y = 0 }

    [[course.marks]]
    name = "windward"
    x = 0
    y = 64.2
    rounding = "port"
    zone = 10

    [[boats]]
    name = "Laser 1"
    x = 12.1
    y = 52.1
    heading = 45
"#;

fn first_decision(log: &MemoryLog) -> Decision {
    log.events()
        .into_iter()
        .find_map(|e| match e {
            LogEvent::Decision { decision, .. } => Some(decision),
            _ => None,
        })
        .expect("a decision was logged")
}

#[test]
fn boat_on_the_layline_tacks() {
    let log = MemoryLog::new();
    let mut sim = Simulation::new(Scenario::from_toml(SINGLE_BEAT).unwrap(), Box::new(log.clone()));
    sim.step().unwrap();

    let decision = first_decision(&log);
    assert_eq!(decision.to_string(), "TURN to 315° PORT");
    assert_eq!(decision.reason(), "tack on layline");
    assert!(sim.boats()[0].is_turning());
}

#[test]
fn boat_short_of_the_layline_sails_on() {
    let text = SINGLE_BEAT.replace("x = 12.1\n    y = 52.1", "x = 8\n    y = 48");
    let log = MemoryLog::new();
    let mut sim = Simulation::new(Scenario::from_toml(&text).unwrap(), Box::new(log.clone()));
    sim.step().unwrap();

    let decision = first_decision(&log);
    assert_eq!(decision.to_string(), "SAILON");
    assert_eq!(decision.reason(), "sail on");
    assert!(!sim.boats()[0].is_turning());
}

#[test]
fn boat_past_the_layline_tacks() {
    let text = SINGLE_BEAT.replace("x = 12.1\n    y = 52.1", "x = 13\n    y = 53");
    let log = MemoryLog::new();
    let mut sim = Simulation::new(Scenario::from_toml(&text).unwrap(), Box::new(log.clone()));
    sim.step().unwrap();

    let decision = first_decision(&log);
    assert_eq!(decision.to_string(), "TURN to 315° PORT");
    assert_eq!(decision.reason(), "tack on layline");
}

#[test]
fn windward_leeward_race_runs_to_the_finish() {
    let log = MemoryLog::new();
    let mut sim = Simulation::new(scenarios::preset("windward-leeward").unwrap(), Box::new(log.clone()));
    let mut seconds = 0;
    while !sim.all_finished() {
        sim.step().unwrap();
        seconds += 1;
        assert!(seconds < 3600, "race still running after an hour");
    }

    let events = log.events();
    for boat in sim.boats() {
        let roundings: Vec<&Decision> = events
            .iter()
            .filter_map(|e| match e {
                LogEvent::Decision { boat: b, decision: d @ Decision::MarkRounding { .. }, .. } if *b == boat.name => {
                    Some(d)
                }
                _ => None,
            })
            .collect();
        assert_eq!(roundings.len(), 2, "{}", boat.name);
        assert!(matches!(roundings[0], Decision::MarkRounding { mark, direction: TurnDirection::Port, .. } if mark == "windward"));
        assert_eq!(roundings[1].reason(), "finishing");
        assert!(boat.track().count() > 0);
    }

    // finished boats keep reporting but never manoeuvre again
    sim.run_batch(5).unwrap();
    let tail = log.events();
    assert!(tail[events.len()..].iter().all(|e| match e {
        LogEvent::Decision { decision, .. } => decision.reason() == "finished",
        _ => true,
    }));
}

/// `Write` handle onto a shared buffer, so the test can read what a boxed sink wrote.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn major_json_lines_from_an_oscillating_breeze() {
    let buffer = SharedBuffer::default();
    let sink = MajorOnly(JsonLinesSink::new(buffer.clone()));
    let mut sim = Simulation::new(scenarios::preset("oscillating").unwrap(), Box::new(sink));
    sim.run_batch(600).unwrap();

    let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let events: Vec<LogEvent> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert!(!events.is_empty());
    assert!(events.iter().all(LogEvent::is_major));
    assert!(events.iter().any(|e| matches!(e, LogEvent::FlowShift { field, .. } if field == "wind")));
    assert!(events.windows(2).all(|w| w[0].second() <= w[1].second()));
}

#[test]
fn bundled_scenario_loads_and_runs() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenario.toml");
    let scenario = Scenario::load(path).unwrap();
    assert_eq!(scenario.boats.len(), 3);
    assert!(!scenario.water.is_calm());

    let log = MemoryLog::new();
    let mut sim = Simulation::new(scenario, Box::new(log.clone()));
    assert_eq!(sim.run_batch(300).unwrap(), 300);
    assert!(log.events().iter().any(|e| matches!(e, LogEvent::Decision { decision: Decision::Turn { .. }, .. })));
}
