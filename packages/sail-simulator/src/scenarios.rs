//! scenarios.rs — Built-in training scenarios
//!
//! Each preset exercises a different part of the simulator:
//! - windward-leeward: steady breeze, laylines and roundings
//! - oscillating: swinging and shifting wind for the shift-tactics flags
//! - tidal-gradient: wind gradient across the course plus patchy tide

use sail_types::Location;

use crate::area::ExtentConfig;
use crate::boat_sim::TacticalFlags;
use crate::config::{
    AreaConfig, BoatConfig, CourseConfig, FlowComponentConfig, FlowKindConfig, MarkConfig, PointConfig,
    RegionConfig, Scenario, ScenarioFile, SimulationSettings,
};
use crate::course::Rounding;
use crate::error::ConfigError;
use crate::flow_field::GradientAxis;
use crate::flow_shifts::ShiftConfig;
use crate::polar::BoatClass;

pub const PRESETS: &[&str] = &["windward-leeward", "oscillating", "tidal-gradient"];

/// Build a preset by name.
pub fn preset(name: &str) -> Result<Scenario, ConfigError> {
    let file = match name {
        "windward-leeward" => preset_windward_leeward(),
        "oscillating" => preset_oscillating(),
        "tidal-gradient" => preset_tidal_gradient(),
        _ => return Err(ConfigError::UnknownPreset(name.to_string())),
    };
    file.build()
}

fn mark(name: &str, x: f64, y: f64, rounding: Rounding) -> MarkConfig {
    MarkConfig { name: name.into(), x, y, rounding, zone: 10.0, upwind_channel: None }
}

fn boat(name: &str, x: f64, y: f64, heading: f64, flags: TacticalFlags) -> BoatConfig {
    BoatConfig { name: name.into(), x, y, heading, leg: 0, flags }
}

fn constant(speed: f64, direction: f64) -> FlowComponentConfig {
    FlowComponentConfig {
        name: None,
        extent: None,
        shifts: None,
        kind: FlowKindConfig::Constant { speed, direction },
    }
}

fn rect(west: f64, south: f64, width: f64, height: f64) -> ExtentConfig {
    ExtentConfig::Rect { west, south, width, height }
}

pub fn preset_windward_leeward() -> ScenarioFile {
    ScenarioFile {
        name: Some("windward-leeward".into()),
        simulation: SimulationSettings::default(),
        area: AreaConfig { west: -400.0, south: -100.0, width: 800.0, height: 800.0 },
        wind: vec![constant(12.0, 0.0)],
        water: vec![],
        course: CourseConfig {
            start: PointConfig { x: 0.0, y: 0.0 },
            marks: vec![
                mark("windward", 0.0, 500.0, Rounding::Port),
                mark("leeward", 0.0, 0.0, Rounding::Port),
            ],
        },
        boat_class: BoatClass::default(),
        boats: vec![
            boat("Laser 1", -30.0, 10.0, 45.0, TacticalFlags::default()),
            boat("Laser 2", 30.0, 10.0, -45.0, TacticalFlags::default()),
            boat("Laser 3", 0.0, -20.0, 45.0, TacticalFlags::default()),
        ],
    }
}

pub fn preset_oscillating() -> ScenarioFile {
    let shifty = TacticalFlags {
        upwind_sail_on_best_tack: true,
        upwind_luff_up_if_lifted: true,
        upwind_bear_away_if_headed: true,
        downwind_sail_on_best_gybe: true,
        downwind_luff_up_if_lifted: true,
        downwind_bear_away_if_headed: true,
        ..Default::default()
    };
    let tacker = TacticalFlags { upwind_tack_if_headed: true, downwind_gybe_if_lifted: true, ..Default::default() };

    let mut wind = constant(10.0, 0.0);
    wind.name = Some("northerly".into());
    wind.shifts = Some(ShiftConfig {
        swing_period: 300,
        swing_angle: 6.0,
        shift_period: 90,
        shift_angle: 8.0,
        random_shifts: true,
        seed: 42,
    });

    ScenarioFile {
        name: Some("oscillating".into()),
        simulation: SimulationSettings { shift_report_threshold: 2.0, ..Default::default() },
        area: AreaConfig { west: -600.0, south: -100.0, width: 1200.0, height: 1100.0 },
        wind: vec![wind],
        water: vec![],
        course: CourseConfig {
            start: PointConfig { x: 0.0, y: 0.0 },
            marks: vec![
                MarkConfig {
                    upwind_channel: Some(crate::course::UpwindChannel { inner_offset: 150.0 }),
                    ..mark("windward", 0.0, 800.0, Rounding::Port)
                },
                mark("leeward", 0.0, 0.0, Rounding::Port),
            ],
        },
        boat_class: BoatClass::default(),
        boats: vec![
            boat("Shifty", -20.0, 10.0, 45.0, shifty),
            boat("Tacker", 20.0, 10.0, -45.0, tacker),
            boat("Steady", 0.0, -10.0, 45.0, TacticalFlags::default()),
        ],
    }
}

pub fn preset_tidal_gradient() -> ScenarioFile {
    let breeze = FlowComponentConfig {
        name: Some("sea breeze".into()),
        extent: None,
        shifts: None,
        kind: FlowKindConfig::Gradient { axis: GradientAxis::West, direction: 350.0, speeds: vec![9.0, 12.0, 15.0] },
    };

    let ebb = FlowComponentConfig {
        name: Some("ebb".into()),
        extent: None,
        shifts: None,
        kind: FlowKindConfig::Complex {
            regions: vec![
                RegionConfig {
                    name: "channel".into(),
                    extent: rect(-500.0, -200.0, 1000.0, 1100.0),
                    kind: FlowKindConfig::Gradient { axis: GradientAxis::East, direction: 200.0, speeds: vec![1.5, 0.5] },
                },
                RegionConfig {
                    name: "bank".into(),
                    extent: ExtentConfig::Polygon {
                        points: vec![[-500.0, 400.0], [-100.0, 900.0], [-500.0, 900.0]],
                    },
                    kind: FlowKindConfig::Constant { speed: 0.2, direction: 90.0 },
                },
            ],
        },
    };
    let eddy = FlowComponentConfig {
        name: Some("eddy".into()),
        extent: Some(rect(250.0, 250.0, 150.0, 150.0)),
        shifts: None,
        kind: FlowKindConfig::Constant { speed: 0.8, direction: 0.0 },
    };

    ScenarioFile {
        name: Some("tidal-gradient".into()),
        simulation: SimulationSettings::default(),
        area: AreaConfig { west: -500.0, south: -200.0, width: 1000.0, height: 1100.0 },
        wind: vec![breeze],
        water: vec![ebb, eddy],
        course: CourseConfig {
            start: PointConfig { x: 0.0, y: 0.0 },
            marks: vec![
                mark("windward", 0.0, 600.0, Rounding::Port),
                mark("wing", 300.0, 300.0, Rounding::Port),
                mark("leeward", 0.0, 0.0, Rounding::Port),
            ],
        },
        boat_class: BoatClass::default(),
        boats: vec![
            boat("Laser 1", -20.0, 10.0, 35.0, TacticalFlags::default()),
            boat("Laser 2", 20.0, 10.0, -55.0, TacticalFlags { upwind_luff_up_if_lifted: true, ..Default::default() }),
        ],
    }
}
