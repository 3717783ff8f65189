//! config.rs — scenario.toml parsing and validation
//!
//! A scenario file is deserialized into the `*Config` structs below and then
//! validated into a `Scenario`. Every configuration error surfaces here,
//! before any clock exists.

use std::path::Path;

use sail_types::{Angle, Location};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::area::{Bounds, Extent, ExtentConfig};
use crate::boat_sim::{Boat, TacticalFlags};
use crate::course::{Course, Mark, Rounding, UpwindChannel};
use crate::error::ConfigError;
use crate::flow_field::{FlowComponent, FlowField, FlowKind, FlowRegion, GradientAxis};
use crate::flow_shifts::ShiftConfig;
use crate::polar::BoatClass;

/// Side of the grid checked for flow coverage at load time.
pub const VALIDATION_GRID: usize = 20;

// ── [simulation] ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Simulated seconds per clock batch.
    pub seconds_per_display: u32,
    /// Simulated time over wall-clock time.
    pub speedup: f64,
    /// Degrees the mean flow must move before a shift is logged.
    pub shift_report_threshold: f64,
    /// Past positions kept per boat.
    pub track_length: usize,
    /// Default run length for the CLI, simulated seconds.
    pub run_seconds: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seconds_per_display: 1,
            speedup: 1.0,
            shift_report_threshold: 1.0,
            track_length: 300,
            run_seconds: 600,
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seconds_per_display == 0 {
            return Err(ConfigError::InvalidClock { reason: "seconds_per_display must be at least 1".into() });
        }
        if !(self.speedup.is_finite() && self.speedup > 0.0) {
            return Err(ConfigError::InvalidClock { reason: format!("speedup {} must be positive", self.speedup) });
        }
        if !(self.shift_report_threshold.is_finite() && self.shift_report_threshold > 0.0) {
            return Err(ConfigError::InvalidShiftThreshold(self.shift_report_threshold));
        }
        Ok(())
    }
}

// ── [[wind]] / [[water]] ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlowKindConfig {
    Constant {
        speed: f64,
        direction: f64,
    },
    Gradient {
        axis: GradientAxis,
        direction: f64,
        #[serde(default)]
        speeds: Vec<f64>,
    },
    Complex {
        regions: Vec<RegionConfig>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub extent: ExtentConfig,
    #[serde(flatten)]
    pub kind: FlowKindConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowComponentConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub extent: Option<ExtentConfig>,
    #[serde(default)]
    pub shifts: Option<ShiftConfig>,
    #[serde(flatten)]
    pub kind: FlowKindConfig,
}

impl FlowKindConfig {
    fn build(&self) -> Result<FlowKind, ConfigError> {
        Ok(match self {
            FlowKindConfig::Constant { speed, direction } => FlowKind::constant(*speed, Angle::new(*direction)),
            FlowKindConfig::Gradient { axis, direction, speeds } => FlowKind::Gradient {
                axis: *axis,
                direction: Angle::new(*direction),
                speeds: speeds.clone(),
            },
            FlowKindConfig::Complex { regions } => FlowKind::Complex(
                regions
                    .iter()
                    .map(|r| {
                        Ok(FlowRegion {
                            name: r.name.clone(),
                            extent: Extent::from_config(&r.name, &r.extent)?,
                            kind: r.kind.build()?,
                        })
                    })
                    .collect::<Result<_, ConfigError>>()?,
            ),
        })
    }
}

fn build_field(
    field: &str,
    components: &[FlowComponentConfig],
    bounds: Bounds,
    threshold: f64,
) -> Result<FlowField, ConfigError> {
    let built = components
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let name = c.name.clone().unwrap_or_else(|| format!("{field} {}", i + 1));
            let mut component = FlowComponent::new(name.clone(), c.kind.build()?);
            if let Some(extent) = &c.extent {
                component = component.with_extent(Extent::from_config(&name, extent)?);
            }
            if let Some(shifts) = &c.shifts {
                component = component.with_shifts(shifts.clone());
            }
            Ok(component)
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;
    FlowField::new(field, bounds, built, threshold)
}

// ── [course] ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointConfig {
    pub x: f64,
    pub y: f64,
}

fn default_rounding() -> Rounding {
    Rounding::Port
}

fn default_zone() -> f64 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkConfig {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_rounding")]
    pub rounding: Rounding,
    #[serde(default = "default_zone")]
    pub zone: f64,
    #[serde(default)]
    pub upwind_channel: Option<UpwindChannel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseConfig {
    pub start: PointConfig,
    #[serde(default)]
    pub marks: Vec<MarkConfig>,
}

// ── [[boats]] ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoatConfig {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    #[serde(default)]
    pub leg: usize,
    #[serde(default)]
    pub flags: TacticalFlags,
}

// ── Whole file ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaConfig {
    pub west: f64,
    pub south: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub simulation: SimulationSettings,
    pub area: AreaConfig,
    #[serde(default)]
    pub wind: Vec<FlowComponentConfig>,
    #[serde(default)]
    pub water: Vec<FlowComponentConfig>,
    pub course: CourseConfig,
    #[serde(default)]
    pub boat_class: BoatClass,
    #[serde(default)]
    pub boats: Vec<BoatConfig>,
}

/// A validated scenario: the starting state a simulation runs and resets to.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub settings: SimulationSettings,
    pub bounds: Bounds,
    pub wind: FlowField,
    pub water: FlowField,
    pub course: Course,
    pub class: BoatClass,
    pub boats: Vec<Boat>,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let scenario = Self::from_toml(&text)?;
        info!("📋 Loaded scenario '{}' from {}", scenario.name, path.as_ref().display());
        Ok(scenario)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str::<ScenarioFile>(text)?.build()
    }
}

impl ScenarioFile {
    pub fn build(self) -> Result<Scenario, ConfigError> {
        let settings = self.simulation;
        settings.validate()?;
        let a = &self.area;
        let bounds = Bounds::new(a.west, a.south, a.width, a.height)?;
        self.boat_class.validate()?;

        let threshold = settings.shift_report_threshold;
        let wind = build_field("wind", &self.wind, bounds, threshold)?;
        let water = if self.water.is_empty() {
            FlowField::calm("water", bounds)
        } else {
            build_field("water", &self.water, bounds, threshold)?
        };

        let marks = self
            .course
            .marks
            .iter()
            .map(|m| Mark {
                name: m.name.clone(),
                location: Location::new(m.x, m.y),
                rounding: m.rounding,
                zone: m.zone,
                upwind_channel: m.upwind_channel,
            })
            .collect();
        let course = Course::new(Location::new(self.course.start.x, self.course.start.y), marks)?;

        let boats = self
            .boats
            .iter()
            .map(|b| {
                if b.leg >= course.leg_count() {
                    return Err(ConfigError::BoatWithoutLeg { boat: b.name.clone() });
                }
                Ok(Boat::new(b.name.clone(), Location::new(b.x, b.y), Angle::new(b.heading))
                    .with_leg(b.leg)
                    .with_flags(b.flags)
                    .with_track_length(settings.track_length))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut probes = bounds.probe_grid(VALIDATION_GRID);
        probes.extend(course.marks.iter().map(|m| m.location));
        probes.extend(boats.iter().map(|b| b.location));
        if let Some(p) = probes.iter().find(|p| !wind.covers(p)) {
            return Err(ConfigError::UncoveredFlow { field: "wind".into(), x: p.x, y: p.y });
        }
        if let Some(p) = probes.iter().find(|p| !water.defines(p)) {
            return Err(ConfigError::UncoveredFlow { field: "water".into(), x: p.x, y: p.y });
        }

        Ok(Scenario {
            name: self.name.unwrap_or_else(|| "unnamed".into()),
            settings,
            bounds,
            wind,
            water,
            course,
            class: self.boat_class,
            boats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        name = "minimal"

        [area]
        west = 0
        south = 0
        width = 200
        height = 400

        [[wind]]
        type = "constant"
        speed = 12
        direction = 0

        [course]
        start = { x = 100, y = 0 }

        [[course.marks]]
        name = "windward"
        x = 100
        y = 380

        [[boats]]
        name = "Laser 1"
        x = 90
        y = 10
        heading = 45
    "#;

    #[test]
    fn minimal_file_uses_defaults() {
        let s = Scenario::from_toml(MINIMAL).unwrap();
        assert_eq!(s.name, "minimal");
        assert_eq!(s.settings, SimulationSettings::default());
        assert_eq!(s.class, BoatClass::default());
        assert_eq!(s.course.marks[0].rounding, Rounding::Port);
        assert_eq!(s.course.marks[0].zone, 10.0);
        assert!(s.water.is_calm());
        assert_eq!(s.boats[0].flags, TacticalFlags::default());
        assert_eq!(s.wind.sample(&Location::new(10.0, 10.0)).speed(), 12.0);
    }

    #[test]
    fn complex_regions_and_shifts_parse() {
        let text = MINIMAL.replace(
            "[[wind]]\n        type = \"constant\"\n        speed = 12\n        direction = 0",
            r#"[[wind]]
        name = "lake breeze"
        type = "complex"
        shifts = { shift_period = 60, shift_angle = 10 }

        [[wind.regions]]
        name = "open water"
        type = "gradient"
        axis = "west"
        direction = 350
        speeds = [10, 14]
        extent = { shape = "rect", west = 0, south = 0, width = 200, height = 400 }

        [[wind.regions]]
        name = "shore"
        type = "constant"
        speed = 6
        direction = 20
        extent = { shape = "polygon", points = [[0, 0], [50, 0], [0, 100]] }"#,
        );
        let s = Scenario::from_toml(&text).unwrap();
        let v = s.wind.sample(&Location::new(200.0, 200.0));
        assert!((v.speed() - 14.0).abs() < 1e-9);
        assert!((v.direction().degrees() - -10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_gradient_is_a_config_error() {
        let text = MINIMAL.replace(
            "type = \"constant\"\n        speed = 12\n        direction = 0",
            "type = \"gradient\"\n        axis = \"north\"\n        direction = 0",
        );
        assert!(matches!(Scenario::from_toml(&text), Err(ConfigError::MissingGradientSamples { .. })));
    }

    #[test]
    fn partial_wind_is_rejected() {
        let text = MINIMAL.replace(
            "direction = 0\n",
            "direction = 0\n        extent = { shape = \"rect\", west = 0, south = 0, width = 100, height = 400 }\n",
        );
        match Scenario::from_toml(&text) {
            Err(ConfigError::UncoveredFlow { field, x, .. }) => {
                assert_eq!(field, "wind");
                assert!(x > 100.0);
            }
            other => panic!("expected uncovered wind, got {other:?}"),
        }
    }

    #[test]
    fn boat_past_last_mark_is_rejected() {
        let text = MINIMAL.replace("heading = 45", "heading = 45\n        leg = 1");
        assert!(matches!(Scenario::from_toml(&text), Err(ConfigError::BoatWithoutLeg { boat }) if boat == "Laser 1"));
    }

    #[test]
    fn bad_clock_and_area_are_rejected() {
        let text = format!("[simulation]\nspeedup = 0\n{MINIMAL}");
        assert!(matches!(Scenario::from_toml(&text), Err(ConfigError::InvalidClock { .. })));
        let text = format!("[simulation]\nshift_report_threshold = 0\n{MINIMAL}");
        assert!(matches!(Scenario::from_toml(&text), Err(ConfigError::InvalidShiftThreshold(t)) if t == 0.0));
        let text = MINIMAL.replace("width = 200", "width = 0");
        assert!(matches!(Scenario::from_toml(&text), Err(ConfigError::InvalidArea)));
        assert!(matches!(Scenario::from_toml("not toml ["), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_marks_are_rejected() {
        let text = MINIMAL.replace("[[course.marks]]\n        name = \"windward\"\n        x = 100\n        y = 380\n", "");
        assert!(matches!(Scenario::from_toml(&text), Err(ConfigError::EmptyCourse)));
    }
}
