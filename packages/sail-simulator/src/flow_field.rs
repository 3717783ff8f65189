//! flow_field.rs — Composed wind / water flow over the scenario area
//!
//! A field is an ordered overlay of components. Each top-level component may
//! be limited to an extent and may carry time-varying shifts; the last
//! component covering a point wins. Complex components blend their own
//! regions by distance from each region's edge, so crossing a region boundary
//! fades smoothly instead of stepping.
//!
//! Directions are the bearing the flow comes FROM. Speeds are knots.

use sail_types::{Angle, Location, SpeedVector};
use serde::{Deserialize, Serialize};

use crate::area::{Bounds, Extent};
use crate::error::ConfigError;
use crate::flow_shifts::{FlowShifts, ShiftConfig};

/// Side of the probe grid used for the mean direction.
pub const MEAN_PROBE_GRID: usize = 5;

/// Edge of the bounding box where gradient sample 0 sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientAxis {
    North,
    South,
    East,
    West,
}

impl GradientAxis {
    /// Fraction of the way across the box from the sample-0 edge, clamped to [0, 1].
    fn fraction(self, bounds: &Bounds, at: &Location) -> f64 {
        let (pos, span) = match self {
            GradientAxis::West => (at.x - bounds.west, bounds.width),
            GradientAxis::East => (bounds.east() - at.x, bounds.width),
            GradientAxis::South => (at.y - bounds.south, bounds.height),
            GradientAxis::North => (bounds.north() - at.y, bounds.height),
        };
        (pos / span).clamp(0.0, 1.0)
    }
}

// ── Flow kinds ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum FlowKind {
    Constant(SpeedVector),
    Gradient {
        axis: GradientAxis,
        direction: Angle,
        speeds: Vec<f64>,
    },
    Complex(Vec<FlowRegion>),
}

/// A named, bounded piece of a complex component.
#[derive(Debug, Clone)]
pub struct FlowRegion {
    pub name: String,
    pub extent: Extent,
    pub kind: FlowKind,
}

impl FlowKind {
    pub fn constant(speed: f64, direction: Angle) -> Self {
        FlowKind::Constant(SpeedVector::new(speed, direction))
    }

    fn validate(&self, component: &str) -> Result<(), ConfigError> {
        match self {
            FlowKind::Constant(_) => Ok(()),
            FlowKind::Gradient { speeds, .. } if speeds.is_empty() => {
                Err(ConfigError::MissingGradientSamples { component: component.to_string() })
            }
            FlowKind::Gradient { .. } => Ok(()),
            FlowKind::Complex(regions) => {
                regions.iter().try_for_each(|r| r.kind.validate(&r.name))
            }
        }
    }

    fn sample(&self, bounds: &Bounds, at: &Location) -> SpeedVector {
        match self {
            FlowKind::Constant(v) => *v,
            FlowKind::Gradient { axis, direction, speeds } => {
                SpeedVector::new(interpolate(speeds, axis.fraction(bounds, at)), *direction)
            }
            FlowKind::Complex(regions) => blend(regions, bounds, at),
        }
    }

    fn covers(&self, at: &Location) -> bool {
        match self {
            FlowKind::Complex(regions) => regions
                .iter()
                .any(|r| r.extent.contains(at) && r.kind.covers(at)),
            _ => true,
        }
    }
}

/// Linear interpolation over evenly spaced samples, `t` in [0, 1].
fn interpolate(speeds: &[f64], t: f64) -> f64 {
    match speeds.len() {
        0 => 0.0,
        1 => speeds[0],
        n => {
            let pos = t * (n - 1) as f64;
            let i = (pos.floor() as usize).min(n - 2);
            let frac = pos - i as f64;
            speeds[i] + (speeds[i + 1] - speeds[i]) * frac
        }
    }
}

/// Edge-distance weighted blend of every region containing `at`.
fn blend(regions: &[FlowRegion], bounds: &Bounds, at: &Location) -> SpeedVector {
    let hits: Vec<(f64, SpeedVector)> = regions
        .iter()
        .filter(|r| r.extent.contains(at))
        .map(|r| (r.extent.edge_distance(at), r.kind.sample(bounds, at)))
        .collect();

    if hits.is_empty() {
        // Only reachable for fields that skipped coverage validation.
        return regions
            .iter()
            .map(|r| (r.extent.edge_distance(at), r))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, r)| r.kind.sample(bounds, at))
            .unwrap_or_else(SpeedVector::zero);
    }

    let total: f64 = hits.iter().map(|(w, _)| w).sum();
    let (x, y) = if total > 0.0 {
        hits.iter().fold((0.0, 0.0), |(x, y), (w, v)| (x + w * v.x(), y + w * v.y()))
    } else {
        hits.iter().fold((0.0, 0.0), |(x, y), (_, v)| (x + v.x(), y + v.y()))
    };
    let norm = if total > 0.0 { total } else { hits.len() as f64 };
    SpeedVector::from_components(x / norm, y / norm)
}

// ── Top-level components ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FlowComponent {
    pub name: String,
    /// `None` covers the whole area.
    pub extent: Option<Extent>,
    pub kind: FlowKind,
    shifts: Option<FlowShifts>,
}

impl FlowComponent {
    pub fn new(name: impl Into<String>, kind: FlowKind) -> Self {
        Self { name: name.into(), extent: None, kind, shifts: None }
    }

    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn with_shifts(mut self, cfg: ShiftConfig) -> Self {
        self.shifts = Some(FlowShifts::new(cfg));
        self
    }

    fn applies_at(&self, at: &Location) -> bool {
        self.extent.as_ref().map_or(true, |e| e.contains(at))
    }

    fn offset(&self) -> Angle {
        self.shifts.as_ref().map_or(Angle::ZERO, FlowShifts::offset)
    }

    fn sample(&self, bounds: &Bounds, at: &Location) -> SpeedVector {
        self.kind.sample(bounds, at).rotate(self.offset())
    }
}

// ── Field ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FlowField {
    name: String,
    bounds: Bounds,
    components: Vec<FlowComponent>,
    report_threshold: f64,
    mean: Angle,
    last_reported: Angle,
}

impl FlowField {
    pub fn new(
        name: impl Into<String>,
        bounds: Bounds,
        components: Vec<FlowComponent>,
        report_threshold: f64,
    ) -> Result<Self, ConfigError> {
        if !(report_threshold.is_finite() && report_threshold > 0.0) {
            return Err(ConfigError::InvalidShiftThreshold(report_threshold));
        }
        for c in &components {
            c.kind.validate(&c.name)?;
        }
        let mut field = Self {
            name: name.into(),
            bounds,
            components,
            report_threshold,
            mean: Angle::ZERO,
            last_reported: Angle::ZERO,
        };
        field.mean = field.compute_mean();
        field.last_reported = field.mean;
        Ok(field)
    }

    /// A field with no components: zero flow everywhere.
    pub fn calm(name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            bounds,
            components: Vec::new(),
            report_threshold: 1.0,
            mean: Angle::ZERO,
            last_reported: Angle::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn is_calm(&self) -> bool {
        self.components.is_empty()
    }

    /// Flow at `at`. Pure between calls to `advance`.
    pub fn sample(&self, at: &Location) -> SpeedVector {
        self.components
            .iter()
            .rev()
            .find(|c| c.applies_at(at))
            .map_or_else(SpeedVector::zero, |c| c.sample(&self.bounds, at))
    }

    pub fn mean_direction(&self) -> Angle {
        self.mean
    }

    /// True when the topmost component at `at` actually defines a flow there.
    pub fn covers(&self, at: &Location) -> bool {
        self.components
            .iter()
            .rev()
            .find(|c| c.applies_at(at))
            .is_some_and(|c| c.kind.covers(at))
    }

    /// Like `covers`, but a point outside every component counts as calm
    /// rather than missing. Used for water, which may be patchy.
    pub fn defines(&self, at: &Location) -> bool {
        self.components
            .iter()
            .rev()
            .find(|c| c.applies_at(at))
            .map_or(true, |c| c.kind.covers(at))
    }

    /// First point of an `n × n` validation grid that no component covers.
    pub fn first_uncovered(&self, n: usize) -> Option<Location> {
        self.bounds.probe_grid(n).into_iter().find(|p| !self.covers(p))
    }

    /// Move shifts and swings to simulated `second`. Returns the new mean
    /// direction when it moved this second and now sits at least the report
    /// threshold away from the last reported one.
    pub fn advance(&mut self, second: u64) -> Option<Angle> {
        let mut moved = false;
        for shifts in self.components.iter_mut().filter_map(|c| c.shifts.as_mut()) {
            let before = shifts.offset();
            moved |= shifts.advance(second) != before;
        }
        if !moved {
            return None;
        }
        self.mean = self.compute_mean();
        if self.mean.abs_diff(self.last_reported) >= self.report_threshold {
            self.last_reported = self.mean;
            Some(self.mean)
        } else {
            None
        }
    }

    fn compute_mean(&self) -> Angle {
        let (x, y) = self
            .bounds
            .probe_grid(MEAN_PROBE_GRID)
            .iter()
            .map(|p| self.sample(p))
            .fold((0.0, 0.0), |(x, y), v| (x + v.x(), y + v.y()));
        SpeedVector::from_components(x, y).direction()
    }
}
