//! area.rs — Scenario bounding box and flow-region extents
//!
//! Extents are closed regions: a point on the boundary is inside. Edge
//! distance drives the cross-fade weighting of complex flow regions.

use geo::{Coord, EuclideanDistance, Intersects, LineString, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

use sail_types::Location;

use crate::error::ConfigError;

// ── Scenario bounding box ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(west: f64, south: f64, width: f64, height: f64) -> Result<Self, ConfigError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidArea);
        }
        Ok(Self { west, south, width, height })
    }

    pub fn east(&self) -> f64 {
        self.west + self.width
    }

    pub fn north(&self) -> f64 {
        self.south + self.height
    }

    /// Cell centres of an `n × n` grid over the box, row by row from the south-west.
    pub fn probe_grid(&self, n: usize) -> Vec<Location> {
        let cells = n as f64;
        (0..n)
            .flat_map(|row| {
                (0..n).map(move |col| {
                    Location::new(
                        self.west + (col as f64 + 0.5) * self.width / cells,
                        self.south + (row as f64 + 0.5) * self.height / cells,
                    )
                })
            })
            .collect()
    }
}

// ── Region extents ────────────────────────────────────────────────────────────

/// Extent as written in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ExtentConfig {
    Rect { west: f64, south: f64, width: f64, height: f64 },
    Polygon { points: Vec<[f64; 2]> },
}

#[derive(Debug, Clone)]
pub struct Extent {
    polygon: Polygon<f64>,
}

impl Extent {
    pub fn rect(west: f64, south: f64, width: f64, height: f64) -> Self {
        let rect = Rect::new(
            Coord { x: west, y: south },
            Coord { x: west + width, y: south + height },
        );
        Self { polygon: rect.to_polygon() }
    }

    pub fn polygon(region: &str, points: &[[f64; 2]]) -> Result<Self, ConfigError> {
        if points.len() < 3 {
            return Err(ConfigError::DegeneratePolygon { region: region.to_string() });
        }
        let ring: LineString<f64> = points.iter().map(|p| (p[0], p[1])).collect::<Vec<_>>().into();
        Ok(Self { polygon: Polygon::new(ring, vec![]) })
    }

    pub fn from_config(region: &str, cfg: &ExtentConfig) -> Result<Self, ConfigError> {
        match cfg {
            ExtentConfig::Rect { west, south, width, height } => {
                if !(*width > 0.0 && *height > 0.0) {
                    return Err(ConfigError::InvalidArea);
                }
                Ok(Self::rect(*west, *south, *width, *height))
            }
            ExtentConfig::Polygon { points } => Self::polygon(region, points),
        }
    }

    pub fn contains(&self, at: &Location) -> bool {
        self.polygon.intersects(&Point::new(at.x, at.y))
    }

    /// Distance from `at` to the nearest point of the boundary.
    pub fn edge_distance(&self, at: &Location) -> f64 {
        Point::new(at.x, at.y).euclidean_distance(self.polygon.exterior())
    }
}
