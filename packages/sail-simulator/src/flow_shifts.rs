//! flow_shifts.rs — Time-varying rotation of a flow component
//!
//! Two independent effects are summed into one offset angle:
//! - swing: sinusoidal oscillation of `swing_angle` degrees over `swing_period` s
//! - shifts: a step change every `shift_period` s, alternating ±`shift_angle`,
//!   or drawn uniformly from ±`shift_angle` when `random_shifts` is set
//!
//! Random shifts use a seeded RNG so a scenario replays identically after reset.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use sail_types::Angle;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftConfig {
    /// Seconds for one full swing cycle (0 = no swing)
    pub swing_period: u32,
    pub swing_angle: f64,
    /// Seconds between step shifts (0 = no shifts)
    pub shift_period: u32,
    pub shift_angle: f64,
    pub random_shifts: bool,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct FlowShifts {
    cfg: ShiftConfig,
    step: f64,
    offset: Angle,
    rng: StdRng,
}

impl FlowShifts {
    pub fn new(cfg: ShiftConfig) -> Self {
        let rng = StdRng::seed_from_u64(cfg.seed);
        Self { cfg, step: 0.0, offset: Angle::ZERO, rng }
    }

    pub fn offset(&self) -> Angle {
        self.offset
    }

    /// Recompute the offset for simulated `second` and return it.
    pub fn advance(&mut self, second: u64) -> Angle {
        let swing = if self.cfg.swing_period > 0 {
            let phase = std::f64::consts::TAU * second as f64 / f64::from(self.cfg.swing_period);
            self.cfg.swing_angle * phase.sin()
        } else {
            0.0
        };

        let period = u64::from(self.cfg.shift_period);
        if period > 0 && second > 0 && second % period == 0 {
            let a = self.cfg.shift_angle.abs();
            self.step = if self.cfg.random_shifts {
                if a > 0.0 { self.rng.gen_range(-a..=a) } else { 0.0 }
            } else if self.step > 0.0 {
                -a
            } else {
                a
            };
        }

        self.offset = Angle::new(swing + self.step);
        self.offset
    }
}
