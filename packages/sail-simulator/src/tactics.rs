//! tactics.rs — Rule-based tactical decisions
//!
//! One decision per boat per evaluated second. The boat's situation (leg
//! kind × tack × rounding side) selects an ordered rule table; the first rule
//! that fires decides, otherwise the boat sails on. The tables below are the
//! whole precedence policy.
//!
//! Angles in this module:
//! - local wind: the flow sampled at the boat, used for what the boat can sail
//! - mean wind: the field's mean direction, used for leg kind and laylines

use sail_types::{Angle, Decision, DistancePolar, Importance, SpeedVector, TurnDirection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boat_sim::Boat;
use crate::course::{Course, LegKind, Mark, Rounding};
use crate::error::SimError;
use crate::polar::BoatClass;

/// Heading comparisons closer than this are treated as equal, degrees.
pub const HEADING_TOLERANCE: f64 = 0.5;

/// Distance from a layline that counts as on it, metres.
const LAYLINE_EPSILON: f64 = 1e-6;

/// Cross-wind distance beyond which a channel forces a tack, as a multiple of
/// the channel's inner offset.
const CHANNEL_LIMIT: f64 = 1.5;

const CHANNEL: &str = "tack to stay in channel";
const BEST_TACK: &str = "tack onto the lifted tack";
const BEST_GYBE: &str = "gybe onto the favoured gybe";
const TACK_HEADED: &str = "tack when headed";
const BEAR_AWAY_HEADED: &str = "bear away when headed";
const LUFF_LIFTED: &str = "luff up when lifted";
const GYBE_LIFTED: &str = "gybe when lifted";
const TACK_LAYLINE: &str = "tack on layline";
const GYBE_LAYLINE: &str = "gybe on layline";
const COURSE_TO_MARK: &str = "course to mark";
const ROUNDING: &str = "mark rounding";
const FINISHING: &str = "finishing";
const FINISHED: &str = "finished";
const SAIL_ON: &str = "sail on";

// ── Situation ─────────────────────────────────────────────────────────────────

/// Which side the wind comes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tack {
    Port,
    Starboard,
}

impl Tack {
    /// Tack for a signed relative wind angle (wind minus heading).
    pub fn of(relative_wind: Angle) -> Tack {
        if relative_wind.degrees() >= 0.0 {
            Tack::Starboard
        } else {
            Tack::Port
        }
    }

    pub fn other(self) -> Tack {
        match self {
            Tack::Port => Tack::Starboard,
            Tack::Starboard => Tack::Port,
        }
    }

    /// Heading `off` degrees from `wind` with the wind on this side.
    pub fn heading(self, wind: Angle, off: f64) -> Angle {
        match self {
            Tack::Starboard => wind - off,
            Tack::Port => wind + off,
        }
    }

    /// Turning this way passes head to wind.
    pub fn tack_direction(self) -> TurnDirection {
        match self {
            Tack::Starboard => TurnDirection::Starboard,
            Tack::Port => TurnDirection::Port,
        }
    }

    /// Turning this way passes dead downwind.
    pub fn gybe_direction(self) -> TurnDirection {
        match self {
            Tack::Starboard => TurnDirection::Port,
            Tack::Port => TurnDirection::Starboard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Situation {
    pub leg: LegKind,
    pub tack: Tack,
    pub rounding: Rounding,
}

/// Everything tactics may read besides the boat itself.
#[derive(Debug, Clone, Copy)]
pub struct TacticsContext<'a> {
    /// Flow sampled at the boat.
    pub wind: SpeedVector,
    pub mean_wind: Angle,
    pub course: &'a Course,
    pub class: &'a BoatClass,
    pub second: u64,
}

// ── Precedence ────────────────────────────────────────────────────────────────

type Rule = fn(&View<'_>) -> Option<Decision>;

const UPWIND: &[Rule] = &[
    channel,
    best_tack,
    upwind_headed,
    upwind_lifted,
    layline,
    course_to_mark,
    rounding,
];

const DOWNWIND: &[Rule] = &[
    best_gybe,
    downwind_lifted,
    downwind_headed,
    layline,
    course_to_mark,
    rounding,
];

const REACH: &[Rule] = &[course_to_mark, rounding];

fn precedence(leg: LegKind) -> &'static [Rule] {
    match leg {
        LegKind::Upwind => UPWIND,
        LegKind::Downwind => DOWNWIND,
        LegKind::Reach => REACH,
    }
}

/// Situation of `boat`, or `None` once it has finished.
pub fn situation(boat: &Boat, ctx: &TacticsContext<'_>) -> Option<Situation> {
    let mark = ctx.course.mark(boat.leg)?;
    let leg = ctx.course.leg_kind(boat.leg, ctx.mean_wind, ctx.class)?;
    Some(Situation { leg, tack: Tack::of(boat.relative_wind(&ctx.wind)), rounding: mark.rounding })
}

/// Decide what `boat` does this second.
pub fn decide(boat: &Boat, ctx: &TacticsContext<'_>) -> Result<Decision, SimError> {
    let fail = |detail: String| SimError::Tactics { boat: boat.name.clone(), second: ctx.second, detail };

    if !ctx.wind.is_finite() {
        return Err(fail(format!("non-finite wind sample at {}", boat.location)));
    }
    let legs = ctx.course.leg_count();
    if boat.leg > legs {
        return Err(fail(format!("leg {} is past the end of a {legs}-mark course", boat.leg)));
    }
    let (Some(mark), Some(situation)) = (ctx.course.mark(boat.leg), situation(boat, ctx)) else {
        return Ok(Decision::sail_on(FINISHED));
    };

    let view = View::new(boat, ctx, mark, situation);
    let decision = precedence(situation.leg)
        .iter()
        .find_map(|rule| rule(&view))
        .unwrap_or_else(|| Decision::sail_on(SAIL_ON));

    debug!(
        "{} t={} {:?}/{:?} → {} ({})",
        boat.name, ctx.second, situation.leg, situation.tack, decision, decision.reason()
    );
    Ok(decision)
}

// ── Rule inputs ───────────────────────────────────────────────────────────────

struct View<'a> {
    boat: &'a Boat,
    ctx: &'a TacticsContext<'a>,
    mark: &'a Mark,
    situation: Situation,
    /// Local wind direction.
    wind: Angle,
    /// Unsigned relative wind angle.
    off_wind: f64,
    to_mark: DistancePolar,
    /// Metres per second through the water.
    sog: f64,
    /// The mark can be steered for on the current tack.
    fetching: bool,
}

impl<'a> View<'a> {
    fn new(boat: &'a Boat, ctx: &'a TacticsContext<'a>, mark: &'a Mark, situation: Situation) -> Self {
        let wind = ctx.wind.direction();
        let to_mark = boat.location.to(&mark.location);
        let fetching = fetchable(to_mark.bearing, situation.tack, wind, ctx.class);
        Self {
            boat,
            ctx,
            mark,
            situation,
            wind,
            off_wind: boat.relative_wind(&ctx.wind).degrees().abs(),
            to_mark,
            sog: boat.metres_per_second(&ctx.wind, ctx.class),
            fetching,
        }
    }

    fn flags(&self) -> &crate::boat_sim::TacticalFlags {
        &self.boat.flags
    }

    fn upwind(&self) -> f64 {
        self.ctx.class.upwind_relative
    }

    fn downwind(&self) -> f64 {
        self.ctx.class.downwind_relative
    }

    fn tack(&self) -> Tack {
        self.situation.tack
    }

    fn trigger_distance(&self) -> f64 {
        self.mark.zone.max(self.sog)
    }

    fn outside_trigger(&self) -> bool {
        self.to_mark.distance > self.trigger_distance()
    }

    fn mark_ahead(&self) -> bool {
        self.to_mark.bearing.abs_diff(self.boat.heading) < 90.0
    }

    /// Tack (upwind) or gybe (downwind) onto `target`.
    fn change_sides(&self, target: Angle, reason: &str) -> Decision {
        let direction = match self.situation.leg {
            LegKind::Downwind => self.tack().gybe_direction(),
            _ => self.tack().tack_direction(),
        };
        Decision::turn(target, direction, Importance::Major, reason)
    }

    /// Adjust course the shortest way.
    fn steer(&self, target: Angle, reason: &str) -> Decision {
        Decision::turn(target, TurnDirection::shortest(self.boat.heading, target), Importance::Minor, reason)
    }
}

/// Whether `bearing` can be sailed on `tack` without pinching above
/// close-hauled or running below the downwind angle.
fn fetchable(bearing: Angle, tack: Tack, wind: Angle, class: &BoatClass) -> bool {
    let relative = wind.diff(bearing);
    let off = relative.degrees().abs();
    Tack::of(relative) == tack
        && off >= class.upwind_relative - HEADING_TOLERANCE
        && off <= class.downwind_relative + HEADING_TOLERANCE
}

fn cross(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.1 - a.1 * b.0
}

fn unit(bearing: Angle) -> (f64, f64) {
    let r = bearing.radians();
    (r.sin(), r.cos())
}

// ── Rules ─────────────────────────────────────────────────────────────────────

fn channel(v: &View<'_>) -> Option<Decision> {
    let ch = v.mark.upwind_channel?;
    // positive to the right looking upwind
    let right = unit(v.ctx.mean_wind + 90.0);
    let offset = (v.boat.location.x - v.mark.location.x) * right.0 + (v.boat.location.y - v.mark.location.y) * right.1;
    let limit = CHANNEL_LIMIT * ch.inner_offset;
    let outside = match v.tack() {
        Tack::Port => offset > limit,
        Tack::Starboard => offset < -limit,
    };
    outside.then(|| v.change_sides(v.tack().other().heading(v.wind, v.upwind()), CHANNEL))
}

/// Tack favoured by the local shift: veer favours starboard, back favours port.
fn favoured_by_shift(v: &View<'_>) -> Option<Tack> {
    let shift = v.wind.diff(v.ctx.mean_wind).degrees();
    if shift > HEADING_TOLERANCE {
        Some(Tack::Starboard)
    } else if shift < -HEADING_TOLERANCE {
        Some(Tack::Port)
    } else {
        None
    }
}

fn best_tack(v: &View<'_>) -> Option<Decision> {
    if !v.flags().upwind_sail_on_best_tack || v.fetching {
        return None;
    }
    let best = favoured_by_shift(v)?;
    (best != v.tack()).then(|| v.change_sides(best.heading(v.wind, v.upwind()), BEST_TACK))
}

fn best_gybe(v: &View<'_>) -> Option<Decision> {
    if !v.flags().downwind_sail_on_best_gybe || v.fetching {
        return None;
    }
    // on a run the veer favours port gybe
    let best = favoured_by_shift(v)?.other();
    (best != v.tack()).then(|| v.change_sides(best.heading(v.wind, v.downwind()), BEST_GYBE))
}

fn upwind_headed(v: &View<'_>) -> Option<Decision> {
    if v.off_wind >= v.upwind() - HEADING_TOLERANCE {
        return None;
    }
    if v.flags().upwind_tack_if_headed {
        Some(v.change_sides(v.tack().other().heading(v.wind, v.upwind()), TACK_HEADED))
    } else if v.flags().upwind_bear_away_if_headed {
        Some(v.steer(v.tack().heading(v.wind, v.upwind()), BEAR_AWAY_HEADED))
    } else {
        None
    }
}

fn upwind_lifted(v: &View<'_>) -> Option<Decision> {
    let lifted = v.off_wind > v.upwind() + HEADING_TOLERANCE;
    (lifted && v.flags().upwind_luff_up_if_lifted && !v.fetching)
        .then(|| v.steer(v.tack().heading(v.wind, v.upwind()), LUFF_LIFTED))
}

fn downwind_lifted(v: &View<'_>) -> Option<Decision> {
    if v.off_wind <= v.downwind() + HEADING_TOLERANCE {
        return None;
    }
    if v.flags().downwind_gybe_if_lifted {
        Some(v.change_sides(v.tack().other().heading(v.wind, v.downwind()), GYBE_LIFTED))
    } else if v.flags().downwind_luff_up_if_lifted {
        Some(v.steer(v.tack().heading(v.wind, v.downwind()), LUFF_LIFTED))
    } else {
        None
    }
}

fn downwind_headed(v: &View<'_>) -> Option<Decision> {
    let headed = v.off_wind < v.downwind() - HEADING_TOLERANCE;
    (headed && v.flags().downwind_bear_away_if_headed && !v.fetching)
        .then(|| v.steer(v.tack().heading(v.wind, v.downwind()), BEAR_AWAY_HEADED))
}

/// Change sides once the other tack's (or gybe's) layline through the mark
/// has been reached: on it, past it, or crossed within the next second.
fn layline(v: &View<'_>) -> Option<Decision> {
    if v.fetching || !v.outside_trigger() {
        return None;
    }
    let (off, reason) = match v.situation.leg {
        LegKind::Upwind => (v.upwind(), TACK_LAYLINE),
        LegKind::Downwind => (v.downwind(), GYBE_LAYLINE),
        LegKind::Reach => return None,
    };
    let other = v.tack().other().heading(v.ctx.mean_wind, off);
    let u = unit(other);
    let from_mark = (v.boat.location.x - v.mark.location.x, v.boat.location.y - v.mark.location.y);
    if -(from_mark.0 * u.0 + from_mark.1 * u.1) <= 0.0 {
        return None;
    }
    // the current tack's sailing line approaches the layline from the short side
    let approach = cross(u, unit(v.tack().heading(v.ctx.mean_wind, off)));
    let side = cross(u, from_mark);
    let heading = unit(v.boat.heading);
    let closing = cross(u, (heading.0 * v.sog, heading.1 * v.sog));
    let on = side.abs() <= LAYLINE_EPSILON;
    let over = side * approach > 0.0;
    let crossing = side * closing < 0.0 && side.abs() <= closing.abs();
    (on || over || crossing).then(|| v.change_sides(other, reason))
}

fn course_to_mark(v: &View<'_>) -> Option<Decision> {
    let adjust = v.fetching
        && v.outside_trigger()
        && v.to_mark.bearing.abs_diff(v.boat.heading) > HEADING_TOLERANCE;
    adjust.then(|| v.steer(v.to_mark.bearing, COURSE_TO_MARK))
}

fn rounding(v: &View<'_>) -> Option<Decision> {
    if v.outside_trigger() || !v.mark_ahead() {
        return None;
    }
    let ctx = v.ctx;
    let next = ctx
        .course
        .rounding_heading(v.boat.leg, v.boat.heading, v.wind, ctx.mean_wind, ctx.class);
    let (target, reason) = match next {
        Some(heading) => (heading, ROUNDING),
        None => (v.boat.heading, FINISHING),
    };
    Some(Decision::MarkRounding {
        target,
        direction: v.situation.rounding.turn_direction(),
        mark: v.mark.name.clone(),
        reason: reason.to_string(),
    })
}
