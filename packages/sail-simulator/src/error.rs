//! error.rs — Error taxonomy for the simulator core
//!
//! Configuration errors are detected when a scenario is loaded and are fatal:
//! no clock is ever built from an invalid scenario. Tactics errors are
//! invariant violations found mid-run; they abort the batch that hit them.

/// Malformed scenario, detected at load time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scenario area must have positive width and height")]
    InvalidArea,

    #[error("gradient flow component '{component}' has no speed samples")]
    MissingGradientSamples { component: String },

    #[error("{field} flow has no coverage at ({x:.1}, {y:.1})")]
    UncoveredFlow { field: String, x: f64, y: f64 },

    #[error("flow region '{region}' needs at least three polygon points")]
    DegeneratePolygon { region: String },

    #[error("course has no marks")]
    EmptyCourse,

    #[error("boat '{boat}' has no assigned leg")]
    BoatWithoutLeg { boat: String },

    #[error("invalid clock settings: {reason}")]
    InvalidClock { reason: String },

    #[error("shift report threshold {0} must be a positive number of degrees")]
    InvalidShiftThreshold(f64),

    #[error("invalid boat polar: {reason}")]
    InvalidPolar { reason: String },

    #[error("unknown scenario preset '{0}'")]
    UnknownPreset(String),
}

/// Anything that stops a simulation batch.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("tactics invariant violated for boat '{boat}' at second {second}: {detail}")]
    Tactics { boat: String, second: u64, detail: String },
}
