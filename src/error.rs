//! Error types
//!
//! The simulation itself is infallible once a session exists. Everything that
//! can go wrong happens while building a session from configuration.

use thiserror::Error;

/// Reasons a configuration cannot start a session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("disc radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("disc mass must be positive and finite, got {0}")]
    InvalidMass(f32),
    #[error("board needs exactly 4 pockets, got {0}")]
    PocketCount(usize),
    #[error("pocket radius must be positive, got {0}")]
    InvalidPocketRadius(f32),
    #[error("border {border} leaves no playable area on a {width}x{height} board")]
    DegenerateBounds { width: f32, height: f32, border: f32 },
    #[error("friction must be in (0, 1), got {0}")]
    InvalidFriction(f32),
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("rest epsilon {rest} must be larger than stop threshold {stop}")]
    RestBelowStop { rest: f32, stop: f32 },
    #[error("layout needs at least one coin")]
    EmptyLayout,
    #[error("table has no striker")]
    MissingStriker,
    #[error("discs {0} and {1} overlap in the initial layout")]
    OverlappingLayout(usize, usize),
    #[error("disc {0} starts outside the playable area")]
    OutOfBounds(usize),
    #[error("invalid config json: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e.to_string())
    }
}

/// Errors surfaced to a host process
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}
