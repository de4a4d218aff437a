//! Carom - A carrom board physics and turn engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, pockets, turns)
//! - `session`: The owned game session a host drives one tick at a time
//! - `config`: Data-driven board, physics and launch tuning
//! - `error`: Configuration and host errors

pub mod config;
pub mod error;
pub mod session;
pub mod sim;

pub use config::{GameConfig, LaunchMode, PlayerConfig, PlayerKind};
pub use error::{ConfigError, SimError};
pub use session::{InputEvent, KeyToken, Session, Snapshot, StepOutcome};
pub use sim::state::Screen;

use glam::Vec2;

/// Reference constants for the standard board
pub mod consts {
    /// Host tick rate (Hz)
    pub const TICK_RATE: u32 = 60;
    /// Simulation timestep in board units (velocities are units/tick)
    pub const SIM_DT: f32 = 1.0;

    /// Board dimensions
    pub const BOARD_WIDTH: f32 = 800.0;
    pub const BOARD_HEIGHT: f32 = 800.0;
    pub const BOARD_BORDER: f32 = 0.0;
    pub const POCKET_RADIUS: f32 = 30.0;

    /// Striker defaults - starts on the near baseline
    pub const STRIKER_RADIUS: f32 = 20.0;
    pub const STRIKER_SPAWN_X: f32 = 400.0;
    pub const STRIKER_SPAWN_Y: f32 = 700.0;

    /// Coin defaults
    pub const COIN_RADIUS: f32 = 15.0;
    pub const COIN_CENTER_X: f32 = 400.0;
    pub const COIN_CENTER_Y: f32 = 400.0;

    /// Velocity multiplier applied every tick
    pub const FRICTION: f32 = 0.99;
    /// Per-component speed below which a disc snaps to a stop
    pub const STOP_THRESHOLD: f32 = 0.05;
    /// Speed below which a disc counts as resting for turn purposes
    pub const REST_EPSILON: f32 = 0.1;
    /// Pairwise resolution passes per tick
    pub const SOLVER_PASSES: u32 = 8;

    /// Drag distance to launch speed
    pub const DRAG_SCALE: f32 = 0.1;
    /// Maximum striker launch speed (units/tick)
    pub const MAX_LAUNCH_SPEED: f32 = 25.0;
    /// Charge gained per held tick in charge-and-aim mode
    pub const CHARGE_RATE: f32 = 0.5;
    /// Fraction of max launch speed used by computer players
    pub const AI_POWER: f32 = 0.6;

    /// Tolerance for overlap checks after a resolved step
    pub const OVERLAP_TOLERANCE: f32 = 1e-3;
}

/// Unit vector for an angle (radians)
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
