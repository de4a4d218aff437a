//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by disc index)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod launch;
pub mod motion;
pub mod state;
pub mod tick;
pub mod turn;

pub use ai::{NearestTarget, RandomTarget, TargetStrategy};
pub use collision::{
    Contact, WallHit, capture_pocketed, max_overlap, reflect_off_walls, resolve_collisions,
    resolve_pair,
};
pub use launch::{AimLine, LaunchController};
pub use motion::{integrate, integrate_all};
pub use state::{
    Board, CaptureEvent, Disc, DiscColor, DiscRole, GameEvent, MassPolicy, POCKET_COUNT, Rect,
    Screen, TableState, TurnPhase,
};
pub use tick::{TickInput, tick};
pub use turn::{RoundSummary, Scores, TurnChange, TurnMachine};
