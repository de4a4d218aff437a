//! Board state and core simulation types
//!
//! Everything the physics step mutates lives in `TableState`. The board
//! geometry is fixed at construction and never changes afterward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::turn::{Scores, TurnMachine};
use crate::consts::OVERLAP_TOLERANCE;
use crate::error::ConfigError;

/// What a disc is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscRole {
    /// The player-launched disc
    Striker,
    Ordinary,
    /// The single privileged disc (the queen)
    Special,
}

/// Disc colors from the reference board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiscColor {
    #[default]
    White,
    Black,
    Red,
}

/// How disc mass is derived at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MassPolicy {
    /// Every disc weighs 1
    #[default]
    Uniform,
    /// Mass equals radius, so the striker outweighs coins
    ProportionalToRadius,
}

impl MassPolicy {
    pub fn mass_for(&self, radius: f32) -> f32 {
        match self {
            MassPolicy::Uniform => 1.0,
            MassPolicy::ProportionalToRadius => radius,
        }
    }
}

/// A circular game piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    pub id: u32,
    pub pos: Vec2,
    /// Units per tick
    pub vel: Vec2,
    radius: f32,
    mass: f32,
    pub role: DiscRole,
    pub color: DiscColor,
    /// Pocketed discs never move or collide again
    pub captured: bool,
}

impl Disc {
    /// Create a resting disc, rejecting non-positive radius or mass
    pub fn new(
        id: u32,
        pos: Vec2,
        radius: f32,
        mass: f32,
        role: DiscRole,
        color: DiscColor,
    ) -> Result<Self, ConfigError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::InvalidRadius(radius));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(ConfigError::InvalidMass(mass));
        }
        Ok(Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            mass,
            role,
            color,
            captured: false,
        })
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Still on the board and taking part in physics
    pub fn is_active(&self) -> bool {
        !self.captured
    }

    pub fn is_resting(&self, rest_epsilon: f32) -> bool {
        self.captured || self.speed() < rest_epsilon
    }

    pub fn kinetic_energy(&self) -> f32 {
        if self.captured {
            0.0
        } else {
            super::motion::kinetic_energy(self.mass, self.vel)
        }
    }

    /// Remove from play. Captured discs keep their last position.
    pub fn capture(&mut self) {
        self.captured = true;
        self.vel = Vec2::ZERO;
    }

    /// True if the two discs interpenetrate by more than the tolerance
    pub fn overlaps(&self, other: &Disc) -> bool {
        self.pos.distance(other.pos) < self.radius + other.radius - OVERLAP_TOLERANCE
    }
}

/// Axis-aligned playable rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            Vec2::new(self.min.x, self.max.y),
            self.max,
        ]
    }

    /// Whether a circle lies fully inside
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        center.x - radius >= self.min.x
            && center.x + radius <= self.max.x
            && center.y - radius >= self.min.y
            && center.y + radius <= self.max.y
    }
}

/// Number of corner pockets on a board
pub const POCKET_COUNT: usize = 4;

/// Immutable board geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    bounds: Rect,
    pockets: [Vec2; POCKET_COUNT],
    pocket_radius: f32,
}

impl Board {
    pub fn new(bounds: Rect, anchors: &[Vec2], pocket_radius: f32) -> Result<Self, ConfigError> {
        let pockets: [Vec2; POCKET_COUNT] = anchors
            .try_into()
            .map_err(|_| ConfigError::PocketCount(anchors.len()))?;
        if !(pocket_radius.is_finite() && pocket_radius > 0.0) {
            return Err(ConfigError::InvalidPocketRadius(pocket_radius));
        }
        let size = bounds.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(ConfigError::DegenerateBounds {
                width: size.x,
                height: size.y,
                border: 0.0,
            });
        }
        Ok(Self {
            bounds,
            pockets,
            pocket_radius,
        })
    }

    /// Board with one pocket anchored at each inner corner
    pub fn with_corner_pockets(bounds: Rect, pocket_radius: f32) -> Result<Self, ConfigError> {
        Self::new(bounds, &bounds.corners(), pocket_radius)
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn pockets(&self) -> &[Vec2; POCKET_COUNT] {
        &self.pockets
    }

    pub fn pocket_radius(&self) -> f32 {
        self.pocket_radius
    }
}

/// Turn flow phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Striker at rest, waiting for the current player's shot
    #[default]
    AwaitingLaunch,
    /// Discs in motion
    Simulating,
    /// Everything stopped, round being scored
    RoundResolved,
}

/// Modal screen the host is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    MainMenu,
    Playing,
    Paused,
    /// Quit requested; the host should stop its loop
    Exited,
}

/// A disc dropping into a pocket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureEvent {
    pub disc_id: u32,
    pub role: DiscRole,
    pub color: DiscColor,
    pub pocket: usize,
}

/// Events reported by a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Launched { player: usize, velocity: Vec2 },
    /// A disc rebounded off at least one wall
    WallBounce { disc: u32 },
    /// Two discs exchanged momentum (ids, lower index first)
    Collision { a: u32, b: u32 },
    Captured(CaptureEvent),
    RoundResolved {
        round: u32,
        player: usize,
        captured: u32,
        striker_pocketed: bool,
    },
    StrikerRespawned { pos: Vec2 },
    TurnChanged { from: usize, to: usize, scores: Scores },
    ScreenChanged { from: Screen, to: Screen },
}

/// All mutable table state advanced by `tick`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableState {
    board: Board,
    /// Stable order; pair resolution walks ascending indices
    pub discs: Vec<Disc>,
    pub turn: TurnMachine,
    /// Simulation tick counter
    pub time_ticks: u64,
    striker_index: usize,
    striker_spawn: Vec2,
}

impl TableState {
    /// Build a table from placed discs. Exactly one disc must be the striker.
    pub fn new(board: Board, discs: Vec<Disc>) -> Result<Self, ConfigError> {
        let striker_index = discs
            .iter()
            .position(|d| d.role == DiscRole::Striker)
            .ok_or(ConfigError::MissingStriker)?;
        let bounds = board.bounds();
        for (i, disc) in discs.iter().enumerate() {
            if !bounds.contains_circle(disc.pos, disc.radius()) {
                return Err(ConfigError::OutOfBounds(i));
            }
            for (j, other) in discs.iter().enumerate().skip(i + 1) {
                if disc.overlaps(other) {
                    return Err(ConfigError::OverlappingLayout(i, j));
                }
            }
        }
        let striker_spawn = discs[striker_index].pos;
        Ok(Self {
            board,
            discs,
            turn: TurnMachine::new(),
            time_ticks: 0,
            striker_index,
            striker_spawn,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn striker(&self) -> &Disc {
        &self.discs[self.striker_index]
    }

    pub fn striker_mut(&mut self) -> &mut Disc {
        &mut self.discs[self.striker_index]
    }

    pub fn striker_index(&self) -> usize {
        self.striker_index
    }

    /// Striker is on the board and exactly stopped
    pub fn striker_ready(&self) -> bool {
        let striker = self.striker();
        striker.is_active() && striker.vel == Vec2::ZERO
    }

    pub fn all_resting(&self, rest_epsilon: f32) -> bool {
        self.discs.iter().all(|d| d.is_resting(rest_epsilon))
    }

    pub fn total_kinetic_energy(&self) -> f32 {
        self.discs.iter().map(Disc::kinetic_energy).sum()
    }

    /// No coins (ordinary or special) left on the board
    pub fn board_cleared(&self) -> bool {
        self.discs
            .iter()
            .filter(|d| d.role != DiscRole::Striker)
            .all(|d| d.captured)
    }

    /// Zero any residual drift once a round is over
    pub fn settle(&mut self) {
        for disc in &mut self.discs {
            disc.vel = Vec2::ZERO;
        }
    }

    /// Put a pocketed striker back on its baseline, sliding sideways
    /// until it finds a free spot. A fully blocked baseline moves the search
    /// one row at a time toward the board center. Returns the chosen position.
    pub fn respawn_striker(&mut self) -> Vec2 {
        let radius = self.striker().radius();
        let step = radius * 2.0 + 1.0;
        let bounds = self.board.bounds();
        let spawn = self.striker_spawn;
        let inward = if (bounds.min.y + bounds.max.y) / 2.0 < spawn.y {
            -step
        } else {
            step
        };

        let is_free = |pos: Vec2, discs: &[Disc], skip: usize| {
            bounds.contains_circle(pos, radius)
                && discs.iter().enumerate().all(|(i, d)| {
                    i == skip
                        || d.captured
                        || d.pos.distance(pos) >= d.radius() + radius
                })
        };

        let cols = (bounds.size().x / step).ceil() as i32;
        let rows = (bounds.size().y / step).ceil() as i32;
        let found = (0..=rows)
            .flat_map(|row| {
                let base = spawn + Vec2::new(0.0, row as f32 * inward);
                (0..=cols).flat_map(move |k| {
                    let offset = Vec2::new(k as f32 * step, 0.0);
                    [base + offset, base - offset]
                })
            })
            .find(|&p| is_free(p, &self.discs, self.striker_index));

        let pos = match found {
            Some(pos) => pos,
            None => {
                log::warn!(
                    "No free spot for the striker, respawning over ({:.1}, {:.1})",
                    spawn.x,
                    spawn.y
                );
                spawn
            }
        };

        let striker = self.striker_mut();
        striker.pos = pos;
        striker.vel = Vec2::ZERO;
        striker.captured = false;
        log::debug!("Striker respawned at ({:.1}, {:.1})", pos.x, pos.y);
        pos
    }
}
