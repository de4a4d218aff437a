//! Game configuration
//!
//! An immutable description of the board, physics and launch tuning that a
//! session is built from. Loaded from JSON by hosts; every field has a
//! default matching the reference board.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::state::{Board, Disc, DiscColor, DiscRole, MassPolicy, Rect, TableState};

/// Gap left between neighbouring coins in generated layouts
const LAYOUT_GAP: f32 = 0.5;

/// Launch gesture model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LaunchMode {
    /// Pull back from the press point and release
    #[default]
    DragRelease,
    /// Hold to build power, release toward the pointer
    ChargeAndAim,
}

/// Who controls a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerKind {
    #[default]
    Human,
    /// Aims at a live target chosen by the session's strategy
    Computer,
}

/// Starting arrangement of the coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinLayout {
    /// A horizontal row; the middle coin is the special disc
    Row { count: u32 },
    /// The special disc in the center with a ring of coins around it
    Ring { count: u32 },
}

impl Default for CoinLayout {
    fn default() -> Self {
        CoinLayout::Ring { count: 6 }
    }
}

impl CoinLayout {
    /// Coin centers with their roles and colors, special disc included
    pub fn place(&self, center: Vec2, radius: f32) -> Vec<(Vec2, DiscRole, DiscColor)> {
        let spacing = radius * 2.0 + LAYOUT_GAP;
        let mut ordinary = 0u32;
        let mut next_ordinary = |pos: Vec2| {
            let color = if ordinary % 2 == 0 {
                DiscColor::White
            } else {
                DiscColor::Black
            };
            ordinary += 1;
            (pos, DiscRole::Ordinary, color)
        };

        match *self {
            CoinLayout::Row { count } => {
                let middle = count / 2;
                let half_span = (count.saturating_sub(1)) as f32 / 2.0;
                (0..count)
                    .map(|i| {
                        let pos = center + Vec2::new((i as f32 - half_span) * spacing, 0.0);
                        if i == middle {
                            (pos, DiscRole::Special, DiscColor::Red)
                        } else {
                            next_ordinary(pos)
                        }
                    })
                    .collect()
            }
            CoinLayout::Ring { count } => {
                let mut placed = vec![(center, DiscRole::Special, DiscColor::Red)];
                let step = std::f32::consts::TAU / count.max(1) as f32;
                placed.extend((0..count).map(|i| {
                    let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * step;
                    next_ordinary(center + crate::direction_from_angle(angle) * spacing)
                }));
                placed
            }
        }
    }

    fn count(&self) -> u32 {
        match *self {
            CoinLayout::Row { count } | CoinLayout::Ring { count } => count,
        }
    }
}

/// Board geometry and starting layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: f32,
    pub height: f32,
    /// Margin between the board edge and the playable rectangle
    pub border: f32,
    pub pocket_radius: f32,
    /// Explicit pocket anchors; the inner corners when absent
    pub pocket_anchors: Option<Vec<Vec2>>,
    pub striker_radius: f32,
    pub striker_spawn: Vec2,
    pub coin_radius: f32,
    pub coin_center: Vec2,
    pub layout: CoinLayout,
    pub mass_policy: MassPolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            border: BOARD_BORDER,
            pocket_radius: POCKET_RADIUS,
            pocket_anchors: None,
            striker_radius: STRIKER_RADIUS,
            striker_spawn: Vec2::new(STRIKER_SPAWN_X, STRIKER_SPAWN_Y),
            coin_radius: COIN_RADIUS,
            coin_center: Vec2::new(COIN_CENTER_X, COIN_CENTER_Y),
            layout: CoinLayout::default(),
            mass_policy: MassPolicy::Uniform,
        }
    }
}

impl BoardConfig {
    /// Inner playable rectangle
    pub fn bounds(&self) -> Result<Rect, ConfigError> {
        let min = Vec2::splat(self.border);
        let max = Vec2::new(self.width - self.border, self.height - self.border);
        let size = max - min;
        if !(size.x > 0.0 && size.y > 0.0 && size.is_finite()) {
            return Err(ConfigError::DegenerateBounds {
                width: self.width,
                height: self.height,
                border: self.border,
            });
        }
        Ok(Rect::new(min, max))
    }

    pub fn build_board(&self) -> Result<Board, ConfigError> {
        let bounds = self.bounds()?;
        match &self.pocket_anchors {
            Some(anchors) => Board::new(bounds, anchors, self.pocket_radius),
            None => Board::with_corner_pockets(bounds, self.pocket_radius),
        }
    }

    /// Striker first, then coins in layout order
    pub fn build_discs(&self) -> Result<Vec<Disc>, ConfigError> {
        if self.layout.count() == 0 {
            return Err(ConfigError::EmptyLayout);
        }
        let striker = Disc::new(
            0,
            self.striker_spawn,
            self.striker_radius,
            self.mass_policy.mass_for(self.striker_radius),
            DiscRole::Striker,
            DiscColor::White,
        )?;

        let mut discs = vec![striker];
        for (i, (pos, role, color)) in self
            .layout
            .place(self.coin_center, self.coin_radius)
            .into_iter()
            .enumerate()
        {
            discs.push(Disc::new(
                i as u32 + 1,
                pos,
                self.coin_radius,
                self.mass_policy.mass_for(self.coin_radius),
                role,
                color,
            )?);
        }
        Ok(discs)
    }
}

/// Integrator and solver tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub dt: f32,
    /// Velocity multiplier per tick, in (0, 1)
    pub friction: f32,
    /// Per-component snap-to-zero threshold
    pub stop_threshold: f32,
    /// Speed below which a disc counts as stopped for turn purposes
    pub rest_epsilon: f32,
    pub solver_passes: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            dt: SIM_DT,
            friction: FRICTION,
            stop_threshold: STOP_THRESHOLD,
            rest_epsilon: REST_EPSILON,
            solver_passes: SOLVER_PASSES,
        }
    }
}

/// Launch gesture tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub mode: LaunchMode,
    /// Drag distance (or pointer distance when charging) to speed
    pub drag_scale: f32,
    pub max_speed: f32,
    /// Power gained per held tick in charge mode
    pub charge_rate: f32,
    /// Fraction of `max_speed` computer players shoot with
    pub ai_power: f32,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            mode: LaunchMode::DragRelease,
            drag_scale: DRAG_SCALE,
            max_speed: MAX_LAUNCH_SPEED,
            charge_rate: CHARGE_RATE,
            ai_power: AI_POWER,
        }
    }
}

/// One seat in the two-player roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    /// Coin color this player aims for
    pub color: DiscColor,
    pub kind: PlayerKind,
}

impl PlayerConfig {
    pub fn human(name: &str, color: DiscColor) -> Self {
        Self {
            name: name.to_string(),
            color,
            kind: PlayerKind::Human,
        }
    }

    pub fn computer(name: &str, color: DiscColor) -> Self {
        Self {
            name: name.to_string(),
            color,
            kind: PlayerKind::Computer,
        }
    }
}

/// Number of seats at the table
pub const PLAYER_COUNT: usize = 2;

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub physics: PhysicsConfig,
    pub launch: LaunchConfig,
    pub players: [PlayerConfig; PLAYER_COUNT],
    /// Seed for randomized computer aim
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            physics: PhysicsConfig::default(),
            launch: LaunchConfig::default(),
            players: [
                PlayerConfig::human("Player 1", DiscColor::White),
                PlayerConfig::computer("Computer", DiscColor::Black),
            ],
            seed: 0,
        }
    }
}

fn require_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Both seats played by the computer (demo / attract mode)
    pub fn computer_vs_computer(mut self) -> Self {
        for player in &mut self.players {
            player.kind = PlayerKind::Computer;
        }
        self
    }

    /// Check every tuning value and the starting layout
    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;
        if !(physics.friction > 0.0 && physics.friction < 1.0) {
            return Err(ConfigError::InvalidFriction(physics.friction));
        }
        require_positive("dt", physics.dt)?;
        require_positive("stop_threshold", physics.stop_threshold)?;
        require_positive("rest_epsilon", physics.rest_epsilon)?;
        require_positive("solver_passes", physics.solver_passes as f32)?;
        if physics.rest_epsilon <= physics.stop_threshold {
            return Err(ConfigError::RestBelowStop {
                rest: physics.rest_epsilon,
                stop: physics.stop_threshold,
            });
        }

        let launch = &self.launch;
        require_positive("drag_scale", launch.drag_scale)?;
        require_positive("max_speed", launch.max_speed)?;
        require_positive("charge_rate", launch.charge_rate)?;
        require_positive("ai_power", launch.ai_power)?;

        self.build_table().map(|_| ())
    }

    /// Build the starting table; fails on any invalid geometry
    pub fn build_table(&self) -> Result<TableState, ConfigError> {
        let board = self.board.build_board()?;
        let discs = self.board.build_discs()?;
        TableState::new(board, discs)
    }
}
