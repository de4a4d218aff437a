//! Game session
//!
//! The single owned object a host drives: feed it the tick's input events,
//! render from its snapshot. Menus and pause are modal screens handled here,
//! so no physics runs while one is up.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, PlayerKind};
use crate::error::ConfigError;
use crate::sim::ai::{RandomTarget, TargetStrategy, aim_at};
use crate::sim::launch::{AimLine, LaunchController};
use crate::sim::state::{
    Board, Disc, DiscColor, DiscRole, GameEvent, Screen, TableState, TurnPhase,
};
use crate::sim::tick::{TickInput, tick};
use crate::sim::turn::Scores;

/// Key presses the session understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyToken {
    /// Start from the menu, or resume from pause
    Start,
    /// Toggle pause
    Pause,
    Quit,
}

/// Discrete input polled by the host once per tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown(Vec2),
    PointerDrag(Vec2),
    PointerUp(Vec2),
    Key(KeyToken),
}

/// Everything that happened during one `step`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
}

impl StepOutcome {
    pub fn captures(&self) -> impl Iterator<Item = &crate::sim::state::CaptureEvent> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Captured(c) => Some(c),
            _ => None,
        })
    }

    /// New current player, if the turn passed this step
    pub fn turn_changed(&self) -> Option<usize> {
        self.events.iter().find_map(|e| match e {
            GameEvent::TurnChanged { to, .. } => Some(*to),
            _ => None,
        })
    }

    pub fn launched(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, GameEvent::Launched { .. }))
    }
}

/// Render-facing view of one disc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscView {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub role: DiscRole,
    pub color: DiscColor,
    pub captured: bool,
}

impl From<&Disc> for DiscView {
    fn from(d: &Disc) -> Self {
        Self {
            id: d.id,
            pos: d.pos,
            vel: d.vel,
            radius: d.radius(),
            role: d.role,
            color: d.color,
            captured: d.captured,
        }
    }
}

/// Read-only state for one rendered frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub screen: Screen,
    pub phase: TurnPhase,
    pub current_player: usize,
    pub round: u32,
    pub scores: Scores,
    pub discs: Vec<DiscView>,
    pub aim: Option<AimLine>,
    pub power: f32,
}

#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    table: TableState,
    launcher: LaunchController,
    screen: Screen,
    strategy: Box<dyn TargetStrategy>,
}

impl Session {
    /// Validate the configuration and set up the opening layout
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let strategy = Box::new(RandomTarget::new(config.seed));
        Self::with_strategy(config, strategy)
    }

    /// Same as `new`, with a custom computer targeting policy
    pub fn with_strategy(
        config: GameConfig,
        strategy: Box<dyn TargetStrategy>,
    ) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            log::warn!("Rejected session config: {}", e);
            return Err(e);
        }
        let table = config.build_table()?;
        log::info!(
            "Session initialized: {} discs, {} vs {}",
            table.discs.len(),
            config.players[0].name,
            config.players[1].name
        );
        Ok(Self {
            launcher: LaunchController::new(config.launch.clone()),
            config,
            table,
            screen: Screen::MainMenu,
            strategy,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn phase(&self) -> TurnPhase {
        self.table.turn.phase()
    }

    pub fn current_player(&self) -> usize {
        self.table.turn.current_player()
    }

    pub fn scores(&self) -> Scores {
        self.table.turn.scores()
    }

    pub fn round(&self) -> u32 {
        self.table.turn.round()
    }

    pub fn discs(&self) -> &[Disc] {
        &self.table.discs
    }

    pub fn board(&self) -> &Board {
        self.table.board()
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    /// False once the player asked to quit
    pub fn is_running(&self) -> bool {
        self.screen != Screen::Exited
    }

    pub fn board_cleared(&self) -> bool {
        self.table.board_cleared()
    }

    /// Advance one tick: handle input, then run physics if playing
    pub fn step(&mut self, inputs: &[InputEvent]) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        let mut launch = None;

        for input in inputs {
            match *input {
                InputEvent::Key(key) => self.handle_key(key, &mut outcome),
                InputEvent::PointerDown(at) if self.accepts_pointer() => {
                    let ready = self.table.turn.can_launch() && self.table.striker_ready();
                    self.launcher.press(at, ready);
                }
                InputEvent::PointerDrag(at) if self.accepts_pointer() => self.launcher.drag(at),
                InputEvent::PointerUp(at) if self.accepts_pointer() => {
                    let striker_pos = self.table.striker().pos;
                    launch = self.launcher.release(at, striker_pos).or(launch);
                }
                _ => {}
            }
        }

        if self.screen != Screen::Playing {
            return outcome;
        }

        if launch.is_none() {
            launch = self.computer_shot();
        }
        if self.launcher.is_aiming() {
            let striker_pos = self.table.striker().pos;
            self.launcher.hold(striker_pos);
        }

        let events = tick(
            &mut self.table,
            &TickInput { launch },
            &self.config.physics,
        );
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::TurnChanged { .. }))
        {
            self.launcher.cancel();
        }
        outcome.events.extend(events);
        outcome
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> Snapshot {
        let striker_pos = self.table.striker().pos;
        Snapshot {
            tick: self.table.time_ticks,
            screen: self.screen,
            phase: self.phase(),
            current_player: self.current_player(),
            round: self.round(),
            scores: self.scores(),
            discs: self.table.discs.iter().map(DiscView::from).collect(),
            aim: self.launcher.aim_line(striker_pos),
            power: self.launcher.power(),
        }
    }

    fn current_kind(&self) -> PlayerKind {
        self.config.players[self.current_player()].kind
    }

    fn accepts_pointer(&self) -> bool {
        self.screen == Screen::Playing && self.current_kind() == PlayerKind::Human
    }

    /// Launch velocity for a computer player whose shot is due
    fn computer_shot(&mut self) -> Option<Vec2> {
        if self.current_kind() != PlayerKind::Computer
            || !self.table.turn.can_launch()
            || !self.table.striker_ready()
        {
            return None;
        }
        let color = self.config.players[self.current_player()].color;
        let target = self.strategy.choose_target(&self.table.discs, color)?;
        let speed = self.config.launch.max_speed * self.config.launch.ai_power.min(1.0);
        let velocity = aim_at(self.table.striker(), &self.table.discs[target], speed);
        log::debug!(
            "Computer player {} aims at disc {}",
            self.current_player(),
            self.table.discs[target].id
        );
        (velocity != Vec2::ZERO).then_some(velocity)
    }

    fn handle_key(&mut self, key: KeyToken, outcome: &mut StepOutcome) {
        let next = match (self.screen, key) {
            (Screen::Exited, _) => return,
            (_, KeyToken::Quit) => Screen::Exited,
            (Screen::MainMenu, KeyToken::Start) => Screen::Playing,
            (Screen::Playing, KeyToken::Pause) => Screen::Paused,
            (Screen::Paused, KeyToken::Pause | KeyToken::Start) => Screen::Playing,
            _ => return,
        };
        if next != Screen::Playing {
            self.launcher.cancel();
        }
        log::info!("Screen {:?} -> {:?}", self.screen, next);
        outcome.events.push(GameEvent::ScreenChanged {
            from: self.screen,
            to: next,
        });
        self.screen = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CoinLayout, LaunchMode, PlayerConfig};
    use crate::sim::ai::NearestTarget;

    fn human_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.players = [
            PlayerConfig::human("Ana", DiscColor::White),
            PlayerConfig::human("Ben", DiscColor::Black),
        ];
        config
    }

    fn playing(config: GameConfig) -> Session {
        let mut session = Session::new(config).unwrap();
        session.step(&[InputEvent::Key(KeyToken::Start)]);
        assert_eq!(session.screen(), Screen::Playing);
        session
    }

    fn drag_shot(session: &mut Session, from: Vec2, to: Vec2) -> StepOutcome {
        session.step(&[
            InputEvent::PointerDown(from),
            InputEvent::PointerDrag(to),
            InputEvent::PointerUp(to),
        ])
    }

    fn run_until_turn_change(session: &mut Session) -> StepOutcome {
        for _ in 0..20_000 {
            let outcome = session.step(&[]);
            if outcome.turn_changed().is_some() {
                return outcome;
            }
        }
        panic!("turn never changed");
    }

    #[test]
    fn test_invalid_config_refuses_to_start() {
        let mut config = GameConfig::default();
        config.board.striker_radius = -1.0;
        assert_eq!(
            Session::new(config).unwrap_err(),
            ConfigError::InvalidRadius(-1.0)
        );
    }

    #[test]
    fn test_menu_blocks_physics() {
        let mut session = Session::new(human_config()).unwrap();
        assert_eq!(session.screen(), Screen::MainMenu);
        let outcome = drag_shot(&mut session, Vec2::new(400.0, 700.0), Vec2::new(400.0, 750.0));
        assert!(outcome.events.is_empty());
        assert_eq!(session.snapshot().tick, 0);
        assert_eq!(session.phase(), TurnPhase::AwaitingLaunch);
    }

    #[test]
    fn test_drag_launch_from_reference_point() {
        let mut session = playing(human_config());
        let outcome = drag_shot(&mut session, Vec2::new(400.0, 700.0), Vec2::new(400.0, 750.0));

        let launched = outcome.events.iter().find_map(|e| match e {
            GameEvent::Launched { velocity, .. } => Some(*velocity),
            _ => None,
        });
        let velocity = launched.unwrap();
        assert!(velocity.x.abs() < 1e-6);
        assert!((velocity.y + 5.0).abs() < 1e-5);
        assert_eq!(session.phase(), TurnPhase::Simulating);
        assert!(session.snapshot().aim.is_none());
    }

    #[test]
    fn test_launch_while_simulating_is_ignored() {
        let mut session = playing(human_config());
        drag_shot(&mut session, Vec2::new(400.0, 700.0), Vec2::new(400.0, 750.0));
        let outcome = drag_shot(&mut session, Vec2::new(400.0, 700.0), Vec2::new(300.0, 700.0));
        assert!(!outcome.launched());
        assert!(session.discs()[0].vel.x.abs() < 1e-6);
    }

    #[test]
    fn test_turn_alternates_between_players() {
        let mut session = playing(human_config());
        drag_shot(&mut session, Vec2::new(400.0, 700.0), Vec2::new(400.0, 710.0));
        let outcome = run_until_turn_change(&mut session);
        assert_eq!(outcome.turn_changed(), Some(1));
        assert_eq!(session.phase(), TurnPhase::AwaitingLaunch);
        assert_eq!(session.round(), 1);

        drag_shot(&mut session, Vec2::new(400.0, 700.0), Vec2::new(390.0, 700.0));
        let outcome = run_until_turn_change(&mut session);
        assert_eq!(outcome.turn_changed(), Some(0));
    }

    #[test]
    fn test_pause_suspends_and_cancels_gesture() {
        let mut session = playing(human_config());
        drag_shot(&mut session, Vec2::new(400.0, 700.0), Vec2::new(400.0, 760.0));
        session.step(&[InputEvent::Key(KeyToken::Pause)]);
        assert_eq!(session.screen(), Screen::Paused);

        let before = session.snapshot();
        for _ in 0..10 {
            session.step(&[]);
        }
        let after = session.snapshot();
        assert_eq!(before.discs, after.discs);
        assert_eq!(before.tick, after.tick);

        session.step(&[InputEvent::Key(KeyToken::Pause)]);
        assert_eq!(session.screen(), Screen::Playing);
        assert!(session.snapshot().tick > after.tick);
    }

    #[test]
    fn test_quit_stops_session() {
        let mut session = playing(human_config());
        let outcome = session.step(&[InputEvent::Key(KeyToken::Quit)]);
        assert!(!session.is_running());
        assert_eq!(
            outcome.events,
            vec![GameEvent::ScreenChanged {
                from: Screen::Playing,
                to: Screen::Exited
            }]
        );
        assert!(session.step(&[InputEvent::Key(KeyToken::Start)]).events.is_empty());
    }

    #[test]
    fn test_aim_line_in_snapshot() {
        let mut session = playing(human_config());
        session.step(&[
            InputEvent::PointerDown(Vec2::new(400.0, 700.0)),
            InputEvent::PointerDrag(Vec2::new(410.0, 740.0)),
        ]);
        let aim = session.snapshot().aim.unwrap();
        assert_eq!(aim.from, Vec2::new(400.0, 700.0));
        assert_eq!(aim.to, Vec2::new(410.0, 740.0));
    }

    #[test]
    fn test_charge_and_aim_launch() {
        let mut config = human_config();
        config.launch.mode = LaunchMode::ChargeAndAim;
        let mut session = playing(config);

        session.step(&[
            InputEvent::PointerDown(Vec2::new(400.0, 700.0)),
            InputEvent::PointerDrag(Vec2::new(400.0, 500.0)),
        ]);
        for _ in 0..9 {
            session.step(&[]);
        }
        assert!((session.snapshot().power - 5.0).abs() < 1e-4);

        let outcome = session.step(&[InputEvent::PointerUp(Vec2::new(400.0, 500.0))]);
        assert!(outcome.launched());
        assert_eq!(session.snapshot().power, 0.0);
        assert!(session.discs()[0].vel.y < 0.0);
    }

    #[test]
    fn test_computer_takes_its_turn() {
        let mut config = GameConfig::default().computer_vs_computer();
        config.board.layout = CoinLayout::Row { count: 3 };
        let mut session =
            Session::with_strategy(config, Box::new(NearestTarget)).unwrap();
        let outcome = session.step(&[InputEvent::Key(KeyToken::Start)]);
        assert!(outcome.launched());
        assert_eq!(session.phase(), TurnPhase::Simulating);
        // Straight up at the row
        assert!(session.discs()[0].vel.y < 0.0);
    }

    #[test]
    fn test_human_pointer_ignored_on_computer_turn() {
        let mut config = human_config();
        config.players[0].kind = PlayerKind::Computer;
        let mut session = playing(config);
        // The computer already shot on the Start step
        assert_eq!(session.phase(), TurnPhase::Simulating);
        session.step(&[InputEvent::PointerDown(Vec2::new(400.0, 700.0))]);
        assert!(session.snapshot().aim.is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let session = Session::new(GameConfig::default()).unwrap();
        let json = serde_json::to_string(&session.snapshot()).unwrap();
        assert!(json.contains("\"screen\":\"MainMenu\""));
        assert!(json.contains("\"phase\":\"AwaitingLaunch\""));
    }
}
