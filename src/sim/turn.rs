//! Turn flow
//!
//! AwaitingLaunch -> Simulating -> RoundResolved -> AwaitingLaunch, cycling
//! through the roster. Captures are collected while a round runs and credited
//! to the shooter when it resolves.

use serde::{Deserialize, Serialize};

use super::state::{CaptureEvent, Disc, DiscRole, TurnPhase};
use crate::config::PLAYER_COUNT;

/// Captured coins per seat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub per_player: [u32; PLAYER_COUNT],
}

impl Scores {
    /// Score for a seat; seats outside the roster have none
    pub fn get(&self, player: usize) -> u32 {
        self.per_player.get(player).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.per_player.iter().sum()
    }
}

/// What happened in a finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    pub player: usize,
    pub captures: Vec<CaptureEvent>,
}

impl RoundSummary {
    pub fn striker_pocketed(&self) -> bool {
        self.captures.iter().any(|c| c.role == DiscRole::Striker)
    }

    /// Coins (not the striker) that count toward the shooter's score
    pub fn scored(&self) -> u32 {
        self.captures
            .iter()
            .filter(|c| c.role != DiscRole::Striker)
            .count() as u32
    }
}

/// Possession handed to the next seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnChange {
    pub from: usize,
    pub to: usize,
    pub scores: Scores,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnMachine {
    phase: TurnPhase,
    current_player: usize,
    /// Rounds completed so far
    round: u32,
    scores: Scores,
    round_captures: Vec<CaptureEvent>,
    summary: Option<RoundSummary>,
}

impl TurnMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn can_launch(&self) -> bool {
        self.phase == TurnPhase::AwaitingLaunch
    }

    /// AwaitingLaunch -> Simulating. False (and no change) in any other phase.
    pub fn begin_round(&mut self) -> bool {
        if !self.can_launch() {
            return false;
        }
        self.phase = TurnPhase::Simulating;
        true
    }

    pub fn record_capture(&mut self, capture: CaptureEvent) {
        self.round_captures.push(capture);
    }

    /// Simulating -> RoundResolved once every disc has slowed below
    /// `rest_epsilon`. Call once per tick after the physics step.
    pub fn evaluate(&mut self, discs: &[Disc], rest_epsilon: f32) -> Option<&RoundSummary> {
        if self.phase != TurnPhase::Simulating {
            return None;
        }
        if !discs.iter().all(|d| d.is_resting(rest_epsilon)) {
            return None;
        }

        self.phase = TurnPhase::RoundResolved;
        self.summary = Some(RoundSummary {
            round: self.round + 1,
            player: self.current_player,
            captures: std::mem::take(&mut self.round_captures),
        });
        self.summary.as_ref()
    }

    /// RoundResolved -> AwaitingLaunch: credit the shooter and pass the turn
    pub fn finish_round(&mut self) -> Option<TurnChange> {
        if self.phase != TurnPhase::RoundResolved {
            return None;
        }
        let summary = self.summary.take()?;

        self.scores.per_player[summary.player] += summary.scored();
        self.round = summary.round;

        let from = self.current_player;
        self.current_player = (self.current_player + 1) % PLAYER_COUNT;
        self.phase = TurnPhase::AwaitingLaunch;

        log::info!(
            "Round {} over: player {} scored {}, turn passes to player {}",
            summary.round,
            from,
            summary.scored(),
            self.current_player
        );

        Some(TurnChange {
            from,
            to: self.current_player,
            scores: self.scores,
        })
    }
}
