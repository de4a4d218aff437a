//! Computer aim
//!
//! A trivial opponent: pick a live coin and shoot the striker straight at it.
//! Target choice is a pluggable strategy so tests can use a fixed policy.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Disc, DiscColor, DiscRole};

/// Chooses which disc the computer aims at
pub trait TargetStrategy: fmt::Debug + Send {
    /// Index into `discs` of the chosen target, or None if nothing is left
    fn choose_target(&mut self, discs: &[Disc], color: DiscColor) -> Option<usize>;
}

/// Live coins worth aiming at: the player's own color when any remain,
/// otherwise anything still on the board (the striker never counts)
pub fn live_targets(discs: &[Disc], color: DiscColor) -> Vec<usize> {
    let live = || {
        discs
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_active() && d.role != DiscRole::Striker)
    };
    let own: Vec<usize> = live().filter(|(_, d)| d.color == color).map(|(i, _)| i).collect();
    if own.is_empty() {
        live().map(|(i, _)| i).collect()
    } else {
        own
    }
}

/// Uniformly random live target from a seeded PCG stream
#[derive(Debug, Clone)]
pub struct RandomTarget {
    rng: Pcg32,
}

impl RandomTarget {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl TargetStrategy for RandomTarget {
    fn choose_target(&mut self, discs: &[Disc], color: DiscColor) -> Option<usize> {
        let targets = live_targets(discs, color);
        if targets.is_empty() {
            return None;
        }
        Some(targets[self.rng.random_range(0..targets.len())])
    }
}

/// Always the live target closest to the striker
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestTarget;

impl TargetStrategy for NearestTarget {
    fn choose_target(&mut self, discs: &[Disc], color: DiscColor) -> Option<usize> {
        let striker = discs.iter().find(|d| d.role == DiscRole::Striker)?;
        live_targets(discs, color).into_iter().min_by(|&a, &b| {
            let da = discs[a].pos.distance_squared(striker.pos);
            let db = discs[b].pos.distance_squared(striker.pos);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// Velocity that sends the striker straight at `target`
pub fn aim_at(striker: &Disc, target: &Disc, speed: f32) -> Vec2 {
    (target.pos - striker.pos).normalize_or_zero() * speed
}
