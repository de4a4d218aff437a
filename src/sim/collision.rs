//! Collision detection and response
//!
//! Wall rebounds against the playable rectangle, pocket capture at the
//! corner anchors, and elastic disc-disc impulses with de-penetration.

use glam::Vec2;

use super::state::{Board, CaptureEvent, Disc, Rect};
use crate::consts::OVERLAP_TOLERANCE;

/// Extra push applied on top of the half-overlap when separating a pair
const SEPARATION_PADDING: f32 = 0.05;
/// Position-only sweeps allowed after the impulse passes
const MAX_SETTLE_SWEEPS: u32 = 64;

/// Which walls a disc touched this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHit {
    pub x: bool,
    pub y: bool,
}

impl WallHit {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Reflect a disc off the inner edges of `bounds`
///
/// Position is clamped back inside on any crossing. A velocity component is
/// only inverted while it still points out of the board, so a disc that is
/// already heading back in is never flipped a second time.
pub fn reflect_off_walls(disc: &mut Disc, bounds: &Rect) -> WallHit {
    let mut hit = WallHit::default();
    if disc.captured {
        return hit;
    }
    let r = disc.radius();

    if disc.pos.x - r < bounds.min.x {
        disc.pos.x = bounds.min.x + r;
        if disc.vel.x < 0.0 {
            disc.vel.x = -disc.vel.x;
            hit.x = true;
        }
    } else if disc.pos.x + r > bounds.max.x {
        disc.pos.x = bounds.max.x - r;
        if disc.vel.x > 0.0 {
            disc.vel.x = -disc.vel.x;
            hit.x = true;
        }
    }

    if disc.pos.y - r < bounds.min.y {
        disc.pos.y = bounds.min.y + r;
        if disc.vel.y < 0.0 {
            disc.vel.y = -disc.vel.y;
            hit.y = true;
        }
    } else if disc.pos.y + r > bounds.max.y {
        disc.pos.y = bounds.max.y - r;
        if disc.vel.y > 0.0 {
            disc.vel.y = -disc.vel.y;
            hit.y = true;
        }
    }

    hit
}

/// Index of the pocket whose capture radius contains the disc center
pub fn pocket_containing(pos: Vec2, board: &Board) -> Option<usize> {
    board
        .pockets()
        .iter()
        .position(|anchor| pos.distance(*anchor) < board.pocket_radius())
}

/// Capture every active disc sitting in a pocket
pub fn capture_pocketed(discs: &mut [Disc], board: &Board) -> Vec<CaptureEvent> {
    let mut captures = Vec::new();
    for disc in discs.iter_mut().filter(|d| d.is_active()) {
        if let Some(pocket) = pocket_containing(disc.pos, board) {
            disc.capture();
            captures.push(CaptureEvent {
                disc_id: disc.id,
                role: disc.role,
                color: disc.color,
                pocket,
            });
        }
    }
    captures
}

/// Outcome of resolving one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Not touching, coincident, or captured
    None,
    /// Pushed apart, but already separating so no impulse
    Separated,
    /// Pushed apart and exchanged momentum
    Impulse,
}

/// Push an overlapping pair apart along the contact normal, returning the
/// normal (a to b). Coincident centers have no normal and are left alone.
fn separate(a: &mut Disc, b: &mut Disc) -> Option<Vec2> {
    if a.captured || b.captured {
        return None;
    }

    let d = b.pos - a.pos;
    let distance = d.length();
    let min_dist = a.radius() + b.radius();
    if distance == 0.0 || distance >= min_dist {
        return None;
    }

    let n = d / distance;
    let correction = n * ((min_dist - distance) / 2.0 + SEPARATION_PADDING);
    a.pos -= correction;
    b.pos += correction;
    Some(n)
}

/// Resolve an overlapping pair: de-penetrate, then apply an elastic impulse
/// along the contact normal if the discs are approaching.
pub fn resolve_pair(a: &mut Disc, b: &mut Disc) -> Contact {
    let Some(n) = separate(a, b) else {
        return Contact::None;
    };

    let dot = (a.vel - b.vel).dot(n);
    if dot <= 0.0 {
        return Contact::Separated;
    }

    let (ma, mb) = (a.mass(), b.mass());
    let j = 2.0 * dot / (ma + mb);
    a.vel -= n * (j * mb);
    b.vel += n * (j * ma);
    Contact::Impulse
}

/// Deepest interpenetration between any two active discs (0 if none)
pub fn max_overlap(discs: &[Disc]) -> f32 {
    let mut worst = 0.0f32;
    for (i, a) in discs.iter().enumerate().filter(|(_, d)| d.is_active()) {
        for b in discs[i + 1..].iter().filter(|d| d.is_active()) {
            let depth = a.radius() + b.radius() - a.pos.distance(b.pos);
            worst = worst.max(depth);
        }
    }
    worst
}

/// Resolve all pairs in ascending index order
///
/// Runs up to `passes` impulse sweeps, stopping early once a sweep finds
/// nothing overlapping. Whatever overlap a dense cluster still carries after
/// that is relaxed with position-only sweeps until it is within
/// `OVERLAP_TOLERANCE`. Returns the index pairs that exchanged momentum.
pub fn resolve_collisions(discs: &mut [Disc], passes: u32) -> Vec<(usize, usize)> {
    let mut impulses = Vec::new();
    for _ in 0..passes.max(1) {
        let mut touched = false;
        for i in 0..discs.len() {
            let (head, tail) = discs.split_at_mut(i + 1);
            let a = &mut head[i];
            for (k, b) in tail.iter_mut().enumerate() {
                match resolve_pair(a, b) {
                    Contact::None => {}
                    Contact::Separated => touched = true,
                    Contact::Impulse => {
                        touched = true;
                        impulses.push((i, i + 1 + k));
                    }
                }
            }
        }
        if !touched {
            return impulses;
        }
    }

    let mut sweeps = 0;
    while max_overlap(discs) > OVERLAP_TOLERANCE {
        if sweeps == MAX_SETTLE_SWEEPS {
            log::warn!(
                "Overlap of {:.4} left after {} settle sweeps",
                max_overlap(discs),
                sweeps
            );
            break;
        }
        for i in 0..discs.len() {
            let (head, tail) = discs.split_at_mut(i + 1);
            for b in tail.iter_mut() {
                separate(&mut head[i], b);
            }
        }
        sweeps += 1;
    }
    impulses
}
