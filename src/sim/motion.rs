//! Kinematics integration
//!
//! Straight-line motion with multiplicative friction. Small velocity
//! components snap to zero so discs reach an exact stop in finite time.

use glam::Vec2;

use super::state::Disc;
use crate::config::PhysicsConfig;

/// Advance one disc by a single tick
pub fn integrate(disc: &mut Disc, physics: &PhysicsConfig) {
    if disc.captured || disc.vel == Vec2::ZERO {
        return;
    }

    disc.pos += disc.vel * physics.dt;
    disc.vel *= physics.friction;

    if disc.vel.x.abs() < physics.stop_threshold {
        disc.vel.x = 0.0;
    }
    if disc.vel.y.abs() < physics.stop_threshold {
        disc.vel.y = 0.0;
    }
}

/// Kinetic energy of a point mass
#[inline]
pub fn kinetic_energy(mass: f32, vel: Vec2) -> f32 {
    0.5 * mass * vel.length_squared()
}

/// Advance every disc on the table
pub fn integrate_all(discs: &mut [Disc], physics: &PhysicsConfig) {
    for disc in discs.iter_mut() {
        integrate(disc, physics);
    }
}
