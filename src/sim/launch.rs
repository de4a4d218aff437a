//! Striker launch gestures
//!
//! Turns pointer press/drag/release into an initial striker velocity. The
//! controller only tracks the gesture; whether a launch is allowed at all is
//! decided by the turn machine when the velocity is applied.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{LaunchConfig, LaunchMode};

/// An in-progress gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    /// Where the pointer went down
    pub press: Vec2,
    /// Latest pointer position
    pub pointer: Vec2,
    /// Accumulated charge (charge mode only)
    pub power: f32,
}

/// Line the renderer draws while aiming
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimLine {
    pub from: Vec2,
    pub to: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchController {
    config: LaunchConfig,
    gesture: Option<Gesture>,
}

impl LaunchController {
    pub fn new(config: LaunchConfig) -> Self {
        Self {
            config,
            gesture: None,
        }
    }

    pub fn mode(&self) -> LaunchMode {
        self.config.mode
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn is_aiming(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn power(&self) -> f32 {
        self.gesture.map(|g| g.power).unwrap_or(0.0)
    }

    /// Start a gesture. `ready` is whether a launch would currently be
    /// accepted (awaiting launch with the striker stopped).
    pub fn press(&mut self, at: Vec2, ready: bool) {
        if !ready {
            log::debug!("Press ignored: striker not ready");
            return;
        }
        self.gesture = Some(Gesture {
            press: at,
            pointer: at,
            power: 0.0,
        });
    }

    pub fn drag(&mut self, at: Vec2) {
        if let Some(gesture) = &mut self.gesture {
            gesture.pointer = at;
        }
    }

    /// Accumulate charge for one held tick, capped by pointer distance
    pub fn hold(&mut self, striker_pos: Vec2) {
        if self.config.mode != LaunchMode::ChargeAndAim {
            return;
        }
        let cfg = &self.config;
        if let Some(gesture) = &mut self.gesture {
            let cap = (gesture.pointer.distance(striker_pos) * cfg.drag_scale).min(cfg.max_speed);
            gesture.power = (gesture.power + cfg.charge_rate).min(cap);
        }
    }

    /// Finish the gesture, returning the launch velocity if it moves at all.
    /// The power accumulator is cleared either way.
    pub fn release(&mut self, at: Vec2, striker_pos: Vec2) -> Option<Vec2> {
        let gesture = self.gesture.take()?;
        let velocity = match self.config.mode {
            LaunchMode::DragRelease => self.drag_velocity(gesture.press, at),
            LaunchMode::ChargeAndAim => self.charge_velocity(striker_pos, at, gesture.power),
        };
        (velocity != Vec2::ZERO).then_some(velocity)
    }

    /// Drop any gesture without launching
    pub fn cancel(&mut self) {
        self.gesture = None;
    }

    /// Pulling back from the press point launches the opposite way
    pub fn drag_velocity(&self, press: Vec2, release: Vec2) -> Vec2 {
        ((press - release) * self.config.drag_scale).clamp_length_max(self.config.max_speed)
    }

    /// Launch toward `target` with the charged power
    pub fn charge_velocity(&self, striker_pos: Vec2, target: Vec2, power: f32) -> Vec2 {
        let to_target = target - striker_pos;
        if to_target == Vec2::ZERO {
            return Vec2::ZERO;
        }
        let angle = to_target.y.atan2(to_target.x);
        crate::direction_from_angle(angle) * power.min(self.config.max_speed)
    }

    /// Aim line from the striker to the pointer while a gesture is live
    pub fn aim_line(&self, striker_pos: Vec2) -> Option<AimLine> {
        self.gesture.map(|g| AimLine {
            from: striker_pos,
            to: g.pointer,
        })
    }
}
