//! Bubble Buster - arcade cannon shooter simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, power-ups, game state)
//! - `driver`: Fixed-cadence frame driver that owns a play session
//! - `platform`: Render surface, session lifecycle and pointer input seams
//! - `audio`: Sound cue collaborator
//! - `highscores` / `persistence`: High score contract and file-backed preferences
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod driver;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use driver::{FrameDriver, InputSender};
pub use highscores::{HighScoreStore, MemoryHighScores};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed sleep between ticks (~60 Hz, no catch-up)
    pub const TICK_MS: u64 = 17;
    /// Largest wall-clock delta fed into a single tick
    pub const MAX_TICK_DT_MS: u64 = 100;

    /// Cannon sits this far above the bottom edge (meter height + padding + 20)
    pub const CANNON_BOTTOM_OFFSET: f32 = 70.0;
    /// Hit radius of the cannon base
    pub const CANNON_HIT_RADIUS: f32 = 30.0;
    /// Barrel length; bullets leave from the muzzle
    pub const CANNON_LENGTH: f32 = 100.0;
    /// Recoil applied on fire and its per-tick recovery
    pub const MAX_RECOIL: f32 = 20.0;
    pub const RECOIL_RECOVERY: f32 = 2.0;

    /// Bullet defaults
    pub const BULLET_SPEED: f32 = 15.0;
    pub const BULLET_RADIUS: f32 = 10.0;

    /// Bullet meter
    pub const MAX_BULLETS: f32 = 10.0;
    pub const BULLET_REFILL_PER_SEC: f32 = 1.0;

    /// Delay between freezing and game over
    pub const GAME_OVER_DELAY_MS: u64 = 3000;
}

/// Viewport size supplied by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Stale or zero-sized surfaces disable spawning and collisions
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Center of the cannon base
    #[inline]
    pub fn cannon_pos(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height - consts::CANNON_BOTTOM_OFFSET)
    }

    /// Pivot used to turn pointer positions into an aim angle
    #[inline]
    pub fn aim_pivot(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height)
    }

    /// Whether a point lies inside the surface (edges inclusive)
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

/// Unit vector for an aim angle (0 = straight up, positive = clockwise)
#[inline]
pub fn aim_direction(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), -angle.cos())
}

/// Aim angle from a pointer position relative to a pivot
#[inline]
pub fn aim_angle(pivot: Vec2, pointer: Vec2) -> f32 {
    let dx = pointer.x - pivot.x;
    let dy = pivot.y - pointer.y;
    dx.atan2(dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_aim_straight_up() {
        let pivot = Vec2::new(200.0, 800.0);
        let angle = aim_angle(pivot, Vec2::new(200.0, 100.0));
        assert!(angle.abs() < 1e-6);
        let dir = aim_direction(angle);
        assert!((dir.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_aim_right_is_positive() {
        let pivot = Vec2::new(200.0, 800.0);
        let angle = aim_angle(pivot, Vec2::new(400.0, 800.0));
        assert!((angle - FRAC_PI_2).abs() < 1e-6);
        assert!(aim_direction(angle).x > 0.99);
    }

    #[test]
    fn test_viewport_validity() {
        assert!(Viewport::new(1080.0, 1920.0).is_valid());
        assert!(!Viewport::new(0.0, 1920.0).is_valid());
        assert!(!Viewport::new(1080.0, -1.0).is_valid());
    }

    #[test]
    fn test_cannon_position() {
        let vp = Viewport::new(1000.0, 2000.0);
        assert_eq!(vp.cannon_pos(), Vec2::new(500.0, 1930.0));
    }
}
