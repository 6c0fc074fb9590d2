//! Game balance values
//!
//! Every spawn interval, speed range and bonus the simulation reads lives
//! here so a build can be rebalanced from a JSON file without recompiling.

use serde::{Deserialize, Serialize};

/// Closed-open range used for uniform rolls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Lerp into the range with `t` in [0, 1)
    #[inline]
    pub fn at(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }
}

/// Spawn cadence per entity kind, in milliseconds of play time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnIntervals {
    pub bubble_ms: u64,
    pub tnt_ms: u64,
    pub rock_ms: u64,
    pub witch_ms: u64,
    pub powerup_ms: u64,
}

impl Default for SpawnIntervals {
    fn default() -> Self {
        Self {
            bubble_ms: 3_000,
            tnt_ms: 5_000,
            rock_ms: 30_000,
            witch_ms: 20_000,
            powerup_ms: 15_000,
        }
    }
}

/// Data-driven game balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub intervals: SpawnIntervals,

    // === Bubbles ===
    pub min_bubble_radius: f32,
    pub max_bubble_radius: f32,
    /// Rise speed for bubbles and TNT (units per tick)
    pub bubble_speed: Range,

    // === Hazards ===
    pub rock_speed: Range,
    pub rock_size: f32,
    pub rock_bonus: u64,
    pub witch_speed: Range,
    pub witch_size: f32,
    pub witch_bonus: u64,
    /// Spawn height for rocks and witches (above the top edge)
    pub hazard_spawn_y: f32,

    // === Power-ups ===
    pub powerup_speed: Range,
    pub powerup_radius: f32,
    /// Collected but not yet activated power-ups
    pub inventory_capacity: usize,

    // === Effects ===
    pub shake_amount: f32,
    pub freeze_delay_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            intervals: SpawnIntervals::default(),

            min_bubble_radius: 20.0,
            max_bubble_radius: 80.0,
            bubble_speed: Range::new(2.0, 7.0),

            rock_speed: Range::new(1.0, 3.0),
            rock_size: 60.0,
            rock_bonus: 10,
            witch_speed: Range::new(1.0, 2.5),
            witch_size: 50.0,
            witch_bonus: 20,
            hazard_spawn_y: -50.0,

            powerup_speed: Range::new(2.0, 4.0),
            powerup_radius: 40.0,
            inventory_capacity: 5,

            shake_amount: 10.0,
            freeze_delay_ms: crate::consts::GAME_OVER_DELAY_MS,
        }
    }
}

impl Tuning {
    /// Parse a tuning file; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load tuning from JSON, falling back to defaults on a bad file
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Invalid tuning, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Points for a regular bubble: smaller bubbles score higher, always 1..=10
    pub fn bubble_points(&self, radius: f32) -> u32 {
        let span = self.max_bubble_radius - self.min_bubble_radius;
        if span <= 0.0 {
            return 10;
        }
        let normalized = ((radius - self.min_bubble_radius) / span).clamp(0.0, 1.0);
        let points = 11 - (normalized * 10.0).floor() as i32;
        points.clamp(1, 10) as u32
    }
}
