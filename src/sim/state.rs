//! Session state and core simulation types
//!
//! One `SessionState` holds every entity collection and counter of a play
//! session. The frame driver owns it; rendering and tests only borrow it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::Effects;
use super::powerup::{Modifiers, PowerUpController};
use super::spawn::SpawnTimers;
use crate::audio::SoundEffect;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Loss triggered; only visual effects keep animating
    Frozen,
    /// Session over, entity collections cleared
    GameOver,
}

/// What ended the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreezeCause {
    TntBubble,
    HazardContact,
}

/// Events raised during a tick, drained by the frame driver
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Fire-and-forget sound cue
    Sound(SoundEffect),
    /// Playing -> Frozen
    Frozen(FreezeCause),
    /// Frozen -> GameOver, with the final score
    GameOver { score: u64 },
}

/// A rising bubble (regular or TNT)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bubble {
    pub id: u32,
    pub pos: Vec2,
    /// Rise per tick
    pub speed: f32,
    pub radius: f32,
    /// 1..=10 for regular bubbles, 0 for TNT
    pub points: u32,
    /// Play time at spawn (ms)
    pub spawn_time_ms: u64,
    pub is_tnt: bool,
    /// Mirror the sprite horizontally
    pub is_flipped: bool,
}

/// A cannon shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Decaying sideways wobble after a non-lethal hit
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Shake {
    pub amount: f32,
    pub since_ms: u64,
}

impl Shake {
    /// Below this the shake is dropped entirely
    pub const NEGLIGIBLE: f32 = 0.1;
    pub const DECAY: f32 = 0.9;

    pub fn trigger(&mut self, amount: f32, now_ms: u64) {
        self.amount = amount;
        self.since_ms = now_ms;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.amount > 0.0
    }
}

/// A falling rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rock {
    pub id: u32,
    pub pos: Vec2,
    pub health: u32,
    /// Health at spawn, for the health bar
    pub max_health: u32,
    pub speed: f32,
    pub size: f32,
    pub shake: Shake,
}

/// A witch homing on the cannon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Witch {
    pub id: u32,
    pub pos: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub speed: f32,
    pub size: f32,
    /// Refreshed to the cannon position every tick
    pub target: Vec2,
    pub shake: Shake,
}

/// Hazards end the round on cannon contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Rock,
    Witch,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    RapidFire,
    DoublePoints,
    Shield,
    MegaBullet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::RapidFire,
        PowerUpKind::DoublePoints,
        PowerUpKind::Shield,
        PowerUpKind::MegaBullet,
    ];
}

/// A power-up, falling or held in the inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub speed: f32,
    pub radius: f32,
    pub kind: PowerUpKind,
    /// Effect duration once activated
    pub time_wallet_secs: u32,
    pub collected: bool,
    pub active: bool,
    /// Session clock at activation
    pub activated_at_ms: Option<u64>,
}

/// The player's cannon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cannon {
    /// Aim angle in radians, 0 = straight up
    pub angle: f32,
    /// Barrel pull-back after a shot
    pub recoil: f32,
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Balance values for this session
    pub tuning: Tuning,
    pub(crate) rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    /// Session clock, advances in every phase
    pub clock_ms: u64,
    /// Play clock, advances only while playing
    pub game_time_ms: u64,
    /// Session clock at the moment of freezing
    pub frozen_at_ms: Option<u64>,
    pub freeze_cause: Option<FreezeCause>,
    pub spawn_timers: SpawnTimers,
    pub cannon: Cannon,
    /// Shots available (fractional while refilling)
    pub bullet_meter: f32,
    pub bubbles: Vec<Bubble>,
    pub bullets: Vec<Bullet>,
    pub rocks: Vec<Rock>,
    pub witches: Vec<Witch>,
    /// Uncollected, falling power-ups
    pub power_ups: Vec<PowerUp>,
    /// Collected power-ups waiting for activation
    pub inventory: Vec<PowerUp>,
    /// Active power-ups and their scheduled reversion
    pub powerups: PowerUpController,
    pub effects: Effects,
    /// Set by the driver when the final score beat the stored record
    pub new_high_score: bool,
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_id: u32,
}

impl SessionState {
    /// Create a fresh session with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            score: 0,
            clock_ms: 0,
            game_time_ms: 0,
            frozen_at_ms: None,
            freeze_cause: None,
            spawn_timers: SpawnTimers::default(),
            cannon: Cannon::default(),
            bullet_meter: crate::consts::MAX_BULLETS,
            bubbles: Vec::new(),
            bullets: Vec::new(),
            rocks: Vec::new(),
            witches: Vec::new(),
            power_ups: Vec::new(),
            inventory: Vec::new(),
            powerups: PowerUpController::default(),
            effects: Effects::default(),
            new_high_score: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queue an event for the driver
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, effect: SoundEffect) {
        self.emit(GameEvent::Sound(effect));
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whole minutes of play, drives difficulty
    #[inline]
    pub fn game_minutes(&self) -> u32 {
        (self.game_time_ms / 60_000) as u32
    }

    /// Elapsed play time as `m:ss`
    pub fn elapsed_display(&self) -> String {
        let minutes = self.game_time_ms / 60_000;
        let seconds = (self.game_time_ms % 60_000) / 1000;
        format!("{}:{:02}", minutes, seconds)
    }

    /// Modifiers from every currently active power-up
    pub fn modifiers(&self) -> Modifiers {
        self.powerups.modifiers()
    }

    /// Add `base` points scaled by the score multiplier; returns the points awarded
    pub fn award(&mut self, base: u64) -> u64 {
        let awarded = base * self.modifiers().score_multiplier;
        self.score += awarded;
        awarded
    }

    /// Enter the Frozen phase (no-op unless playing)
    pub fn freeze(&mut self, cause: FreezeCause) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::Frozen;
        self.frozen_at_ms = Some(self.clock_ms);
        self.freeze_cause = Some(cause);
        log::info!("Session frozen ({:?}) at score {}", cause, self.score);
        self.emit(GameEvent::Frozen(cause));
    }

    /// Drop every gameplay entity (effects are left to finish)
    pub fn clear_entities(&mut self) {
        self.bubbles.clear();
        self.bullets.clear();
        self.rocks.clear();
        self.witches.clear();
        self.power_ups.clear();
        self.inventory.clear();
        self.powerups.cancel_all();
    }

    /// True once the session has nothing left to simulate
    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let state = SessionState::new(42, Tuning::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.bullet_meter, crate::consts::MAX_BULLETS);
        assert!(state.bubbles.is_empty());
    }

    #[test]
    fn test_elapsed_display() {
        let mut state = SessionState::new(1, Tuning::default());
        state.game_time_ms = 125_400;
        assert_eq!(state.elapsed_display(), "2:05");
        assert_eq!(state.game_minutes(), 2);
    }

    #[test]
    fn test_freeze_only_from_playing() {
        let mut state = SessionState::new(1, Tuning::default());
        state.clock_ms = 500;
        state.freeze(FreezeCause::TntBubble);
        assert_eq!(state.phase, GamePhase::Frozen);
        assert_eq!(state.frozen_at_ms, Some(500));

        state.clock_ms = 900;
        state.freeze(FreezeCause::HazardContact);
        assert_eq!(state.frozen_at_ms, Some(500));
        assert_eq!(state.freeze_cause, Some(FreezeCause::TntBubble));

        let frozen_events = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Frozen(_)))
            .count();
        assert_eq!(frozen_events, 1);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = SessionState::new(1, Tuning::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }
}
