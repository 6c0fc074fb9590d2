//! Time-gated entity spawning
//!
//! Each kind keeps its own last-spawn timestamp on the play clock; at most
//! one entity of each kind appears per tick. Difficulty grows with whole
//! minutes of play.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Bubble, PowerUp, PowerUpKind, Rock, SessionState, Shake, Witch};
use crate::Viewport;
use crate::audio::SoundEffect;

/// Last spawn time per kind (play clock, ms). Unset timers fire immediately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub bubble: Option<u64>,
    pub tnt: Option<u64>,
    pub rock: Option<u64>,
    pub witch: Option<u64>,
    pub powerup: Option<u64>,
}

impl SpawnTimers {
    /// Pretend every kind just spawned (holds all spawns for one interval)
    pub fn hold_all(&mut self, now_ms: u64) {
        self.bubble = Some(now_ms);
        self.tnt = Some(now_ms);
        self.rock = Some(now_ms);
        self.witch = Some(now_ms);
        self.powerup = Some(now_ms);
    }
}

#[inline]
fn is_due(last: Option<u64>, now_ms: u64, interval_ms: u64) -> bool {
    last.is_none_or(|t| now_ms.saturating_sub(t) >= interval_ms)
}

/// Rock health: one more hit per minute survived
#[inline]
pub fn rock_health(game_minutes: u32) -> u32 {
    game_minutes + 1
}

/// Witch health starts at 5 and grows by one per minute
#[inline]
pub fn witch_health(game_minutes: u32) -> u32 {
    game_minutes + 5
}

/// Power-up duration grows by 5 s per minute survived
#[inline]
pub fn power_up_wallet_secs(game_minutes: u32) -> u32 {
    game_minutes * 5 + 5
}

/// X in the outer quarter of the screen, left or right with equal odds
fn edge_biased_x<R: Rng>(rng: &mut R, width: f32) -> f32 {
    let offset = rng.random::<f32>() * (width * 0.25);
    if rng.random_bool(0.5) {
        offset
    } else {
        width * 0.75 + offset
    }
}

/// Spawn everything whose interval has elapsed
pub fn spawn_entities(state: &mut SessionState, viewport: Viewport) {
    if !viewport.is_valid() {
        return;
    }
    let now = state.game_time_ms;
    let intervals = state.tuning.intervals.clone();

    if is_due(state.spawn_timers.tnt, now, intervals.tnt_ms) {
        spawn_bubble(state, viewport, true);
        state.spawn_timers.tnt = Some(now);
    }
    if is_due(state.spawn_timers.bubble, now, intervals.bubble_ms) {
        spawn_bubble(state, viewport, false);
        state.spawn_timers.bubble = Some(now);
    }
    if is_due(state.spawn_timers.rock, now, intervals.rock_ms) {
        spawn_rock(state, viewport);
        state.spawn_timers.rock = Some(now);
    }
    if is_due(state.spawn_timers.witch, now, intervals.witch_ms) {
        spawn_witch(state, viewport);
        state.spawn_timers.witch = Some(now);
    }
    if is_due(state.spawn_timers.powerup, now, intervals.powerup_ms) {
        spawn_power_up(state, viewport);
        state.spawn_timers.powerup = Some(now);
    }
}

/// A bubble entering from the bottom edge
pub fn spawn_bubble(state: &mut SessionState, viewport: Viewport, is_tnt: bool) {
    let tuning = &state.tuning;
    let (min_r, max_r, speed_range) = (
        tuning.min_bubble_radius,
        tuning.max_bubble_radius,
        tuning.bubble_speed,
    );
    let rng = &mut state.rng;
    let x = edge_biased_x(rng, viewport.width);
    let speed = speed_range.at(rng.random::<f32>());
    let radius = min_r + rng.random::<f32>() * (max_r - min_r);
    let is_flipped = rng.random_bool(0.5);

    let points = if is_tnt {
        0
    } else {
        state.tuning.bubble_points(radius)
    };
    let bubble = Bubble {
        id: state.next_entity_id(),
        pos: Vec2::new(x, viewport.height),
        speed,
        radius,
        points,
        spawn_time_ms: state.game_time_ms,
        is_tnt,
        is_flipped,
    };
    log::debug!(
        "Spawned {} bubble {} r={:.1} pts={}",
        if is_tnt { "TNT" } else { "regular" },
        bubble.id,
        radius,
        points
    );
    state.bubbles.push(bubble);
}

/// A rock dropping in from above the top edge
pub fn spawn_rock(state: &mut SessionState, viewport: Viewport) {
    let x = state.rng.random::<f32>() * viewport.width;
    let speed = state.tuning.rock_speed.at(state.rng.random::<f32>());
    let health = rock_health(state.game_minutes());
    let rock = Rock {
        id: state.next_entity_id(),
        pos: Vec2::new(x, state.tuning.hazard_spawn_y),
        health,
        max_health: health,
        speed,
        size: state.tuning.rock_size,
        shake: Shake::default(),
    };
    log::debug!("Spawned rock {} hp={}", rock.id, health);
    state.rocks.push(rock);
    state.play(SoundEffect::RockLaugh);
}

/// A witch that will home on the cannon
pub fn spawn_witch(state: &mut SessionState, viewport: Viewport) {
    let x = state.rng.random::<f32>() * viewport.width;
    let speed = state.tuning.witch_speed.at(state.rng.random::<f32>());
    let health = witch_health(state.game_minutes());
    let witch = Witch {
        id: state.next_entity_id(),
        pos: Vec2::new(x, state.tuning.hazard_spawn_y),
        health,
        max_health: health,
        speed,
        size: state.tuning.witch_size,
        target: viewport.cannon_pos(),
        shake: Shake::default(),
    };
    log::debug!("Spawned witch {} hp={}", witch.id, health);
    state.witches.push(witch);
    state.play(SoundEffect::WitchCackle);
}

/// A falling power-up of a uniformly random kind
pub fn spawn_power_up(state: &mut SessionState, viewport: Viewport) {
    let radius = state.tuning.powerup_radius;
    let x = radius + state.rng.random::<f32>() * (viewport.width - 2.0 * radius).max(0.0);
    let speed = state.tuning.powerup_speed.at(state.rng.random::<f32>());
    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    let power_up = PowerUp {
        id: state.next_entity_id(),
        pos: Vec2::new(x, -radius),
        speed,
        radius,
        kind,
        time_wallet_secs: power_up_wallet_secs(state.game_minutes()),
        collected: false,
        active: false,
        activated_at_ms: None,
    };
    log::debug!(
        "Spawned power-up {} {:?} ({}s)",
        power_up.id,
        kind,
        power_up.time_wallet_secs
    );
    state.power_ups.push(power_up);
}
