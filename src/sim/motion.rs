//! Per-tick motion for every entity kind
//!
//! Spatial motion is a fixed step per tick (not scaled by wall-clock
//! delta). Culling runs once per tick after the move.

use glam::Vec2;

use super::state::{Rock, SessionState, Shake, Witch};
use crate::Viewport;
use crate::consts::*;

/// Sideways wobble: `sin(t * 0.5) * amount`, amount decaying geometrically
pub fn apply_shake(x: &mut f32, shake: &mut Shake, now_ms: u64) {
    if !shake.is_active() {
        return;
    }
    let since = now_ms.saturating_sub(shake.since_ms) as f32;
    *x += (since * 0.5).sin() * shake.amount;
    shake.amount *= Shake::DECAY;
    if shake.amount < Shake::NEGLIGIBLE {
        shake.amount = 0.0;
    }
}

/// One homing step: unit direction toward `target`, recomputed every call
#[inline]
pub fn seek_step(pos: Vec2, target: Vec2, speed: f32) -> Vec2 {
    pos + (target - pos).normalize_or_zero() * speed
}

/// Rocks fall straight down
pub fn step_rock(rock: &mut Rock) {
    rock.pos.y += rock.speed;
}

/// Witches re-aim at the cannon every tick
pub fn step_witch(witch: &mut Witch, cannon: Vec2) {
    witch.target = cannon;
    witch.pos = seek_step(witch.pos, witch.target, witch.speed);
}

/// Bubbles rise; drop those past the top edge
pub fn move_bubbles(state: &mut SessionState) {
    for bubble in &mut state.bubbles {
        bubble.pos.y -= bubble.speed;
    }
    state.bubbles.retain(|b| b.pos.y >= -b.radius * 2.0);
}

/// Falling power-ups; drop those past the bottom edge
pub fn move_power_ups(state: &mut SessionState, viewport: Viewport) {
    for p in &mut state.power_ups {
        p.pos.y += p.speed;
    }
    state
        .power_ups
        .retain(|p| p.pos.y <= viewport.height + p.radius);
}

/// Bullets fly straight; drop those outside any edge
pub fn move_bullets(state: &mut SessionState, viewport: Viewport) {
    for bullet in &mut state.bullets {
        bullet.pos += bullet.vel;
    }
    state.bullets.retain(|b| viewport.contains(b.pos));
}

/// Rocks past the bottom edge leave play
pub fn cull_rocks(state: &mut SessionState, viewport: Viewport) {
    state.rocks.retain(|r| r.pos.y <= viewport.height + r.size);
}

/// Meter refill and recoil recovery
pub fn update_cannon(state: &mut SessionState, dt_ms: u64) {
    let refill = BULLET_REFILL_PER_SEC * state.modifiers().refill_rate * dt_ms as f32 / 1000.0;
    state.bullet_meter = (state.bullet_meter + refill).min(MAX_BULLETS);
    state.cannon.recoil = (state.cannon.recoil - RECOIL_RECOVERY).max(0.0);
}
