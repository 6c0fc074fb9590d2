//! Collision detection and resolution
//!
//! Everything is circle-circle: two entities touch when the distance
//! between centers is at most the sum of their radii (inclusive). For each
//! bullet, the first overlapping target of each kind in collection order is
//! resolved; closest-first is not used.

use glam::Vec2;

use super::effects::ParticleTint;
use super::motion::{apply_shake, step_rock, step_witch};
use super::state::{Bullet, FreezeCause, GamePhase, HazardKind, SessionState, Shake};
use crate::Viewport;
use crate::audio::SoundEffect;
use crate::consts::*;

/// Inclusive circle overlap test
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) <= radius_a + radius_b
}

/// Reach of an active shield around the cannon for a hazard of `size`
#[inline]
pub fn shield_reach(viewport: Viewport, size: f32) -> f32 {
    viewport.width / 4.0 + size
}

/// Whether a hazard at `pos` has reached the cannon
#[inline]
pub fn hazard_hits_cannon(pos: Vec2, size: f32, cannon: Vec2) -> bool {
    circles_overlap(pos, size, cannon, CANNON_HIT_RADIUS)
}

/// Result of resolving one bullet against a hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardHit {
    /// Health reached zero
    Destroyed,
    /// Survived with this much health left
    Damaged(u32),
}

/// Advance rocks and witches, then check them against the cannon.
///
/// With a shield up, a hazard already inside the shield's reach is held in
/// place for the tick: it neither moves nor reaches the cannon. Otherwise
/// the hazard moves and, if it now touches the cannon, the round ends.
pub fn resolve_hazards(state: &mut SessionState, viewport: Viewport) {
    if state.phase != GamePhase::Playing || !viewport.is_valid() {
        return;
    }
    let cannon = viewport.cannon_pos();
    let shield = state.modifiers().shield;
    let now = state.clock_ms;
    let mut contact: Option<(HazardKind, usize)> = None;

    for (idx, rock) in state.rocks.iter_mut().enumerate() {
        if shield && rock.pos.distance(cannon) <= shield_reach(viewport, rock.size) {
            continue;
        }
        step_rock(rock);
        if hazard_hits_cannon(rock.pos, rock.size, cannon) {
            contact = Some((HazardKind::Rock, idx));
            break;
        }
        apply_shake(&mut rock.pos.x, &mut rock.shake, now);
    }

    if contact.is_none() {
        for (idx, witch) in state.witches.iter_mut().enumerate() {
            if shield && witch.pos.distance(cannon) <= shield_reach(viewport, witch.size) {
                continue;
            }
            step_witch(witch, cannon);
            if hazard_hits_cannon(witch.pos, witch.size, cannon) {
                contact = Some((HazardKind::Witch, idx));
                break;
            }
            apply_shake(&mut witch.pos.x, &mut witch.shake, now);
        }
    }

    if let Some((kind, idx)) = contact {
        let (pos, size) = match kind {
            HazardKind::Rock => {
                let rock = state.rocks.remove(idx);
                (rock.pos, rock.size)
            }
            HazardKind::Witch => {
                let witch = state.witches.remove(idx);
                (witch.pos, witch.size)
            }
        };
        log::info!("{:?} reached the cannon", kind);
        state.effects.queue_explosion_sequence(cannon, size, now);
        state.effects.queue_explosion(pos, size, now);
        state.play(SoundEffect::BombExplode);
        state.freeze(FreezeCause::HazardContact);
        return;
    }

    super::motion::cull_rocks(state, viewport);
}

/// Damage a hazard by one; shake it if it survives
fn damage(health: &mut u32, shake: &mut Shake, amount: f32, now_ms: u64) -> HazardHit {
    *health = health.saturating_sub(1);
    if *health == 0 {
        HazardHit::Destroyed
    } else {
        shake.trigger(amount, now_ms);
        HazardHit::Damaged(*health)
    }
}

/// Score, label and effects for a resolved hazard hit
fn reward_hazard_hit(
    state: &mut SessionState,
    kind: HazardKind,
    hit: HazardHit,
    hazard_pos: Vec2,
    hazard_size: f32,
    bullet_pos: Vec2,
) {
    let now = state.clock_ms;
    match hit {
        HazardHit::Destroyed => {
            let bonus = match kind {
                HazardKind::Rock => state.tuning.rock_bonus,
                HazardKind::Witch => state.tuning.witch_bonus,
            };
            let awarded = state.award(bonus);
            state.effects.queue_explosion(hazard_pos, hazard_size, now);
            state.effects.spawn_floating_score(hazard_pos, awarded, now);
            state.play(SoundEffect::BubbleBurst);
            log::debug!("{:?} destroyed (+{})", kind, awarded);
        }
        HazardHit::Damaged(_) => {
            let awarded = state.award(1);
            state.effects.spawn_floating_score(bullet_pos, awarded, now);
        }
    }
}

/// Resolve every bullet against bubbles, hazards and falling power-ups.
///
/// Targets are removed the moment they are resolved, so a second bullet in
/// the same tick can never hit (or score) them again. A TNT hit removes the
/// bubble and bullet, freezes the session and stops resolution.
pub fn resolve_bullets(state: &mut SessionState, viewport: Viewport) {
    if state.phase != GamePhase::Playing || !viewport.is_valid() {
        return;
    }
    let bullet_radius = BULLET_RADIUS * state.modifiers().bullet_radius;
    let bullets = std::mem::take(&mut state.bullets);
    let mut survivors: Vec<Bullet> = Vec::with_capacity(bullets.len());
    let mut iter = bullets.into_iter();

    while let Some(bullet) = iter.next() {
        let now = state.clock_ms;
        let mut consumed = false;

        // Bubbles
        if let Some(idx) = state
            .bubbles
            .iter()
            .position(|b| circles_overlap(bullet.pos, bullet_radius, b.pos, b.radius))
        {
            let bubble = state.bubbles.remove(idx);
            consumed = true;
            if bubble.is_tnt {
                state
                    .effects
                    .spawn_pop_burst(bubble.pos, bubble.radius, ParticleTint::Bomb, now);
                state
                    .effects
                    .queue_explosion(bubble.pos, bubble.radius * 3.0, now);
                state.play(SoundEffect::BombExplode);
                state.freeze(FreezeCause::TntBubble);
                // Remaining bullets stay put; the session is frozen
                survivors.extend(iter);
                state.bullets = survivors;
                return;
            }
            state
                .effects
                .spawn_pop_burst(bubble.pos, bubble.radius, ParticleTint::Bubble, now);
            state.play(SoundEffect::BubbleBurst);
            let awarded = state.award(u64::from(bubble.points));
            log::debug!("Popped bubble {} (+{})", bubble.id, awarded);
        }

        // Rocks
        if let Some(idx) = state
            .rocks
            .iter()
            .position(|r| circles_overlap(bullet.pos, bullet_radius, r.pos, r.size))
        {
            let shake_amount = state.tuning.shake_amount;
            let rock = &mut state.rocks[idx];
            let hit = damage(&mut rock.health, &mut rock.shake, shake_amount, now);
            let (pos, size) = (rock.pos, rock.size);
            if hit == HazardHit::Destroyed {
                state.rocks.remove(idx);
            }
            reward_hazard_hit(state, HazardKind::Rock, hit, pos, size, bullet.pos);
            consumed = true;
        }

        // Witches
        if let Some(idx) = state
            .witches
            .iter()
            .position(|w| circles_overlap(bullet.pos, bullet_radius, w.pos, w.size))
        {
            let shake_amount = state.tuning.shake_amount;
            let witch = &mut state.witches[idx];
            let hit = damage(&mut witch.health, &mut witch.shake, shake_amount, now);
            let (pos, size) = (witch.pos, witch.size);
            if hit == HazardHit::Destroyed {
                state.witches.remove(idx);
            }
            reward_hazard_hit(state, HazardKind::Witch, hit, pos, size, bullet.pos);
            consumed = true;
        }

        // Falling power-ups
        if let Some(idx) = state
            .power_ups
            .iter()
            .position(|p| !p.collected && circles_overlap(bullet.pos, bullet_radius, p.pos, p.radius))
        {
            let mut power_up = state.power_ups.remove(idx);
            if state.inventory.len() < state.tuning.inventory_capacity {
                power_up.collected = true;
                log::debug!("Collected {:?} into slot {}", power_up.kind, state.inventory.len());
                state.inventory.push(power_up);
                state.play(SoundEffect::PowerUpCollect);
            } else {
                log::debug!("Inventory full, {:?} destroyed", power_up.kind);
            }
            consumed = true;
        }

        if !consumed {
            survivors.push(bullet);
        }
    }

    state.bullets = survivors;
}
