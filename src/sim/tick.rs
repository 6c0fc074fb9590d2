//! Fixed-cadence simulation tick
//!
//! One call advances the session by one frame: intents, spawning, motion,
//! collisions, then phase transitions.

use glam::Vec2;

use super::collision::{resolve_bullets, resolve_hazards};
use super::motion::{move_bubbles, move_bullets, move_power_ups, update_cannon};
use super::powerup::{activate_slot, expire_power_ups};
use super::spawn::spawn_entities;
use super::state::{Bullet, GameEvent, GamePhase, SessionState};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::{Viewport, aim_direction};

/// Player intents for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// New cannon aim angle (radians, 0 = up)
    pub aim_angle: Option<f32>,
    /// Fire one bullet if the meter allows
    pub fire: bool,
    /// Inventory slots to activate, in tap order
    pub activate_slots: Vec<usize>,
    /// Autopilot aims and fires on its own
    pub idle_mode: bool,
}

impl TickInput {
    /// Fold a later intent into this one (latest aim wins, actions accumulate)
    pub fn merge(&mut self, other: TickInput) {
        if other.aim_angle.is_some() {
            self.aim_angle = other.aim_angle;
        }
        self.fire |= other.fire;
        self.activate_slots.extend(other.activate_slots);
        self.idle_mode = other.idle_mode;
    }
}

/// Advance the session by one tick of `dt_ms` wall-clock milliseconds
pub fn tick(state: &mut SessionState, input: &TickInput, dt_ms: u64, viewport: Viewport) {
    state.clock_ms += dt_ms;
    expire_power_ups(state);

    match state.phase {
        GamePhase::GameOver => {
            state.effects.update(state.clock_ms);
            if state.new_high_score && viewport.is_valid() {
                let now = state.clock_ms;
                if state
                    .effects
                    .update_celebration(&mut state.rng, viewport, now)
                {
                    state.play(SoundEffect::FireworkShot);
                }
            }
        }

        GamePhase::Frozen => {
            state.effects.update(state.clock_ms);
            let frozen_for = state
                .frozen_at_ms
                .map(|t| state.clock_ms.saturating_sub(t))
                .unwrap_or(0);
            if state.effects.blocking_finished() && frozen_for >= state.tuning.freeze_delay_ms {
                enter_game_over(state);
            }
        }

        GamePhase::Playing => {
            state.game_time_ms += dt_ms;
            update_cannon(state, dt_ms);

            let mut input = input.clone();
            if input.idle_mode {
                autopilot(state, viewport, &mut input);
            }
            apply_input(state, &input, viewport);

            if !viewport.is_valid() {
                log::debug!(
                    "Skipping tick on invalid viewport {}x{}",
                    viewport.width,
                    viewport.height
                );
                state.effects.update(state.clock_ms);
                return;
            }

            spawn_entities(state, viewport);
            move_bubbles(state);
            move_power_ups(state, viewport);
            move_bullets(state, viewport);
            state.effects.update(state.clock_ms);

            resolve_hazards(state, viewport);
            resolve_bullets(state, viewport);
        }
    }
}

/// Aim, power-up taps and firing
fn apply_input(state: &mut SessionState, input: &TickInput, viewport: Viewport) {
    if let Some(angle) = input.aim_angle {
        state.cannon.angle = angle;
    }
    for &slot in &input.activate_slots {
        activate_slot(state, slot);
    }
    if input.fire && viewport.is_valid() {
        fire(state, viewport);
    }
}

/// Shoot from the muzzle if a shot is available. Returns true on fire.
pub fn fire(state: &mut SessionState, viewport: Viewport) -> bool {
    if state.phase != GamePhase::Playing || state.bullet_meter < 1.0 {
        return false;
    }
    let dir = aim_direction(state.cannon.angle);
    let muzzle = viewport.cannon_pos() + dir * CANNON_LENGTH;
    let speed = BULLET_SPEED * state.modifiers().bullet_speed;
    let id = state.next_entity_id();
    state.bullets.push(Bullet {
        id,
        pos: muzzle,
        vel: dir * speed,
    });
    state.bullet_meter -= 1.0;
    state.cannon.recoil = MAX_RECOIL;
    state.play(SoundEffect::Shoot);
    true
}

/// Frozen -> GameOver: clear the field and report the final score
fn enter_game_over(state: &mut SessionState) {
    state.phase = GamePhase::GameOver;
    state.clear_entities();
    log::info!(
        "Game over: score {} after {}",
        state.score,
        state.elapsed_display()
    );
    let score = state.score;
    state.emit(GameEvent::GameOver { score });
}

/// Demo player: shoot close hazards first, otherwise the nearest regular
/// bubble or power-up. Activates the first idle held power-up.
fn autopilot(state: &SessionState, viewport: Viewport, input: &mut TickInput) {
    if !viewport.is_valid() {
        return;
    }
    let cannon = viewport.cannon_pos();
    let pivot = viewport.aim_pivot();

    let danger = state
        .rocks
        .iter()
        .map(|r| r.pos)
        .chain(state.witches.iter().map(|w| w.pos))
        .filter(|p| p.distance(cannon) < viewport.height * 0.5)
        .min_by(|a, b| {
            a.distance(cannon)
                .partial_cmp(&b.distance(cannon))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let target: Option<Vec2> = danger.or_else(|| {
        state
            .bubbles
            .iter()
            .filter(|b| !b.is_tnt && b.pos.y < viewport.height - b.radius)
            .map(|b| b.pos)
            .chain(state.power_ups.iter().map(|p| p.pos))
            .min_by(|a, b| {
                a.distance(cannon)
                    .partial_cmp(&b.distance(cannon))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    if let Some(target) = target {
        input.aim_angle = Some(crate::aim_angle(pivot, target));
        // One shot per full recoil recovery
        input.fire = state.bullet_meter >= 1.0 && state.cannon.recoil == 0.0;
    }
    if let Some(slot) = state.inventory.iter().position(|p| !p.active) {
        input.activate_slots.push(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::FreezeCause;
    use crate::sim::effects::EXPLOSION_LIFETIME_MS;
    use crate::sim::state::{Bubble, PowerUp, PowerUpKind, Rock, Shake};
    use crate::tuning::Tuning;

    const VP: Viewport = Viewport {
        width: 1000.0,
        height: 2000.0,
    };

    /// Session with spawning held off so tests control every entity
    fn quiet_session() -> SessionState {
        let mut tuning = Tuning::default();
        tuning.intervals.bubble_ms = u64::MAX;
        tuning.intervals.tnt_ms = u64::MAX;
        tuning.intervals.rock_ms = u64::MAX;
        tuning.intervals.witch_ms = u64::MAX;
        tuning.intervals.powerup_ms = u64::MAX;
        let mut state = SessionState::new(12345, tuning);
        state.spawn_timers.hold_all(0);
        state
    }

    fn add_rock(state: &mut SessionState, pos: Vec2, health: u32) {
        let id = state.next_entity_id();
        state.rocks.push(Rock {
            id,
            pos,
            health,
            max_health: health,
            speed: 2.0,
            size: 60.0,
            shake: Shake::default(),
        });
    }

    fn add_bubble(state: &mut SessionState, pos: Vec2) {
        let id = state.next_entity_id();
        state.bubbles.push(Bubble {
            id,
            pos,
            speed: 0.0,
            radius: 30.0,
            points: 6,
            spawn_time_ms: 0,
            is_tnt: false,
            is_flipped: false,
        });
    }

    fn held_power_up(state: &mut SessionState, kind: PowerUpKind, secs: u32) {
        let id = state.next_entity_id();
        state.inventory.push(PowerUp {
            id,
            pos: Vec2::ZERO,
            speed: 0.0,
            radius: 40.0,
            kind,
            time_wallet_secs: secs,
            collected: true,
            active: false,
            activated_at_ms: None,
        });
    }

    fn run_until_over(state: &mut SessionState, max_ticks: u32) -> u32 {
        for n in 0..max_ticks {
            if state.is_over() {
                return n;
            }
            tick(state, &TickInput::default(), TICK_MS, VP);
        }
        max_ticks
    }

    #[test]
    fn test_fire_spends_meter_and_recoils() {
        let mut state = quiet_session();
        let input = TickInput {
            aim_angle: Some(0.0),
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &input, TICK_MS, VP);
        assert_eq!(state.bullets.len(), 1);
        assert!(state.bullet_meter < MAX_BULLETS);
        assert_eq!(state.cannon.recoil, MAX_RECOIL);

        let b = &state.bullets[0];
        // Muzzle is 100 above the cannon, then one step of 15
        assert!((b.pos - Vec2::new(500.0, 1930.0 - 100.0 - 15.0)).length() < 1e-3);
    }

    #[test]
    fn test_empty_meter_does_not_fire() {
        let mut state = quiet_session();
        state.bullet_meter = 0.5;
        let input = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &input, 0, VP);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_rapid_fire_speeds_up_bullets() {
        let mut state = quiet_session();
        held_power_up(&mut state, PowerUpKind::RapidFire, 5);
        let input = TickInput {
            activate_slots: vec![0],
            fire: true,
            aim_angle: Some(0.0),
            ..Default::default()
        };
        tick(&mut state, &input, TICK_MS, VP);
        assert_eq!(state.bullets[0].vel.length(), BULLET_SPEED * 3.0);
    }

    #[test]
    fn test_bullet_hits_rock_end_to_end() {
        let mut state = quiet_session();
        add_rock(&mut state, Vec2::new(500.0, 1000.0), 1);
        let input = TickInput {
            aim_angle: Some(0.0),
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &input, TICK_MS, VP);
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), TICK_MS, VP);
        }
        assert!(state.rocks.is_empty());
        assert!(state.bullets.is_empty());
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_hazard_contact_then_game_over() {
        let mut state = quiet_session();
        let cannon = VP.cannon_pos();
        add_rock(&mut state, cannon - Vec2::new(0.0, 91.0), 2);
        add_bubble(&mut state, Vec2::new(100.0, 100.0));

        tick(&mut state, &TickInput::default(), TICK_MS, VP);
        assert_eq!(state.phase, GamePhase::Frozen);
        assert_eq!(state.freeze_cause, Some(FreezeCause::HazardContact));
        let frozen_at = state.frozen_at_ms.unwrap();

        // Motion halts while frozen
        let bubble_y = state.bubbles[0].pos.y;
        tick(&mut state, &TickInput::default(), TICK_MS, VP);
        assert_eq!(state.bubbles[0].pos.y, bubble_y);

        // Effects end well before the delay; the delay still applies
        while state.clock_ms - frozen_at < 2_900 {
            tick(&mut state, &TickInput::default(), TICK_MS, VP);
        }
        assert!(state.effects.blocking_finished());
        assert_eq!(state.phase, GamePhase::Frozen);

        run_until_over(&mut state, 20);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.clock_ms - frozen_at >= 3_000);
        assert!(state.bubbles.is_empty());
        assert!(state.rocks.is_empty());
        assert!(state.bullets.is_empty());

        let game_overs: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .collect();
        assert_eq!(game_overs, vec![GameEvent::GameOver { score: 0 }]);
    }

    #[test]
    fn test_frozen_waits_for_effects() {
        let mut state = quiet_session();
        state.freeze(FreezeCause::TntBubble);
        // A long-queued explosion keeps the session frozen past the delay
        let start = state.clock_ms + 4_000;
        state
            .effects
            .queue_explosion(Vec2::new(10.0, 10.0), 20.0, start);

        for _ in 0..((3_500 / TICK_MS) as u32) {
            tick(&mut state, &TickInput::default(), TICK_MS, VP);
        }
        assert_eq!(state.phase, GamePhase::Frozen);

        let ticks = run_until_over(&mut state, 200);
        assert!(ticks < 200);
        assert!(state.clock_ms >= start + EXPLOSION_LIFETIME_MS);
    }

    #[test]
    fn test_shield_expires_on_time() {
        let mut state = quiet_session();
        held_power_up(&mut state, PowerUpKind::Shield, 2);
        let activate = TickInput {
            activate_slots: vec![0],
            ..Default::default()
        };
        tick(&mut state, &activate, TICK_MS, VP);
        let activated_at = state.clock_ms;
        assert!(state.modifiers().shield);

        while state.modifiers().shield {
            tick(&mut state, &TickInput::default(), TICK_MS, VP);
        }
        let elapsed = state.clock_ms - activated_at;
        assert!((2_000..2_000 + TICK_MS).contains(&elapsed));
    }

    #[test]
    fn test_invalid_viewport_is_a_quiet_tick() {
        let mut state = SessionState::new(1, Tuning::default());
        tick(&mut state, &TickInput::default(), TICK_MS, Viewport::default());
        assert!(state.bubbles.is_empty());
        assert!(state.rocks.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_game_time_stops_when_frozen() {
        let mut state = quiet_session();
        tick(&mut state, &TickInput::default(), 100, VP);
        state.freeze(FreezeCause::TntBubble);
        tick(&mut state, &TickInput::default(), 100, VP);
        assert_eq!(state.game_time_ms, 100);
        assert_eq!(state.clock_ms, 200);
    }

    #[test]
    fn test_celebration_after_new_record() {
        let mut state = quiet_session();
        state.phase = GamePhase::GameOver;
        state.new_high_score = true;
        tick(&mut state, &TickInput::default(), TICK_MS, VP);
        assert!(!state.effects.celebration.is_empty());
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::Sound(SoundEffect::FireworkShot))
        );
    }

    #[test]
    fn test_determinism() {
        let mut a = SessionState::new(99999, Tuning::default());
        let mut b = SessionState::new(99999, Tuning::default());
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut a, &input, TICK_MS, VP);
            tick(&mut b, &input, TICK_MS, VP);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.bubbles.len(), b.bubbles.len());
        assert_eq!(a.bullets.len(), b.bullets.len());
    }

    #[test]
    fn test_merge_keeps_latest_aim_and_any_fire() {
        let mut input = TickInput {
            aim_angle: Some(0.1),
            fire: true,
            ..Default::default()
        };
        input.merge(TickInput {
            aim_angle: Some(0.4),
            ..Default::default()
        });
        assert_eq!(input.aim_angle, Some(0.4));
        assert!(input.fire);
    }

    #[test]
    fn test_merge_queues_every_power_up_tap() {
        let mut input = TickInput {
            activate_slots: vec![2],
            ..Default::default()
        };
        input.merge(TickInput {
            activate_slots: vec![0],
            ..Default::default()
        });
        assert_eq!(input.activate_slots, vec![2, 0]);
    }

    #[test]
    fn test_two_taps_in_one_tick_activate_both() {
        let mut state = quiet_session();
        held_power_up(&mut state, PowerUpKind::Shield, 5);
        held_power_up(&mut state, PowerUpKind::DoublePoints, 5);
        let mut input = TickInput::default();
        input.merge(TickInput {
            activate_slots: vec![0],
            ..Default::default()
        });
        input.merge(TickInput {
            activate_slots: vec![1],
            ..Default::default()
        });
        tick(&mut state, &input, TICK_MS, VP);

        let mods = state.modifiers();
        assert!(mods.shield);
        assert_eq!(mods.score_multiplier, 2);
        assert!(state.inventory.iter().all(|p| p.active));
    }

    #[test]
    fn test_tnt_hit_then_game_over() {
        let mut state = quiet_session();
        let cannon = VP.cannon_pos();
        let muzzle = cannon - Vec2::new(0.0, CANNON_LENGTH);
        // TNT bubble straight above the muzzle, plus bystanders
        let id = state.next_entity_id();
        state.bubbles.push(Bubble {
            id,
            pos: muzzle - Vec2::new(0.0, 200.0),
            speed: 0.0,
            radius: 30.0,
            points: 6,
            spawn_time_ms: 0,
            is_tnt: true,
            is_flipped: false,
        });
        add_bubble(&mut state, Vec2::new(100.0, 100.0));
        add_rock(&mut state, Vec2::new(900.0, 100.0), 3);

        let shoot = TickInput {
            aim_angle: Some(0.0),
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &shoot, TICK_MS, VP);
        let mut ticks = 1;
        while state.phase == GamePhase::Playing {
            tick(&mut state, &TickInput::default(), TICK_MS, VP);
            ticks += 1;
            assert!(ticks < 30);
        }
        assert_eq!(state.phase, GamePhase::Frozen);
        assert_eq!(state.freeze_cause, Some(FreezeCause::TntBubble));
        assert!(state.bubbles.iter().all(|b| !b.is_tnt));
        assert!(state.bullets.is_empty());
        assert_eq!(state.score, 0);

        run_until_over(&mut state, 400);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.bubbles.is_empty());
        assert!(state.rocks.is_empty());
        assert!(state.bullets.is_empty());
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::Sound(SoundEffect::BombExplode))
        );
    }
}
