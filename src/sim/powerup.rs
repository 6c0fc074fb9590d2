//! Power-up effect controller
//!
//! An activated power-up becomes a scheduled revert record
//! `{kind, fire_at_ms}` checked against the session clock every tick.
//! Modifiers are derived from the records still pending, so one expiry
//! never disturbs another, and cancelling a session is just dropping them.

use serde::{Deserialize, Serialize};

use super::state::{PowerUp, PowerUpKind, SessionState};
use crate::audio::SoundEffect;

/// Timed gameplay modifiers (baseline via `Default`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Bullet meter refill multiplier
    pub refill_rate: f32,
    /// Bullet speed multiplier
    pub bullet_speed: f32,
    pub score_multiplier: u64,
    /// Shield holds hazards back from the cannon
    pub shield: bool,
    /// Bullet hit-radius multiplier
    pub bullet_radius: f32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            refill_rate: 1.0,
            bullet_speed: 1.0,
            score_multiplier: 1,
            shield: false,
            bullet_radius: 1.0,
        }
    }
}

impl Modifiers {
    /// Effect table: what each kind changes while active
    pub fn apply(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::RapidFire => {
                self.refill_rate = 2.0;
                self.bullet_speed = 3.0;
            }
            PowerUpKind::DoublePoints => self.score_multiplier = 2,
            PowerUpKind::Shield => self.shield = true,
            PowerUpKind::MegaBullet => self.bullet_radius = 2.0,
        }
    }
}

/// Pending reversion of one active power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledRevert {
    pub kind: PowerUpKind,
    /// The power-up instance that scheduled it
    pub power_up_id: u32,
    pub activated_at_ms: u64,
    pub fire_at_ms: u64,
}

/// Active power-ups of a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUpController {
    active: Vec<ScheduledRevert>,
}

impl PowerUpController {
    /// Start an effect. An already active kind has its single timer
    /// refreshed to `now + wallet` instead of stacking; the id of the
    /// power-up it replaces is returned.
    pub fn activate(&mut self, power_up: &PowerUp, now_ms: u64) -> Option<u32> {
        let fire_at_ms = now_ms + u64::from(power_up.time_wallet_secs) * 1000;
        if let Some(existing) = self.active.iter_mut().find(|r| r.kind == power_up.kind) {
            log::debug!(
                "{:?} already active, timer refreshed by power-up {}",
                power_up.kind,
                power_up.id
            );
            let replaced = existing.power_up_id;
            existing.power_up_id = power_up.id;
            existing.activated_at_ms = now_ms;
            existing.fire_at_ms = fire_at_ms;
            return Some(replaced);
        }
        self.active.push(ScheduledRevert {
            kind: power_up.kind,
            power_up_id: power_up.id,
            activated_at_ms: now_ms,
            fire_at_ms,
        });
        None
    }

    /// Remove and return every record due at `now_ms`
    pub fn expire(&mut self, now_ms: u64) -> Vec<ScheduledRevert> {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|r| r.fire_at_ms <= now_ms);
        self.active = pending;
        due
    }

    /// Drop every pending revert (session ending)
    pub fn cancel_all(&mut self) {
        if !self.active.is_empty() {
            log::debug!("Cancelled {} pending power-up reverts", self.active.len());
        }
        self.active.clear();
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.iter().any(|r| r.kind == kind)
    }

    /// Milliseconds left on a kind's timer
    pub fn remaining_ms(&self, kind: PowerUpKind, now_ms: u64) -> Option<u64> {
        self.active
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| r.fire_at_ms.saturating_sub(now_ms))
    }

    pub fn active(&self) -> &[ScheduledRevert] {
        &self.active
    }

    /// Current modifiers
    pub fn modifiers(&self) -> Modifiers {
        let mut mods = Modifiers::default();
        for record in &self.active {
            mods.apply(record.kind);
        }
        mods
    }
}

/// Activate the inventory power-up at `slot`. It keeps its slot until it
/// expires. Returns false for an empty or already active slot, or a session
/// that is no longer playing.
pub fn activate_slot(state: &mut SessionState, slot: usize) -> bool {
    if state.phase != super::GamePhase::Playing {
        return false;
    }
    let now = state.clock_ms;
    let Some(power_up) = state.inventory.get_mut(slot).filter(|p| !p.active) else {
        return false;
    };
    power_up.active = true;
    power_up.activated_at_ms = Some(now);
    let activated = power_up.clone();

    // A refreshed kind frees the slot of the instance it replaced
    if let Some(replaced) = state.powerups.activate(&activated, now) {
        state.inventory.retain(|p| p.id != replaced);
    }
    log::info!(
        "Activated {:?} for {}s",
        activated.kind,
        activated.time_wallet_secs
    );
    state.play(SoundEffect::PowerUpActivate);
    true
}

/// Revert every effect whose wallet has run out and free its slot
pub fn expire_power_ups(state: &mut SessionState) {
    for record in state.powerups.expire(state.clock_ms) {
        state.inventory.retain(|p| p.id != record.power_up_id);
        log::info!(
            "{:?} expired after {} ms",
            record.kind,
            record.fire_at_ms - record.activated_at_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn power_up(id: u32, kind: PowerUpKind, secs: u32) -> PowerUp {
        PowerUp {
            id,
            pos: Vec2::ZERO,
            speed: 2.0,
            radius: 40.0,
            kind,
            time_wallet_secs: secs,
            collected: true,
            active: false,
            activated_at_ms: None,
        }
    }

    #[test]
    fn test_effect_table() {
        let mut ctl = PowerUpController::default();
        assert_eq!(ctl.modifiers(), Modifiers::default());

        for (i, kind) in PowerUpKind::ALL.iter().enumerate() {
            ctl.activate(&power_up(i as u32, *kind, 10), 0);
        }
        let mods = ctl.modifiers();
        assert_eq!(mods.refill_rate, 2.0);
        assert_eq!(mods.bullet_speed, 3.0);
        assert_eq!(mods.score_multiplier, 2);
        assert!(mods.shield);
        assert_eq!(mods.bullet_radius, 2.0);
    }

    #[test]
    fn test_independent_expiry() {
        let mut ctl = PowerUpController::default();
        ctl.activate(&power_up(1, PowerUpKind::DoublePoints, 5), 1_000);
        ctl.activate(&power_up(2, PowerUpKind::Shield, 10), 2_000);

        assert!(ctl.expire(5_999).is_empty());
        let due = ctl.expire(6_000);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].kind, PowerUpKind::DoublePoints);

        let mods = ctl.modifiers();
        assert_eq!(mods.score_multiplier, 1);
        assert!(mods.shield);

        assert_eq!(ctl.expire(12_000).len(), 1);
        assert_eq!(ctl.modifiers(), Modifiers::default());
    }

    #[test]
    fn test_reactivation_refreshes_timer() {
        let mut ctl = PowerUpController::default();
        ctl.activate(&power_up(1, PowerUpKind::RapidFire, 5), 0);
        ctl.activate(&power_up(2, PowerUpKind::RapidFire, 5), 3_000);
        assert_eq!(ctl.active().len(), 1);
        assert_eq!(ctl.remaining_ms(PowerUpKind::RapidFire, 3_000), Some(5_000));
        assert!(ctl.expire(5_000).is_empty());
        assert_eq!(ctl.expire(8_000).len(), 1);
    }

    #[test]
    fn test_cancel_all() {
        let mut ctl = PowerUpController::default();
        ctl.activate(&power_up(1, PowerUpKind::Shield, 5), 0);
        ctl.cancel_all();
        assert!(!ctl.is_active(PowerUpKind::Shield));
        assert!(ctl.expire(u64::MAX).is_empty());
    }

    #[test]
    fn test_activate_slot() {
        let mut state = SessionState::new(1, Tuning::default());
        state.inventory.push(power_up(9, PowerUpKind::MegaBullet, 5));
        state.inventory[0].collected = true;
        state.clock_ms = 400;

        assert!(!activate_slot(&mut state, 3));
        assert!(activate_slot(&mut state, 0));
        // Active power-ups hold their slot until they expire
        assert_eq!(state.inventory.len(), 1);
        assert!(state.inventory[0].active);
        assert_eq!(state.inventory[0].activated_at_ms, Some(400));
        assert!(state.powerups.is_active(PowerUpKind::MegaBullet));
        assert_eq!(state.modifiers().bullet_radius, 2.0);
        assert!(!activate_slot(&mut state, 0));

        state.clock_ms = 5_399;
        expire_power_ups(&mut state);
        assert_eq!(state.inventory.len(), 1);

        state.clock_ms = 5_400;
        expire_power_ups(&mut state);
        assert!(state.inventory.is_empty());
        assert_eq!(state.modifiers().bullet_radius, 1.0);
    }

    #[test]
    fn test_refresh_frees_replaced_slot() {
        let mut state = SessionState::new(1, Tuning::default());
        state.inventory.push(power_up(1, PowerUpKind::Shield, 5));
        state.inventory.push(power_up(2, PowerUpKind::DoublePoints, 5));
        state.inventory.push(power_up(3, PowerUpKind::Shield, 5));

        assert!(activate_slot(&mut state, 0));
        state.clock_ms = 2_000;
        assert!(activate_slot(&mut state, 2));

        let ids: Vec<u32> = state.inventory.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(state.powerups.active().len(), 1);

        state.clock_ms = 7_000;
        expire_power_ups(&mut state);
        assert_eq!(state.inventory.len(), 1);
        assert_eq!(state.inventory[0].id, 2);
        assert!(!state.modifiers().shield);
    }
}
