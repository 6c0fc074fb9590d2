//! Transient visual effects
//!
//! Pop bursts, floating score labels, explosions and the new-record
//! fireworks. None of these affect gameplay, but pop particles and
//! explosions hold the Frozen phase open until they finish.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Viewport;

/// Pop burst: particles per burst, speed, lifetime and per-tick shrink
pub const POP_PARTICLE_COUNT: usize = 8;
pub const POP_PARTICLE_SPEED: f32 = 8.0;
pub const POP_LIFETIME_MS: u64 = 500;
pub const POP_SHRINK: f32 = 0.6;

/// Floating score labels rise this much per tick
pub const FLOAT_RISE: f32 = 2.0;
pub const FLOAT_LIFETIME_MS: u64 = 1000;

pub const EXPLOSION_LIFETIME_MS: u64 = 600;
/// Stage offsets for the cannon-hit explosion sequence
pub const HAZARD_EXPLOSION_STAGES_MS: [u64; 3] = [0, 250, 500];

/// Fireworks cadence and shape
pub const CELEBRATION_INTERVAL_MS: u64 = 1000;
pub const CELEBRATION_PARTICLES: usize = 26;
pub const CELEBRATION_GRAVITY: f32 = 0.5;
/// Palette slots for fireworks (yellow, cyan, magenta, green, red)
pub const CELEBRATION_COLORS: u8 = 5;

/// Tint family for pop particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleTint {
    Bubble,
    Bomb,
}

/// Fragment of a popped bubble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub alpha: u8,
    pub start_ms: u64,
    pub tint: ParticleTint,
}

/// "+N" label drifting upward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingScore {
    pub pos: Vec2,
    pub value: u64,
    pub alpha: u8,
    pub start_ms: u64,
}

/// Expanding blast; may be queued to start in the future
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub start_ms: u64,
    /// 0 before start, grows to 1 over the lifetime
    pub progress: f32,
    pub alpha: u8,
}

impl Explosion {
    #[inline]
    pub fn is_started(&self, now_ms: u64) -> bool {
        now_ms >= self.start_ms
    }
}

/// Firework spark shown after a new high score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelebrationParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Index into the presentation palette
    pub color: u8,
}

/// Linear fade from 255 to 0 over `lifetime_ms`
#[inline]
pub fn fade_alpha(elapsed_ms: u64, lifetime_ms: u64) -> u8 {
    if lifetime_ms == 0 || elapsed_ms >= lifetime_ms {
        return 0;
    }
    ((lifetime_ms - elapsed_ms) * 255 / lifetime_ms) as u8
}

/// All live visual effects of a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Effects {
    pub particles: Vec<PopParticle>,
    pub floating_scores: Vec<FloatingScore>,
    pub explosions: Vec<Explosion>,
    pub celebration: Vec<CelebrationParticle>,
    last_burst_ms: Option<u64>,
    /// 0 = top-left, 1 = top-right
    corner: u8,
}

impl Effects {
    /// Eight fragments radiating at 45° steps
    pub fn spawn_pop_burst(&mut self, pos: Vec2, radius: f32, tint: ParticleTint, now_ms: u64) {
        for i in 0..POP_PARTICLE_COUNT {
            let angle = (i as f32 * (360.0 / POP_PARTICLE_COUNT as f32)).to_radians();
            self.particles.push(PopParticle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * POP_PARTICLE_SPEED,
                size: radius / 2.0,
                alpha: 255,
                start_ms: now_ms,
                tint,
            });
        }
    }

    pub fn spawn_floating_score(&mut self, pos: Vec2, value: u64, now_ms: u64) {
        self.floating_scores.push(FloatingScore {
            pos,
            value,
            alpha: 255,
            start_ms: now_ms,
        });
    }

    pub fn queue_explosion(&mut self, pos: Vec2, radius: f32, start_ms: u64) {
        self.explosions.push(Explosion {
            pos,
            radius,
            start_ms,
            progress: 0.0,
            alpha: 255,
        });
    }

    /// Staged blast used when a hazard reaches the cannon
    pub fn queue_explosion_sequence(&mut self, pos: Vec2, radius: f32, now_ms: u64) {
        for (stage, offset) in HAZARD_EXPLOSION_STAGES_MS.iter().enumerate() {
            let scale = 1.0 + stage as f32 * 0.5;
            self.queue_explosion(pos, radius * scale, now_ms + offset);
        }
    }

    /// Advance particles, labels and explosions; drop expired ones
    pub fn update(&mut self, now_ms: u64) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.alpha = fade_alpha(now_ms.saturating_sub(p.start_ms), POP_LIFETIME_MS);
            p.size *= POP_SHRINK;
        }
        self.particles
            .retain(|p| now_ms.saturating_sub(p.start_ms) <= POP_LIFETIME_MS);

        self.floating_scores
            .retain(|f| now_ms.saturating_sub(f.start_ms) <= FLOAT_LIFETIME_MS);
        for f in &mut self.floating_scores {
            f.pos.y -= FLOAT_RISE;
            f.alpha = fade_alpha(now_ms.saturating_sub(f.start_ms), FLOAT_LIFETIME_MS);
        }

        for e in &mut self.explosions {
            if !e.is_started(now_ms) {
                continue;
            }
            let elapsed = now_ms - e.start_ms;
            e.progress = (elapsed as f32 / EXPLOSION_LIFETIME_MS as f32).min(1.0);
            e.alpha = fade_alpha(elapsed, EXPLOSION_LIFETIME_MS);
        }
        self.explosions
            .retain(|e| !e.is_started(now_ms) || now_ms - e.start_ms <= EXPLOSION_LIFETIME_MS);
    }

    /// No pop particles or explosions (queued or running) remain
    #[inline]
    pub fn blocking_finished(&self) -> bool {
        self.particles.is_empty() && self.explosions.is_empty()
    }

    /// Fireworks: a burst per interval from alternating top corners.
    /// Returns true when a new burst was launched.
    pub fn update_celebration<R: Rng>(&mut self, rng: &mut R, viewport: Viewport, now_ms: u64) -> bool {
        let due = self
            .last_burst_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= CELEBRATION_INTERVAL_MS);
        if due {
            self.last_burst_ms = Some(now_ms);
            let origin_x = if self.corner == 0 { 0.0 } else { viewport.width };
            for _ in 0..CELEBRATION_PARTICLES {
                use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
                let spread = rng.random::<f32>() * FRAC_PI_2;
                let angle = if self.corner == 0 {
                    spread - FRAC_PI_4
                } else {
                    spread + PI * 0.75
                };
                let speed = rng.random::<f32>() * 15.0 + 5.0;
                self.celebration.push(CelebrationParticle {
                    pos: Vec2::new(origin_x, 0.0),
                    vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                    size: rng.random::<f32>() * 20.0 + 10.0,
                    color: rng.random_range(0..CELEBRATION_COLORS),
                });
            }
            self.corner = (self.corner + 1) % 2;
        }

        for p in &mut self.celebration {
            p.pos += p.vel;
            p.vel.y += CELEBRATION_GRAVITY;
        }
        self.celebration.retain(|p| {
            p.pos.y <= viewport.height && p.pos.x >= 0.0 && p.pos.x <= viewport.width
        });

        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pop_burst_shape() {
        let mut fx = Effects::default();
        fx.spawn_pop_burst(Vec2::new(100.0, 100.0), 40.0, ParticleTint::Bubble, 0);
        assert_eq!(fx.particles.len(), 8);
        // First fragment heads right, third straight down (screen y grows downward)
        assert!((fx.particles[0].vel - Vec2::new(8.0, 0.0)).length() < 1e-4);
        assert!((fx.particles[2].vel - Vec2::new(0.0, 8.0)).length() < 1e-4);
        assert!(fx.particles.iter().all(|p| p.size == 20.0));
    }

    #[test]
    fn test_particles_expire_after_lifetime() {
        let mut fx = Effects::default();
        fx.spawn_pop_burst(Vec2::ZERO, 20.0, ParticleTint::Bomb, 1000);
        fx.update(1000 + POP_LIFETIME_MS);
        assert_eq!(fx.particles.len(), 8);
        assert_eq!(fx.particles[0].alpha, 0);
        fx.update(1001 + POP_LIFETIME_MS);
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn test_alpha_decays_monotonically() {
        let mut last = u8::MAX;
        for t in (0..=1000).step_by(50) {
            let a = fade_alpha(t, 1000);
            assert!(a <= last);
            last = a;
        }
        assert_eq!(fade_alpha(1000, 1000), 0);
    }

    #[test]
    fn test_queued_explosion_blocks_until_done() {
        let mut fx = Effects::default();
        fx.queue_explosion_sequence(Vec2::ZERO, 60.0, 0);
        assert_eq!(fx.explosions.len(), 3);
        fx.update(EXPLOSION_LIFETIME_MS + 1);
        // First stage done, later stages still running
        assert_eq!(fx.explosions.len(), 2);
        assert!(!fx.blocking_finished());
        fx.update(500 + EXPLOSION_LIFETIME_MS + 1);
        assert!(fx.blocking_finished());
    }

    #[test]
    fn test_floating_score_rises() {
        let mut fx = Effects::default();
        fx.spawn_floating_score(Vec2::new(50.0, 50.0), 10, 0);
        fx.update(100);
        assert_eq!(fx.floating_scores[0].pos.y, 48.0);
        fx.update(1001);
        assert!(fx.floating_scores.is_empty());
    }

    #[test]
    fn test_celebration_alternates_corners() {
        let mut fx = Effects::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let vp = Viewport::new(1000.0, 2000.0);

        assert!(fx.update_celebration(&mut rng, vp, 0));
        assert!(!fx.update_celebration(&mut rng, vp, 500));
        assert!(fx.update_celebration(&mut rng, vp, 1000));
        // Second burst starts at the right edge; its sparks fly left
        assert!(fx.celebration.iter().any(|p| p.vel.x < 0.0));
    }
}
