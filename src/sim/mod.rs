//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through the `dt_ms` handed to `tick`
//! - Seeded RNG only
//! - Stable iteration order (insertion order per collection)
//! - No rendering, audio or platform dependencies; side effects leave as `GameEvent`s

pub mod collision;
pub mod effects;
pub mod motion;
pub mod powerup;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{circles_overlap, resolve_bullets, resolve_hazards};
pub use effects::Effects;
pub use powerup::{Modifiers, PowerUpController, activate_slot};
pub use spawn::{SpawnTimers, spawn_entities};
pub use state::{
    Bubble, Bullet, Cannon, FreezeCause, GameEvent, GamePhase, HazardKind, PowerUp, PowerUpKind,
    Rock, SessionState, Shake, Witch,
};
pub use tick::{TickInput, fire, tick};
