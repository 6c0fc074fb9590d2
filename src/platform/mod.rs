//! Platform abstraction layer
//!
//! Everything the core needs from its host, expressed as traits:
//! - Drawing a session snapshot at a known viewport size
//! - Returning to the home screen after a game
//! - Raw pointer events, mapped here to tick intents

use glam::Vec2;

use crate::Viewport;
use crate::sim::{GamePhase, SessionState, TickInput};

/// Draws a session snapshot
pub trait RenderSurface {
    /// Current drawable size (zero while unsized)
    fn viewport(&self) -> Viewport;

    fn render(&mut self, state: &SessionState);
}

/// Host screen flow
pub trait SessionLifecycle {
    /// The player left the game-over screen
    fn on_return_home(&mut self, final_score: u64);
}

/// Raw pointer input in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
}

impl PointerEvent {
    pub fn pos(&self) -> Vec2 {
        match *self {
            PointerEvent::Down { x, y } | PointerEvent::Move { x, y } | PointerEvent::Up { x, y } => {
                Vec2::new(x, y)
            }
        }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// "Home" button on the game-over screen
pub fn home_button_rect(viewport: Viewport) -> Rect {
    const WIDTH: f32 = 300.0;
    const HEIGHT: f32 = 100.0;
    let origin = Vec2::new(
        viewport.width / 2.0 - WIDTH / 2.0,
        viewport.height / 2.0 + 100.0,
    );
    Rect::from_origin_size(origin, Vec2::new(WIDTH, HEIGHT))
}

/// Inventory slots: a row of squares along the bottom-left corner
#[derive(Debug, Clone, Copy)]
pub struct InventoryLayout {
    pub slot_size: f32,
    pub padding: f32,
}

impl Default for InventoryLayout {
    fn default() -> Self {
        Self {
            slot_size: 80.0,
            padding: 20.0,
        }
    }
}

impl InventoryLayout {
    pub fn slot_rect(&self, viewport: Viewport, slot: usize) -> Rect {
        let x = self.padding + slot as f32 * (self.slot_size + self.padding);
        let y = viewport.height - self.slot_size - self.padding;
        Rect::from_origin_size(Vec2::new(x, y), Vec2::splat(self.slot_size))
    }

    /// Occupied slot under `p`, if any
    pub fn hit_test(&self, viewport: Viewport, p: Vec2, occupied: usize) -> Option<usize> {
        (0..occupied).find(|&slot| self.slot_rect(viewport, slot).contains(p))
    }
}

/// What a pointer event amounts to
#[derive(Debug, Clone, PartialEq)]
pub enum PointerAction {
    None,
    Intent(TickInput),
    ReturnHome,
}

/// Turns pointer gestures into intents.
///
/// A press that lands on an inventory slot is a power-up tap: it activates
/// the slot and the matching release does not fire.
#[derive(Debug, Default)]
pub struct PointerMapper {
    pub layout: InventoryLayout,
    power_up_tap: bool,
}

impl PointerMapper {
    pub fn map(
        &mut self,
        event: PointerEvent,
        viewport: Viewport,
        phase: GamePhase,
        inventory_len: usize,
    ) -> PointerAction {
        let pos = event.pos();
        match phase {
            GamePhase::GameOver => {
                self.power_up_tap = false;
                if matches!(event, PointerEvent::Down { .. })
                    && home_button_rect(viewport).contains(pos)
                {
                    return PointerAction::ReturnHome;
                }
                PointerAction::None
            }
            GamePhase::Frozen => {
                self.power_up_tap = false;
                PointerAction::None
            }
            GamePhase::Playing => self.map_playing(event, viewport, inventory_len),
        }
    }

    fn map_playing(
        &mut self,
        event: PointerEvent,
        viewport: Viewport,
        inventory_len: usize,
    ) -> PointerAction {
        let pos = event.pos();
        let aim = || Some(crate::aim_angle(viewport.aim_pivot(), pos));
        match event {
            PointerEvent::Down { .. } => {
                if let Some(slot) = self.layout.hit_test(viewport, pos, inventory_len) {
                    self.power_up_tap = true;
                    return PointerAction::Intent(TickInput {
                        activate_slots: vec![slot],
                        ..Default::default()
                    });
                }
                self.power_up_tap = false;
                PointerAction::Intent(TickInput {
                    aim_angle: aim(),
                    ..Default::default()
                })
            }
            PointerEvent::Move { .. } if !self.power_up_tap => PointerAction::Intent(TickInput {
                aim_angle: aim(),
                ..Default::default()
            }),
            PointerEvent::Move { .. } => PointerAction::None,
            PointerEvent::Up { .. } => {
                let was_tap = std::mem::take(&mut self.power_up_tap);
                if was_tap {
                    PointerAction::None
                } else {
                    PointerAction::Intent(TickInput {
                        fire: true,
                        ..Default::default()
                    })
                }
            }
        }
    }
}
