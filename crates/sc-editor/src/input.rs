//! Input abstraction layer.
//!
//! Normalizes host pointer, wheel, and keyboard events into a unified
//! `InputEvent` enum consumed by the canvas controller. Positions are
//! screen pixels; the controller converts to world coordinates where
//! needed.

use sc_core::Vec2;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    /// Platform-aware command modifier: ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event from the host.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Primary-button press.
    PointerDown { pos: Vec2, modifiers: Modifiers },

    PointerMove { pos: Vec2, modifiers: Modifiers },

    PointerUp { pos: Vec2, modifiers: Modifiers },

    /// Double-click with the primary button.
    DoubleClick { pos: Vec2 },

    /// Scroll wheel; `delta_y` in host wheel units (positive = away).
    Wheel { pos: Vec2, delta_y: f32 },

    /// Key press. `key` follows `KeyboardEvent.key` naming.
    Key { key: String, modifiers: Modifiers },

    /// Key release; only modifier-like keys (Space) are tracked.
    KeyUp { key: String },
}

impl InputEvent {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            pos: Vec2::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            pos: Vec2::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            pos: Vec2::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: &str) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Self::PointerDown { pos, .. }
            | Self::PointerMove { pos, .. }
            | Self::PointerUp { pos, .. }
            | Self::DoubleClick { pos }
            | Self::Wheel { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}
