pub mod controller;
pub mod frame;
pub mod input;
pub mod shortcuts;

pub use controller::{
    CanvasController, DISPOSAL_ABSORB_RADIUS, DISPOSAL_PULL_RADIUS, DRAG_DEAD_ZONE, EDGE_MARGIN,
    MAX_PAN_SPEED, TickResult, edge_pan_velocity,
};
pub use frame::{Debounce, FrameScheduler};
pub use input::{InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
