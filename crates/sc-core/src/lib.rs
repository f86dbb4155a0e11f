pub mod geometry;
pub mod id;
pub mod layout;
pub mod model;
pub mod spatial;
pub mod store;

pub use geometry::{Rect, Vec2, curve_control, edge_points, quad_point, screen_to_world, world_to_screen};
pub use id::NoteId;
pub use layout::{ORBIT_RADIUS_STEP, orbital_position};
pub use model::*;
pub use spatial::{VISIBILITY_PADDING, view_rect, visible_links, visible_notes};
pub use store::{NoteSeed, NoteStore, Snapshot};
