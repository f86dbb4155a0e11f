pub mod hit;
pub mod scene;

pub use hit::{Connection, hit_test, hit_test_connection, hit_test_rect};
pub use scene::{DrawOp, Overlay, build_scene, kind_color};
