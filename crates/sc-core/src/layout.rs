//! Orbital placement for newly created notes.
//!
//! A golden-angle (phyllotaxis) spiral seeded by the current note count:
//! each new note lands at `angle = n·π(3−√5)`, `radius = K·√(n+1)`. The
//! irrational angle step spreads notes evenly around the origin and the
//! √ radius growth keeps density roughly constant, so fresh notes don't
//! pile on top of existing ones.

use crate::geometry::Vec2;

/// Radial growth constant `K` — world units per √step.
pub const ORBIT_RADIUS_STEP: f32 = 400.0;

/// The golden angle in radians: `π(3−√5)` ≈ 2.39996.
fn golden_angle() -> f32 {
    std::f32::consts::PI * (3.0 - 5.0_f32.sqrt())
}

/// Top-left position for the `n`-th note (where `n` is the number of
/// notes already on the canvas), centered so the note's bounding box
/// straddles the computed spiral point.
pub fn orbital_position(n: usize, diameter: f32) -> Vec2 {
    let angle = n as f32 * golden_angle();
    let radius = ORBIT_RADIUS_STEP * ((n + 1) as f32).sqrt();
    Vec2::new(
        angle.cos() * radius - diameter / 2.0,
        angle.sin() * radius - diameter / 2.0,
    )
}
