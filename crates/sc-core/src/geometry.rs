//! Pure geometry: coordinate transforms, link anchoring, rectangle tests.
//!
//! Everything here is a total function over plain values. The only policy
//! baked in is the NaN guard: degenerate inputs (coincident centers) fall
//! back to an angle of zero instead of propagating NaN into the render path.

use crate::model::Viewport;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// ─── Vec2 ────────────────────────────────────────────────────────────────

/// A 2D point or displacement. World or screen space depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, k: f32) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ─── Viewport transforms ─────────────────────────────────────────────────

/// Screen pixels → world coordinates: `(screen − pan) / zoom`.
pub fn screen_to_world(screen: Vec2, viewport: &Viewport) -> Vec2 {
    Vec2::new(
        (screen.x - viewport.pan.x) / viewport.zoom,
        (screen.y - viewport.pan.y) / viewport.zoom,
    )
}

/// World coordinates → screen pixels: `world * zoom + pan`.
pub fn world_to_screen(world: Vec2, viewport: &Viewport) -> Vec2 {
    Vec2::new(
        world.x * viewport.zoom + viewport.pan.x,
        world.y * viewport.zoom + viewport.pan.y,
    )
}

// ─── Link anchoring ──────────────────────────────────────────────────────

/// The two points where the segment between two note centers crosses each
/// note's bounding circle. Anchoring link lines here keeps them clear of
/// the shapes themselves.
///
/// Coincident centers are treated as angle 0 (both anchors on the +x axis).
pub fn edge_points(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> (Vec2, Vec2) {
    let d = center_b - center_a;
    let angle = if d.x == 0.0 && d.y == 0.0 {
        0.0
    } else {
        d.y.atan2(d.x)
    };
    let (sin, cos) = angle.sin_cos();
    let p1 = Vec2::new(center_a.x + radius_a * cos, center_a.y + radius_a * sin);
    let p2 = Vec2::new(center_b.x - radius_b * cos, center_b.y - radius_b * sin);
    (p1, p2)
}

/// Control point for the quadratic Bézier drawn between two link anchors:
/// the midpoint pushed perpendicular to the segment by 20% of its length
/// (`(−dy, dx) * 0.2`), giving arbitrary links a gentle arc that sets them
/// apart from straight hierarchy lines.
pub fn curve_control(p1: Vec2, p2: Vec2) -> Vec2 {
    let mid = (p1 + p2) * 0.5;
    let d = p2 - p1;
    Vec2::new(mid.x - d.y * 0.2, mid.y + d.x * 0.2)
}

/// Point on the quadratic Bézier `(p1, ctrl, p2)` at parameter `t`.
pub fn quad_point(p1: Vec2, ctrl: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p1 * (u * u) + ctrl * (2.0 * u * t) + p2 * (t * t)
}

// ─── Rectangles ──────────────────────────────────────────────────────────

/// Axis-aligned rectangle. Used for box selection, containment checks,
/// and visibility culling.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle from two corner points (any orientation).
    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }

    /// AABB overlap with half-open comparisons: touching edges don't count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Grow the rectangle by `pad` on every side.
    pub fn expand(&self, pad: f32) -> Rect {
        Rect::new(
            self.x - pad,
            self.y - pad,
            self.width + 2.0 * pad,
            self.height + 2.0 * pad,
        )
    }
}
