//! Store state → display list.
//!
//! Builds a flat, back-to-front list of drawing commands for one frame:
//! hierarchy lines, link curves, note discs, then the interaction overlays.
//! Shapes are kurbo primitives in world coordinates; the presenting layer
//! applies the viewport transform and rasterizes. Rebuilt from scratch
//! every frame — the visible set is small enough that retained-mode
//! bookkeeping isn't worth it.

use crate::hit::Connection;
use kurbo::{Circle, Line, Point, QuadBez, Rect as KurboRect};
use peniko::Color;
use sc_core::{
    NoteId, NoteKind, NoteStore, Rect, ScreenSize, Vec2, curve_control, edge_points,
    screen_to_world, visible_links, visible_notes,
};
use std::collections::HashSet;

// ─── Palette ─────────────────────────────────────────────────────────────

/// Base disc color per celestial kind.
pub fn kind_color(kind: NoteKind) -> Color {
    match kind {
        NoteKind::Nebula => Color::from_rgba8(139, 92, 246, 64),
        NoteKind::Galaxy => Color::from_rgb8(167, 139, 250),
        NoteKind::Sun => Color::from_rgb8(251, 191, 36),
        NoteKind::RedGiant => Color::from_rgb8(239, 68, 68),
        NoteKind::WhiteDwarf => Color::from_rgb8(241, 245, 249),
        NoteKind::Pulsar => Color::from_rgb8(34, 211, 238),
        NoteKind::Jupiter => Color::from_rgb8(217, 119, 6),
        NoteKind::Saturn => Color::from_rgb8(234, 179, 8),
        NoteKind::Neptune => Color::from_rgb8(59, 130, 246),
        NoteKind::Uranus => Color::from_rgb8(103, 232, 249),
        NoteKind::Earth => Color::from_rgb8(16, 185, 129),
        NoteKind::Venus => Color::from_rgb8(253, 230, 138),
        NoteKind::Mars => Color::from_rgb8(249, 115, 22),
        NoteKind::Mercury => Color::from_rgb8(156, 163, 175),
        NoteKind::Pluto => Color::from_rgb8(168, 162, 158),
        NoteKind::Ceres => Color::from_rgb8(120, 113, 108),
        NoteKind::Moon => Color::from_rgb8(203, 213, 225),
        NoteKind::Asteroid => Color::from_rgb8(87, 83, 78),
        NoteKind::Comet => Color::from_rgb8(165, 243, 252),
    }
}

const SELECTION_STROKE: Color = Color::from_rgb8(96, 165, 250);
const DROP_TARGET_STROKE: Color = Color::from_rgb8(74, 222, 128);
const HIERARCHY_LINE: Color = Color::from_rgba8(148, 163, 184, 120);
const LINK_CURVE: Color = Color::from_rgba8(125, 211, 252, 160);
/// Removal cue for the connection under the cursor.
const CONNECTION_HOVER: Color = Color::from_rgb8(248, 113, 113);
const MARQUEE_FILL: Color = Color::from_rgba8(96, 165, 250, 40);
const MARQUEE_STROKE: Color = Color::from_rgb8(96, 165, 250);

// ─── Display list ────────────────────────────────────────────────────────

/// One drawing command. World coordinates unless noted.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Note body. `stroke` carries the highlight ring, if any.
    Disc {
        id: NoteId,
        circle: Circle,
        fill: Color,
        stroke: Option<Color>,
        /// Shrink-toward-center progress for a note being absorbed, 0..1.
        absorb: f32,
    },
    /// Dashed parent→child line.
    HierarchyLine { line: Line, color: Color },
    /// Curved symmetric link.
    LinkCurve { curve: QuadBez, color: Color },
    /// In-flight link from a note edge to the cursor.
    LinkPreview { curve: QuadBez, color: Color },
    /// Box-selection marquee, screen coordinates.
    Marquee {
        rect: KurboRect,
        fill: Color,
        stroke: Color,
    },
}

/// Per-frame interaction state the store doesn't own.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    /// Marquee in screen coordinates, while box-selecting.
    pub marquee: Option<Rect>,
    /// Link drag in flight: source note and current cursor (screen).
    pub link_preview: Option<(NoteId, Vec2)>,
    /// Connection under the cursor, drawn in the removal-cue color.
    pub hovered_connection: Option<Connection>,
    /// Absorb progress for the note named by the store's absorbing marker.
    pub absorb_progress: f32,
}

fn point(v: Vec2) -> Point {
    Point::new(v.x as f64, v.y as f64)
}

/// Build the frame's display list: hierarchy lines, links, discs
/// (containers below plain notes below selected), then overlays on top.
pub fn build_scene(store: &NoteStore, screen: ScreenSize, overlay: &Overlay) -> Vec<DrawOp> {
    let mut ops = Vec::new();
    let visible = visible_notes(store, screen);
    let selected: HashSet<NoteId> = store.selection().iter().copied().collect();

    // Hierarchy lines under everything.
    for id in &visible {
        let Some(note) = store.get(*id) else { continue };
        let Some(parent) = note.parent_id.and_then(|p| store.get(p)) else {
            continue;
        };
        let (from, to) = edge_points(
            parent.center(),
            parent.kind.radius(),
            note.center(),
            note.kind.radius(),
        );
        let hovered =
            overlay.hovered_connection == Some(Connection::Parent { child: note.id });
        ops.push(DrawOp::HierarchyLine {
            line: Line::new(point(from), point(to)),
            color: if hovered { CONNECTION_HOVER } else { HIERARCHY_LINE },
        });
    }

    for (a, b) in visible_links(store, screen) {
        if let (Some(na), Some(nb)) = (store.get(a), store.get(b)) {
            let (p1, p2) = edge_points(na.center(), na.kind.radius(), nb.center(), nb.kind.radius());
            let ctrl = curve_control(p1, p2);
            let hovered =
                overlay.hovered_connection == Some(Connection::Link(sc_core::Link::new(a, b)));
            ops.push(DrawOp::LinkCurve {
                curve: QuadBez::new(point(p1), point(ctrl), point(p2)),
                color: if hovered { CONNECTION_HOVER } else { LINK_CURVE },
            });
        }
    }

    // Discs back-to-front: containers, plain notes, selected notes.
    let mut layered: Vec<NoteId> = Vec::with_capacity(visible.len());
    for pass in 0..3 {
        for id in &visible {
            let Some(note) = store.get(*id) else { continue };
            let layer = if selected.contains(id) {
                2
            } else if note.kind.is_container() {
                0
            } else {
                1
            };
            if layer == pass {
                layered.push(*id);
            }
        }
    }
    for id in layered {
        let Some(note) = store.get(id) else { continue };
        let stroke = if store.drop_target() == Some(id) {
            Some(DROP_TARGET_STROKE)
        } else if selected.contains(&id) {
            Some(SELECTION_STROKE)
        } else {
            None
        };
        let absorb = if store.absorbing() == Some(id) {
            overlay.absorb_progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let radius = note.kind.radius() * (1.0 - absorb);
        ops.push(DrawOp::Disc {
            id,
            circle: Circle::new(point(note.center()), radius as f64),
            fill: kind_color(note.kind),
            stroke,
            absorb,
        });
    }

    if let Some((source, cursor)) = overlay.link_preview
        && let Some(note) = store.get(source)
    {
        let target = screen_to_world(cursor, &store.viewport());
        let (p1, p2) = edge_points(note.center(), note.kind.radius(), target, 0.0);
        let ctrl = curve_control(p1, p2);
        ops.push(DrawOp::LinkPreview {
            curve: QuadBez::new(point(p1), point(ctrl), point(p2)),
            color: LINK_CURVE,
        });
    }

    if let Some(m) = overlay.marquee {
        ops.push(DrawOp::Marquee {
            rect: KurboRect::new(
                m.x as f64,
                m.y as f64,
                m.right() as f64,
                m.bottom() as f64,
            ),
            fill: MARQUEE_FILL,
            stroke: MARQUEE_STROKE,
        });
    }

    log::trace!("scene: {} op(s)", ops.len());
    ops
}
