//! Hit testing: pointer position → note or connection lookup.
//!
//! Note lookup mirrors the paint order in reverse — the topmost-drawn
//! note wins. The stacking is selected notes over plain notes over
//! containers, so a giant Nebula never steals clicks from the small notes
//! parked inside it. Connection lookup measures distance to the drawn
//! line or curve, for hover highlighting and click-to-remove.

use sc_core::{Link, NoteId, NoteStore, Rect, Vec2, curve_control, edge_points, quad_point};
use std::collections::HashSet;

/// Find the topmost note at a world-space point, or `None` for background.
///
/// Discs hit on their bounding circle, not the box, so the corners of a
/// note's bounds are click-through.
pub fn hit_test(store: &NoteStore, world: Vec2) -> Option<NoteId> {
    let selected: HashSet<NoteId> = store.selection().iter().copied().collect();

    let mut hits: Vec<(u8, NoteId)> = store
        .notes()
        .filter(|n| (world - n.center()).length() <= n.kind.radius())
        .map(|n| {
            let layer = if selected.contains(&n.id) {
                2
            } else if n.kind.is_container() {
                0
            } else {
                1
            };
            (layer, n.id)
        })
        .collect();

    // Topmost layer first; within a layer, highest id was drawn last.
    hits.sort();
    hits.last().map(|(_, id)| *id)
}

/// All notes whose bounding boxes overlap a world-space rectangle.
/// Used for marquee selection; sorted for determinism.
pub fn hit_test_rect(store: &NoteStore, rect: Rect) -> Vec<NoteId> {
    let mut out: Vec<NoteId> = store
        .notes()
        .filter(|n| {
            let d = n.kind.diameter();
            Rect::new(n.position.x, n.position.y, d, d).intersects(&rect)
        })
        .map(|n| n.id)
        .collect();
    out.sort();
    out
}

// ─── Connections ─────────────────────────────────────────────────────────

/// A drawn relation between two notes: an arbitrary link curve or a
/// hierarchy (parent) line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Link(Link),
    Parent { child: NoteId },
}

/// Sample count for distance-to-curve. The curves are gentle arcs, so a
/// coarse polyline approximation is well within click tolerance.
const CURVE_SAMPLES: usize = 24;

fn quad_distance(p1: Vec2, ctrl: Vec2, p2: Vec2, target: Vec2) -> f32 {
    let mut best = f32::MAX;
    for i in 0..=CURVE_SAMPLES {
        let t = i as f32 / CURVE_SAMPLES as f32;
        let d = (quad_point(p1, ctrl, p2, t) - target).length();
        best = best.min(d);
    }
    best
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.x * ab.x + ab.y * ab.y;
    if len2 == 0.0 {
        return (p - a).length();
    }
    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}

/// Find the connection nearest a world-space point, within `tolerance`
/// world units of its drawn line or curve. Link curves and parent lines
/// compete on distance; the closest wins.
pub fn hit_test_connection(store: &NoteStore, world: Vec2, tolerance: f32) -> Option<Connection> {
    let mut best: Option<(f32, Connection)> = None;
    let mut consider = |d: f32, c: Connection, best: &mut Option<(f32, Connection)>| {
        if d <= tolerance && best.is_none_or(|(bd, _)| d < bd) {
            *best = Some((d, c));
        }
    };

    for link in store.links() {
        let (Some(na), Some(nb)) = (store.get(link.a), store.get(link.b)) else {
            continue;
        };
        let (p1, p2) = edge_points(na.center(), na.kind.radius(), nb.center(), nb.kind.radius());
        let ctrl = curve_control(p1, p2);
        consider(quad_distance(p1, ctrl, p2, world), Connection::Link(link), &mut best);
    }

    for note in store.notes() {
        let Some(parent) = note.parent_id.and_then(|p| store.get(p)) else {
            continue;
        };
        let (p1, p2) = edge_points(
            parent.center(),
            parent.kind.radius(),
            note.center(),
            note.kind.radius(),
        );
        consider(
            segment_distance(world, p1, p2),
            Connection::Parent { child: note.id },
            &mut best,
        );
    }

    best.map(|(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{NoteKind, NoteSeed};

    fn seed_at(x: f32, y: f32) -> NoteSeed {
        NoteSeed {
            position: Some(Vec2::new(x, y)),
            ..Default::default()
        }
    }

    #[test]
    fn plain_note_wins_over_enclosing_container() {
        let mut store = NoteStore::new();
        let neb = store.add_note(NoteKind::Nebula, seed_at(0.0, 0.0), false);
        let earth = store.add_note(NoteKind::Earth, seed_at(600.0, 600.0), false);
        // Earth center (800, 800) is inside the nebula's circle too.
        assert_eq!(hit_test(&store, Vec2::new(800.0, 800.0)), Some(earth));
        // A point in the nebula but outside earth hits the nebula.
        assert_eq!(hit_test(&store, Vec2::new(200.0, 800.0)), Some(neb));
    }

    #[test]
    fn selected_note_wins_over_overlapping_plain() {
        let mut store = NoteStore::new();
        let a = store.add_note(NoteKind::Earth, seed_at(0.0, 0.0), false);
        let b = store.add_note(NoteKind::Earth, seed_at(100.0, 0.0), false);
        let overlap = Vec2::new(250.0, 200.0); // inside both circles
        store.set_selection(|_| vec![a]);
        assert_eq!(hit_test(&store, overlap), Some(a));
        store.set_selection(|_| vec![b]);
        assert_eq!(hit_test(&store, overlap), Some(b));
    }

    #[test]
    fn corners_of_the_bounding_box_miss() {
        let mut store = NoteStore::new();
        store.add_note(NoteKind::Earth, seed_at(0.0, 0.0), false);
        // (10, 10) is inside the 400×400 box but outside the circle.
        assert_eq!(hit_test(&store, Vec2::new(10.0, 10.0)), None);
        assert_eq!(hit_test(&store, Vec2::new(2000.0, 2000.0)), None);
    }

    #[test]
    fn link_curve_hit_near_its_midpoint() {
        let mut store = NoteStore::new();
        let a = store.add_note(NoteKind::Earth, seed_at(100.0, 100.0), false);
        let b = store.add_note(NoteKind::Mars, seed_at(600.0, 100.0), false);
        store.create_link(a, b);

        let (na, nb) = (store.get(a).unwrap(), store.get(b).unwrap());
        let (p1, p2) = edge_points(na.center(), na.kind.radius(), nb.center(), nb.kind.radius());
        let mid = quad_point(p1, curve_control(p1, p2), p2, 0.5);

        assert_eq!(
            hit_test_connection(&store, mid, 5.0),
            Some(Connection::Link(Link::new(a, b)))
        );
        // Outside the tolerance band the curve doesn't register.
        assert_eq!(
            hit_test_connection(&store, mid + Vec2::new(0.0, 40.0), 5.0),
            None
        );
    }

    #[test]
    fn parent_line_hit_along_the_segment() {
        let mut store = NoteStore::new();
        let sun = store.add_note(NoteKind::Sun, seed_at(0.0, 0.0), false);
        let earth = store.add_note(NoteKind::Earth, seed_at(1200.0, 0.0), false);
        store.set_parent(earth, sun);

        let (ns, ne) = (store.get(sun).unwrap(), store.get(earth).unwrap());
        let (p1, p2) = edge_points(ns.center(), ns.kind.radius(), ne.center(), ne.kind.radius());
        let mid = (p1 + p2) * 0.5;

        assert_eq!(
            hit_test_connection(&store, mid, 5.0),
            Some(Connection::Parent { child: earth })
        );
        assert_eq!(hit_test_connection(&store, Vec2::new(0.0, 4000.0), 5.0), None);
    }

    #[test]
    fn rect_hit_uses_bounding_boxes() {
        let mut store = NoteStore::new();
        let a = store.add_note(NoteKind::Earth, seed_at(0.0, 0.0), false);
        let b = store.add_note(NoteKind::Mars, seed_at(1000.0, 1000.0), false);
        // Clips only a's bounding box corner.
        let hits = hit_test_rect(&store, Rect::new(-50.0, -50.0, 60.0, 60.0));
        assert_eq!(hits, vec![a]);
        let all = hit_test_rect(&store, Rect::new(-100.0, -100.0, 2000.0, 2000.0));
        assert!(all.contains(&a) && all.contains(&b));
    }
}
