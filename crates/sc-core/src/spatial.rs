//! Visibility culling.
//!
//! The render layer only needs the notes whose bounding boxes overlap the
//! current view, plus a padding band so notes slide into view instead of
//! popping in at the screen edge. Links are visible when either endpoint
//! is — a link with both endpoints off-screen can't have a meaningful
//! segment on screen at canvas scales.

use crate::geometry::{Rect, Vec2, screen_to_world};
use crate::id::NoteId;
use crate::model::{ScreenSize, Viewport};
use crate::store::NoteStore;
use std::collections::HashSet;

/// Extra margin around the view rectangle, in world units regardless of
/// zoom. At high zoom this pre-loads less world area, at low zoom more,
/// which errs on the side of cheap.
pub const VISIBILITY_PADDING: f32 = 200.0;

/// The world-space rectangle currently on screen.
pub fn view_rect(viewport: &Viewport, screen: ScreenSize) -> Rect {
    let top_left = screen_to_world(Vec2::ZERO, viewport);
    Rect::new(
        top_left.x,
        top_left.y,
        screen.width / viewport.zoom,
        screen.height / viewport.zoom,
    )
}

/// Ids of all notes overlapping the padded view, sorted for determinism.
pub fn visible_notes(store: &NoteStore, screen: ScreenSize) -> Vec<NoteId> {
    let padded = view_rect(&store.viewport(), screen).expand(VISIBILITY_PADDING);
    let mut out: Vec<NoteId> = store
        .notes()
        .filter(|n| {
            let d = n.kind.diameter();
            Rect::new(n.position.x, n.position.y, d, d).intersects(&padded)
        })
        .map(|n| n.id)
        .collect();
    out.sort();
    out
}

/// Links worth drawing: at least one endpoint in the padded view.
pub fn visible_links(store: &NoteStore, screen: ScreenSize) -> Vec<(NoteId, NoteId)> {
    let visible: HashSet<NoteId> = visible_notes(store, screen).into_iter().collect();
    store
        .links()
        .into_iter()
        .filter(|l| visible.contains(&l.a) || visible.contains(&l.b))
        .map(|l| (l.a, l.b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteKind;
    use crate::store::NoteSeed;

    fn seed_at(x: f32, y: f32) -> NoteSeed {
        NoteSeed {
            position: Some(Vec2::new(x, y)),
            ..Default::default()
        }
    }

    fn screen() -> ScreenSize {
        ScreenSize {
            width: 1000.0,
            height: 1000.0,
        }
    }

    #[test]
    fn padding_band_is_inclusive_up_to_the_edge() {
        let mut store = NoteStore::new();
        // View is [0,1000); padded right edge 1200. A note starting at
        // x = 1198 still pokes into the band; one at 1201 does not.
        let inside = store.add_note(NoteKind::Earth, seed_at(1198.0, 0.0), false);
        let outside = store.add_note(NoteKind::Earth, seed_at(1201.0, 0.0), false);
        let visible = visible_notes(&store, screen());
        assert!(visible.contains(&inside));
        assert!(!visible.contains(&outside));
    }

    #[test]
    fn pan_shifts_the_visible_set() {
        let mut store = NoteStore::new();
        let far = store.add_note(NoteKind::Moon, seed_at(5000.0, 5000.0), false);
        assert!(!visible_notes(&store, screen()).contains(&far));
        // Pan so that world (5000, 5000) lands at screen origin.
        store.set_viewport(Viewport::new(Vec2::new(-5000.0, -5000.0), 1.0));
        assert!(visible_notes(&store, screen()).contains(&far));
    }

    #[test]
    fn zoom_widens_the_view() {
        let mut store = NoteStore::new();
        let n = store.add_note(NoteKind::Moon, seed_at(1500.0, 1500.0), false);
        assert!(!visible_notes(&store, screen()).contains(&n));
        store.set_viewport(Viewport::new(Vec2::ZERO, 0.5));
        // View now spans 2000 world units.
        assert!(visible_notes(&store, screen()).contains(&n));
    }

    #[test]
    fn link_visible_when_one_endpoint_is() {
        let mut store = NoteStore::new();
        let near = store.add_note(NoteKind::Earth, seed_at(100.0, 100.0), false);
        let far = store.add_note(NoteKind::Earth, seed_at(9000.0, 9000.0), false);
        let far2 = store.add_note(NoteKind::Earth, seed_at(9500.0, 9500.0), false);
        store.create_link(near, far);
        store.create_link(far, far2);
        let links = visible_links(&store, screen());
        assert_eq!(links.len(), 1);
        let (a, b) = links[0];
        assert!((a == near && b == far) || (a == far && b == near));
    }
}
