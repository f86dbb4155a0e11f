//! The authoritative in-memory canvas state.
//!
//! `NoteStore` owns notes, the symmetric link graph, the viewport, the
//! selection, and the transient interaction markers. It is the sole
//! mutation path: every operation preserves the model invariants
//! (cascade delete, link symmetry, container activation) before returning,
//! so callers always observe a consistent state.
//!
//! Operations addressing a missing id are silent no-ops — transient UI
//! state can race ahead of pending deletions, and the UI must not crash
//! for it. Nothing here returns `Result`.

use crate::geometry::Vec2;
use crate::id::NoteId;
use crate::layout::orbital_position;
use crate::model::{Link, Note, NoteKind, Viewport, ZOOM_MAX, ZOOM_MIN};
use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet, VecDeque};

/// Creation parameters for [`NoteStore::add_note`]. Unset fields fall back
/// to kind defaults.
#[derive(Debug, Clone, Default)]
pub struct NoteSeed {
    pub position: Option<Vec2>,
    pub content: Option<String>,
    pub parent_id: Option<NoteId>,
    pub tags: SmallVec<[String; 2]>,
}

/// Serializable snapshot of the persistent state (notes + links).
/// Viewport, selection, and transient markers are session-local and
/// deliberately excluded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub notes: Vec<Note>,
    pub links: Vec<Link>,
}

/// The canvas state container. Explicitly constructed and passed to the
/// interaction controller and render layer — no ambient global.
#[derive(Debug, Default)]
pub struct NoteStore {
    notes: HashMap<NoteId, Note>,
    links: UnGraphMap<NoteId, ()>,
    viewport: Viewport,
    selection: Vec<NoteId>,
    focused: Option<NoteId>,
    absorbing: Option<NoteId>,
    drop_target: Option<NoteId>,
    revision: u64,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Monotonic state version. Derived computations (visibility, scenes)
    /// can memoize on this instead of observing individual fields.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.notes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selection(&self) -> &[NoteId] {
        &self.selection
    }

    pub fn focused(&self) -> Option<NoteId> {
        self.focused
    }

    pub fn absorbing(&self) -> Option<NoteId> {
        self.absorbing
    }

    pub fn drop_target(&self) -> Option<NoteId> {
        self.drop_target
    }

    /// Ids linked to `id`, sorted for deterministic iteration.
    pub fn linked_ids(&self, id: NoteId) -> Vec<NoteId> {
        let mut out: Vec<NoteId> = self.links.neighbors(id).collect();
        out.sort();
        out
    }

    pub fn is_linked(&self, a: NoteId, b: NoteId) -> bool {
        self.links.contains_edge(a, b)
    }

    /// All links in canonical order.
    pub fn links(&self) -> Vec<Link> {
        let mut out: Vec<Link> = self
            .links
            .all_edges()
            .map(|(a, b, _)| Link::new(a, b))
            .collect();
        out.sort();
        out
    }

    /// The container note (other than `exclude`) whose bounds contain the
    /// given world point, if any. Ties broken by id order.
    pub fn container_at(&self, point: Vec2, exclude: NoteId) -> Option<NoteId> {
        let mut candidates: Vec<&Note> = self
            .notes
            .values()
            .filter(|n| n.kind.is_container() && n.id != exclude)
            .collect();
        candidates.sort_by_key(|n| n.id);
        candidates
            .into_iter()
            .find(|n| {
                let d = n.kind.diameter();
                crate::geometry::Rect::new(n.position.x, n.position.y, d, d).contains(point)
            })
            .map(|n| n.id)
    }

    /// Walk the parent chain of `descendant` looking for `ancestor`.
    pub fn is_ancestor_of(&self, ancestor: NoteId, descendant: NoteId) -> bool {
        if ancestor == descendant {
            return false;
        }
        let mut current = self.notes.get(&descendant).and_then(|n| n.parent_id);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.notes.get(&id).and_then(|n| n.parent_id);
        }
        false
    }

    // ─── Note lifecycle ──────────────────────────────────────────────────

    /// Create a note. With `orbital` set and no explicit parent, the
    /// position comes from the golden-angle spiral seeded by the current
    /// note count; otherwise the seed position (or origin) is used as-is.
    ///
    /// A freshly created container starts active as its own group.
    pub fn add_note(&mut self, kind: NoteKind, seed: NoteSeed, orbital: bool) -> NoteId {
        let id = NoteId::fresh();
        let position = if orbital && seed.parent_id.is_none() {
            orbital_position(self.notes.len(), kind.diameter())
        } else {
            seed.position.unwrap_or(Vec2::ZERO)
        };

        let mut note = Note::new(id, kind, position);
        if let Some(content) = seed.content {
            note.content = content;
        }
        // A dangling parent reference is dropped rather than stored.
        note.parent_id = seed.parent_id.filter(|p| self.notes.contains_key(p));
        note.tags = seed.tags;
        if kind.is_container() {
            note.group_id = Some(id);
        }

        log::debug!("add {id} ({})", kind.label());
        self.notes.insert(id, note);
        self.links.add_node(id);
        self.bump();
        id
    }

    /// Move a note by a world-space delta.
    ///
    /// Dragging an active container moves every member of its group as a
    /// rigid body; dragging a member alone moves only that member, which
    /// is how notes get extracted from a container.
    pub fn update_note_position(&mut self, id: NoteId, delta: Vec2) {
        if delta.x == 0.0 && delta.y == 0.0 {
            return;
        }
        let Some(target) = self.notes.get(&id) else {
            return;
        };

        if target.is_active_container() {
            let group = target.group_id;
            let members: Vec<NoteId> = self
                .notes
                .values()
                .filter(|n| n.group_id == group)
                .map(|n| n.id)
                .collect();
            for member in members {
                if let Some(n) = self.notes.get_mut(&member) {
                    n.position += delta;
                }
            }
        } else if let Some(n) = self.notes.get_mut(&id) {
            n.position += delta;
        }
        self.bump();
    }

    /// Replace the opaque content payload.
    pub fn update_content(&mut self, id: NoteId, content: impl Into<String>) {
        if let Some(n) = self.notes.get_mut(&id) {
            n.content = content.into();
            self.bump();
        }
    }

    /// Delete a note and, transitively, every descendant reachable through
    /// `parent_id`. Surviving notes have dangling parent, link, and group
    /// references cleared; selection, focus, and transient markers that
    /// pointed at deleted notes are cleared too.
    pub fn delete_note(&mut self, id: NoteId) {
        if !self.notes.contains_key(&id) {
            return;
        }

        // BFS over the parent forest.
        let mut doomed: HashSet<NoteId> = HashSet::from([id]);
        let mut queue: VecDeque<NoteId> = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let children: Vec<NoteId> = self
                .notes
                .values()
                .filter(|n| n.parent_id == Some(current) && !doomed.contains(&n.id))
                .map(|n| n.id)
                .collect();
            for child in children {
                doomed.insert(child);
                queue.push_back(child);
            }
        }

        log::debug!("delete {id}: cascade removes {} note(s)", doomed.len());
        for dead in &doomed {
            self.notes.remove(dead);
            self.links.remove_node(*dead);
        }

        // Clear dangling references on survivors.
        for note in self.notes.values_mut() {
            if note.parent_id.is_some_and(|p| doomed.contains(&p)) {
                note.parent_id = None;
            }
            if note.group_id.is_some_and(|g| doomed.contains(&g)) {
                note.group_id = None;
            }
        }

        // A container whose last member died goes back to inactive.
        let emptied: Vec<NoteId> = self
            .notes
            .values()
            .filter(|n| n.is_active_container())
            .filter(|n| {
                !self
                    .notes
                    .values()
                    .any(|m| m.id != n.id && m.group_id == n.group_id)
            })
            .map(|n| n.id)
            .collect();
        for container in emptied {
            if let Some(n) = self.notes.get_mut(&container) {
                n.group_id = None;
            }
        }

        self.selection.retain(|sel| !doomed.contains(sel));
        if self.focused.is_some_and(|f| doomed.contains(&f)) {
            self.focused = None;
        }
        // The absorbing marker is always stale after a delete.
        self.absorbing = None;
        if self.drop_target.is_some_and(|t| doomed.contains(&t)) {
            self.drop_target = None;
        }
        self.bump();
    }

    // ─── Links & hierarchy ───────────────────────────────────────────────

    /// Create a symmetric link. Self-links and missing endpoints are
    /// no-ops; duplicates are absorbed by the graph (idempotent).
    pub fn create_link(&mut self, a: NoteId, b: NoteId) {
        if a == b || !self.notes.contains_key(&a) || !self.notes.contains_key(&b) {
            return;
        }
        self.links.add_edge(a, b, ());
        self.bump();
    }

    pub fn remove_link(&mut self, a: NoteId, b: NoteId) {
        if self.links.remove_edge(a, b).is_some() {
            self.bump();
        }
    }

    /// Detach a note from its hierarchical parent. Links are untouched.
    pub fn remove_parent_link(&mut self, child: NoteId) {
        if let Some(n) = self.notes.get_mut(&child)
            && n.parent_id.is_some()
        {
            n.parent_id = None;
            self.bump();
        }
    }

    /// Assign a hierarchical parent. Rejected (no-op) if either note is
    /// missing, the notes coincide, or the assignment would close a cycle
    /// (`child` already an ancestor of `parent`).
    pub fn set_parent(&mut self, child: NoteId, parent: NoteId) {
        if child == parent
            || !self.notes.contains_key(&child)
            || !self.notes.contains_key(&parent)
            || self.is_ancestor_of(child, parent)
        {
            return;
        }
        if let Some(n) = self.notes.get_mut(&child) {
            n.parent_id = Some(parent);
            self.bump();
        }
    }

    // ─── Grouping ────────────────────────────────────────────────────────

    /// Reassign a note's group membership.
    ///
    /// Leaving a container that would be left with zero other members
    /// resets that container's own `group_id` to `None` (inactive).
    /// Joining an inactive container activates it (`group_id` = own id).
    pub fn set_group(&mut self, note_id: NoteId, group_id: Option<NoteId>) {
        if !self.notes.contains_key(&note_id) {
            return;
        }
        // Only existing container notes can be joined.
        if let Some(g) = group_id
            && !self.notes.get(&g).is_some_and(|n| n.kind.is_container())
        {
            return;
        }

        let old_group = self.notes.get(&note_id).and_then(|n| n.group_id);
        if let Some(n) = self.notes.get_mut(&note_id) {
            n.group_id = group_id;
        }

        if let Some(og) = old_group
            && og != note_id
        {
            let remaining = self
                .notes
                .values()
                .filter(|n| n.group_id == Some(og))
                .count();
            // Only the container itself is left — mark it empty.
            if remaining == 1
                && let Some(container) = self.notes.get_mut(&og)
                && container.kind.is_container()
            {
                container.group_id = None;
            }
        }

        if let Some(g) = group_id
            && let Some(container) = self.notes.get_mut(&g)
            && container.group_id.is_none()
        {
            container.group_id = Some(g);
        }
        self.bump();
    }

    // ─── Viewport, selection, transients ─────────────────────────────────

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Viewport {
            pan: viewport.pan,
            zoom: viewport.zoom.clamp(ZOOM_MIN, ZOOM_MAX),
        };
        self.bump();
    }

    /// Add a raw screen-pixel delta to the pan (pan is unscaled by zoom).
    pub fn pan_by(&mut self, delta: Vec2) {
        self.viewport.pan += delta;
        self.bump();
    }

    /// Replace the selection through an updater over the current one,
    /// dropping any ids that no longer resolve.
    pub fn set_selection(&mut self, updater: impl FnOnce(&[NoteId]) -> Vec<NoteId>) {
        let mut next = updater(&self.selection);
        next.retain(|id| self.notes.contains_key(id));
        self.selection = next;
        self.bump();
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.bump();
        }
    }

    pub fn set_focused(&mut self, id: Option<NoteId>) {
        self.focused = id.filter(|n| self.notes.contains_key(n));
        self.bump();
    }

    pub fn set_absorbing(&mut self, id: Option<NoteId>) {
        self.absorbing = id.filter(|n| self.notes.contains_key(n));
        self.bump();
    }

    pub fn set_drop_target(&mut self, id: Option<NoteId>) {
        self.drop_target = id.filter(|n| self.notes.contains_key(n));
        self.bump();
    }

    // ─── Snapshots ───────────────────────────────────────────────────────

    /// Capture the persistent state (notes sorted by id, links canonical).
    pub fn to_snapshot(&self) -> Snapshot {
        let mut notes: Vec<Note> = self.notes.values().cloned().collect();
        notes.sort_by_key(|n| n.id);
        Snapshot {
            notes,
            links: self.links(),
        }
    }

    /// Rebuild a store from a snapshot. Links with missing endpoints and
    /// self-links are dropped rather than trusted.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        for note in snapshot.notes {
            store.links.add_node(note.id);
            store.notes.insert(note.id, note);
        }
        for link in snapshot.links {
            if link.a != link.b
                && store.notes.contains_key(&link.a)
                && store.notes.contains_key(&link.b)
            {
                store.links.add_edge(link.a, link.b, ());
            }
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(store: &mut NoteStore, kind: NoteKind) -> NoteId {
        store.add_note(kind, NoteSeed::default(), false)
    }

    #[test]
    fn add_note_orbital_uses_spiral() {
        let mut store = NoteStore::new();
        let a = store.add_note(NoteKind::Earth, NoteSeed::default(), true);
        let expected = orbital_position(0, NoteKind::Earth.diameter());
        assert_eq!(store.get(a).unwrap().position, expected);
    }

    #[test]
    fn add_note_explicit_position_wins_without_orbital() {
        let mut store = NoteStore::new();
        let seed = NoteSeed {
            position: Some(Vec2::new(7.0, 8.0)),
            ..Default::default()
        };
        let a = store.add_note(NoteKind::Mars, seed, false);
        assert_eq!(store.get(a).unwrap().position, Vec2::new(7.0, 8.0));
    }

    #[test]
    fn new_container_is_its_own_group() {
        let mut store = NoteStore::new();
        let neb = add(&mut store, NoteKind::Nebula);
        assert_eq!(store.get(neb).unwrap().group_id, Some(neb));
    }

    #[test]
    fn dangling_parent_seed_is_dropped() {
        let mut store = NoteStore::new();
        let ghost = NoteId::intern("never_added");
        let seed = NoteSeed {
            parent_id: Some(ghost),
            ..Default::default()
        };
        let a = store.add_note(NoteKind::Moon, seed, false);
        assert_eq!(store.get(a).unwrap().parent_id, None);
    }

    #[test]
    fn link_is_symmetric_and_idempotent() {
        let mut store = NoteStore::new();
        let a = add(&mut store, NoteKind::Earth);
        let b = add(&mut store, NoteKind::Mars);
        store.create_link(a, b);
        store.create_link(a, b);
        store.create_link(b, a);
        assert_eq!(store.linked_ids(a), vec![b]);
        assert_eq!(store.linked_ids(b), vec![a]);
        assert_eq!(store.links().len(), 1);
    }

    #[test]
    fn self_link_is_noop() {
        let mut store = NoteStore::new();
        let a = add(&mut store, NoteKind::Earth);
        store.create_link(a, a);
        assert!(store.linked_ids(a).is_empty());
    }

    #[test]
    fn remove_parent_link_keeps_links() {
        let mut store = NoteStore::new();
        let parent = add(&mut store, NoteKind::Sun);
        let child = add(&mut store, NoteKind::Earth);
        store.set_parent(child, parent);
        store.create_link(child, parent);
        store.remove_parent_link(child);
        assert_eq!(store.get(child).unwrap().parent_id, None);
        assert!(store.is_linked(child, parent));
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut store = NoteStore::new();
        let a = add(&mut store, NoteKind::Sun);
        let b = add(&mut store, NoteKind::Earth);
        let c = add(&mut store, NoteKind::Moon);
        store.set_parent(b, a);
        store.set_parent(c, b);
        // a → b → c established; closing the loop must be refused.
        store.set_parent(a, c);
        assert_eq!(store.get(a).unwrap().parent_id, None);
        store.set_parent(a, a);
        assert_eq!(store.get(a).unwrap().parent_id, None);
    }

    #[test]
    fn missing_ids_never_panic() {
        let mut store = NoteStore::new();
        let ghost = NoteId::intern("ghost");
        store.update_note_position(ghost, Vec2::new(1.0, 1.0));
        store.update_content(ghost, "x");
        store.delete_note(ghost);
        store.create_link(ghost, ghost);
        store.remove_link(ghost, ghost);
        store.remove_parent_link(ghost);
        store.set_group(ghost, None);
        assert!(store.is_empty());
    }

    #[test]
    fn zero_delta_move_does_not_bump_revision() {
        let mut store = NoteStore::new();
        let a = add(&mut store, NoteKind::Earth);
        let rev = store.revision();
        store.update_note_position(a, Vec2::ZERO);
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn deleting_container_clears_member_groups() {
        let mut store = NoteStore::new();
        let neb = add(&mut store, NoteKind::Nebula);
        let m = add(&mut store, NoteKind::Earth);
        store.set_group(m, Some(neb));
        store.delete_note(neb);
        assert_eq!(store.get(m).unwrap().group_id, None);
    }

    #[test]
    fn deleting_last_member_deactivates_container() {
        let mut store = NoteStore::new();
        let neb = add(&mut store, NoteKind::Nebula);
        let m = add(&mut store, NoteKind::Earth);
        store.set_group(m, Some(neb));
        store.delete_note(m);
        assert_eq!(store.get(neb).unwrap().group_id, None);
    }

    #[test]
    fn snapshot_roundtrip_preserves_notes_and_links() {
        let mut store = NoteStore::new();
        let a = add(&mut store, NoteKind::Earth);
        let b = add(&mut store, NoteKind::Mars);
        store.create_link(a, b);
        store.update_content(a, "blue marble");

        let restored = NoteStore::from_snapshot(store.to_snapshot());
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get(a).unwrap().content, "blue marble");
        assert!(restored.is_linked(a, b));
    }

    #[test]
    fn snapshot_restore_drops_dangling_links() {
        let a = NoteId::intern("snap_a");
        let snapshot = Snapshot {
            notes: vec![Note::new(a, NoteKind::Earth, Vec2::ZERO)],
            links: vec![
                Link::new(a, NoteId::intern("snap_missing")),
                Link::new(a, a),
            ],
        };
        let store = NoteStore::from_snapshot(snapshot);
        assert!(store.linked_ids(a).is_empty());
    }

    #[test]
    fn container_at_finds_enclosing_nebula() {
        let mut store = NoteStore::new();
        let neb = store.add_note(
            NoteKind::Nebula,
            NoteSeed {
                position: Some(Vec2::ZERO),
                ..Default::default()
            },
            false,
        );
        let outside = Vec2::new(-10.0, -10.0);
        let inside = Vec2::new(800.0, 800.0);
        let dragged = NoteId::intern("dragged");
        assert_eq!(store.container_at(inside, dragged), Some(neb));
        assert_eq!(store.container_at(outside, dragged), None);
        // A container never contains itself for drop purposes.
        assert_eq!(store.container_at(inside, neb), None);
    }
}
