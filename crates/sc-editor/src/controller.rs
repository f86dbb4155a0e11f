//! The canvas interaction state machine.
//!
//! Translates normalized input events into store mutations: panning,
//! anchored zooming, box selection, note dragging (with group cascade and
//! container re-parenting), link-drag creation, and edge-triggered
//! auto-panning. One controller per canvas; the embedding drives it with
//! `handle` for events and `tick` once per animation frame.
//!
//! States are logically prioritized link-drag > panning > box-select >
//! idle; note dragging is tracked alongside because it owns the per-frame
//! containment and disposal checks.

use crate::frame::{Debounce, FrameScheduler};
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use sc_core::{
    NoteId, NoteKind, NoteSeed, NoteStore, Rect, ScreenSize, Vec2, Viewport, ZOOM_MAX, ZOOM_MIN,
    screen_to_world, world_to_screen,
};
use sc_render::{Connection, Overlay, hit_test, hit_test_connection, hit_test_rect};
use std::time::{Duration, Instant};

// ─── Tunables ────────────────────────────────────────────────────────────

/// Width of the screen-edge band that triggers auto-panning, in pixels.
pub const EDGE_MARGIN: f32 = 60.0;
/// Auto-pan speed at the very edge, in pixels per frame.
pub const MAX_PAN_SPEED: f32 = 15.0;
/// Pointer travel below this, in either axis, is a click rather than a
/// box-select drag.
pub const DRAG_DEAD_ZONE: f32 = 5.0;

/// Distance from the disposal control at which the pre-absorption visual
/// cue starts, in screen pixels.
pub const DISPOSAL_PULL_RADIUS: f32 = 150.0;
/// Distance at which releasing a drag commits deletion.
pub const DISPOSAL_ABSORB_RADIUS: f32 = 80.0;
/// Offset of the disposal control's center from the bottom-right corner.
pub const DISPOSAL_OFFSET: f32 = 80.0;

/// How close the pointer must be to a link curve or parent line, in
/// screen pixels, to hover it for removal.
pub const CONNECTION_HIT_TOLERANCE: f32 = 8.0;

const SAVE_QUIET: Duration = Duration::from_secs(1);
const WHEEL_ZOOM_RATE: f32 = 0.002;
const KEY_ZOOM_STEP: f32 = 1.2;

// ─── State machine ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Idle,
    /// Background drag with the pan modifier held. `last` is the previous
    /// pointer position; pan accumulates raw pixel deltas.
    Panning { last: Vec2 },
    /// Background drag without the pan modifier. Screen-space corners.
    BoxSelecting { anchor: Vec2, cursor: Vec2 },
    /// Dragging a note body. `last` is the previous pointer position.
    DraggingNote { id: NoteId, last: Vec2 },
    /// Dragging out a link from a note's connection port.
    LinkDragging { source: NoteId, cursor: Vec2 },
}

/// Per-frame outcome of [`CanvasController::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickResult {
    /// The save debounce elapsed; the embedding should persist now.
    pub save: bool,
}

pub struct CanvasController {
    store: NoteStore,
    screen: ScreenSize,
    mode: Mode,
    /// Spacebar pan-mode affordance.
    space_held: bool,
    /// Open radial creation menu, screen position.
    creation_menu: Option<Vec2>,
    /// Connection under the idle cursor; clicking it removes the relation.
    hovered_connection: Option<Connection>,
    /// Note playing its disposal exit animation, awaiting `finish_disposal`.
    disposing: Option<NoteId>,
    /// Pre-absorption cue strength, 0..1, while a drag hovers the
    /// disposal control's pull zone.
    pull_progress: f32,
    /// Current auto-pan velocity (pan delta per frame).
    edge_velocity: Vec2,
    drag_checks: FrameScheduler,
    save: Debounce,
    seen_revision: u64,
}

impl CanvasController {
    pub fn new(store: NoteStore, screen: ScreenSize) -> Self {
        let seen_revision = store.revision();
        Self {
            store,
            screen,
            mode: Mode::Idle,
            space_held: false,
            creation_menu: None,
            hovered_connection: None,
            disposing: None,
            pull_progress: 0.0,
            edge_velocity: Vec2::ZERO,
            drag_checks: FrameScheduler::new(),
            save: Debounce::new(SAVE_QUIET),
            seen_revision,
        }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut NoteStore {
        &mut self.store
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn set_screen_size(&mut self, screen: ScreenSize) {
        self.screen = screen;
    }

    pub fn creation_menu(&self) -> Option<Vec2> {
        self.creation_menu
    }

    pub fn disposing(&self) -> Option<NoteId> {
        self.disposing
    }

    pub fn hovered_connection(&self) -> Option<Connection> {
        self.hovered_connection
    }

    /// Whether the edge-pan loop needs further frames.
    pub fn wants_frames(&self) -> bool {
        self.edge_velocity != Vec2::ZERO
            || self.drag_checks.is_scheduled()
            || self.save.is_pending()
    }

    /// Screen position of the disposal control's center.
    pub fn disposal_center(&self) -> Vec2 {
        Vec2::new(
            self.screen.width - DISPOSAL_OFFSET,
            self.screen.height - DISPOSAL_OFFSET,
        )
    }

    /// Render overlay for the current interaction state.
    pub fn overlay(&self) -> Overlay {
        let marquee = match &self.mode {
            Mode::BoxSelecting { anchor, cursor } if Self::past_dead_zone(*anchor, *cursor) => {
                Some(Rect::from_points(*anchor, *cursor))
            }
            _ => None,
        };
        let link_preview = match &self.mode {
            Mode::LinkDragging { source, cursor } => Some((*source, *cursor)),
            _ => None,
        };
        Overlay {
            marquee,
            link_preview,
            hovered_connection: self.hovered_connection,
            absorb_progress: self.pull_progress,
        }
    }

    fn connection_at(&self, world: Vec2) -> Option<Connection> {
        let tolerance = CONNECTION_HIT_TOLERANCE / self.store.viewport().zoom;
        hit_test_connection(&self.store, world, tolerance)
    }

    // ─── Event handling ──────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { pos, modifiers } => self.pointer_down(*pos, *modifiers),
            InputEvent::PointerMove { pos, .. } => self.pointer_move(*pos),
            InputEvent::PointerUp { pos, .. } => self.pointer_up(*pos),
            InputEvent::DoubleClick { pos } => self.double_click(*pos),
            InputEvent::Wheel { pos, delta_y } => self.wheel(*pos, *delta_y),
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers),
            InputEvent::KeyUp { key } => {
                if key == " " {
                    self.space_held = false;
                }
            }
        }
        self.note_mutations(Instant::now());
    }

    fn pointer_down(&mut self, pos: Vec2, modifiers: Modifiers) {
        self.creation_menu = None;
        let world = screen_to_world(pos, &self.store.viewport());

        if self.space_held {
            self.hovered_connection = None;
            self.mode = Mode::Panning { last: pos };
            return;
        }

        if let Some(id) = hit_test(&self.store, world) {
            self.hovered_connection = None;
            // Shift toggles membership; a plain click on an unselected
            // note replaces the selection, on a selected one keeps it
            // (so multi-drags survive the grab).
            if modifiers.shift {
                self.store.set_selection(|sel| {
                    let mut next = sel.to_vec();
                    if let Some(i) = next.iter().position(|s| *s == id) {
                        next.remove(i);
                    } else {
                        next.push(id);
                    }
                    next
                });
            } else if !self.store.selection().contains(&id) {
                self.store.set_selection(|_| vec![id]);
            }
            self.mode = Mode::DraggingNote { id, last: pos };
        } else if let Some(connection) = self.connection_at(world) {
            // Clicking a hovered connection severs it; the press is
            // consumed, no box select starts.
            match connection {
                Connection::Link(link) => {
                    log::debug!("remove link {} ~ {}", link.a, link.b);
                    self.store.remove_link(link.a, link.b);
                }
                Connection::Parent { child } => {
                    log::debug!("detach {child} from parent");
                    self.store.remove_parent_link(child);
                }
            }
            self.hovered_connection = None;
        } else {
            // Eager clear on background press, not deferred to release.
            if !modifiers.shift {
                self.store.clear_selection();
            }
            self.mode = Mode::BoxSelecting {
                anchor: pos,
                cursor: pos,
            };
        }
    }

    fn pointer_move(&mut self, pos: Vec2) {
        match &mut self.mode {
            Mode::Idle => {
                // Notes shadow the connections drawn beneath them.
                let world = screen_to_world(pos, &self.store.viewport());
                self.hovered_connection = if hit_test(&self.store, world).is_some() {
                    None
                } else {
                    self.connection_at(world)
                };
            }
            Mode::Panning { last } => {
                let delta = pos - *last;
                *last = pos;
                self.store.pan_by(delta);
            }
            Mode::BoxSelecting { cursor, .. } => {
                *cursor = pos;
                self.edge_velocity = edge_pan_velocity(pos, self.screen);
            }
            Mode::DraggingNote { id, last } => {
                let id = *id;
                let delta = pos - *last;
                *last = pos;
                let zoom = self.store.viewport().zoom;
                self.store
                    .update_note_position(id, delta * (1.0 / zoom));
                self.edge_velocity = edge_pan_velocity(pos, self.screen);
                self.drag_checks.schedule();
            }
            Mode::LinkDragging { cursor, .. } => {
                *cursor = pos;
                self.edge_velocity = edge_pan_velocity(pos, self.screen);
            }
        }
    }

    fn pointer_up(&mut self, pos: Vec2) {
        let mode = std::mem::replace(&mut self.mode, Mode::Idle);
        self.edge_velocity = Vec2::ZERO;

        match mode {
            Mode::Idle | Mode::Panning { .. } => {}
            Mode::BoxSelecting { anchor, .. } => {
                if Self::past_dead_zone(anchor, pos) {
                    let viewport = self.store.viewport();
                    let a = screen_to_world(anchor, &viewport);
                    let b = screen_to_world(pos, &viewport);
                    let hits = hit_test_rect(&self.store, Rect::from_points(a, b));
                    // Additive union: prior selections outside the box stay.
                    self.store.set_selection(|sel| {
                        let mut next = sel.to_vec();
                        for id in hits {
                            if !next.contains(&id) {
                                next.push(id);
                            }
                        }
                        next
                    });
                }
            }
            Mode::DraggingNote { id, .. } => self.finish_note_drag(id),
            Mode::LinkDragging { source, .. } => {
                let world = screen_to_world(pos, &self.store.viewport());
                if let Some(target) = hit_test(&self.store, world)
                    && target != source
                {
                    self.store.create_link(source, target);
                }
            }
        }
    }

    fn finish_note_drag(&mut self, id: NoteId) {
        self.store.set_drop_target(None);
        let Some(center) = self.store.get(id).map(|n| n.center()) else {
            return;
        };

        let screen_center = world_to_screen(center, &self.store.viewport());
        if (screen_center - self.disposal_center()).length() <= DISPOSAL_ABSORB_RADIUS {
            self.begin_disposal(id);
            return;
        }
        self.store.set_absorbing(None);
        self.pull_progress = 0.0;

        // Final containment decides membership.
        let container = self.store.container_at(center, id);
        if self.store.get(id).and_then(|n| n.group_id) != container {
            self.store.set_group(id, container);
        }
    }

    fn double_click(&mut self, pos: Vec2) {
        let world = screen_to_world(pos, &self.store.viewport());
        match hit_test(&self.store, world) {
            Some(id) => self.store.set_focused(Some(id)),
            None => self.creation_menu = Some(pos),
        }
    }

    fn wheel(&mut self, pos: Vec2, delta_y: f32) {
        let viewport = self.store.viewport();
        let new_zoom = (viewport.zoom * (1.0 - delta_y * WHEEL_ZOOM_RATE)).clamp(ZOOM_MIN, ZOOM_MAX);
        self.zoom_anchored(pos, new_zoom);
    }

    /// Set zoom while keeping the world point under `anchor` stationary:
    /// `new_pan = anchor − (anchor − pan) · (new_zoom / zoom)`.
    fn zoom_anchored(&mut self, anchor: Vec2, new_zoom: f32) {
        let viewport = self.store.viewport();
        if new_zoom == viewport.zoom {
            return;
        }
        let k = new_zoom / viewport.zoom;
        let new_pan = anchor - (anchor - viewport.pan) * k;
        self.store.set_viewport(Viewport::new(new_pan, new_zoom));
    }

    fn key(&mut self, key: &str, modifiers: Modifiers) {
        if key == " " {
            self.space_held = true;
            return;
        }
        let Some(action) = ShortcutMap::resolve(
            key,
            modifiers.ctrl,
            modifiers.shift,
            modifiers.alt,
            modifiers.meta,
        ) else {
            return;
        };

        match action {
            ShortcutAction::DeleteSelection => {
                for id in self.store.selection().to_vec() {
                    self.store.delete_note(id);
                }
            }
            ShortcutAction::SelectAll => {
                let mut all: Vec<NoteId> = self.store.notes().map(|n| n.id).collect();
                all.sort();
                self.store.set_selection(|_| all);
            }
            ShortcutAction::ZoomIn => self.key_zoom(KEY_ZOOM_STEP),
            ShortcutAction::ZoomOut => self.key_zoom(1.0 / KEY_ZOOM_STEP),
            ShortcutAction::ZoomReset => {
                let center = Vec2::new(self.screen.width / 2.0, self.screen.height / 2.0);
                self.zoom_anchored(center, 1.0);
            }
            ShortcutAction::Cancel => self.cancel(),
        }
    }

    fn key_zoom(&mut self, factor: f32) {
        let center = Vec2::new(self.screen.width / 2.0, self.screen.height / 2.0);
        let new_zoom = (self.store.viewport().zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.zoom_anchored(center, new_zoom);
    }

    /// Escape: unwind transient state in priority order — creation menu,
    /// then link drag, then selection, then box select.
    fn cancel(&mut self) {
        if self.creation_menu.is_some() {
            self.creation_menu = None;
        } else if matches!(self.mode, Mode::LinkDragging { .. }) {
            self.mode = Mode::Idle;
            self.edge_velocity = Vec2::ZERO;
        } else if !self.store.selection().is_empty() {
            self.store.clear_selection();
        } else if matches!(self.mode, Mode::BoxSelecting { .. }) {
            self.mode = Mode::Idle;
            self.edge_velocity = Vec2::ZERO;
        }
    }

    // ─── Explicit gestures ───────────────────────────────────────────────

    /// Start a link drag from a note's connection port.
    pub fn begin_link_drag(&mut self, source: NoteId, pos: Vec2) {
        if self.store.contains(source) {
            self.mode = Mode::LinkDragging {
                source,
                cursor: pos,
            };
        }
    }

    /// Create a note from the toolbar: orbital placement, selected.
    pub fn create_note(&mut self, kind: NoteKind) -> NoteId {
        let id = self.store.add_note(kind, NoteSeed::default(), true);
        self.store.set_selection(|_| vec![id]);
        self.note_mutations(Instant::now());
        id
    }

    /// Pick a kind from the open creation menu; spawns the note centered
    /// on the menu position and closes the menu.
    pub fn choose_creation(&mut self, kind: NoteKind) -> Option<NoteId> {
        let pos = self.creation_menu.take()?;
        let world = screen_to_world(pos, &self.store.viewport());
        let r = kind.radius();
        let seed = NoteSeed {
            position: Some(world - Vec2::new(r, r)),
            ..Default::default()
        };
        let id = self.store.add_note(kind, seed, false);
        self.store.set_selection(|_| vec![id]);
        self.note_mutations(Instant::now());
        Some(id)
    }

    // ─── Disposal (two-phase deletion) ───────────────────────────────────

    /// Phase one: mark the note for removal and start the exit animation.
    /// The note stays in the store so the render layer can animate it.
    fn begin_disposal(&mut self, id: NoteId) {
        log::debug!("disposal: absorbing {id}");
        self.store.set_absorbing(Some(id));
        self.disposing = Some(id);
        self.pull_progress = 1.0;
    }

    /// Phase two, called when the exit animation completes: the actual
    /// cascade delete.
    pub fn finish_disposal(&mut self) {
        if let Some(id) = self.disposing.take() {
            self.store.delete_note(id);
            self.pull_progress = 0.0;
            self.note_mutations(Instant::now());
        }
    }

    // ─── Frame loop ──────────────────────────────────────────────────────

    /// Advance one animation frame: apply edge-pan velocity, run the
    /// throttled drag checks, and poll the save debounce.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        if self.edge_velocity != Vec2::ZERO {
            let delta = self.edge_velocity;
            self.store.pan_by(delta);
            // Keep the dragged note pinned under the stationary pointer.
            if let Mode::DraggingNote { id, .. } = self.mode {
                let zoom = self.store.viewport().zoom;
                self.store.update_note_position(id, -delta * (1.0 / zoom));
                self.drag_checks.schedule();
            }
        }

        if self.drag_checks.take() {
            self.run_drag_checks();
        }

        self.note_mutations(now);
        let save = self.save.poll(now);
        if save {
            log::debug!("save debounce elapsed at revision {}", self.seen_revision);
        }
        TickResult { save }
    }

    /// Arm the save debounce when the store has changed. `now` is the
    /// caller's clock so the quiet period measures against the same
    /// timestamps `tick` later polls with.
    fn note_mutations(&mut self, now: Instant) {
        let revision = self.store.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.save.fire(now);
        }
    }

    /// Containment and disposal checks, at most once per frame.
    fn run_drag_checks(&mut self) {
        let Mode::DraggingNote { id, .. } = self.mode else {
            return;
        };
        let Some(center) = self.store.get(id).map(|n| n.center()) else {
            return;
        };

        let target = self.store.container_at(center, id);
        if self.store.drop_target() != target {
            self.store.set_drop_target(target);
        }

        let screen_center = world_to_screen(center, &self.store.viewport());
        let dist = (screen_center - self.disposal_center()).length();
        if dist <= DISPOSAL_PULL_RADIUS {
            self.pull_progress = 1.0 - dist / DISPOSAL_PULL_RADIUS;
            if self.store.absorbing() != Some(id) {
                self.store.set_absorbing(Some(id));
            }
        } else {
            self.pull_progress = 0.0;
            if self.store.absorbing().is_some() {
                self.store.set_absorbing(None);
            }
        }
    }

    fn past_dead_zone(anchor: Vec2, cursor: Vec2) -> bool {
        (cursor.x - anchor.x).abs() > DRAG_DEAD_ZONE || (cursor.y - anchor.y).abs() > DRAG_DEAD_ZONE
    }
}

/// Pan velocity for a pointer position: a linear ramp per axis from zero
/// at the inner margin boundary to `MAX_PAN_SPEED` at the screen edge.
/// The sign reveals content in the pointed-at direction (pointer at the
/// left edge pans the view left).
pub fn edge_pan_velocity(pos: Vec2, screen: ScreenSize) -> Vec2 {
    fn axis(p: f32, extent: f32) -> f32 {
        if p < EDGE_MARGIN {
            MAX_PAN_SPEED * ((EDGE_MARGIN - p).min(EDGE_MARGIN) / EDGE_MARGIN)
        } else if p > extent - EDGE_MARGIN {
            -MAX_PAN_SPEED * ((p - (extent - EDGE_MARGIN)).min(EDGE_MARGIN) / EDGE_MARGIN)
        } else {
            0.0
        }
    }
    Vec2::new(axis(pos.x, screen.width), axis(pos.y, screen.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> ScreenSize {
        ScreenSize {
            width: 1000.0,
            height: 800.0,
        }
    }

    #[test]
    fn edge_velocity_ramps_linearly() {
        let s = screen();
        assert_eq!(edge_pan_velocity(Vec2::new(500.0, 400.0), s), Vec2::ZERO);
        // Halfway into the left margin: half speed, panning right (+x).
        let v = edge_pan_velocity(Vec2::new(30.0, 400.0), s);
        assert_eq!(v.x, MAX_PAN_SPEED / 2.0);
        assert_eq!(v.y, 0.0);
        // At the very edge: full speed.
        let v = edge_pan_velocity(Vec2::new(0.0, 400.0), s);
        assert_eq!(v.x, MAX_PAN_SPEED);
        // Right edge pans the other way.
        let v = edge_pan_velocity(Vec2::new(1000.0, 400.0), s);
        assert_eq!(v.x, -MAX_PAN_SPEED);
        // Corners ramp both axes.
        let v = edge_pan_velocity(Vec2::new(0.0, 800.0), s);
        assert_eq!(v, Vec2::new(MAX_PAN_SPEED, -MAX_PAN_SPEED));
    }

    #[test]
    fn pointer_past_the_edge_clamps_to_max() {
        let v = edge_pan_velocity(Vec2::new(-40.0, 400.0), screen());
        assert_eq!(v.x, MAX_PAN_SPEED);
    }
}
