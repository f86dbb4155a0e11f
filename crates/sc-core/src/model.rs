//! Core data model for the cosmic canvas.
//!
//! Notes are celestial bodies placed in world coordinates. Two relation
//! kinds exist between them: a hierarchical parent edge (`parent_id`,
//! forming a forest) and symmetric arbitrary links (held in the store's
//! link graph, not on the note itself). A Nebula can additionally act as
//! a spatial group container via `group_id`.

use crate::geometry::Vec2;
use crate::id::NoteId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Celestial kinds ─────────────────────────────────────────────────────

/// The celestial body a note renders as. Kind determines render diameter
/// and palette only — behavior is identical for all kinds except `Nebula`,
/// the group container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    // Cosmic structures
    Nebula,
    Galaxy,
    // Stars
    Sun,
    RedGiant,
    WhiteDwarf,
    Pulsar,
    // Gas giants
    Jupiter,
    Saturn,
    // Ice giants
    Neptune,
    Uranus,
    // Terrestrial planets
    Earth,
    Venus,
    Mars,
    Mercury,
    // Dwarf planets
    Pluto,
    Ceres,
    // Other
    Moon,
    Asteroid,
    Comet,
}

impl NoteKind {
    /// Render diameter in world units.
    pub fn diameter(self) -> f32 {
        match self {
            Self::Nebula => 1600.0,
            Self::Galaxy => 1200.0,
            Self::RedGiant => 900.0,
            Self::Sun => 800.0,
            Self::Jupiter => 700.0,
            Self::Saturn => 600.0,
            Self::Neptune => 500.0,
            Self::Uranus => 480.0,
            Self::Earth => 400.0,
            Self::Venus => 380.0,
            Self::Mars => 340.0,
            Self::Pulsar => 320.0,
            Self::WhiteDwarf => 300.0,
            Self::Comet => 280.0,
            Self::Mercury => 260.0,
            Self::Moon => 240.0,
            Self::Pluto => 220.0,
            Self::Ceres => 200.0,
            Self::Asteroid => 180.0,
        }
    }

    /// Half the diameter — the bounding-circle radius links anchor to.
    pub fn radius(self) -> f32 {
        self.diameter() / 2.0
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Nebula => "Nebula",
            Self::Galaxy => "Galaxy",
            Self::Sun => "Sun",
            Self::RedGiant => "Red Giant",
            Self::WhiteDwarf => "White Dwarf",
            Self::Pulsar => "Pulsar",
            Self::Jupiter => "Jupiter",
            Self::Saturn => "Saturn",
            Self::Neptune => "Neptune",
            Self::Uranus => "Uranus",
            Self::Earth => "Earth",
            Self::Venus => "Venus",
            Self::Mars => "Mars",
            Self::Mercury => "Mercury",
            Self::Pluto => "Pluto",
            Self::Ceres => "Ceres",
            Self::Moon => "Moon",
            Self::Asteroid => "Asteroid",
            Self::Comet => "Comet",
        }
    }

    /// Whether this kind can contain other notes as a group.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Nebula)
    }

    /// Default rich-text payload for a freshly created note.
    pub fn default_content(self) -> String {
        if self.is_container() {
            "<h1>Nebula Title</h1>".to_string()
        } else {
            format!("New {}", self.label())
        }
    }
}

// ─── Notes ───────────────────────────────────────────────────────────────

/// A single note on the canvas.
///
/// `position` is the top-left corner of the note's bounding box in world
/// coordinates (the bounding box is `diameter × diameter`). `content` is
/// an opaque payload owned by the external rich-text editor and passed
/// through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub kind: NoteKind,
    pub position: Vec2,
    pub content: String,

    /// Hierarchical parent. Forms a forest — never a cycle.
    pub parent_id: Option<NoteId>,

    /// The container note this entity spatially belongs to. A container's
    /// own `group_id` equals its own id while it has at least one member,
    /// and is `None` when empty.
    pub group_id: Option<NoteId>,

    /// Freeform tags, carried through persistence and export untouched.
    pub tags: SmallVec<[String; 2]>,
}

impl Note {
    pub fn new(id: NoteId, kind: NoteKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            content: kind.default_content(),
            parent_id: None,
            group_id: None,
            tags: SmallVec::new(),
        }
    }

    /// Center of the bounding box in world coordinates.
    pub fn center(&self) -> Vec2 {
        let r = self.kind.radius();
        Vec2::new(self.position.x + r, self.position.y + r)
    }

    /// Whether this note is an active group container (has members).
    pub fn is_active_container(&self) -> bool {
        self.kind.is_container() && self.group_id == Some(self.id)
    }
}

/// A symmetric arbitrary link between two notes, in canonical order
/// (`a <= b`). The store's link graph is the source of truth; this shape
/// exists for persistence and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    pub a: NoteId,
    pub b: NoteId,
}

impl Link {
    pub fn new(x: NoteId, y: NoteId) -> Self {
        if x <= y { Self { a: x, b: y } } else { Self { a: y, b: x } }
    }
}

// ─── Viewport ────────────────────────────────────────────────────────────

pub const ZOOM_MIN: f32 = 0.1;
pub const ZOOM_MAX: f32 = 3.0;

/// The canvas view transform: `screen = world * zoom + pan`.
/// `pan` is in screen pixels, `zoom` is clamped to `[ZOOM_MIN, ZOOM_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Viewport {
    pub fn new(pan: Vec2, zoom: f32) -> Self {
        Self {
            pan,
            zoom: zoom.clamp(ZOOM_MIN, ZOOM_MAX),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// Screen dimensions in pixels, needed to turn the viewport transform
/// into a world-space view rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}
