//! Note identity.
//!
//! Ids are interned strings: copying and comparing one costs the same as
//! a small integer, while the original text stays resolvable for display,
//! persistence, and stable cross-run ordering.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Process-wide interner backing every `NoteId`.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identifier of a note on the canvas. Wraps an interner key, so two ids
/// made from the same string are equal and hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteId(Spur);

impl NoteId {
    /// The id for `s`, interning the string on first use.
    pub fn intern(s: &str) -> Self {
        NoteId(INTERNER.get_or_intern(s))
    }

    /// The underlying string.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Allocate a fresh process-unique id for a newly created note.
    pub fn fresh() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("note_{n}"))
    }
}

// Ordering goes through the resolved strings, not the interner keys:
// key order depends on interning order, which differs between a fresh
// session and one restored from a snapshot.
impl PartialOrd for NoteId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NoteId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

// Persisted as the plain string; loading interns it again.
impl Serialize for NoteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NoteId::intern(&s))
    }
}
