//! Snapshot persistence.
//!
//! Overwrite-all semantics: the whole note/link collection is written as
//! one MessagePack blob on every save. Saves are already debounced by the
//! editor, so there is no incremental format. A missing file on load is a
//! first run, not an error.

use crate::error::IoError;
use sc_core::Snapshot;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence collaborator: `load_all` at startup, `save_all` after the
/// save debounce fires.
pub trait Storage {
    fn load_all(&self) -> Result<Snapshot, IoError>;
    fn save_all(&mut self, snapshot: &Snapshot) -> Result<(), IoError>;
}

// ─── File-backed ─────────────────────────────────────────────────────────

/// MessagePack snapshot at a fixed path. Writes go through a sibling
/// temp file and rename, so a crash mid-save never truncates the
/// previous snapshot.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> IoError {
        IoError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

impl Storage for FileStorage {
    fn load_all(&self) -> Result<Snapshot, IoError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no snapshot at {}, starting empty", self.path.display());
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(self.io_err(e)),
        };
        let snapshot: Snapshot = rmp_serde::from_slice(&bytes)?;
        log::info!(
            "loaded {} note(s), {} link(s) from {}",
            snapshot.notes.len(),
            snapshot.links.len(),
            self.path.display()
        );
        Ok(snapshot)
    }

    fn save_all(&mut self, snapshot: &Snapshot) -> Result<(), IoError> {
        let bytes = rmp_serde::to_vec_named(snapshot)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        log::debug!("saved {} byte(s) to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

// ─── In-memory ───────────────────────────────────────────────────────────

/// Degraded-mode storage when the filesystem is unavailable: the session
/// keeps working, nothing survives it.
#[derive(Default)]
pub struct MemoryStorage {
    snapshot: Snapshot,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load_all(&self) -> Result<Snapshot, IoError> {
        Ok(self.snapshot.clone())
    }

    fn save_all(&mut self, snapshot: &Snapshot) -> Result<(), IoError> {
        self.snapshot = snapshot.clone();
        Ok(())
    }
}

/// Open file storage, or fall back to memory-only when the snapshot
/// location is unusable. Startup must never block the canvas on IO.
pub fn open_or_memory(path: impl Into<PathBuf>) -> Box<dyn Storage> {
    let path = path.into();
    match path.parent().map(fs::create_dir_all) {
        Some(Err(e)) => {
            log::warn!(
                "cannot use {} ({e}), falling back to in-memory session",
                path.display()
            );
            Box::new(MemoryStorage::new())
        }
        _ => Box::new(FileStorage::new(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{NoteId, NoteKind, NoteSeed, NoteStore, Vec2};

    fn sample_snapshot() -> (Snapshot, NoteId, NoteId) {
        let mut store = NoteStore::new();
        let a = store.add_note(
            NoteKind::Earth,
            NoteSeed {
                position: Some(Vec2::new(12.0, -8.0)),
                ..Default::default()
            },
            false,
        );
        let b = store.add_note(NoteKind::Nebula, NoteSeed::default(), false);
        store.create_link(a, b);
        store.update_content(a, "home");
        (store.to_snapshot(), a, b)
    }

    #[test]
    fn file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("canvas.msgpack"));
        let (snapshot, a, b) = sample_snapshot();

        storage.save_all(&snapshot).unwrap();
        let loaded = storage.load_all().unwrap();

        assert_eq!(loaded.notes.len(), 2);
        assert_eq!(loaded.links, vec![sc_core::Link::new(a, b)]);
        let earth = loaded.notes.iter().find(|n| n.id == a).unwrap();
        assert_eq!(earth.content, "home");
        assert_eq!(earth.position, Vec2::new(12.0, -8.0));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nope.msgpack"));
        let snapshot = storage.load_all().unwrap();
        assert!(snapshot.notes.is_empty());
        assert!(snapshot.links.is_empty());
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("canvas.msgpack"));
        let (snapshot, ..) = sample_snapshot();
        storage.save_all(&snapshot).unwrap();
        storage.save_all(&Snapshot::default()).unwrap();
        assert!(storage.load_all().unwrap().notes.is_empty());
    }

    #[test]
    fn memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        let (snapshot, ..) = sample_snapshot();
        storage.save_all(&snapshot).unwrap();
        assert_eq!(storage.load_all().unwrap().notes.len(), 2);
    }
}
