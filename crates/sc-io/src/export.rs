//! One-way export of the canvas to portable documents.
//!
//! Two formats: a structured JSON document carrying the full entity
//! shapes, and a flat Markdown outline for reading outside the app. The
//! bundle writer drops both, plus a manifest, into a directory.

use crate::error::IoError;
use sc_core::{Link, Note, Snapshot};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Bumped when the exported JSON shape changes.
const EXPORT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ExportDocument<'a> {
    version: u32,
    notes: &'a [Note],
    links: &'a [Link],
}

/// Snapshot → pretty-printed JSON document.
pub fn export_json(snapshot: &Snapshot) -> Result<String, IoError> {
    let doc = ExportDocument {
        version: EXPORT_VERSION,
        notes: &snapshot.notes,
        links: &snapshot.links,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Snapshot → Markdown outline: one section per note with its kind,
/// relations, and the raw content payload.
pub fn export_markdown(snapshot: &Snapshot) -> String {
    let mut out = String::from("# Canvas export\n");
    for note in &snapshot.notes {
        out.push_str(&format!("\n## {} ({})\n\n", note.id, note.kind.label()));
        if let Some(parent) = note.parent_id {
            out.push_str(&format!("- parent: {parent}\n"));
        }
        let linked: Vec<String> = snapshot
            .links
            .iter()
            .filter_map(|l| {
                if l.a == note.id {
                    Some(l.b.to_string())
                } else if l.b == note.id {
                    Some(l.a.to_string())
                } else {
                    None
                }
            })
            .collect();
        if !linked.is_empty() {
            out.push_str(&format!("- linked: {}\n", linked.join(", ")));
        }
        if !note.tags.is_empty() {
            out.push_str(&format!("- tags: {}\n", note.tags.join(", ")));
        }
        out.push('\n');
        out.push_str(&note.content);
        out.push('\n');
    }
    out
}

/// Write a bundle directory: `canvas.json`, `canvas.md`, and a
/// `manifest.json` naming them. Overwrites existing files in place.
pub fn export_bundle(snapshot: &Snapshot, dir: &Path) -> Result<(), IoError> {
    let io_err = |source| IoError::Storage {
        path: dir.to_path_buf(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    fs::write(dir.join("canvas.json"), export_json(snapshot)?).map_err(io_err)?;
    fs::write(dir.join("canvas.md"), export_markdown(snapshot)).map_err(io_err)?;

    #[derive(Serialize)]
    struct Manifest<'a> {
        version: u32,
        files: &'a [&'a str],
        note_count: usize,
        link_count: usize,
    }
    let manifest = serde_json::to_string_pretty(&Manifest {
        version: EXPORT_VERSION,
        files: &["canvas.json", "canvas.md"],
        note_count: snapshot.notes.len(),
        link_count: snapshot.links.len(),
    })?;
    fs::write(dir.join("manifest.json"), manifest).map_err(io_err)?;

    log::info!(
        "exported {} note(s) to {}",
        snapshot.notes.len(),
        dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{NoteKind, NoteSeed, NoteStore, Vec2};

    fn snapshot() -> Snapshot {
        let mut store = NoteStore::new();
        let a = store.add_note(
            NoteKind::Earth,
            NoteSeed {
                position: Some(Vec2::new(1.0, 2.0)),
                ..Default::default()
            },
            false,
        );
        let b = store.add_note(NoteKind::Sun, NoteSeed::default(), false);
        store.set_parent(a, b);
        store.create_link(a, b);
        store.update_content(a, "pale blue dot");
        store.to_snapshot()
    }

    #[test]
    fn json_export_carries_all_entities() {
        let json = export_json(&snapshot()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["notes"].as_array().unwrap().len(), 2);
        assert_eq!(value["links"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn markdown_export_lists_relations_and_content() {
        let md = export_markdown(&snapshot());
        assert!(md.contains("(Earth)"));
        assert!(md.contains("- parent: "));
        assert!(md.contains("- linked: "));
        assert!(md.contains("pale blue dot"));
    }

    #[test]
    fn bundle_writes_manifest_and_documents() {
        let dir = tempfile::tempdir().unwrap();
        export_bundle(&snapshot(), dir.path()).unwrap();
        for name in ["canvas.json", "canvas.md", "manifest.json"] {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }
        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(manifest["note_count"], 2);
        assert_eq!(manifest["link_count"], 1);
    }
}
