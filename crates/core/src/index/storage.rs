//! On-disk form of a committed snapshot.
//!
//! `classes.idx` and `names.idx` are MessagePack (`rmp-serde`) encodings of
//! sorted maps, so equal snapshots always produce equal bytes. The ledger is
//! plain text, one fingerprint per line. Every file is written to a `.tmp`
//! sibling first and renamed over the committed one.

use super::model::{ClassIndex, NameIndex, ScanLedger};
use super::store::IndexSnapshot;
use crate::error::Result;
use luasense_api::Fingerprint;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CLASSES_FILE: &str = "classes.idx";
pub const NAMES_FILE: &str = "names.idx";
pub const LEDGER_FILE: &str = "scanned_files.txt";

/// Bumped whenever the encoded layout changes; older files are discarded.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct IndexFile<T> {
    version: u32,
    data: T,
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, bytes)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}

fn encode<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    let file = IndexFile {
        version: FORMAT_VERSION,
        data,
    };
    Ok(rmp_serde::to_vec_named(&file)?)
}

/// Decode an index file, or `None` when it is missing, unreadable or of
/// another format version. Bad files are removed so the next scan rebuilds
/// them.
fn decode<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)?;

    match rmp_serde::from_slice::<IndexFile<T>>(&bytes) {
        Ok(file) if file.version == FORMAT_VERSION => Ok(Some(file.data)),
        Ok(file) => {
            tracing::warn!(
                "Index version mismatch at {} (found {}, expected {}). Will rebuild.",
                path.display(),
                file.version,
                FORMAT_VERSION
            );
            let _ = std::fs::remove_file(path);
            Ok(None)
        }
        Err(e) => {
            crate::logging::diagnostic("index-load", &e);
            tracing::warn!("Failed to parse index at {}: {}. Will rebuild.", path.display(), e);
            let _ = std::fs::remove_file(path);
            Ok(None)
        }
    }
}

pub fn encode_ledger(ledger: &ScanLedger) -> String {
    ledger.iter().map(|fp| format!("{fp}\n")).collect()
}

/// Parse ledger text, skipping blank and malformed lines.
pub fn decode_ledger(text: &str) -> ScanLedger {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match line.parse::<Fingerprint>() {
            Ok(fp) => Some(fp),
            Err(e) => {
                tracing::warn!("Skipping ledger line: {}", e);
                None
            }
        })
        .collect()
}

/// Persist a snapshot. The ledger is written last so an interrupted save
/// leads to a rescan rather than to an archive marked as indexed.
pub fn save_snapshot(dir: &Path, snapshot: &IndexSnapshot) -> Result<()> {
    write_atomic(&dir.join(CLASSES_FILE), &encode(&snapshot.classes)?)?;
    write_atomic(&dir.join(NAMES_FILE), &encode(&snapshot.names)?)?;
    write_atomic(&dir.join(LEDGER_FILE), encode_ledger(&snapshot.ledger).as_bytes())?;

    tracing::info!(
        "Saved index to {} ({} classes)",
        dir.display(),
        snapshot.classes.len()
    );
    Ok(())
}

/// Load the persisted snapshot, `None` when no usable class index exists.
pub fn load_snapshot(dir: &Path) -> Result<Option<IndexSnapshot>> {
    let Some(classes) = decode::<ClassIndex>(&dir.join(CLASSES_FILE))? else {
        return Ok(None);
    };

    let names = match decode::<NameIndex>(&dir.join(NAMES_FILE))? {
        Some(names) => names,
        None => NameIndex::from_classes(&classes),
    };

    let ledger_path = dir.join(LEDGER_FILE);
    let ledger = if ledger_path.exists() {
        decode_ledger(&std::fs::read_to_string(&ledger_path)?)
    } else {
        ScanLedger::new()
    };

    tracing::info!("Loaded index from {} ({} classes)", dir.display(), classes.len());
    Ok(Some(IndexSnapshot {
        classes,
        names,
        ledger,
    }))
}

/// Remove every persisted index file.
pub fn clear_index(dir: &Path) -> Result<()> {
    for file in [CLASSES_FILE, NAMES_FILE, LEDGER_FILE] {
        let path = dir.join(file);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use luasense_api::CompletionEntry;
    use luasense_plugin::ClassMembers;

    fn snapshot() -> IndexSnapshot {
        let mut classes = ClassIndex::new();
        let mut widget = ClassMembers::new("a.Widget");
        widget.insert(CompletionEntry::method("show", "void", ""));
        widget.insert(CompletionEntry::method("setText", "void", "java.lang.CharSequence"));
        widget.insert(CompletionEntry::property("text", "java.lang.CharSequence"));
        classes.insert_members(widget);
        classes.insert_members(ClassMembers::new("a.Widget$Style"));

        let ledger = [
            Fingerprint::new("/libs/b.jar", 20),
            Fingerprint::new("/libs/a_v2.jar", 10),
        ]
        .into_iter()
        .collect();
        IndexSnapshot::new(classes, ledger)
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let original = snapshot();
        save_snapshot(dir.path(), &original).unwrap();

        let loaded = load_snapshot(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, original);
        assert!(!dir.path().join("classes.tmp").exists());
    }

    #[test]
    fn test_save_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        save_snapshot(dir.path(), &snapshot()).unwrap();
        let first = std::fs::read(dir.path().join(CLASSES_FILE)).unwrap();
        let first_names = std::fs::read(dir.path().join(NAMES_FILE)).unwrap();

        let reloaded = load_snapshot(dir.path()).unwrap().unwrap();
        save_snapshot(dir.path(), &reloaded).unwrap();
        assert_eq!(std::fs::read(dir.path().join(CLASSES_FILE)).unwrap(), first);
        assert_eq!(std::fs::read(dir.path().join(NAMES_FILE)).unwrap(), first_names);
    }

    #[test]
    fn test_ledger_text_form() {
        let text = encode_ledger(&snapshot().ledger);
        assert_eq!(text, "/libs/a_v2.jar_10\n/libs/b.jar_20\n");

        let parsed = decode_ledger("/libs/a_v2.jar_10\n\ngarbage\n/libs/b.jar_20");
        assert_eq!(parsed, snapshot().ledger);
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_snapshot(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CLASSES_FILE), b"not msgpack").unwrap();
        assert!(load_snapshot(dir.path()).unwrap().is_none());
        assert!(!dir.path().join(CLASSES_FILE).exists());
    }

    #[test]
    fn test_missing_name_index_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        save_snapshot(dir.path(), &snapshot()).unwrap();
        std::fs::remove_file(dir.path().join(NAMES_FILE)).unwrap();

        let loaded = load_snapshot(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.names.first("Widget.Style"), Some("a.Widget$Style"));
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        save_snapshot(dir.path(), &snapshot()).unwrap();
        clear_index(dir.path()).unwrap();
        assert!(load_snapshot(dir.path()).unwrap().is_none());
        assert!(!dir.path().join(LEDGER_FILE).exists());
    }
}
