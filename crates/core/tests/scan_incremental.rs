//! Incremental scanning against an in-memory reflector.

use luasense_api::CompletionEntry;
use luasense_core::config::ScanConfig;
use luasense_core::index::storage::{CLASSES_FILE, LEDGER_FILE, NAMES_FILE};
use luasense_core::index::{IndexService, IndexStore, NullSink, ScanEvent};
use luasense_plugin::{BoxError, ClassMembers, ClassReflector, ReflectedArchive};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves the same fixed class set for every `.jar` it is given.
struct FixtureReflector {
    classes: BTreeMap<String, Vec<CompletionEntry>>,
    opened: AtomicUsize,
}

impl FixtureReflector {
    fn new() -> Self {
        let mut classes = BTreeMap::new();
        classes.insert(
            "com.ui.Widget".to_string(),
            vec![
                CompletionEntry::method("show", "void", ""),
                CompletionEntry::method("getParent", "com.ui.Widget", ""),
            ],
        );
        classes.insert(
            "com.ui.Widget$Style".to_string(),
            vec![CompletionEntry::field("color", "int")],
        );
        classes.insert("com.ui.Widget$1".to_string(), Vec::new());
        classes.insert("com.ui.Broken".to_string(), Vec::new());
        Self {
            classes,
            opened: AtomicUsize::new(0),
        }
    }
}

struct FixtureArchive {
    classes: BTreeMap<String, Vec<CompletionEntry>>,
}

impl ClassReflector for FixtureReflector {
    fn name(&self) -> &str {
        "fixture"
    }

    fn can_reflect(&self, archive: &Path) -> bool {
        archive.extension().is_some_and(|ext| ext == "jar")
    }

    fn open(&self, _archive: &Path) -> Result<Box<dyn ReflectedArchive>, BoxError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixtureArchive {
            classes: self.classes.clone(),
        }))
    }
}

impl ReflectedArchive for FixtureArchive {
    fn class_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    fn reflect(&mut self, class: &str) -> Result<ClassMembers, BoxError> {
        if class.ends_with("Broken") {
            return Err("unsupported class version".into());
        }
        let entries = self.classes.get(class).ok_or("missing class")?;
        let mut members = ClassMembers::new(class);
        for entry in entries {
            members.insert(entry.clone());
        }
        Ok(members)
    }

    fn inner_classes(&mut self, class: &str) -> Result<Vec<String>, BoxError> {
        let marker = format!("{class}$");
        Ok(self
            .classes
            .keys()
            .filter(|name| name.starts_with(&marker))
            .cloned()
            .collect())
    }
}

fn service(index_dir: PathBuf, reflector: Arc<FixtureReflector>) -> IndexService {
    IndexService::new(
        Arc::new(IndexStore::default()),
        vec![reflector as Arc<dyn ClassReflector>],
        index_dir,
        ScanConfig::default(),
    )
}

fn write_archive(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"PK").unwrap();
    path
}

fn read_files(dir: &Path) -> Vec<Vec<u8>> {
    [CLASSES_FILE, NAMES_FILE, LEDGER_FILE]
        .iter()
        .map(|f| std::fs::read(dir.join(f)).unwrap())
        .collect()
}

#[test]
fn test_first_scan_indexes_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let jar = write_archive(dir.path(), "ui.jar");
    let index_dir = dir.path().join("index");
    let service = service(index_dir.clone(), Arc::new(FixtureReflector::new()));

    let mut events = Vec::new();
    let summary = service.scan(&[jar], &mut events).unwrap();

    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.failed_classes, 1);
    assert!(summary.persisted);
    assert!(matches!(events.last(), Some(ScanEvent::Finished(_))));

    let snapshot = service.store().snapshot();
    assert!(snapshot.classes.contains("com.ui.Widget"));
    assert!(snapshot.classes.contains("com.ui.Widget$Style"));
    assert!(!snapshot.classes.contains("com.ui.Widget$1"));
    assert!(!snapshot.classes.contains("com.ui.Broken"));
    assert_eq!(snapshot.names.first("Widget.Style"), Some("com.ui.Widget$Style"));

    for file in [CLASSES_FILE, NAMES_FILE, LEDGER_FILE] {
        assert!(index_dir.join(file).exists(), "{file} missing");
    }
}

#[test]
fn test_rescan_without_changes_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let jar = write_archive(dir.path(), "ui.jar");
    let index_dir = dir.path().join("index");
    let reflector = Arc::new(FixtureReflector::new());

    let first = service(index_dir.clone(), Arc::clone(&reflector));
    first.scan(std::slice::from_ref(&jar), NullSink).unwrap();
    let before = read_files(&index_dir);
    let ledger_before = first.store().snapshot().ledger.clone();

    // a fresh process: load the persisted state, then scan again
    let second = service(index_dir.clone(), Arc::clone(&reflector));
    assert!(second.load().unwrap());
    let summary = second.scan(&[jar], NullSink).unwrap();

    assert_eq!(summary.scanned, 0);
    assert_eq!(summary.unchanged, 1);
    assert!(!summary.persisted);
    assert_eq!(reflector.opened.load(Ordering::SeqCst), 1);
    assert_eq!(read_files(&index_dir), before);
    assert_eq!(second.store().snapshot().ledger, ledger_before);
}

#[test]
fn test_new_archive_extends_index() {
    let dir = tempfile::tempdir().unwrap();
    let first_jar = write_archive(dir.path(), "a.jar");
    let second_jar = write_archive(dir.path(), "b.jar");
    let service = service(dir.path().join("index"), Arc::new(FixtureReflector::new()));

    service.scan(std::slice::from_ref(&first_jar), NullSink).unwrap();
    let summary = service.scan(&[first_jar, second_jar], NullSink).unwrap();

    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(service.store().snapshot().ledger.len(), 2);
}

#[test]
fn test_unreadable_archives_are_not_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let text = write_archive(dir.path(), "notes.txt");
    let missing = dir.path().join("missing.jar");
    let service = service(dir.path().join("index"), Arc::new(FixtureReflector::new()));

    let summary = service.scan(&[text, missing], NullSink).unwrap();
    assert_eq!(summary.unreadable, 2);
    assert_eq!(summary.scanned, 0);
    assert!(service.store().snapshot().ledger.is_empty());
}

#[test]
fn test_persist_failure_keeps_committed_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let jar = write_archive(dir.path(), "ui.jar");
    // a plain file where the index directory should be
    let blocked = dir.path().join("index");
    std::fs::write(&blocked, b"").unwrap();
    let service = service(blocked, Arc::new(FixtureReflector::new()));

    let mut events = Vec::new();
    assert!(service.scan(&[jar], &mut events).is_err());
    assert!(matches!(events.last(), Some(ScanEvent::Failed { .. })));
    assert!(service.store().snapshot().classes.contains("com.ui.Widget"));
}

#[test]
fn test_clear_removes_files() {
    let dir = tempfile::tempdir().unwrap();
    let jar = write_archive(dir.path(), "ui.jar");
    let index_dir = dir.path().join("index");
    let service = service(index_dir.clone(), Arc::new(FixtureReflector::new()));
    service.scan(&[jar], NullSink).unwrap();

    service.clear().unwrap();
    assert!(!index_dir.join(CLASSES_FILE).exists());
    assert!(!index_dir.join(LEDGER_FILE).exists());
    assert!(service.store().snapshot().classes.is_empty());
    assert!(!service.load().unwrap());
}

#[tokio::test]
async fn test_spawned_scan_streams_progress() {
    let dir = tempfile::tempdir().unwrap();
    let jar = write_archive(dir.path(), "ui.jar");
    let service = Arc::new(service(dir.path().join("index"), Arc::new(FixtureReflector::new())));

    let mut percents = Vec::new();
    let mut finished = false;
    let summary = service
        .spawn_scan(vec![jar])
        .wait(|event| match event {
            ScanEvent::Progress { percent, .. } => percents.push(percent),
            ScanEvent::Finished(_) => finished = true,
            ScanEvent::Failed { .. } => {}
        })
        .await
        .unwrap();

    assert!(finished);
    assert_eq!(summary.scanned, 1);
    assert_eq!(percents.first(), Some(&0));
    assert_eq!(percents.last(), Some(&100));
    assert!(percents.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_dropped_receiver_does_not_stop_scan() {
    let dir = tempfile::tempdir().unwrap();
    let jar = write_archive(dir.path(), "ui.jar");
    let service = Arc::new(service(dir.path().join("index"), Arc::new(FixtureReflector::new())));

    let handle = service.spawn_scan(vec![jar]);
    drop(handle.events);
    let summary = handle.task.await.unwrap().unwrap();

    assert_eq!(summary.scanned, 1);
    assert!(service.store().snapshot().classes.contains("com.ui.Widget"));
}
