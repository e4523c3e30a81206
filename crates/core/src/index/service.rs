use super::builder::IndexBuilder;
use super::progress::{ProgressSink, ProgressTracker, ScanEvent, ScanSummary};
use super::storage;
use super::store::{IndexSnapshot, IndexStore};
use crate::config::ScanConfig;
use crate::error::{LuasenseError, Result};
use crate::logging::diagnostic;
use luasense_plugin::ClassReflector;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use walkdir::WalkDir;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A scan running on the blocking pool.
pub struct ScanHandle {
    pub events: mpsc::Receiver<ScanEvent>,
    pub task: JoinHandle<Result<ScanSummary>>,
}

/// Owns the scan side of the index: loading, scanning, persisting and
/// publishing snapshots into the shared [`IndexStore`].
pub struct IndexService {
    store: Arc<IndexStore>,
    builder: IndexBuilder,
    index_dir: PathBuf,
    config: ScanConfig,
    // one scan at a time; readers never touch it
    scan_lock: Mutex<()>,
}

impl IndexService {
    pub fn new(
        store: Arc<IndexStore>,
        reflectors: Vec<Arc<dyn ClassReflector>>,
        index_dir: PathBuf,
        config: ScanConfig,
    ) -> Self {
        let builder = IndexBuilder::new(config.clone()).with_reflectors(reflectors);
        Self {
            store,
            builder,
            index_dir,
            config,
            scan_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Commit the persisted snapshot, if any. Returns whether one was found.
    pub fn load(&self) -> Result<bool> {
        match storage::load_snapshot(&self.index_dir)? {
            Some(snapshot) => {
                self.store.commit(snapshot);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Expand directories among `roots` into the archives they contain.
    pub fn discover(&self, roots: &[PathBuf]) -> Vec<PathBuf> {
        discover_archives(roots, &self.config.extensions, self.config.max_depth)
    }

    /// Scan synchronously on the calling thread.
    ///
    /// The new snapshot is committed when the scan finishes and persisted
    /// only when at least one archive was new. A persistence failure leaves
    /// the previous files in place and is returned as an error.
    pub fn scan<S: ProgressSink>(&self, archives: &[PathBuf], sink: S) -> Result<ScanSummary> {
        let _guard = self.scan_lock.lock();
        let mut tracker = ProgressTracker::new(sink);

        let base = self.store.snapshot();
        let outcome = self.builder.scan(archives, &base, &mut tracker);
        let mut summary = outcome.summary.clone();

        if !outcome.is_new() {
            tracing::info!("No new archives, index left as is");
            tracker.finish(summary.clone());
            return Ok(summary);
        }

        let snapshot = outcome.snapshot;
        let saved = storage::save_snapshot(&self.index_dir, &snapshot);
        self.store.commit(snapshot);

        match saved {
            Ok(()) => {
                summary.persisted = true;
                tracker.finish(summary.clone());
                Ok(summary)
            }
            Err(e) => {
                diagnostic("persist", &e);
                tracker.fail(format!("Failed to save index: {e}"));
                Err(e)
            }
        }
    }

    /// Run [`IndexService::scan`] on the blocking pool, streaming progress.
    ///
    /// Dropping the returned receiver silences further events; the scan
    /// itself runs to completion.
    pub fn spawn_scan(self: &Arc<Self>, archives: Vec<PathBuf>) -> ScanHandle {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let service = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || service.scan(&archives, tx));
        ScanHandle { events: rx, task }
    }

    /// Remove the persisted files and publish an empty snapshot.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.scan_lock.lock();
        storage::clear_index(&self.index_dir)?;
        self.store.commit(IndexSnapshot::empty());
        Ok(())
    }
}

impl ScanHandle {
    /// Drain events into `on_event` until the scan ends, then return its
    /// result.
    pub async fn wait(mut self, mut on_event: impl FnMut(ScanEvent)) -> Result<ScanSummary> {
        while let Some(event) = self.events.recv().await {
            on_event(event);
        }
        self.task
            .await
            .map_err(|e| LuasenseError::Internal(format!("Scan task failed: {e}")))?
    }
}

/// Archives under `roots`: files are taken as given, directories are walked
/// up to `max_depth` for files with one of `extensions`. Sorted, no
/// duplicates.
pub fn discover_archives(roots: &[PathBuf], extensions: &[String], max_depth: usize) -> Vec<PathBuf> {
    let matches_extension = |path: &Path| {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
    };

    let mut archives = Vec::new();
    for root in roots {
        if root.is_file() {
            archives.push(root.clone());
            continue;
        }
        archives.extend(
            WalkDir::new(root)
                .max_depth(max_depth)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| matches_extension(path)),
        );
    }

    archives.sort();
    archives.dedup();
    archives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_archives() {
        let dir = tempfile::tempdir().unwrap();
        let libs = dir.path().join("libs");
        std::fs::create_dir_all(libs.join("nested")).unwrap();
        std::fs::write(libs.join("b.jar"), b"").unwrap();
        std::fs::write(libs.join("a.ZIP"), b"").unwrap();
        std::fs::write(libs.join("notes.txt"), b"").unwrap();
        std::fs::write(libs.join("nested").join("deep.jar"), b"").unwrap();
        let single = dir.path().join("single.bin");
        std::fs::write(&single, b"").unwrap();

        let exts = vec!["jar".to_string(), "zip".to_string()];
        let found = discover_archives(&[libs.clone(), single.clone(), libs.clone()], &exts, 1);
        assert_eq!(found, vec![libs.join("a.ZIP"), libs.join("b.jar"), single]);

        let deeper = discover_archives(&[libs.clone()], &exts, 2);
        assert!(deeper.contains(&libs.join("nested").join("deep.jar")));
    }
}
