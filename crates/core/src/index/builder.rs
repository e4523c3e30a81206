//! Incremental class index builder.
//!
//! For every archive whose fingerprint is not in the ledger:
//! 1. List top-level classes (nested ones come back through step 3)
//! 2. Reflect them in fixed-size batches, reporting progress per batch
//! 3. Expand declared inner classes level by level and reflect those too
//!
//! A class that fails to reflect is logged to the diagnostic sink and
//! skipped; an archive that cannot be opened is skipped and left out of the
//! ledger so it is retried next time.

use super::model::ClassIndex;
use super::progress::{ProgressSink, ProgressTracker, ScanSummary};
use super::store::IndexSnapshot;
use crate::config::ScanConfig;
use crate::logging::diagnostic;
use luasense_api::Fingerprint;
use luasense_api::naming::{NESTED_MARKER, is_anonymous};
use luasense_plugin::{ClassReflector, ReflectedArchive};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Working result of a scan, not yet committed.
#[derive(Debug)]
pub struct ScanOutcome {
    pub snapshot: IndexSnapshot,
    pub summary: ScanSummary,
}

impl ScanOutcome {
    /// At least one archive was read, so the result differs from the base.
    pub fn is_new(&self) -> bool {
        self.summary.scanned > 0
    }
}

pub struct IndexBuilder {
    reflectors: Vec<Arc<dyn ClassReflector>>,
    config: ScanConfig,
}

impl IndexBuilder {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            reflectors: Vec::new(),
            config,
        }
    }

    pub fn add_reflector(mut self, reflector: Arc<dyn ClassReflector>) -> Self {
        self.reflectors.push(reflector);
        self
    }

    pub fn with_reflectors(
        mut self,
        reflectors: impl IntoIterator<Item = Arc<dyn ClassReflector>>,
    ) -> Self {
        self.reflectors.extend(reflectors);
        self
    }

    fn find_reflector(&self, archive: &Path) -> Option<&Arc<dyn ClassReflector>> {
        self.reflectors.iter().find(|r| r.can_reflect(archive))
    }

    /// Scan `archives` on top of `base`, returning the merged snapshot.
    ///
    /// `base` is never modified; the caller decides whether to commit.
    pub fn scan<S: ProgressSink>(
        &self,
        archives: &[PathBuf],
        base: &IndexSnapshot,
        progress: &mut ProgressTracker<S>,
    ) -> ScanOutcome {
        let start = Instant::now();
        let mut classes = base.classes.clone();
        let mut ledger = base.ledger.clone();
        let mut summary = ScanSummary::default();
        let total = archives.len() as f64;

        progress.report("Starting scan", 0);

        for (idx, path) in archives.iter().enumerate() {
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let fingerprint = match Fingerprint::from_path(path) {
                Ok(fp) => fp,
                Err(e) => {
                    diagnostic("fingerprint", &format!("{}: {}", path.display(), e));
                    summary.unreadable += 1;
                    continue;
                }
            };

            if ledger.contains(&fingerprint) {
                debug!("Unchanged archive {}", path.display());
                summary.unchanged += 1;
                progress.report_fraction(format!("{label}: unchanged"), (idx + 1) as f64, total);
                continue;
            }

            let Some(reflector) = self.find_reflector(path) else {
                debug!("No reflector for {}", path.display());
                summary.unreadable += 1;
                continue;
            };

            let mut archive = match reflector.open(path) {
                Ok(archive) => archive,
                Err(e) => {
                    diagnostic("open-archive", &format!("{}: {}", path.display(), e));
                    summary.unreadable += 1;
                    continue;
                }
            };

            summary.failed_classes +=
                self.scan_archive(archive.as_mut(), &mut classes, |done, count| {
                    let fraction = if count == 0 { 1.0 } else { done as f64 / count as f64 };
                    progress.report_fraction(
                        format!("{label}: {done}/{count} classes"),
                        idx as f64 + fraction,
                        total,
                    );
                });

            ledger.record(fingerprint);
            summary.scanned += 1;
        }

        progress.report("Scan complete", 100);

        let snapshot = IndexSnapshot::new(classes, ledger);
        summary.classes = snapshot.classes.len();
        info!(
            "Class scan complete: {} scanned, {} unchanged, {} unreadable, {} failed classes in {:?}",
            summary.scanned,
            summary.unchanged,
            summary.unreadable,
            summary.failed_classes,
            start.elapsed()
        );

        ScanOutcome { snapshot, summary }
    }

    /// Reflect every class of one archive into `classes`, returning the
    /// number of classes that failed.
    fn scan_archive(
        &self,
        archive: &mut dyn ReflectedArchive,
        classes: &mut ClassIndex,
        mut on_batch: impl FnMut(usize, usize),
    ) -> usize {
        let mut failures = 0;

        let mut top_level: Vec<String> = archive
            .class_names()
            .into_iter()
            .filter(|name| !name.contains(NESTED_MARKER) && !self.config.is_denied(name))
            .collect();
        top_level.sort_unstable();
        top_level.dedup();

        let mut frontier =
            self.reflect_batches(archive, &top_level, classes, &mut failures, &mut on_batch);

        let mut seen: HashSet<String> = HashSet::new();
        while !frontier.is_empty() {
            let mut inner = Vec::new();
            for outer in &frontier {
                match archive.inner_classes(outer) {
                    Ok(found) => inner.extend(found.into_iter().filter(|name| {
                        !is_anonymous(name)
                            && !self.config.is_denied(name)
                            && seen.insert(name.clone())
                    })),
                    Err(e) => diagnostic("inner-classes", &format!("{outer}: {e}")),
                }
            }
            frontier = self.reflect_batches(archive, &inner, classes, &mut failures, |_, _| {});
        }

        failures
    }

    /// Reflect `names` in batches, returning the classes that succeeded.
    fn reflect_batches(
        &self,
        archive: &mut dyn ReflectedArchive,
        names: &[String],
        classes: &mut ClassIndex,
        failures: &mut usize,
        mut on_batch: impl FnMut(usize, usize),
    ) -> Vec<String> {
        let mut reflected = Vec::with_capacity(names.len());
        let mut done = 0;

        for batch in names.chunks(self.config.batch_size.max(1)) {
            for (class, result) in archive.reflect_batch(batch) {
                match result {
                    Ok(members) => {
                        classes.insert_members(members);
                        reflected.push(class);
                    }
                    Err(e) => {
                        diagnostic("reflect", &format!("{class}: {e}"));
                        *failures += 1;
                    }
                }
            }
            done += batch.len();
            on_batch(done, names.len());
        }

        reflected
    }
}
