use super::model::{ClassIndex, NameIndex, ScanLedger};
use arc_swap::ArcSwap;
use luasense_api::IndexStats;
use std::sync::Arc;

/// One fully built, immutable index state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSnapshot {
    pub classes: ClassIndex,
    pub names: NameIndex,
    pub ledger: ScanLedger,
}

impl IndexSnapshot {
    /// Build a snapshot, deriving the name index from the classes.
    pub fn new(classes: ClassIndex, ledger: ScanLedger) -> Self {
        let names = NameIndex::from_classes(&classes);
        Self {
            classes,
            names,
            ledger,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            classes: self.classes.len(),
            members: self.classes.member_count(),
            short_names: self.names.len(),
            archives: self.ledger.len(),
        }
    }
}

/// Holder of the committed snapshot.
///
/// Readers clone the current `Arc` and never wait; a scan builds a new
/// snapshot on the side and publishes it with [`IndexStore::commit`].
pub struct IndexStore {
    current: ArcSwap<IndexSnapshot>,
}

impl Default for IndexStore {
    fn default() -> Self {
        Self::new(IndexSnapshot::empty())
    }
}

impl IndexStore {
    pub fn new(snapshot: IndexSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// The last committed snapshot.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current.load_full()
    }

    /// Atomically replace the committed snapshot.
    pub fn commit(&self, snapshot: IndexSnapshot) {
        self.current.store(Arc::new(snapshot));
    }

    pub fn stats(&self) -> IndexStats {
        self.current.load().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luasense_api::{CompletionEntry, Fingerprint};
    use luasense_plugin::ClassMembers;

    #[test]
    fn test_readers_keep_their_snapshot_across_commit() {
        let store = IndexStore::default();
        let before = store.snapshot();

        let mut classes = ClassIndex::new();
        let mut widget = ClassMembers::new("a.Widget");
        widget.insert(CompletionEntry::method("show", "void", ""));
        classes.insert_members(widget);
        let ledger: ScanLedger = [Fingerprint::new("/a.jar", 1)].into_iter().collect();
        store.commit(IndexSnapshot::new(classes, ledger));

        assert!(before.classes.is_empty());
        let after = store.snapshot();
        assert_eq!(after.names.first("Widget"), Some("a.Widget"));
        assert_eq!(
            store.stats(),
            IndexStats {
                classes: 1,
                members: 1,
                short_names: 1,
                archives: 1
            }
        );
    }
}
