//! Class index: model, committed snapshots, persistence and the scanner
//! that builds them.

pub mod builder;
pub mod model;
pub mod progress;
pub mod service;
pub mod storage;
pub mod store;

pub use builder::{IndexBuilder, ScanOutcome};
pub use model::{ClassIndex, ImportRegistry, MemberMap, NameIndex, ScanLedger};
pub use progress::{NullSink, ProgressSink, ProgressTracker, ScanEvent, ScanSummary};
pub use service::{IndexService, ScanHandle, discover_archives};
pub use store::{IndexSnapshot, IndexStore};
