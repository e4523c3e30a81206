pub mod entry;
pub mod fingerprint;
pub mod item;
pub mod kind;
pub mod naming;
pub mod stats;

pub use entry::CompletionEntry;
pub use fingerprint::Fingerprint;
pub use item::CompletionItem;
pub use kind::CompletionKind;
pub use stats::IndexStats;
