pub mod complete;
pub mod config;
pub mod context;
pub mod error;
pub mod index;
pub mod logging;
pub mod syntax;
pub mod text;

pub use complete::{CompletionEngine, CompletionRequest};
pub use config::LuasenseConfig;
pub use context::EditorContext;
pub use error::{LuasenseError, Result};
pub use index::{IndexService, IndexSnapshot, IndexStore};
