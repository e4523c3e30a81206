use luasense_core::config::LuasenseConfig;
use luasense_core::logging::LoggingGuards;
use luasense_core::{EditorContext, IndexService, IndexStore};
use std::sync::Arc;

/// An editor context and the scan service feeding it, sharing one store.
pub struct Runtime {
    pub context: Arc<EditorContext>,
    pub service: Arc<IndexService>,
}

/// Bootstraps the completion runtime with every available reflector.
///
/// The persisted index under `<home>/index` is committed before returning;
/// a corrupt or unreadable index is reported and the runtime starts empty.
pub fn build_default_runtime(config: &LuasenseConfig) -> Runtime {
    let store = Arc::new(IndexStore::default());

    let service = Arc::new(IndexService::new(
        Arc::clone(&store),
        vec![luasense_java::java_reflector()],
        config.index_dir(),
        config.scan.clone(),
    ));

    match service.load() {
        Ok(true) => {
            let stats = store.stats();
            tracing::info!(
                "Loaded index: {} classes, {} archives",
                stats.classes,
                stats.archives
            );
        }
        Ok(false) => tracing::info!("No index at {}", config.index_dir().display()),
        Err(e) => tracing::error!("Failed to load index: {}", e),
    }

    let context = Arc::new(EditorContext::new(store, config));
    Runtime { context, service }
}

/// Initializes logging for a component under the configured log directory.
pub fn init_logging(config: &LuasenseConfig, component: &str, to_stderr: bool) -> LoggingGuards {
    luasense_core::logging::init_logging(component, &config.log_dir(), to_stderr)
}

/// Removes the persisted index of `config`.
pub fn clear_index(config: &LuasenseConfig) -> luasense_core::Result<()> {
    luasense_core::index::storage::clear_index(&config.index_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use luasense_api::CompletionKind;

    #[test]
    fn test_runtime_shares_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = LuasenseConfig::load_from(dir.path());
        let runtime = build_default_runtime(&config);

        assert!(Arc::ptr_eq(runtime.context.store(), runtime.service.store()));
        assert_eq!(runtime.service.index_dir(), config.index_dir());
        assert!(runtime.context.store().snapshot().classes.is_empty());

        let items = runtime.context.complete("whi", 3, None);
        assert_eq!(items[0].label, "while");
        assert_eq!(items[0].kind, CompletionKind::Keyword);
    }

    #[test]
    fn test_clear_without_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = LuasenseConfig::load_from(dir.path());
        assert!(clear_index(&config).is_ok());
    }
}
