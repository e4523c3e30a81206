use luasense_core::config::LuasenseConfig;
use tracing::info;

pub fn run(config: &LuasenseConfig) -> anyhow::Result<()> {
    let dir = config.index_dir();
    info!("Clearing index at: {}...", dir.display());
    luasense_runtime::clear_index(config)?;
    println!("Index cleared: {}", dir.display());
    Ok(())
}
