use luasense_core::config::LuasenseConfig;
use luasense_core::index::ScanEvent;
use std::path::PathBuf;
use tracing::info;

pub async fn run(config: &LuasenseConfig, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let runtime = luasense_runtime::build_default_runtime(config);

    let archives = runtime.service.discover(&paths);
    if archives.is_empty() {
        anyhow::bail!("No archives found under the given paths");
    }
    info!("Indexing {} archives...", archives.len());

    let handle = runtime.service.spawn_scan(archives);
    let summary = handle
        .wait(|event| match event {
            ScanEvent::Progress { message, percent } => println!("[{percent:>3}%] {message}"),
            ScanEvent::Finished(_) => {}
            ScanEvent::Failed { message } => eprintln!("{message}"),
        })
        .await?;

    println!(
        "Scanned {} archives ({} unchanged, {} unreadable), {} classes indexed, {} failed",
        summary.scanned,
        summary.unchanged,
        summary.unreadable,
        summary.classes,
        summary.failed_classes
    );
    if summary.persisted {
        println!("Index saved to {}", runtime.service.index_dir().display());
    }
    Ok(())
}
