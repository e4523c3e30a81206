use std::fmt::Display;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Target of events routed to the diagnostic log.
pub const DIAGNOSTIC_TARGET: &str = "luasense::diagnostic";

/// File name of the diagnostic log inside the log directory.
pub const DIAGNOSTIC_FILE: &str = "diagnostic.log";

/// Keeps the non-blocking writers flushing until dropped.
pub struct LoggingGuards {
    _log: WorkerGuard,
    _diagnostic: WorkerGuard,
}

pub fn init_logging(component: &str, log_dir: &Path, to_stderr: bool) -> LoggingGuards {
    let _ = std::fs::create_dir_all(log_dir);

    // Roll daily, with the component name as the prefix
    // This will create files like cli.log.2024-01-21
    let file_appender = tracing_appender::rolling::daily(log_dir, component);
    let (non_blocking, log_guard) = tracing_appender::non_blocking(file_appender);

    let diagnostic_appender = tracing_appender::rolling::never(log_dir, DIAGNOSTIC_FILE);
    let (diagnostic_writer, diagnostic_guard) = tracing_appender::non_blocking(diagnostic_appender);

    let env_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_filter(env_filter());

    // Diagnostic layer ignores RUST_LOG: failures are always recorded
    let diagnostic_layer = fmt::layer()
        .with_writer(diagnostic_writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter_fn(|meta| meta.target() == DIAGNOSTIC_TARGET));

    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .with_filter(env_filter())
    });

    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(diagnostic_layer)
        .with(stderr_layer)
        .try_init();

    LoggingGuards {
        _log: log_guard,
        _diagnostic: diagnostic_guard,
    }
}

/// Record an internal failure in the diagnostic log.
///
/// Advisory only: nothing returned to callers depends on it.
pub fn diagnostic(stage: &str, error: &dyn Display) {
    tracing::warn!(target: DIAGNOSTIC_TARGET, stage, "{}", error);
}
