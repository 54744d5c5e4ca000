use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// File-backed tracing; stdout is owned by the terminal UI.
///
/// Returns the writer guard, which must live until exit so buffered lines
/// get flushed. `None` means logging stays disabled.
pub fn init_file_logging(log_dir: Option<&Path>, filter: &str) -> Option<WorkerGuard> {
    let dir = log_dir?;
    fs::create_dir_all(dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(dir, "betmind.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok()?;
    Some(guard)
}
