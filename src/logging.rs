use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILE_NAME: &str = "pipeline.log";

/// Initializes logging with console output and a plain-text, timestamped
/// daily log file under `log_dir`. The returned guard must be held until
/// exit so buffered lines are flushed.
pub fn init_logging(log_dir: &Path) -> WorkerGuard {
    // Ensure logs directory exists
    let _ = fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(non_blocking_writer);

    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stdout);

    // Respect RUST_LOG if set; otherwise info for our crate
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("commerce_quality=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}
