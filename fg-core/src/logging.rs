//! Tracing setup driven by [`LoggingConfig`].
//!
//! Console output is always installed. When the configuration names a log
//! directory, a daily-rotated file layer is added on top of it, plain text or
//! JSON per the config. The returned guard owns the non-blocking file writer;
//! hold it for the life of the process and drop it to flush.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::FgResult;

/// Base name of the rotated log file.
const LOG_FILE_NAME: &str = "fotogram.log";

/// Keeps the non-blocking file writer alive; dropping it flushes the file.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Install the global subscriber described by `config`.
///
/// Returns a guard when a file layer was set up, `None` for console-only
/// configurations. Initializing more than once is a no-op; the first
/// subscriber wins.
pub fn init_logging(config: &LoggingConfig) -> FgResult<Option<LogGuard>> {
    let filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let console = fmt::layer().with_target(true).compact();

    if config.directory.is_empty() {
        let _ = tracing_subscriber::registry().with(filter).with(console).try_init();
        return Ok(None);
    }

    std::fs::create_dir_all(&config.directory)?;
    let appender = tracing_appender::rolling::daily(&config.directory, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    if config.json_output {
        let file = fmt::layer().with_writer(writer).json().with_target(true);
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .with(file)
            .try_init();
    } else {
        let file = fmt::layer().with_writer(writer).with_ansi(false).with_target(true);
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .with(file)
            .try_init();
    }

    tracing::info!(directory = %config.directory, "file logging enabled");
    Ok(Some(LogGuard { _guard: guard }))
}

/// Console-only initializer for tests and short-lived tools.
pub fn init_console_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).compact())
        .try_init();
}
