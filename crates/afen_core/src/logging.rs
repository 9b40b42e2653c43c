use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::MarketConfig;

pub use tracing_appender::non_blocking::WorkerGuard;

const DEFAULT_FILTER: &str = "info,afen_ui=debug,afen_core=debug";

/// Filter directive used when `RUST_LOG` is unset: the configured
/// `log_level` if it parses, the crate default otherwise.
pub fn fallback_filter(log_level: &str) -> String {
    let level = log_level.trim();
    if !level.is_empty() && EnvFilter::try_new(level).is_ok() {
        level.to_string()
    } else {
        DEFAULT_FILTER.to_string()
    }
}

/// Initializes the logging system with file + console output under
/// `~/.afen/logs`. `log_level` is the fallback when `RUST_LOG` is unset.
/// Returns a guard that must be kept alive for the duration of the app.
pub fn init_logging(log_level: &str) -> Result<WorkerGuard> {
    let logs_dir = MarketConfig::logs_dir()?;
    std::fs::create_dir_all(&logs_dir)?;

    // File appender: daily rotation
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "afen");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_filter(log_level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(non_blocking),
        )
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

/// Initialize logging to a custom directory with a custom filter.
/// Useful for tests or embedded scenarios where `~/.afen/logs` is not desired.
pub fn init_logging_to_dir(logs_dir: &std::path::Path, filter: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, "afen");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}
