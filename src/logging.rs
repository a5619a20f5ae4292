//! Tracing setup: stderr plus a daily-rolling log file.

use crate::error::{Result, ScoutError};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "industry_scout=info,scout_search=info";

/// Log file prefix inside the logs directory.
pub const LOG_FILE_PREFIX: &str = "industry-scout.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Events go to stderr and, when `logs_dir` is given, to a daily-rolling
/// file in it. Keep the returned guard alive for the process lifetime or
/// buffered file lines are lost.
///
/// # Errors
///
/// Returns an error if the logs directory cannot be created or a global
/// subscriber is already installed.
pub fn init(logs_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    let Some(dir) = logs_dir else {
        tracing_subscriber::registry()
            .with(stderr)
            .try_init()
            .map_err(|e| ScoutError::Config(format!("failed to install logger: {e}")))?;
        return Ok(None);
    };

    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(stderr)
        .with(file)
        .try_init()
        .map_err(|e| ScoutError::Config(format!("failed to install logger: {e}")))?;
    Ok(Some(guard))
}
