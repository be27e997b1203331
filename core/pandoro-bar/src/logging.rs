//! Logging setup.
//!
//! stdout belongs to the menu-bar host, so logs go to
//! `~/.pandoro/logs/pandoro.<date>.log`, one file per day, keeping the last
//! week. Set `PANDORO_DEBUG_LOG=1` for debug output, or use `RUST_LOG` for
//! finer filters.

use std::env;
use std::path::Path;

use fs_err as fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "pandoro";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;

fn env_filter() -> EnvFilter {
    let debug_enabled = env::var("PANDORO_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global subscriber. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init(logs_dir: Option<&Path>) -> Option<WorkerGuard> {
    let Some(dir) = logs_dir else {
        init_stderr();
        return None;
    };

    if let Err(err) = fs::create_dir_all(dir) {
        init_stderr();
        tracing::warn!(error = %err, "Failed to create log directory, logging to stderr");
        return None;
    }

    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
    {
        Ok(appender) => appender,
        Err(err) => {
            init_stderr();
            tracing::warn!(error = %err, "Failed to open log file, logging to stderr");
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}
