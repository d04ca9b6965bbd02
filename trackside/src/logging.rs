//! Tracing subscriber setup.
//!
//! Log verbosity is controlled through `RUST_LOG` (default `info`). Output
//! goes to stderr so it never interleaves with the operator display on
//! stdout; an optional daily-rotated file can be added for unattended
//! stations.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes and stops file logging; hold it for the life
/// of the process.
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Initialize stderr logging.
///
/// Returns `false` when a global subscriber was already set, which is fine
/// in tests.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::rfc_3339())
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// Initialize logging to a daily-rotated file under `dir`.
///
/// # Errors
///
/// Returns an error when the directory cannot be created.
pub fn init_with_file(dir: &Path) -> std::io::Result<LogGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, "trackside.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::rfc_3339())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .is_ok();

    Ok(LogGuard {
        _worker: initialized.then_some(guard),
    })
}
