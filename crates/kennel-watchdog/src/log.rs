//! Timestamped log sink.
//!
//! Every watchdog event becomes one line of the form
//! `[YYYY-MM-DD HH:MM:SS]Watchdog: <message>`, written to stderr
//! unconditionally and appended to the configured log file when there is
//! one. The file is an inter-process resource, so each append holds an
//! advisory exclusive lock on the descriptor rather than the in-process
//! registry mutex. File-sink failures never reach the caller; they are
//! counted and reported through `tracing` so tests and operators can see
//! them.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use fs2::FileExt;

/// Console-plus-file sink for watchdog log lines.
#[derive(Debug, Default)]
pub struct WatchdogLog {
    path: Option<PathBuf>,
    sink_failures: AtomicU64,
}

impl WatchdogLog {
    /// Create a sink. `path` of `None` leaves the console as the only
    /// destination.
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            sink_failures: AtomicU64::new(0),
        }
    }

    /// Emit one timestamped line.
    ///
    /// The console write is unconditional; the file append is best-effort.
    pub fn record(&self, message: &str) {
        let line = format!(
            "[{}]Watchdog: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        );

        eprint!("{line}");

        if let Some(path) = &self.path {
            if let Err(err) = append_locked(path, &line) {
                self.sink_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "log file append failed"
                );
            }
        }
    }

    /// Number of file appends that have failed so far.
    #[must_use]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    /// Configured log file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn append_locked(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.lock_exclusive()?;
    let written = file.write_all(line.as_bytes());
    let unlocked = FileExt::unlock(&file);
    written.and(unlocked)
}
