//! Process-wide watchdog instance.
//!
//! The classic deployment: one watchdog for the whole process, initialized
//! once at startup, then fed from worker threads through free functions.
//! Embedders that want independent registries (or injected termination
//! handlers) construct [`Watchdog`] values directly instead.
//!
//! `initialize` is safe to call from several threads at once: the
//! singleton is created through a `OnceLock` and the monitor start is
//! gated by a compare-exchange, so at most one monitor thread ever runs.
//! The first caller's configuration wins; later calls are no-ops.

use std::path::Path;
use std::sync::OnceLock;

use crate::config::WatchdogConfig;
use crate::error::{WatchdogError, WatchdogResult};
use crate::registry::DogSnapshot;
use crate::watchdog::{DogHandle, Watchdog};

static GLOBAL: OnceLock<Watchdog> = OnceLock::new();

/// Initialize the process-wide watchdog with the default one-second tick
/// and start its monitor.
///
/// Must be called before any worker registers. Idempotent: repeated and
/// concurrent calls start the monitor at most once.
///
/// # Errors
///
/// Returns `InitializationFailure` if the monitor thread could not be
/// spawned; callers should treat that as fatal and abort startup.
pub fn initialize(log_file: Option<&Path>) -> WatchdogResult<()> {
    initialize_with_config(WatchdogConfig {
        log_file: log_file.map(Path::to_path_buf),
        ..WatchdogConfig::default()
    })
}

/// Initialize the process-wide watchdog with an explicit configuration.
///
/// # Errors
///
/// Returns `InvalidConfiguration` for a bad configuration, or
/// `InitializationFailure` if the monitor thread could not be spawned.
pub fn initialize_with_config(config: WatchdogConfig) -> WatchdogResult<()> {
    config.validate()?;
    let watchdog = GLOBAL.get_or_init(|| {
        Watchdog::from_parts(config, crate::watchdog::default_termination_handler())
    });
    watchdog.start()
}

/// The process-wide watchdog, if initialized.
#[must_use]
pub fn get() -> Option<&'static Watchdog> {
    GLOBAL.get()
}

fn instance() -> WatchdogResult<&'static Watchdog> {
    GLOBAL.get().ok_or(WatchdogError::NotInitialized)
}

/// Register a dog for the calling worker on the process-wide watchdog.
///
/// # Errors
///
/// Returns `NotInitialized` before [`initialize`], otherwise the errors of
/// [`Watchdog::create`].
pub fn create(name: impl Into<String>, timeout: u32) -> WatchdogResult<DogHandle> {
    instance()?.create(name, timeout)
}

/// Feed the calling worker's dog on the process-wide watchdog.
///
/// # Errors
///
/// Returns `NotInitialized` before [`initialize`], otherwise the errors of
/// [`Watchdog::feed`].
pub fn feed() -> WatchdogResult<()> {
    instance()?.feed()
}

/// Delete the calling worker's dog on the process-wide watchdog.
///
/// # Errors
///
/// Returns `NotInitialized` before [`initialize`], otherwise the errors of
/// [`Watchdog::delete`].
pub fn delete() -> WatchdogResult<()> {
    instance()?.delete()
}

/// Print the calling worker's dog to stdout.
///
/// # Errors
///
/// Returns `NotInitialized` before [`initialize`]; having no dog attached
/// is not an error, it just prints a note.
pub fn dump() -> WatchdogResult<()> {
    instance()?.dump();
    Ok(())
}

/// Observer copy of the calling worker's dog on the process-wide watchdog.
#[must_use]
pub fn snapshot() -> Option<DogSnapshot> {
    GLOBAL.get().and_then(Watchdog::snapshot)
}

/// Whether [`initialize`] has completed at least once.
#[must_use]
pub fn is_initialized() -> bool {
    GLOBAL.get().is_some()
}
