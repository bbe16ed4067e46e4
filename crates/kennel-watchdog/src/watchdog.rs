//! The watchdog system: per-worker lifecycle API plus the background
//! monitor.
//!
//! One [`Watchdog`] owns one registry behind one mutex, one log sink, and
//! at most one monitor thread. Every lifecycle operation and every monitor
//! sweep serializes on that mutex, which is what keeps the registry from
//! ever being observed half-linked and gives a total order over
//! {create, feed, delete, sweep} across all workers.
//!
//! Most deployments use the process-wide instance in [`crate::global`];
//! constructing a `Watchdog` directly is for embedders and tests, which
//! inject a termination handler instead of exiting.

use std::fmt;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::config::WatchdogConfig;
use crate::error::{WatchdogError, WatchdogResult};
use crate::identity::WorkerId;
use crate::log::WatchdogLog;
use crate::registry::{DogRecord, DogSnapshot, ExpiredDog, Registry};
use crate::state::{MonitorState, MonitorStatus};

/// Callback invoked by the monitor when a dog expires.
///
/// Runs on the monitor thread with the registry lock held, so it must not
/// re-enter the watchdog API. The default handler terminates the process
/// with a failure status; tests inject one that records the event instead.
pub type TerminationHandler = Arc<dyn Fn(&ExpiredDog) + Send + Sync>;

/// Handle returned by [`Watchdog::create`].
///
/// Purely informational: feeding and deletion go through the calling
/// worker's identity, not through the handle.
#[derive(Debug, Clone)]
pub struct DogHandle {
    name: String,
    identity: WorkerId,
}

impl DogHandle {
    /// The dog's display label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning worker.
    #[must_use]
    pub fn identity(&self) -> WorkerId {
        self.identity
    }
}

struct Shared {
    config: WatchdogConfig,
    registry: Mutex<Registry>,
    log: WatchdogLog,
    state: MonitorState,
    on_expiry: TerminationHandler,
}

/// Liveness watchdog for cooperating worker threads.
pub struct Watchdog {
    shared: Arc<Shared>,
}

impl Watchdog {
    /// Create a watchdog with the default termination handler, which exits
    /// the process with status 1 when a dog expires.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: WatchdogConfig) -> WatchdogResult<Self> {
        Self::with_termination_handler(config, default_termination_handler())
    }

    /// Create a watchdog with an injected termination handler.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use kennel_watchdog::prelude::*;
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::time::Duration;
    ///
    /// let expirations = Arc::new(AtomicUsize::new(0));
    /// let seen = Arc::clone(&expirations);
    /// let config = WatchdogConfig::builder()
    ///     .tick_interval(Duration::from_secs(3600))
    ///     .build()?;
    /// let watchdog = Watchdog::with_termination_handler(
    ///     config,
    ///     Arc::new(move |_dead: &ExpiredDog| {
    ///         seen.fetch_add(1, Ordering::SeqCst);
    ///     }),
    /// )?;
    ///
    /// watchdog.create("worker", 1)?;
    /// assert!(watchdog.sweep_now().is_none());
    /// assert!(watchdog.sweep_now().is_some());
    /// assert_eq!(expirations.load(Ordering::SeqCst), 1);
    /// # Ok::<(), kennel_watchdog::WatchdogError>(())
    /// ```
    pub fn with_termination_handler(
        config: WatchdogConfig,
        on_expiry: TerminationHandler,
    ) -> WatchdogResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, on_expiry))
    }

    pub(crate) fn from_parts(config: WatchdogConfig, on_expiry: TerminationHandler) -> Self {
        let log = WatchdogLog::new(config.log_file.clone());
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::new()),
                log,
                state: MonitorState::new(),
                on_expiry,
                config,
            }),
        }
    }

    /// Start the background monitor.
    ///
    /// The first successful call spawns the monitor thread; concurrent and
    /// repeated calls are idempotent no-ops. The monitor sleeps one tick
    /// interval, sweeps every dog under the registry lock, and repeats for
    /// the life of the process.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailure` if the monitor thread could not be
    /// spawned; the watchdog is left stopped so startup can be retried.
    pub fn start(&self) -> WatchdogResult<()> {
        if !self.shared.state.begin() {
            return Ok(());
        }

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(self.shared.config.thread_name.clone())
            .spawn(move || monitor_main(&shared));

        match spawned {
            Ok(_detached) => {
                tracing::debug!(
                    thread = %self.shared.config.thread_name,
                    interval = ?self.shared.config.tick_interval,
                    "monitor started"
                );
                Ok(())
            }
            Err(err) => {
                self.shared.state.cancel();
                Err(WatchdogError::initialization_failure(format!(
                    "failed to spawn monitor thread: {err}"
                )))
            }
        }
    }

    /// Register a dog for the calling worker.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a zero timeout, or
    /// `DuplicateRegistration` if the calling worker already owns a dog
    /// (the existing registration is untouched).
    pub fn create(&self, name: impl Into<String>, timeout: u32) -> WatchdogResult<DogHandle> {
        let name = name.into();
        if timeout == 0 {
            return Err(WatchdogError::invalid_configuration(
                "timeout must be at least one tick",
            ));
        }

        let identity = WorkerId::current();
        let mut registry = self.shared.registry.lock();
        if let Some(slot) = registry.find(identity) {
            let existing = registry
                .get(slot)
                .map(|record| record.name.clone())
                .unwrap_or_default();
            drop(registry);
            tracing::warn!(%identity, rejected = %name, existing = %existing,
                "duplicate dog registration rejected");
            self.shared
                .log
                .record(&format!("duplicate dog rejected for thread<{name}> (tid = {identity})"));
            return Err(WatchdogError::duplicate_registration(existing, identity));
        }

        registry.push(DogRecord::new(name.clone(), identity, timeout));
        drop(registry);

        tracing::debug!(%identity, name = %name, timeout, "dog created");
        self.shared.log.record(&format!(
            "dog created for thread<{name}> (tid = {identity}, timeout = {timeout})"
        ));
        Ok(DogHandle { name, identity })
    }

    /// Refill the calling worker's dog.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if the calling worker has no live dog.
    pub fn feed(&self) -> WatchdogResult<()> {
        let identity = WorkerId::current();
        let mut registry = self.shared.registry.lock();
        match registry.find(identity) {
            Some(slot) => {
                if let Some(record) = registry.get_mut(slot) {
                    record.feed();
                }
                drop(registry);
                tracing::trace!(%identity, "dog fed");
                Ok(())
            }
            None => {
                drop(registry);
                tracing::warn!(%identity, "feed with no registered dog");
                self.shared
                    .log
                    .record(&format!("feed with no dog attached (tid = {identity})"));
                Err(WatchdogError::not_registered(identity))
            }
        }
    }

    /// Unregister and destroy the calling worker's dog.
    ///
    /// Idempotent in effect: a second call finds nothing and changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if the calling worker has no live dog.
    pub fn delete(&self) -> WatchdogResult<()> {
        let identity = WorkerId::current();
        let mut registry = self.shared.registry.lock();
        let removed = match registry.find(identity) {
            Some(slot) => registry.remove(slot),
            None => None,
        };
        drop(registry);

        match removed {
            Some(record) => {
                tracing::debug!(%identity, name = %record.name, "dog deleted");
                Ok(())
            }
            None => {
                tracing::warn!(%identity, "delete with no registered dog");
                self.shared
                    .log
                    .record(&format!("delete with no dog attached (tid = {identity})"));
                Err(WatchdogError::not_registered(identity))
            }
        }
    }

    /// Print a human-readable snapshot of the calling worker's dog to
    /// stdout, or a note that none is attached. Never mutates state.
    pub fn dump(&self) {
        match self.snapshot() {
            Some(snapshot) => println!("{snapshot}"),
            None => println!("this thread has no dog attached"),
        }
    }

    /// Observer copy of the calling worker's dog, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<DogSnapshot> {
        let identity = WorkerId::current();
        self.shared.registry.lock().snapshot(identity)
    }

    /// Number of live dogs.
    #[must_use]
    pub fn dog_count(&self) -> usize {
        self.shared.registry.lock().len()
    }

    /// Current monitor status.
    #[must_use]
    pub fn status(&self) -> MonitorStatus {
        self.shared.state.status()
    }

    /// Number of log-file appends that have failed so far.
    #[must_use]
    pub fn sink_failures(&self) -> u64 {
        self.shared.log.sink_failures()
    }

    /// Walk the registry under the lock and verify its structure.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.shared.registry.lock().is_consistent()
    }

    /// Run one monitor sweep immediately, without waiting for the tick
    /// interval.
    ///
    /// Ages every dog by one unit and, on expiry, runs the full fatal path
    /// (log line, terminal state transition, termination handler; the handler runs
    /// at most once). Intended for tests and diagnostics; production
    /// callers let the monitor thread do the ticking.
    pub fn sweep_now(&self) -> Option<ExpiredDog> {
        run_tick(&self.shared)
    }
}

impl fmt::Debug for Watchdog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watchdog")
            .field("config", &self.shared.config)
            .field("dog_count", &self.shared.registry.lock().len())
            .field("status", &self.shared.state.status())
            .finish()
    }
}

fn monitor_main(shared: &Shared) {
    while shared.state.status() == MonitorStatus::Running {
        thread::sleep(shared.config.tick_interval);
        if run_tick(shared).is_some() {
            break;
        }
    }
    tracing::debug!("monitor parked after expiry");
}

fn run_tick(shared: &Shared) -> Option<ExpiredDog> {
    let mut registry = shared.registry.lock();
    let expired = registry.sweep()?;

    // Fatal path, registry lock still held: termination is immediate and
    // unconditional, so no thread observes the registry afterwards.
    if shared.state.expire() {
        shared.log.record(&expired.to_string());
        (shared.on_expiry)(&expired);
    }
    Some(expired)
}

pub(crate) fn default_termination_handler() -> TerminationHandler {
    Arc::new(|expired: &ExpiredDog| {
        tracing::error!(name = %expired.name, identity = %expired.identity,
            "dog expired, terminating process");
        #[expect(
            clippy::exit,
            reason = "the monitor's fatal path is the only legitimate termination site"
        )]
        std::process::exit(1);
    })
}
