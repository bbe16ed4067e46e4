//! Configuration for the watchdog system.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{WatchdogError, WatchdogResult};

/// Watchdog configuration.
///
/// The defaults match the classic deployment: a one-second tick and no log
/// file. Tests shorten the tick to keep expiry scenarios fast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Interval between monitor sweeps. One dog timeout unit equals one
    /// tick, so this is also the resolution of every timeout.
    pub tick_interval: Duration,

    /// Path of the append-only log file. `None` leaves the console as the
    /// only sink.
    pub log_file: Option<PathBuf>,

    /// Name given to the monitor thread.
    pub thread_name: String,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            log_file: None,
            thread_name: "kennel-monitor".to_string(),
        }
    }
}

impl WatchdogConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> WatchdogConfigBuilder {
        WatchdogConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick interval is zero or the monitor thread
    /// name is empty.
    pub fn validate(&self) -> WatchdogResult<()> {
        if self.tick_interval.is_zero() {
            return Err(WatchdogError::invalid_configuration(
                "tick_interval must be non-zero",
            ));
        }
        if self.thread_name.is_empty() {
            return Err(WatchdogError::invalid_configuration(
                "thread_name must not be empty",
            ));
        }
        Ok(())
    }
}

/// Builder for [`WatchdogConfig`].
#[derive(Debug, Default)]
pub struct WatchdogConfigBuilder {
    config: WatchdogConfig,
}

impl WatchdogConfigBuilder {
    /// Set the interval between monitor sweeps.
    #[must_use]
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    /// Set the log file path.
    #[must_use]
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_file = Some(path.into());
        self
    }

    /// Set the monitor thread name.
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> WatchdogResult<WatchdogConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
