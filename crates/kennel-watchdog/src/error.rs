//! Error types for the kennel watchdog.
//!
//! Every fallible lifecycle operation returns its error to the immediate
//! caller; nothing here crosses the process boundary. Dog expiry is not an
//! error value at all; it is the monitor's fatal condition and is handled
//! by the termination handler.

use thiserror::Error;

use crate::identity::WorkerId;

/// Errors that can occur during watchdog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// The calling worker already owns a dog.
    ///
    /// The existing registration is left untouched.
    #[error("worker {identity} already owns dog '{name}'")]
    DuplicateRegistration {
        /// Name of the dog the worker already owns.
        name: String,
        /// Identity of the offending worker.
        identity: WorkerId,
    },

    /// The calling worker has no registered dog.
    #[error("worker {0} has no registered dog")]
    NotRegistered(WorkerId),

    /// The process-wide watchdog has not been initialized yet.
    #[error("watchdog is not initialized")]
    NotInitialized,

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The monitor thread could not be started.
    ///
    /// Fatal to the calling program's startup; callers should abort.
    #[error("watchdog initialization failed: {0}")]
    InitializationFailure(String),
}

impl WatchdogError {
    /// Create a duplicate registration error.
    #[must_use]
    pub fn duplicate_registration(name: impl Into<String>, identity: WorkerId) -> Self {
        Self::DuplicateRegistration {
            name: name.into(),
            identity,
        }
    }

    /// Create a not registered error.
    #[must_use]
    pub fn not_registered(identity: WorkerId) -> Self {
        Self::NotRegistered(identity)
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create an initialization failure error.
    #[must_use]
    pub fn initialization_failure(reason: impl Into<String>) -> Self {
        Self::InitializationFailure(reason.into())
    }
}

/// A specialized `Result` type for watchdog operations.
pub type WatchdogResult<T> = std::result::Result<T, WatchdogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatchdogError::duplicate_registration("uplink", WorkerId::from_raw(7));
        assert!(err.to_string().contains("uplink"));
        assert!(err.to_string().contains('7'));

        let err = WatchdogError::not_registered(WorkerId::from_raw(3));
        assert!(err.to_string().contains("no registered dog"));
    }

    #[test]
    fn test_error_constructors() {
        let err = WatchdogError::invalid_configuration("timeout must be at least one tick");
        assert!(matches!(err, WatchdogError::InvalidConfiguration(_)));

        let err = WatchdogError::initialization_failure("spawn failed");
        assert!(matches!(err, WatchdogError::InitializationFailure(_)));
    }
}
