//! Monitor state machine.
//!
//! The monitor starts at most once per watchdog and never goes back to
//! `Stopped`; the `Stopped → Running` compare-exchange is the run-once
//! guard for monitor startup. All transitions are atomic, so concurrent
//! `start` calls race safely and exactly one wins.
//!
//! ```text
//! Stopped ──begin()──► Running ──expire()──► Expired
//!    │                                          ▲
//!    └────────────────expire()──────────────────┘
//! ```
//!
//! `Expired` is terminal. With the default termination handler the process
//! exits before the state is ever observed; the state only matters when a
//! test injects a handler that returns.

use std::sync::atomic::{AtomicU32, Ordering};

/// Monitor operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum MonitorStatus {
    /// Monitor has not been started.
    #[default]
    Stopped = 0,
    /// Monitor loop is sweeping the registry once per tick.
    Running = 1,
    /// A dog expired and the fatal action ran (terminal).
    Expired = 2,
}

impl MonitorStatus {
    /// Convert from a raw `u32` value.
    #[must_use]
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Stopped),
            1 => Some(Self::Running),
            2 => Some(Self::Expired),
            _ => None,
        }
    }

    /// Check if this is the terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Get the status as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Running => "Running",
            Self::Expired => "Expired",
        }
    }
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Atomic monitor state.
#[derive(Debug, Default)]
pub struct MonitorState {
    status: AtomicU32,
}

impl MonitorState {
    /// Create a new state machine in `Stopped`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> MonitorStatus {
        MonitorStatus::from_raw(self.status.load(Ordering::Acquire))
            .unwrap_or(MonitorStatus::Expired)
    }

    /// Attempt the `Stopped → Running` transition.
    ///
    /// Returns `true` only for the caller that performed the transition;
    /// every concurrent or later caller gets `false`.
    pub fn begin(&self) -> bool {
        self.status
            .compare_exchange(
                MonitorStatus::Stopped as u32,
                MonitorStatus::Running as u32,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Roll back a failed start: `Running → Stopped`.
    ///
    /// Only meaningful for the caller that just won [`MonitorState::begin`]
    /// and then failed to spawn the monitor thread.
    pub fn cancel(&self) {
        let _ = self.status.compare_exchange(
            MonitorStatus::Running as u32,
            MonitorStatus::Stopped as u32,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Enter the terminal `Expired` state.
    ///
    /// Returns `true` on the first transition, `false` if already expired.
    /// The fatal action must run at most once, so callers gate it on this.
    pub fn expire(&self) -> bool {
        let previous = self
            .status
            .swap(MonitorStatus::Expired as u32, Ordering::AcqRel);
        previous != MonitorStatus::Expired as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_initial_state() {
        let state = MonitorState::new();
        assert_eq!(state.status(), MonitorStatus::Stopped);
        assert!(!state.status().is_terminal());
    }

    #[test]
    fn test_begin_wins_once() {
        let state = MonitorState::new();
        assert!(state.begin());
        assert!(!state.begin());
        assert_eq!(state.status(), MonitorStatus::Running);
    }

    #[test]
    fn test_concurrent_begin_single_winner() {
        let state = Arc::new(MonitorState::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                thread::spawn(move || state.begin())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join())
            .filter(|r| matches!(r, Ok(true)))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(state.status(), MonitorStatus::Running);
    }

    #[test]
    fn test_cancel_restores_stopped() {
        let state = MonitorState::new();
        assert!(state.begin());
        state.cancel();
        assert_eq!(state.status(), MonitorStatus::Stopped);
        // A later start attempt can win again.
        assert!(state.begin());
    }

    #[test]
    fn test_expire_fires_once() {
        let state = MonitorState::new();
        assert!(state.begin());
        assert!(state.expire());
        assert!(!state.expire());
        assert_eq!(state.status(), MonitorStatus::Expired);
        assert!(state.status().is_terminal());
    }

    #[test]
    fn test_expire_from_stopped() {
        // Manual sweeps can expire a dog before the monitor thread starts.
        let state = MonitorState::new();
        assert!(state.expire());
        assert_eq!(state.status(), MonitorStatus::Expired);
        assert!(!state.begin());
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(MonitorStatus::from_raw(0), Some(MonitorStatus::Stopped));
        assert_eq!(MonitorStatus::from_raw(1), Some(MonitorStatus::Running));
        assert_eq!(MonitorStatus::from_raw(2), Some(MonitorStatus::Expired));
        assert_eq!(MonitorStatus::from_raw(3), None);
        assert_eq!(MonitorStatus::Running.as_str(), "Running");
    }
}
