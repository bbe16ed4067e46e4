//! Worker identity resolution.
//!
//! Every per-caller operation locates "my dog" through a [`WorkerId`]: a
//! token that is stable for the lifetime of the calling thread and unique
//! across all threads of the process. Resolution is a pure query with no
//! error conditions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_WORKER_ID: WorkerId =
        WorkerId(NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed));
}

/// Stable identity of one worker thread.
///
/// Assigned lazily on the first query from each thread and never reused
/// within a process. The raw value carries no meaning beyond uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Identity of the calling thread.
    #[must_use]
    pub fn current() -> Self {
        CURRENT_WORKER_ID.with(|id| *id)
    }

    /// Construct an identity from a raw value.
    ///
    /// Intended for tests and for embedders driving a [`Registry`] directly;
    /// workers themselves should always use [`WorkerId::current`].
    ///
    /// [`Registry`]: crate::registry::Registry
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identity value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
