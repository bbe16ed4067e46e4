//! Prelude for kennel-watchdog.
//!
//! Re-exports the types most callers need.
//!
//! # Example
//!
//! ```
//! use kennel_watchdog::prelude::*;
//!
//! let config = WatchdogConfig::default();
//! let watchdog = Watchdog::new(config)?;
//! watchdog.create("worker", 30)?;
//! watchdog.feed()?;
//! # Ok::<(), kennel_watchdog::WatchdogError>(())
//! ```

pub use crate::config::{WatchdogConfig, WatchdogConfigBuilder};
pub use crate::error::{WatchdogError, WatchdogResult};
pub use crate::identity::WorkerId;
pub use crate::registry::{DogSnapshot, ExpiredDog};
pub use crate::state::MonitorStatus;
pub use crate::watchdog::{DogHandle, TerminationHandler, Watchdog};
