//! # kennel-watchdog
//!
//! Liveness watchdog for cooperating worker threads.
//!
//! Each worker registers a *dog* with a timeout, then periodically *feeds*
//! it to prove it is still making progress. A single background monitor
//! ages every registered dog once per tick; a dog whose countdown runs out
//! means its owner is stuck, and the watchdog logs a timestamped line and
//! terminates the process. Fail fast is the point: the watchdog exists to
//! guarantee termination, not to limp along.
//!
//! ## Architecture
//!
//! - [`registry`] - dog records and the arena-backed list that owns them
//! - [`watchdog`] - the [`Watchdog`] system object: lifecycle API + monitor
//! - [`global`] - the process-wide instance behind `initialize`
//! - [`identity`] - per-thread worker identity resolution
//! - [`state`] - atomic monitor state machine (the run-once start guard)
//! - [`log`] - timestamped console/file sink with an advisory file lock
//! - [`config`] - tick interval, log path, monitor thread name
//! - [`error`] - watchdog-specific error types
//!
//! All registry access, worker operations and monitor sweeps alike, goes
//! through one mutex, so there is a total order over every mutation and
//! the list is never observed half-linked.
//!
//! ## Example
//!
//! ```
//! use kennel_watchdog::prelude::*;
//! use std::time::Duration;
//!
//! let config = WatchdogConfig::builder()
//!     .tick_interval(Duration::from_secs(1))
//!     .build()?;
//! let watchdog = Watchdog::new(config)?;
//! watchdog.start()?;
//!
//! // A worker proves liveness by feeding its dog.
//! watchdog.create("ingest-worker", 30)?;
//! watchdog.feed()?;
//! assert!(watchdog.snapshot().is_some());
//! watchdog.delete()?;
//! # Ok::<(), kennel_watchdog::WatchdogError>(())
//! ```
//!
//! Deployments that want the classic one-per-process setup use
//! [`global::initialize`] and the free functions next to it.

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod global;
pub mod identity;
pub mod log;
pub mod prelude;
pub mod registry;
pub mod state;
pub mod watchdog;

pub use config::{WatchdogConfig, WatchdogConfigBuilder};
pub use error::{WatchdogError, WatchdogResult};
pub use identity::WorkerId;
pub use log::WatchdogLog;
pub use registry::{DogRecord, DogSnapshot, ExpiredDog, Registry};
pub use state::{MonitorState, MonitorStatus};
pub use watchdog::{DogHandle, TerminationHandler, Watchdog};
