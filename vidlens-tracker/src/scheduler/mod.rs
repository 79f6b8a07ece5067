//! Scheduler layer for the tracker
//!
//! This layer owns everything time-driven about a loading session: the
//! status poller with its backoff schedule, and the watchdog guarding
//! against a missed completion event.

pub mod poller;
pub mod watchdog;

pub use poller::{JobPoller, PollEvent, PollFailure, PollHandle, PollOutcome};
pub use watchdog::Watchdog;
