//! Tracking engine for video analysis jobs
//!
//! Drives a submitted job from upload to a renderable report: polls its
//! status with backoff, fetches the finished result with retries and keeps
//! the current view (home, loading or dashboard) as an explicit state
//! machine. Presentation layers observe it through [`ViewListener`].

pub mod backoff;
pub mod config;
pub mod controller;
pub mod error;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod testing;

pub use backoff::Backoff;
pub use config::{Environment, FetcherConfig, PollerConfig, TrackerConfig};
pub use controller::{
    CAPTCHA_GUIDANCE, DashboardView, LoadingFailure, LoadingSource, LoadingView, NoopListener,
    ViewKind, ViewListener, ViewState, ViewStateController,
};
pub use error::{Result, TrackerError};
pub use scheduler::{JobPoller, PollEvent, PollFailure, PollHandle, PollOutcome, Watchdog};
pub use service::ResultFetcher;
