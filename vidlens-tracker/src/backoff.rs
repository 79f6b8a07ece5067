//! Geometric backoff schedule

use std::time::Duration;

use crate::config::{FetcherConfig, PollerConfig};

/// Delay tracker for consecutive failures
///
/// The delay starts at `base` and is multiplied by `factor` on every
/// recorded failure, never exceeding `max`. A reset returns to `base`.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    factor: f64,
    max: Duration,
    current: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(base: Duration, factor: f64, max: Duration) -> Self {
        Self {
            base,
            factor,
            max,
            current: base,
            failures: 0,
        }
    }

    /// Delay to wait before the next attempt
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Consecutive failures since the last reset
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Records a failure and returns the grown delay
    ///
    /// Never panics: a product that is not a valid duration saturates at `max`.
    pub fn record_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        self.current = self.capped(self.current.as_secs_f64() * self.factor);
        self.current
    }

    /// Returns to the baseline delay and clears the failure count
    pub fn reset(&mut self) {
        self.failures = 0;
        self.current = self.base;
    }

    /// Delay for the `attempt`-th retry, independent of recorded failures
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        self.capped(self.base.as_secs_f64() * self.factor.powi(exponent))
    }

    fn capped(&self, secs: f64) -> Duration {
        match Duration::try_from_secs_f64(secs) {
            Ok(delay) => delay.min(self.max),
            Err(_) => self.max,
        }
    }
}

impl From<&PollerConfig> for Backoff {
    fn from(config: &PollerConfig) -> Self {
        Self::new(config.base_delay, config.backoff_factor, config.max_delay)
    }
}

impl From<&FetcherConfig> for Backoff {
    fn from(config: &FetcherConfig) -> Self {
        Self::new(config.base_delay, config.backoff_factor, config.max_delay)
    }
}
