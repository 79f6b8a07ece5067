//! Stuck-completion watchdog
//!
//! Arms when a job reports 100% and fires if the completed status does not
//! follow within the configured window.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Watchdog {
    interval: Duration,
    armed_at: Option<Instant>,
}

impl Watchdog {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            armed_at: None,
        }
    }

    /// Feeds the latest reported progress
    ///
    /// The timer starts on the first report at 100 and keeps its original
    /// start while progress stays there. Any lower value disarms it.
    pub fn observe(&mut self, progress: u8) {
        if progress >= 100 {
            self.armed_at.get_or_insert_with(Instant::now);
        } else {
            self.armed_at = None;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Instant at which the fallback should run
    pub fn deadline(&self) -> Option<Instant> {
        self.armed_at.map(|armed_at| armed_at + self.interval)
    }

    pub fn disarm(&mut self) {
        self.armed_at = None;
    }

    /// Resolves at the deadline, or never while disarmed
    pub async fn expired(&self) {
        match self.deadline() {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_arms_once_at_full_progress() {
        let mut watchdog = Watchdog::new(Duration::from_secs(5));
        watchdog.observe(90);
        assert!(!watchdog.is_armed());

        let start = Instant::now();
        watchdog.observe(100);
        tokio::time::sleep(Duration::from_secs(2)).await;
        watchdog.observe(100);

        assert_eq!(watchdog.deadline(), Some(start + Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lower_progress_disarms() {
        let mut watchdog = Watchdog::new(Duration::from_secs(5));
        watchdog.observe(100);
        watchdog.observe(80);
        assert!(watchdog.deadline().is_none());

        let fired = tokio::time::timeout(Duration::from_secs(60), watchdog.expired()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_fires_after_interval() {
        let mut watchdog = Watchdog::new(Duration::from_secs(5));
        let start = Instant::now();
        watchdog.observe(100);

        watchdog.expired().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_millis(5010));

        watchdog.disarm();
        assert!(!watchdog.is_armed());
    }
}
