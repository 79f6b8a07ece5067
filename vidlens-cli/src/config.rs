//! Configuration module
//!
//! Combines the `VIDLENS_*` environment configuration with command-line
//! overrides.

use anyhow::{Context, Result};
use vidlens_client::AnalysisClient;
use vidlens_tracker::TrackerConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Tracker settings, including the backend URL
    pub tracker: TrackerConfig,

    /// Emit JSON instead of formatted output
    pub json: bool,
}

impl Config {
    /// Loads configuration from the environment, then applies `api_url`
    pub fn load(api_url: Option<String>, json: bool) -> Result<Self> {
        let mut tracker =
            TrackerConfig::from_env().context("Invalid VIDLENS_* environment configuration")?;

        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            tracker = tracker.with_api_url(url.trim().trim_end_matches('/'));
            tracker.validate().context("Invalid --api-url")?;
        }

        Ok(Self { tracker, json })
    }

    /// HTTP client for the configured backend
    pub fn client(&self) -> Result<AnalysisClient> {
        AnalysisClient::with_timeout(&self.tracker.api_base_url, self.tracker.request_timeout)
            .context("Failed to build HTTP client")
    }
}
