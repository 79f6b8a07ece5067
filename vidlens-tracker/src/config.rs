//! Tracker configuration
//!
//! Defines every tunable of the tracker: which backend to talk to, request
//! timeouts, the polling backoff schedule, result retry policy and the
//! watchdog window. Built once at startup and passed down explicitly.

use std::time::Duration;

use crate::error::{Result, TrackerError};

/// Backend used when running against a local development server
pub const DEVELOPMENT_API_URL: &str = "http://localhost:8000";

/// Backend used in production when no override is given
pub const PRODUCTION_API_URL: &str = "https://api.vidlens.io";

/// Runtime environment, selects the default backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Parses `development`/`dev` and `production`/`prod`
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(TrackerError::InvalidConfig(format!(
                "unknown environment '{}'",
                other
            ))),
        }
    }

    /// Default backend URL for this environment
    pub fn default_api_url(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_API_URL,
            Environment::Production => PRODUCTION_API_URL,
        }
    }
}

/// Status polling schedule
#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    /// Delay between polls while the backend answers
    pub base_delay: Duration,

    /// Growth factor applied to the delay after each failed poll
    pub backoff_factor: f64,

    /// Upper bound for the grown delay
    pub max_delay: Duration,

    /// Consecutive failed polls after which the service counts as unreachable
    pub max_consecutive_errors: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(2000),
            backoff_factor: 1.5,
            max_delay: Duration::from_millis(30_000),
            max_consecutive_errors: 10,
        }
    }
}

/// Result retrieval retry policy
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay unit; retry `n` waits `base_delay * backoff_factor^n`
    pub base_delay: Duration,

    pub backoff_factor: f64,

    pub max_delay: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_millis(1000),
            backoff_factor: 1.5,
            max_delay: Duration::from_millis(30_000),
        }
    }
}

/// Tracker configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub environment: Environment,

    /// Analysis backend base URL (e.g., "https://api.vidlens.io")
    pub api_base_url: String,

    /// Maximum time a single HTTP request may take
    pub request_timeout: Duration,

    pub poller: PollerConfig,

    pub fetcher: FetcherConfig,

    /// How long progress may sit at 100% before the completed listing is consulted
    pub watchdog_interval: Duration,
}

impl TrackerConfig {
    /// Creates a configuration with defaults for the given environment
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            api_base_url: environment.default_api_url().to_string(),
            request_timeout: Duration::from_secs(30),
            poller: PollerConfig::default(),
            fetcher: FetcherConfig::default(),
            watchdog_interval: Duration::from_secs(5),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - VIDLENS_ENV (development | production, default: production)
    /// - VIDLENS_API_URL (default depends on VIDLENS_ENV)
    /// - VIDLENS_REQUEST_TIMEOUT_SECS (default: 30)
    /// - VIDLENS_POLL_INTERVAL_MS (default: 2000)
    /// - VIDLENS_POLL_MAX_DELAY_MS (default: 30000)
    /// - VIDLENS_POLL_MAX_ERRORS (default: 10)
    /// - VIDLENS_FETCH_RETRIES (default: 4)
    /// - VIDLENS_FETCH_RETRY_DELAY_MS (default: 1000)
    /// - VIDLENS_WATCHDOG_SECS (default: 5)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    ///
    /// Unparsable numeric values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let environment = match lookup("VIDLENS_ENV") {
            Some(value) if !value.trim().is_empty() => Environment::parse(&value)?,
            _ => Environment::default(),
        };

        let mut config = Self::new(environment);

        if let Some(url) = lookup("VIDLENS_API_URL").filter(|url| !url.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }

        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        if let Some(secs) = number("VIDLENS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = number("VIDLENS_POLL_INTERVAL_MS") {
            config.poller.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = number("VIDLENS_POLL_MAX_DELAY_MS") {
            config.poller.max_delay = Duration::from_millis(ms);
        }
        if let Some(max) = number("VIDLENS_POLL_MAX_ERRORS") {
            config.poller.max_consecutive_errors = max.min(u32::MAX as u64) as u32;
        }
        if let Some(retries) = number("VIDLENS_FETCH_RETRIES") {
            config.fetcher.max_retries = retries.min(u32::MAX as u64) as u32;
        }
        if let Some(ms) = number("VIDLENS_FETCH_RETRY_DELAY_MS") {
            config.fetcher.base_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = number("VIDLENS_WATCHDOG_SECS") {
            config.watchdog_interval = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Overrides the backend URL
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(TrackerError::InvalidConfig(msg.to_string()));

        if self.api_base_url.is_empty() {
            return invalid("api_base_url cannot be empty");
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return invalid("api_base_url must start with http:// or https://");
        }

        if self.request_timeout.is_zero() {
            return invalid("request_timeout must be greater than 0");
        }

        if self.poller.base_delay.is_zero() {
            return invalid("poll interval must be greater than 0");
        }

        if self.poller.max_delay < self.poller.base_delay {
            return invalid("poll max delay must not be below the poll interval");
        }

        if !valid_factor(self.poller.backoff_factor) || !valid_factor(self.fetcher.backoff_factor) {
            return invalid("backoff factor must be a finite number of at least 1");
        }

        if self.poller.max_consecutive_errors == 0 {
            return invalid("max consecutive poll errors must be greater than 0");
        }

        if self.fetcher.base_delay.is_zero() {
            return invalid("fetch retry delay must be greater than 0");
        }

        if self.watchdog_interval.is_zero() {
            return invalid("watchdog interval must be greater than 0");
        }

        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

fn valid_factor(factor: f64) -> bool {
    factor.is_finite() && factor >= 1.0
}
