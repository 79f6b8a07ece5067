//! Vidlens HTTP Client
//!
//! A small, type-safe HTTP client for the video analysis backend.
//!
//! The client covers job submission, progress polling, result retrieval and
//! saved-analysis browsing. The [`AnalysisApi`] trait is the seam the tracker
//! depends on, so polling logic can be exercised without a network.
//!
//! # Example
//!
//! ```no_run
//! use vidlens_client::AnalysisClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), vidlens_client::ClientError> {
//!     let client = AnalysisClient::new("http://localhost:8000");
//!
//!     let progress = client.get_progress("abc123").await?;
//!     println!("{} ({}%)", progress.status, progress.progress);
//!     Ok(())
//! }
//! ```

mod analysis;
mod api;
pub mod error;
mod saved;
mod upload;

// Re-export commonly used types
pub use api::AnalysisApi;
pub use error::{ClientError, Result};
pub use upload::VideoUpload;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the video analysis backend
///
/// Endpoints are organized into logical groups:
/// - Analysis lifecycle (submit, progress, result, completed listing)
/// - Saved analyses (list, get, delete)
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl AnalysisClient {
    /// Create a new analysis client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the analysis API (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use vidlens_client::AnalysisClient;
    ///
    /// let client = AnalysisClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new analysis client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the analysis API
    /// * `client` - A configured reqwest Client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;

        Ok(Self::with_client(base_url, client))
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Deserialize a JSON body after checking the status code
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status of a response whose body is ignored (e.g., DELETE)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        check_status(response).await.map(|_| ())
    }
}

/// Turns a non-2xx response into [`ClientError::ApiError`] carrying the body
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ClientError::api_error(status.as_u16(), body))
}

/// Rejects ids that would produce a malformed request path
fn require_id<'a>(kind: &str, id: &'a str) -> Result<&'a str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ClientError::InvalidRequest(format!("{} id cannot be empty", kind)));
    }
    Ok(id)
}
