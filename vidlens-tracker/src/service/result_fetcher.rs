//! Result fetcher
//!
//! Retrieves the finished report once polling reports completion. A report
//! may lag behind the completed status (not yet persisted), so transient
//! absence is retried with growing delays. The fetcher never fails: when the
//! report cannot be obtained it synthesizes a placeholder the dashboard can
//! still render.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio::time;
use tracing::{debug, info, warn};
use vidlens_client::{AnalysisApi, ClientError};
use vidlens_core::domain::result::{AnalysisResult, is_empty_payload};
use vidlens_core::domain::saved::{SavedAnalysis, SavedAnalysisSummary};
use vidlens_core::dto::saved::SavedAnalysisRecord;

use crate::backoff::Backoff;
use crate::config::FetcherConfig;

/// Retrieves and normalizes finished reports
#[derive(Clone)]
pub struct ResultFetcher {
    api: Arc<dyn AnalysisApi>,
    config: FetcherConfig,
}

impl ResultFetcher {
    pub fn new(api: Arc<dyn AnalysisApi>, config: FetcherConfig) -> Self {
        Self { api, config }
    }

    /// Fetches the report stored under `id`
    ///
    /// `metadata` is what the poller learned about the job. It fills in a
    /// report that carries no metadata of its own, and it is embedded in the
    /// placeholder when the report cannot be loaded.
    pub async fn fetch(&self, id: &str, metadata: Option<JsonValue>) -> AnalysisResult {
        let fetched = self
            .with_retry(id, || self.api.get_analysis(id), |body: &JsonValue| {
                is_empty_payload(&unwrap_payload(body.clone()))
            })
            .await;

        match fetched {
            Ok(body) => {
                info!(id, "Analysis result retrieved");
                AnalysisResult::new(attach_metadata(unwrap_payload(body), metadata))
            }
            Err(message) => {
                warn!(id, "Falling back to placeholder result: {}", message);
                AnalysisResult::placeholder(id, message, metadata)
            }
        }
    }

    /// Fetches a saved analysis, with the same retry and fallback policy
    pub async fn fetch_saved(&self, id: &str) -> SavedAnalysis {
        let fetched = self
            .with_retry(id, || self.api.get_saved_analysis(id), |record: &SavedAnalysisRecord| {
                record.analysis_data.as_ref().is_none_or(is_empty_payload)
            })
            .await;

        match fetched {
            Ok(record) => {
                let data = record.analysis_data.unwrap_or(JsonValue::Null);
                let metadata = serde_json::to_value(&record.summary).ok();
                SavedAnalysis {
                    result: AnalysisResult::new(attach_metadata(unwrap_payload(data), metadata)),
                    summary: record.summary,
                }
            }
            Err(message) => {
                warn!(id, "Saved analysis unavailable: {}", message);
                SavedAnalysis {
                    summary: SavedAnalysisSummary {
                        id: id.to_string(),
                        ..Default::default()
                    },
                    result: AnalysisResult::placeholder(id, message, None),
                }
            }
        }
    }

    /// Runs `op` until it yields a non-empty value or the retry budget is spent
    ///
    /// Returns the readable reason on failure.
    async fn with_retry<T, F, Fut>(
        &self,
        id: &str,
        op: F,
        is_empty: impl Fn(&T) -> bool,
    ) -> Result<T, String>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let backoff = Backoff::from(&self.config);
        let attempts = self.config.max_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let reason = match op().await {
                Ok(value) if !is_empty(&value) => return Ok(value),
                Ok(_) => "Analysis result is empty".to_string(),
                Err(e) if e.is_retryable() => e.to_string(),
                Err(e) => {
                    return Err(format!("Failed to load analysis {}: {}", id, e));
                }
            };

            if attempt >= attempts {
                return Err(format!(
                    "Analysis {} is not available after {} attempts: {}",
                    id, attempts, reason
                ));
            }

            let delay = backoff.delay_for_attempt(attempt);
            debug!(
                id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Result not ready, retrying: {}",
                reason
            );
            time::sleep(delay).await;
        }
    }
}

/// Strips the `analysis_data` envelope when present
pub fn unwrap_payload(body: JsonValue) -> JsonValue {
    match body {
        JsonValue::Object(mut map) => match map.remove("analysis_data") {
            Some(inner) if !inner.is_null() => inner,
            Some(inner) => {
                map.insert("analysis_data".to_string(), inner);
                JsonValue::Object(map)
            }
            None => JsonValue::Object(map),
        },
        other => other,
    }
}

/// Gives a report without metadata the metadata gathered elsewhere
pub(crate) fn attach_metadata(mut report: JsonValue, metadata: Option<JsonValue>) -> JsonValue {
    if let (JsonValue::Object(map), Some(metadata)) = (&mut report, metadata) {
        if map.get("metadata").is_none_or(JsonValue::is_null) {
            map.insert("metadata".to_string(), metadata);
        }
    }
    report
}
