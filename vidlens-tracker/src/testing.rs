//! Scripted in-memory backend for tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::time::Instant;
use vidlens_client::{AnalysisApi, ClientError, Result, VideoUpload};
use vidlens_core::domain::job::AnalysisPhase;
use vidlens_core::dto::analysis::{AnalysesListing, ProgressResponse, SubmitResponse};
use vidlens_core::dto::saved::SavedAnalysisRecord;

/// Builds a progress report for a wire status name
pub fn progress(status: &str, value: f64) -> ProgressResponse {
    let status: AnalysisPhase =
        serde_json::from_value(JsonValue::String(status.to_string())).unwrap();
    ProgressResponse {
        status,
        progress: value,
        ..Default::default()
    }
}

/// Backend whose answers are queued up front
///
/// Once the progress queue runs dry the last successful report is repeated,
/// which models a job that stops moving.
#[derive(Default)]
pub struct ScriptedApi {
    submit: Mutex<Option<Result<SubmitResponse>>>,
    submitted: Mutex<Vec<String>>,
    progress: Mutex<VecDeque<Result<ProgressResponse>>>,
    sticky: Mutex<Option<ProgressResponse>>,
    progress_latency: Mutex<Duration>,
    progress_ids: Mutex<Vec<String>>,
    progress_times: Mutex<Vec<Instant>>,
    progress_answered: AtomicUsize,
    analysis: Mutex<VecDeque<Result<JsonValue>>>,
    analysis_ids: Mutex<Vec<String>>,
    analysis_times: Mutex<Vec<Instant>>,
    listing: Mutex<Option<Result<AnalysesListing>>>,
    listing_calls: AtomicUsize,
    saved: Mutex<VecDeque<Result<SavedAnalysisRecord>>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_submit(&self, reply: Result<SubmitResponse>) {
        *self.submit.lock().unwrap() = Some(reply);
    }

    pub fn push_progress(&self, reply: Result<ProgressResponse>) {
        self.progress.lock().unwrap().push_back(reply);
    }

    pub fn set_progress_latency(&self, latency: Duration) {
        *self.progress_latency.lock().unwrap() = latency;
    }

    pub fn push_analysis(&self, reply: Result<JsonValue>) {
        self.analysis.lock().unwrap().push_back(reply);
    }

    pub fn set_listing(&self, reply: Result<AnalysesListing>) {
        *self.listing.lock().unwrap() = Some(reply);
    }

    pub fn push_saved(&self, reply: Result<SavedAnalysisRecord>) {
        self.saved.lock().unwrap().push_back(reply);
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn progress_calls(&self) -> usize {
        self.progress_ids.lock().unwrap().len()
    }

    pub fn progress_ids(&self) -> Vec<String> {
        self.progress_ids.lock().unwrap().clone()
    }

    pub fn progress_answered(&self) -> usize {
        self.progress_answered.load(Ordering::SeqCst)
    }

    pub fn progress_gaps(&self) -> Vec<Duration> {
        gaps(&self.progress_times.lock().unwrap())
    }

    pub fn analysis_ids(&self) -> Vec<String> {
        self.analysis_ids.lock().unwrap().clone()
    }

    pub fn analysis_gaps(&self) -> Vec<Duration> {
        gaps(&self.analysis_times.lock().unwrap())
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }
}

fn gaps(times: &[Instant]) -> Vec<Duration> {
    times.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

#[async_trait]
impl AnalysisApi for ScriptedApi {
    async fn submit_analysis(&self, upload: VideoUpload) -> Result<SubmitResponse> {
        self.submitted.lock().unwrap().push(upload.name);
        self.submit
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ClientError::api_error(500, "no submit scripted")))
    }

    async fn get_progress(&self, analysis_id: &str) -> Result<ProgressResponse> {
        self.progress_ids
            .lock()
            .unwrap()
            .push(analysis_id.to_string());
        self.progress_times.lock().unwrap().push(Instant::now());

        let latency = *self.progress_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.progress_answered.fetch_add(1, Ordering::SeqCst);

        let next = self.progress.lock().unwrap().pop_front();
        match next {
            Some(Ok(report)) => {
                *self.sticky.lock().unwrap() = Some(report.clone());
                Ok(report)
            }
            Some(Err(e)) => Err(e),
            None => self
                .sticky
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ClientError::api_error(404, "no progress scripted")),
        }
    }

    async fn get_analysis(&self, id: &str) -> Result<JsonValue> {
        self.analysis_ids.lock().unwrap().push(id.to_string());
        self.analysis_times.lock().unwrap().push(Instant::now());
        self.analysis
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::api_error(404, "analysis not found")))
    }

    async fn list_analyses(&self) -> Result<AnalysesListing> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.listing
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(AnalysesListing::default()))
    }

    async fn get_saved_analysis(&self, _id: &str) -> Result<SavedAnalysisRecord> {
        self.saved
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::api_error(404, "saved analysis not found")))
    }
}
