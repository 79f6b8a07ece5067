//! Backend seam used by the tracker

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use vidlens_core::dto::analysis::{AnalysesListing, ProgressResponse, SubmitResponse};
use vidlens_core::dto::saved::SavedAnalysisRecord;

use crate::error::Result;
use crate::{AnalysisClient, VideoUpload};

/// Operations the tracker needs from the analysis backend
///
/// [`AnalysisClient`] is the HTTP implementation. Tests substitute
/// scripted in-memory implementations.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Submits a video and returns the backend's acknowledgement
    async fn submit_analysis(&self, upload: VideoUpload) -> Result<SubmitResponse>;

    /// Fetches the current progress of a job
    async fn get_progress(&self, analysis_id: &str) -> Result<ProgressResponse>;

    /// Fetches a finished report, possibly wrapped in `analysis_data`
    async fn get_analysis(&self, id: &str) -> Result<JsonValue>;

    /// Lists completed analyses
    async fn list_analyses(&self) -> Result<AnalysesListing>;

    /// Fetches a saved analysis
    async fn get_saved_analysis(&self, id: &str) -> Result<SavedAnalysisRecord>;
}

#[async_trait]
impl AnalysisApi for AnalysisClient {
    async fn submit_analysis(&self, upload: VideoUpload) -> Result<SubmitResponse> {
        AnalysisClient::submit_analysis(self, upload).await
    }

    async fn get_progress(&self, analysis_id: &str) -> Result<ProgressResponse> {
        AnalysisClient::get_progress(self, analysis_id).await
    }

    async fn get_analysis(&self, id: &str) -> Result<JsonValue> {
        AnalysisClient::get_analysis(self, id).await
    }

    async fn list_analyses(&self) -> Result<AnalysesListing> {
        AnalysisClient::list_analyses(self).await
    }

    async fn get_saved_analysis(&self, id: &str) -> Result<SavedAnalysisRecord> {
        AnalysisClient::get_saved_analysis(self, id).await
    }
}
