//! Analysis lifecycle endpoints

use serde_json::Value as JsonValue;
use tracing::debug;
use vidlens_core::dto::analysis::{AnalysesListing, ProgressResponse, SubmitResponse};

use crate::error::Result;
use crate::{AnalysisClient, VideoUpload, require_id};

impl AnalysisClient {
    // =============================================================================
    // Analysis Lifecycle
    // =============================================================================

    /// Submit a video for analysis
    ///
    /// Sends the file and display name as a multipart form. The returned
    /// `analysis_id` is left optional; callers decide how to treat a
    /// response without one.
    ///
    /// # Example
    /// ```no_run
    /// # use vidlens_client::{AnalysisClient, VideoUpload};
    /// # async fn example() -> vidlens_client::Result<()> {
    /// let client = AnalysisClient::new("http://localhost:8000");
    /// let upload = VideoUpload::from_path("Launch teaser", "teaser.mp4").await?;
    /// let submitted = client.submit_analysis(upload).await?;
    /// println!("{:?}", submitted.analysis_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_analysis(&self, upload: VideoUpload) -> Result<SubmitResponse> {
        upload.validate()?;

        let url = self.url("/api/analyze-unified");
        debug!(file = %upload.file_name, bytes = upload.content.len(), "Submitting video for analysis");

        let response = self
            .client
            .post(&url)
            .multipart(upload.into_form()?)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the current progress of an analysis job
    ///
    /// # Arguments
    /// * `analysis_id` - The id returned by [`AnalysisClient::submit_analysis`]
    pub async fn get_progress(&self, analysis_id: &str) -> Result<ProgressResponse> {
        let analysis_id = require_id("analysis", analysis_id)?;
        let url = self.url(&format!("/api/analysis-progress/{}", analysis_id));
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get a finished analysis report
    ///
    /// The body is returned as-is: it may be wrapped in `analysis_data` or not.
    ///
    /// # Arguments
    /// * `id` - The analysis or result id
    pub async fn get_analysis(&self, id: &str) -> Result<JsonValue> {
        let id = require_id("analysis", id)?;
        let url = self.url(&format!("/api/analysis/{}", id));
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List all completed analyses
    pub async fn list_analyses(&self) -> Result<AnalysesListing> {
        let url = self.url("/api/analyses");
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
