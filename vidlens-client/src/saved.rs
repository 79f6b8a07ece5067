//! Saved-analysis endpoints

use vidlens_core::dto::saved::{SavedAnalysisPage, SavedAnalysisQuery, SavedAnalysisRecord};

use crate::error::Result;
use crate::{AnalysisClient, require_id};

impl AnalysisClient {
    // =============================================================================
    // Saved Analyses
    // =============================================================================

    /// List saved analyses, one page at a time
    ///
    /// # Arguments
    /// * `query` - Page size (`limit`) and offset (`skip`)
    pub async fn list_saved_analyses(&self, query: SavedAnalysisQuery) -> Result<SavedAnalysisPage> {
        let url = self.url("/api/saved-analyses");
        let response = self
            .client
            .get(&url)
            .query(&[("limit", query.limit), ("skip", query.skip)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a saved analysis by ID
    pub async fn get_saved_analysis(&self, id: &str) -> Result<SavedAnalysisRecord> {
        let id = require_id("saved analysis", id)?;
        let url = self.url(&format!("/api/saved-analyses/{}", id));
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Delete a saved analysis
    pub async fn delete_saved_analysis(&self, id: &str) -> Result<()> {
        let id = require_id("saved analysis", id)?;
        let url = self.url(&format!("/api/saved-analyses/{}", id));
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
