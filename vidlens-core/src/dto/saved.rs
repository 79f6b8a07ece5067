//! Saved-analysis DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::saved::SavedAnalysisSummary;

/// Response of `GET /api/saved-analyses?limit&skip`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedAnalysisPage {
    #[serde(default)]
    pub analyses: Vec<SavedAnalysisSummary>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Response of `GET /api/saved-analyses/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedAnalysisRecord {
    #[serde(flatten)]
    pub summary: SavedAnalysisSummary,
    #[serde(default)]
    pub analysis_data: Option<JsonValue>,
}

/// Query parameters for paging saved analyses
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SavedAnalysisQuery {
    pub limit: u32,
    pub skip: u32,
}

impl Default for SavedAnalysisQuery {
    fn default() -> Self {
        Self { limit: 20, skip: 0 }
    }
}
