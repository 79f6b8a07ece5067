//! Analysis DTOs for the backend HTTP API

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::job::AnalysisPhase;

/// Response of `POST /api/analyze-unified`
///
/// The id is optional on the wire so that a malformed response can be
/// reported as a submission failure instead of a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub analysis_id: Option<String>,
}

/// Response of `GET /api/analysis-progress/{id}`
///
/// An inline `result` is not read; the finished report always comes from
/// `GET /api/analysis/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressResponse {
    #[serde(default)]
    pub status: AnalysisPhase,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub step: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
    #[serde(default)]
    pub result_id: Option<String>,
}

/// Response of `GET /api/analyses`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysesListing {
    #[serde(default)]
    pub analyses: Vec<ListedAnalysis>,
}

/// One completed analysis in the listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListedAnalysis {
    #[serde(default)]
    pub metadata: JsonValue,
    #[serde(default)]
    pub analysis_data: JsonValue,
}

impl ListedAnalysis {
    /// Id recorded in the entry's metadata, if any
    pub fn id(&self) -> Option<&str> {
        self.metadata.get("id").and_then(JsonValue::as_str)
    }
}

impl AnalysesListing {
    /// Finds the entry recorded for `id`
    pub fn find(&self, id: &str) -> Option<&ListedAnalysis> {
        self.analyses.iter().find(|entry| entry.id() == Some(id))
    }
}
