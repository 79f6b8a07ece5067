//! Saved analysis domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::result::AnalysisResult;

/// Listing entry for an analysis the user saved earlier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedAnalysisSummary {
    #[serde(alias = "_id", alias = "analysis_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Fields the listing carries that have no dedicated slot
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl SavedAnalysisSummary {
    /// Best display title for the entry
    pub fn title(&self) -> &str {
        [self.name.as_deref(), self.video_title.as_deref()]
            .into_iter()
            .flatten()
            .find(|title| !title.trim().is_empty())
            .unwrap_or("Untitled analysis")
    }
}

/// A saved analysis together with its normalized report
#[derive(Debug, Clone)]
pub struct SavedAnalysis {
    pub summary: SavedAnalysisSummary,
    pub result: AnalysisResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_accepts_mongo_style_id_and_keeps_extra_fields() {
        let summary: SavedAnalysisSummary = serde_json::from_value(json!({
            "_id": "66f0c1",
            "video_title": "Launch teaser",
            "created_at": "2024-05-01T10:00:00Z",
            "duration": 42
        }))
        .unwrap();

        assert_eq!(summary.id, "66f0c1");
        assert_eq!(summary.title(), "Launch teaser");
        assert!(summary.created_at.is_some());
        assert_eq!(summary.extra.get("duration"), Some(&json!(42)));
    }

    #[test]
    fn test_title_fallback() {
        let summary = SavedAnalysisSummary {
            id: "x".to_string(),
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(summary.title(), "Untitled analysis");

        let summary = SavedAnalysisSummary {
            video_title: Some("Teaser".to_string()),
            ..summary
        };
        assert_eq!(summary.title(), "Teaser");
    }
}
