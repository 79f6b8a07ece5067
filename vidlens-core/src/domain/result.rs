//! Analysis result domain types
//!
//! The finished report is loosely typed JSON produced by several AI models.
//! [`AnalysisResult`] keeps it opaque and offers section accessors for
//! presentation code, plus a placeholder form used whenever the real report
//! cannot be retrieved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

/// Report sections known to the presentation layer, in display order
pub const SECTIONS: [Section; 9] = [
    Section::Summary,
    Section::PerformanceMetrics,
    Section::AudienceAnalysis,
    Section::ContentQuality,
    Section::EmotionalAnalysis,
    Section::Recommendations,
    Section::Transcription,
    Section::Contradictions,
    Section::Metadata,
];

/// A named top-level section of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Metadata,
    Summary,
    PerformanceMetrics,
    AudienceAnalysis,
    ContentQuality,
    EmotionalAnalysis,
    Recommendations,
    Transcription,
    Contradictions,
}

impl Section {
    /// Key of the section in the report JSON
    pub fn key(&self) -> &'static str {
        match self {
            Section::Metadata => "metadata",
            Section::Summary => "summary",
            Section::PerformanceMetrics => "performance_metrics",
            Section::AudienceAnalysis => "audience_analysis",
            Section::ContentQuality => "content_quality",
            Section::EmotionalAnalysis => "emotional_analysis",
            Section::Recommendations => "recommendations",
            Section::Transcription => "transcription",
            Section::Contradictions => "contradictions",
        }
    }

    /// Heading used when rendering the section
    pub fn title(&self) -> &'static str {
        match self {
            Section::Metadata => "Metadata",
            Section::Summary => "Summary",
            Section::PerformanceMetrics => "Performance Metrics",
            Section::AudienceAnalysis => "Audience Analysis",
            Section::ContentQuality => "Content Quality",
            Section::EmotionalAnalysis => "Emotional Analysis",
            Section::Recommendations => "Recommendations",
            Section::Transcription => "Transcription",
            Section::Contradictions => "Contradictions",
        }
    }
}

/// Final report of an analysis job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(JsonValue);

impl AnalysisResult {
    /// Wraps an already-normalized report payload
    pub fn new(data: JsonValue) -> Self {
        Self(data)
    }

    /// Synthesizes a displayable result for a report that could not be loaded
    ///
    /// Carried-over job metadata is kept, with `id` and the error flag
    /// layered on top so the dashboard can still identify the job.
    pub fn placeholder(
        id: impl Into<String>,
        message: impl Into<String>,
        metadata: Option<JsonValue>,
    ) -> Self {
        let id = id.into();
        let message = message.into();

        let mut meta = match metadata {
            Some(JsonValue::Object(map)) => map,
            _ => Map::new(),
        };
        meta.insert("id".to_string(), JsonValue::String(id.clone()));
        meta.insert("status".to_string(), json!("error"));
        meta.insert("placeholder".to_string(), JsonValue::Bool(true));

        Self(json!({
            "metadata": meta,
            "summary": {
                "overview": format!("The analysis for {} could not be loaded.", id),
            },
            "error": {
                "message": message,
            },
        }))
    }

    /// Whether this result was synthesized instead of fetched
    pub fn is_placeholder(&self) -> bool {
        self.0
            .pointer("/metadata/placeholder")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }

    /// Error message embedded in a placeholder
    pub fn error_message(&self) -> Option<&str> {
        self.0.pointer("/error/message").and_then(JsonValue::as_str)
    }

    /// Id recorded in the report metadata
    pub fn id(&self) -> Option<&str> {
        self.0.pointer("/metadata/id").and_then(JsonValue::as_str)
    }

    /// Returns a section if the report carries a non-null value for it
    pub fn section(&self, section: Section) -> Option<&JsonValue> {
        self.0.get(section.key()).filter(|value| !value.is_null())
    }

    /// Whether the payload carries no data at all (null or `{}`)
    pub fn is_empty(&self) -> bool {
        is_empty_payload(&self.0)
    }

    /// Borrow the raw report
    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    /// Consume into the raw report
    pub fn into_json(self) -> JsonValue {
        self.0
    }
}

/// Null, empty object and empty array payloads carry no report
pub fn is_empty_payload(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Object(map) => map.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        _ => false,
    }
}
