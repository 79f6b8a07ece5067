//! Analysis job domain types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::dto::analysis::ProgressResponse;

/// Phase of a remote analysis job
///
/// Mirrors the backend's status vocabulary. Values the backend adds later
/// deserialize to [`AnalysisPhase::Unknown`] and are treated as in-progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    #[default]
    Initializing,
    DownloadingVideo,
    DownloadComplete,
    #[serde(rename = "uploading_to_s3")]
    UploadingToS3,
    RunningGeminiAnalysis,
    RunningClarifaiAnalysis,
    ProcessingWithAiModels,
    GeminiStarted,
    ClarifaiStarted,
    GeminiComplete,
    ClarifaiAnalysisComplete,
    GeneratingUnifiedAnalysis,
    ValidatingAnalysis,
    FinalizingResults,
    Completed,
    Error,
    CaptchaError,
    #[serde(other)]
    Unknown,
}

impl AnalysisPhase {
    /// Wire representation of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisPhase::Initializing => "initializing",
            AnalysisPhase::DownloadingVideo => "downloading_video",
            AnalysisPhase::DownloadComplete => "download_complete",
            AnalysisPhase::UploadingToS3 => "uploading_to_s3",
            AnalysisPhase::RunningGeminiAnalysis => "running_gemini_analysis",
            AnalysisPhase::RunningClarifaiAnalysis => "running_clarifai_analysis",
            AnalysisPhase::ProcessingWithAiModels => "processing_with_ai_models",
            AnalysisPhase::GeminiStarted => "gemini_started",
            AnalysisPhase::ClarifaiStarted => "clarifai_started",
            AnalysisPhase::GeminiComplete => "gemini_complete",
            AnalysisPhase::ClarifaiAnalysisComplete => "clarifai_analysis_complete",
            AnalysisPhase::GeneratingUnifiedAnalysis => "generating_unified_analysis",
            AnalysisPhase::ValidatingAnalysis => "validating_analysis",
            AnalysisPhase::FinalizingResults => "finalizing_results",
            AnalysisPhase::Completed => "completed",
            AnalysisPhase::Error => "error",
            AnalysisPhase::CaptchaError => "captcha_error",
            AnalysisPhase::Unknown => "unknown",
        }
    }

    /// Human-readable status line for progress displays
    pub fn describe(&self) -> &'static str {
        match self {
            AnalysisPhase::Initializing => "Initializing analysis",
            AnalysisPhase::DownloadingVideo => "Downloading video",
            AnalysisPhase::DownloadComplete => "Video downloaded",
            AnalysisPhase::UploadingToS3 => "Uploading video to storage",
            AnalysisPhase::RunningGeminiAnalysis => "Running Gemini analysis",
            AnalysisPhase::RunningClarifaiAnalysis => "Running Clarifai analysis",
            AnalysisPhase::ProcessingWithAiModels => "Processing with AI models",
            AnalysisPhase::GeminiStarted => "Gemini analysis started",
            AnalysisPhase::ClarifaiStarted => "Clarifai analysis started",
            AnalysisPhase::GeminiComplete => "Gemini analysis complete",
            AnalysisPhase::ClarifaiAnalysisComplete => "Clarifai analysis complete",
            AnalysisPhase::GeneratingUnifiedAnalysis => "Generating unified analysis",
            AnalysisPhase::ValidatingAnalysis => "Validating analysis",
            AnalysisPhase::FinalizingResults => "Finalizing results",
            AnalysisPhase::Completed => "Analysis complete",
            AnalysisPhase::Error => "Analysis failed",
            AnalysisPhase::CaptchaError => "Video source requires CAPTCHA verification",
            AnalysisPhase::Unknown => "Processing",
        }
    }

    /// Check if the backend reported a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, AnalysisPhase::Error | AnalysisPhase::CaptchaError)
    }
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a remote analysis job as last reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: String,
    pub phase: AnalysisPhase,
    /// Progress percentage (0-100)
    pub progress: u8,
    pub step: Option<u32>,
    pub message: Option<String>,
    pub metadata: Option<JsonValue>,
    /// Id under which the finished report is stored, when it differs from `id`
    pub result_id: Option<String>,
}

impl AnalysisJob {
    /// Creates a freshly submitted job
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phase: AnalysisPhase::Initializing,
            progress: 0,
            step: None,
            message: None,
            metadata: None,
            result_id: None,
        }
    }

    /// Applies a progress report to this job
    ///
    /// Metadata and result id are only replaced when the report carries them,
    /// so values learned from earlier polls survive sparse later reports.
    pub fn apply(&mut self, report: ProgressResponse) {
        self.phase = report.status;
        self.progress = clamp_progress(report.progress);
        self.step = report.step;
        self.message = report.message;
        if report.metadata.is_some() {
            self.metadata = report.metadata;
        }
        if report.result_id.is_some() {
            self.result_id = report.result_id;
        }
    }

    /// Id to fetch the finished report with
    pub fn result_key(&self) -> &str {
        self.result_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.id)
    }

    /// Status line combining the backend message and the phase description
    pub fn status_line(&self) -> String {
        match &self.message {
            Some(message) if !message.trim().is_empty() => message.clone(),
            _ => self.phase.describe().to_string(),
        }
    }
}

fn clamp_progress(progress: f64) -> u8 {
    if progress.is_nan() {
        return 0;
    }
    progress.round().clamp(0.0, 100.0) as u8
}
