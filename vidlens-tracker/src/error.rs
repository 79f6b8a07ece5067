//! Error types for the tracker

use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors surfaced to callers of the tracker
///
/// Network and backend failures during polling are not errors here: they are
/// folded into view state. Only problems the caller must act on are returned.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Submission rejected before anything was sent
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// The backend did not accept the submission
    #[error("Failed to start analysis: {0}")]
    SubmissionFailed(String),

    /// Configuration value is missing or out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
