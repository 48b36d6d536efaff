//! FIRVision Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

use super::ReportId;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Media Errors
    // =========================================================================
    #[error("Unsupported media format: {0}")]
    UnsupportedMediaFormat(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Device access denied: {0}")]
    DeviceAccessDenied(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device error: {0}")]
    DeviceError(String),

    // =========================================================================
    // Analysis Errors
    // =========================================================================
    #[error("AI request failed: {0}")]
    AIRequestFailed(String),

    #[error("Analysis response malformed: {0}")]
    AnalysisResponseMalformed(String),

    // =========================================================================
    // Report Errors
    // =========================================================================
    #[error("Report not found: {0}")]
    ReportNotFound(ReportId),

    #[error("Report history corrupted: {0}")]
    HistoryCorrupted(String),

    #[error("Failed to save report history: {0}")]
    HistorySaveFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    #[error("Invalid session transition: {0}")]
    InvalidTransition(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Convert to a user-friendly error message for display layers
    pub fn to_display_error(&self) -> String {
        self.to_string()
    }
}
