//! Shared Type Definitions
//!
//! Identifier aliases and helpers used across the core modules.

/// Report identifier (UUID v4 string)
pub type ReportId = String;

/// Generates a new report ID
pub fn new_report_id() -> ReportId {
    uuid::Uuid::new_v4().to_string()
}
