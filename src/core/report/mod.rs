//! Report Module
//!
//! FIR draft and submitted-report models, the history store, and the
//! PDF exporter.

mod export;
mod store;

pub use export::*;
pub use store::*;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::core::analysis::{AnalysisResult, IpcSection};
use crate::core::{new_report_id, CoreError, CoreResult, ReportId};

// =============================================================================
// Constants
// =============================================================================

/// Reasoning recorded for IPC sections the user adds by hand
pub const MANUAL_SECTION_REASONING: &str = "Manually added by user.";

/// Format for the incident date/time field (local time, minute precision)
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

// =============================================================================
// Report Draft
// =============================================================================

/// An FIR being filled in by the complainant
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    /// Complainant's full name
    pub complainant_name: String,
    /// Complainant's address
    pub address: String,
    /// Where the incident took place
    pub place_of_occurrence: String,
    /// When the incident took place (`YYYY-MM-DDTHH:MM`, local)
    pub date_time: String,
    /// Narrative of the incident
    pub incident_details: String,
    /// Applicable IPC sections
    pub ipc_sections: Vec<IpcSection>,
}

impl ReportDraft {
    /// Seeds a draft from a completed analysis.
    ///
    /// The narrative and IPC sections come from the analysis; the incident
    /// date/time defaults to `now` truncated to the minute; everything else
    /// starts empty for the complainant to fill in.
    pub fn from_analysis(analysis: &AnalysisResult, now: DateTime<Local>) -> Self {
        Self {
            complainant_name: String::new(),
            address: String::new(),
            place_of_occurrence: String::new(),
            date_time: now.format(DATE_TIME_FORMAT).to_string(),
            incident_details: analysis.event_summary.clone(),
            ipc_sections: analysis.suggested_ipc_sections.clone(),
        }
    }

    /// Adds a manually-entered IPC section.
    ///
    /// Section number, title, and description are all required.
    pub fn add_section(&mut self, section: &str, title: &str, description: &str) -> CoreResult<()> {
        if section.trim().is_empty() || title.trim().is_empty() || description.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Section number, title, and description are all required.".to_string(),
            ));
        }

        self.ipc_sections.push(IpcSection {
            section: section.trim().to_string(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            reasoning: MANUAL_SECTION_REASONING.to_string(),
        });

        Ok(())
    }

    /// Removes an IPC section by index
    pub fn remove_section(&mut self, index: usize) -> CoreResult<()> {
        if index >= self.ipc_sections.len() {
            return Err(CoreError::ValidationError(format!(
                "No IPC section at index {}",
                index
            )));
        }
        self.ipc_sections.remove(index);
        Ok(())
    }
}

// =============================================================================
// Stored Report
// =============================================================================

/// A submitted FIR kept in the history store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    /// Unique report ID
    pub id: ReportId,
    /// Submission time, RFC 3339
    pub submitted_at: String,
    /// The submitted draft
    pub report: ReportDraft,
    /// The analysis that seeded the draft, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

impl StoredReport {
    /// Creates a stored report with a fresh ID, stamped now
    pub fn new(report: ReportDraft, analysis: Option<AnalysisResult>) -> Self {
        Self {
            id: new_report_id(),
            submitted_at: Utc::now().to_rfc3339(),
            report,
            analysis,
        }
    }

    /// Creates a stored report with an explicit timestamp (tests, imports)
    pub fn with_submitted_at(
        report: ReportDraft,
        analysis: Option<AnalysisResult>,
        submitted_at: &str,
    ) -> Self {
        Self {
            id: new_report_id(),
            submitted_at: submitted_at.to_string(),
            report,
            analysis,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
