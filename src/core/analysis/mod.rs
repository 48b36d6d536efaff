//! Video Analysis Module
//!
//! Types and client for AI-backed video analysis: event summary,
//! detected activities, suggested IPC sections, and an authenticity
//! forensics report.

mod client;
pub mod provider;
pub mod providers;

pub use client::*;

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Analysis Result Types
// =============================================================================

/// A suggested Indian Penal Code section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpcSection {
    /// Section number, e.g. "379"
    pub section: String,
    /// Section title, e.g. "Punishment for theft"
    pub title: String,
    /// What the section covers
    pub description: String,
    /// Why the model suggested this section
    pub reasoning: String,
}

/// A single proof observed while assessing authenticity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticityFinding {
    /// The specific observation, e.g. "Unnatural shadow movement at 0:15"
    pub observation: String,
    /// Classification of the proof, e.g. "Shadow Inconsistency"
    #[serde(rename = "type")]
    pub finding_type: String,
}

/// Forensic assessment of the footage's authenticity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticityReport {
    /// Whether the footage appears authentic (false = signs of manipulation)
    pub is_authentic: bool,
    /// Confidence in the assessment, 0.0 to 1.0
    pub confidence_score: f64,
    /// One-sentence summary of the assessment
    pub summary: String,
    /// Individual proofs backing the assessment
    pub findings: Vec<AuthenticityFinding>,
}

/// Full analysis of a video
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Narrative summary of the recorded events
    pub event_summary: String,
    /// Potential criminal or suspicious activities observed
    pub detected_activities: Vec<String>,
    /// Applicable IPC sections
    #[serde(rename = "suggestedIPCSections")]
    pub suggested_ipc_sections: Vec<IpcSection>,
    /// Authenticity forensics
    pub authenticity_analysis: AuthenticityReport,
}

impl AnalysisResult {
    /// Validates semantic constraints that the schema cannot express
    pub fn validate(&self) -> CoreResult<()> {
        let score = self.authenticity_analysis.confidence_score;
        if !(0.0..=1.0).contains(&score) {
            return Err(CoreError::AnalysisResponseMalformed(format!(
                "confidenceScore out of range [0, 1]: {}",
                score
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
