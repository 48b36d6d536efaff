//! Analysis Client
//!
//! Drives a [`VideoAnalysisProvider`] with the fixed FIR instruction
//! prompt and parses the reply into an [`AnalysisResult`]. Retry policy
//! belongs to the caller; a single attempt either parses or fails.

use std::sync::Arc;

use crate::core::media::VideoAsset;
use crate::core::{CoreError, CoreResult};

use super::provider::VideoAnalysisProvider;
use super::AnalysisResult;

// =============================================================================
// Instruction Prompt
// =============================================================================

/// Fixed instruction sent with every analysis request
pub const ANALYSIS_PROMPT: &str = r#"You are an expert legal assistant and digital forensics analyst specializing in Indian law. Analyze the attached video and respond with a single, valid JSON object containing exactly these fields:

1. "eventSummary": a detailed, objective, chronological summary of the events depicted. Describe actions, people involved (e.g., "Person A"), and the sequence of events.
2. "detectedActivities": an array of strings naming potential criminal or suspicious activities observed (e.g., "Theft", "Assault", "Vandalism").
3. "suggestedIPCSections": an array of objects, each a relevant section of the Indian Penal Code, with:
   - "section": the section number (e.g., "379").
   - "title": the official title of the section.
   - "description": a brief explanation of the section.
   - "reasoning": a short sentence explaining why it might apply.
4. "authenticityAnalysis": an object assessing the video's authenticity, with:
   - "isAuthentic": boolean, true if the footage appears authentic, false if it shows signs of being AI-generated or manipulated.
   - "confidenceScore": a number between 0.0 and 1.0 for your confidence in the assessment.
   - "summary": a brief one-sentence summary of the assessment.
   - "findings": an array of objects serving as proofs, each with "observation" (a specific observation, e.g., "Unnatural shadow movement near Person A at 0:15") and "type" (your classification of the proof, e.g., "Shadow Inconsistency", "Pixel Artifact", "Compression Artifacts", "Consistent Lighting").

The output MUST be only a single JSON object and nothing else. Do not wrap it in markdown backticks."#;

// =============================================================================
// Analysis Client
// =============================================================================

/// Client for running FIR video analysis through a provider
pub struct AnalysisClient {
    provider: Arc<dyn VideoAnalysisProvider>,
}

impl AnalysisClient {
    /// Creates a client over the given provider
    pub fn new(provider: Arc<dyn VideoAnalysisProvider>) -> Self {
        Self { provider }
    }

    /// Returns the underlying provider name
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Analyzes a video and returns the structured result.
    ///
    /// The raw model text is fence-stripped, parsed strictly, and range
    /// validated. Any failure is an error; fields are never coerced or
    /// defaulted.
    pub async fn analyze(&self, asset: &VideoAsset) -> CoreResult<AnalysisResult> {
        let raw = self.provider.analyze(asset, ANALYSIS_PROMPT).await?;

        let result = parse_analysis_response(&raw)?;
        result.validate()?;

        tracing::info!(
            "Analysis complete: {} IPC sections, authentic={}",
            result.suggested_ipc_sections.len(),
            result.authenticity_analysis.is_authentic
        );

        Ok(result)
    }
}

// =============================================================================
// Response Parsing
// =============================================================================

/// Parses model text into an [`AnalysisResult`].
///
/// Tries direct JSON first, then strips a markdown code fence
/// (```json ... ``` or ``` ... ```) and retries.
pub fn parse_analysis_response(text: &str) -> CoreResult<AnalysisResult> {
    let trimmed = text.trim();

    if let Ok(result) = serde_json::from_str::<AnalysisResult>(trimmed) {
        return Ok(result);
    }

    let inner = if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        }
    } else if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        }
    } else {
        return Err(CoreError::AnalysisResponseMalformed(format!(
            "Response is not valid JSON: {}",
            truncate_for_error(trimmed)
        )));
    };

    serde_json::from_str::<AnalysisResult>(inner.trim()).map_err(|e| {
        CoreError::AnalysisResponseMalformed(format!("Failed to parse fenced JSON: {}", e))
    })
}

fn truncate_for_error(text: &str) -> String {
    const MAX: usize = 200;
    if text.len() <= MAX {
        text.to_string()
    } else {
        let mut end = MAX;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

// =============================================================================
// Tests
// =============================================================================
