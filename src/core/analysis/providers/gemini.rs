//! Google Gemini Provider Implementation
//!
//! Implements the VideoAnalysisProvider trait for Google's Gemini models.
//! Video is sent inline (base64) alongside the instruction prompt, with
//! a JSON response MIME type requested.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::ProviderConfig;
use crate::core::analysis::provider::VideoAnalysisProvider;
use crate::core::media::VideoAsset;
use crate::core::{CoreError, CoreResult};

// =============================================================================
// Gemini Provider
// =============================================================================

/// Google Gemini API provider
pub struct GeminiProvider {
    /// API key
    api_key: String,
    /// Base URL for API requests
    #[allow(dead_code)]
    base_url: String,
    /// Model used for analysis
    #[allow(dead_code)]
    model: String,
    /// Request timeout in seconds
    #[allow(dead_code)]
    timeout_secs: u64,
    /// HTTP client
    #[cfg(feature = "ai-providers")]
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Default Gemini API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default model for video analysis
    pub const DEFAULT_MODEL: &'static str = "gemini-3-flash-preview";

    /// Creates a new Gemini provider
    pub fn new(config: ProviderConfig) -> CoreResult<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| CoreError::ValidationError("Gemini API key is required".to_string()))?;

        if api_key.is_empty() {
            return Err(CoreError::ValidationError(
                "Gemini API key cannot be empty".to_string(),
            ));
        }

        let base_url = config
            .base_url
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());

        let model = config.model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string());
        let timeout_secs = config.timeout_secs.unwrap_or(300); // Video uploads are slow

        #[cfg(feature = "ai-providers")]
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout_secs,
            #[cfg(feature = "ai-providers")]
            client,
        })
    }

    #[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
    fn build_generate_content_request(
        &self,
        asset: &VideoAsset,
        prompt: &str,
    ) -> CoreResult<GenerateContentRequest> {
        if asset.data.is_empty() {
            return Err(CoreError::ValidationError(
                "Video payload is empty".to_string(),
            ));
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(&asset.data);

        Ok(GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: asset.mime_type.clone(),
                            data: encoded,
                        }),
                    },
                    Part {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
            }),
        })
    }
}

// =============================================================================
// Gemini API Types
// =============================================================================

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[allow(dead_code)]
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    status: Option<String>,
}

// =============================================================================
// VideoAnalysisProvider Implementation
// =============================================================================

#[async_trait]
impl VideoAnalysisProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[cfg(feature = "ai-providers")]
    async fn analyze(&self, asset: &VideoAsset, prompt: &str) -> CoreResult<String> {
        let api_request = self.build_generate_content_request(asset, prompt)?;

        // Build URL (API key is passed via header to avoid leaking it in logs).
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        tracing::debug!(
            "Sending analysis request: {} ({} bytes, {})",
            asset.name,
            asset.size,
            asset.mime_type
        );

        // Send request
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| CoreError::AIRequestFailed(format!("Request failed: {}", e)))?;

        // Handle response
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::AIRequestFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let error: ApiError = serde_json::from_str(&body).unwrap_or(ApiError {
                error: ApiErrorDetail {
                    message: body.clone(),
                    code: None,
                    status: None,
                },
            });
            let status_str = error.error.status.as_deref().unwrap_or("unknown");
            return Err(CoreError::AIRequestFailed(format!(
                "Gemini API error ({}; status={}): {}",
                status, status_str, error.error.message
            )));
        }

        let api_response: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| CoreError::AIRequestFailed(format!("Failed to parse response: {}", e)))?;

        // Check for blocked content
        if let Some(feedback) = &api_response.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Err(CoreError::AIRequestFailed(format!(
                    "Content blocked by Gemini safety filters: {}",
                    reason
                )));
            }
        }

        let candidates = api_response.candidates.ok_or_else(|| {
            CoreError::AIRequestFailed("No candidates returned from Gemini".to_string())
        })?;

        let candidate = candidates.first().ok_or_else(|| {
            CoreError::AIRequestFailed("Empty candidates array from Gemini".to_string())
        })?;

        let text = candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.clone())
            .unwrap_or_default();

        Ok(text)
    }

    #[cfg(not(feature = "ai-providers"))]
    async fn analyze(&self, _asset: &VideoAsset, _prompt: &str) -> CoreResult<String> {
        Err(CoreError::NotSupported(
            "AI providers feature not enabled. Build with --features ai-providers".to_string(),
        ))
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
