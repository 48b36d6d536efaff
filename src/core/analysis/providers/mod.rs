//! Analysis Provider Implementations
//!
//! Concrete backends for the [`VideoAnalysisProvider`] trait.

pub mod gemini;

pub use gemini::GeminiProvider;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::analysis::provider::VideoAnalysisProvider;
use crate::core::{CoreError, CoreResult};

/// Environment variable consulted when no API key is configured
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for creating a provider
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// API key (falls back to the environment when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    /// Creates a Gemini configuration with an explicit API key
    pub fn gemini(api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            base_url: None,
            model: None,
            timeout_secs: None,
        }
    }

    /// Creates a configuration from the environment.
    ///
    /// Reads `GEMINI_API_KEY`; a missing or empty variable is a
    /// `ValidationError` so misconfiguration surfaces at startup.
    pub fn from_env() -> CoreResult<Self> {
        let api_key = std::env::var(GEMINI_API_KEY_ENV).map_err(|_| {
            CoreError::ValidationError(format!("{} is not set", GEMINI_API_KEY_ENV))
        })?;

        if api_key.is_empty() {
            return Err(CoreError::ValidationError(format!(
                "{} is empty",
                GEMINI_API_KEY_ENV
            )));
        }

        Ok(Self {
            api_key: Some(api_key),
            base_url: None,
            model: None,
            timeout_secs: None,
        })
    }

    /// Sets the model
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Sets the base URL
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    /// Sets the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}

/// Creates the default provider from a configuration
pub fn create_provider(config: ProviderConfig) -> CoreResult<Arc<dyn VideoAnalysisProvider>> {
    Ok(Arc::new(GeminiProvider::new(config)?))
}

// =============================================================================
// Tests
// =============================================================================
