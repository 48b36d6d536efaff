//! Analysis Provider Module
//!
//! Defines the trait for video analysis providers.

use async_trait::async_trait;

use crate::core::media::VideoAsset;
use crate::core::{CoreError, CoreResult};

// =============================================================================
// Video Analysis Provider Trait
// =============================================================================

/// Trait for video analysis backends (Gemini, local models, etc.)
#[async_trait]
pub trait VideoAnalysisProvider: Send + Sync {
    /// Returns the provider name
    fn name(&self) -> &str;

    /// Analyzes a video against an instruction prompt.
    ///
    /// Returns the raw model text; parsing and validation belong to the
    /// caller.
    async fn analyze(&self, asset: &VideoAsset, prompt: &str) -> CoreResult<String>;

    /// Checks if the provider is available
    fn is_available(&self) -> bool;
}

// =============================================================================
// Mock Provider (for testing)
// =============================================================================

/// Mock analysis provider for testing
pub struct MockAnalysisProvider {
    name: String,
    response: String,
    available: bool,
    fail: bool,
}

impl MockAnalysisProvider {
    /// Creates a new mock provider
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            response: "{}".to_string(),
            available: true,
            fail: false,
        }
    }

    /// Sets the mock response text
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Sets availability
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Makes every `analyze` call fail
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl VideoAnalysisProvider for MockAnalysisProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(&self, _asset: &VideoAsset, _prompt: &str) -> CoreResult<String> {
        if !self.available {
            return Err(CoreError::Internal("Provider not available".to_string()));
        }
        if self.fail {
            return Err(CoreError::AIRequestFailed("Mock failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

// =============================================================================
// Tests
// =============================================================================
