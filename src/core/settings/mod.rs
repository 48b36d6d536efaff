//! Application Settings
//!
//! Persistent configuration: data directory, analysis model, and request
//! timeout. Stored as JSON next to the report history.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Constants
// =============================================================================

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "settings.json";

const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 600;

// =============================================================================
// App Settings
// =============================================================================

/// User-adjustable application settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Override for the data directory (reports, settings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Gemini model used for analysis
    #[serde(default = "default_model")]
    pub gemini_model: String,

    /// Analysis request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    crate::core::analysis::providers::GeminiProvider::DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            gemini_model: default_model(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppSettings {
    /// Clamps fields into their valid ranges
    pub fn normalize(&mut self) {
        self.request_timeout_secs = self
            .request_timeout_secs
            .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);

        if self.gemini_model.trim().is_empty() {
            self.gemini_model = default_model();
        }
    }
}

// =============================================================================
// Settings Manager
// =============================================================================

/// Loads and saves settings in a directory
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Creates a manager for the given directory
    pub fn new(dir: &Path) -> Self {
        Self {
            settings_path: dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Returns the settings file path
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Loads settings, falling back to defaults when the file is missing
    /// or corrupt
    pub fn load(&self) -> AppSettings {
        if !self.settings_path.exists() {
            return AppSettings::default();
        }

        let content = match fs::read_to_string(&self.settings_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Failed to read settings {}: {} (using defaults)",
                    self.settings_path.display(),
                    e
                );
                return AppSettings::default();
            }
        };

        match serde_json::from_str::<AppSettings>(&content) {
            Ok(mut settings) => {
                settings.normalize();
                settings
            }
            Err(e) => {
                warn!(
                    "Settings file {} is corrupted: {} (using defaults)",
                    self.settings_path.display(),
                    e
                );
                AppSettings::default()
            }
        }
    }

    /// Saves settings (atomic write via temp file + rename)
    pub fn save(&self, settings: &AppSettings) -> CoreResult<()> {
        if let Some(parent) = self.settings_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self
            .settings_path
            .with_extension(format!("json.tmp.{}", std::process::id()));

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| CoreError::Internal(format!("Failed to serialize settings: {}", e)))?;

        fs::write(&temp_path, &content)?;

        fs::rename(&temp_path, &self.settings_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            CoreError::Internal(format!(
                "Failed to rename settings file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Resets settings to defaults and persists them
    pub fn reset(&self) -> CoreResult<AppSettings> {
        let settings = AppSettings::default();
        self.save(&settings)?;
        Ok(settings)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_manager() -> (TempDir, SettingsManager) {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path());
        (temp_dir, manager)
    }

    #[test]
    fn test_load_missing_returns_defaults() {
        let (_temp_dir, manager) = create_test_manager();
        assert_eq!(manager.load(), AppSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let (_temp_dir, manager) = create_test_manager();

        let mut settings = AppSettings::default();
        settings.gemini_model = "gemini-2.5-pro".to_string();
        settings.request_timeout_secs = 60;
        manager.save(&settings).unwrap();

        let loaded = manager.load();
        assert_eq!(loaded.gemini_model, "gemini-2.5-pro");
        assert_eq!(loaded.request_timeout_secs, 60);
    }

    #[test]
    fn test_load_corrupt_returns_defaults() {
        let (_temp_dir, manager) = create_test_manager();
        fs::write(manager.settings_path(), "{broken").unwrap();

        assert_eq!(manager.load(), AppSettings::default());
    }

    #[test]
    fn test_load_partial_fills_defaults() {
        let (_temp_dir, manager) = create_test_manager();
        fs::write(manager.settings_path(), r#"{"requestTimeoutSecs": 30}"#).unwrap();

        let loaded = manager.load();
        assert_eq!(loaded.request_timeout_secs, 30);
        assert_eq!(loaded.gemini_model, AppSettings::default().gemini_model);
    }

    #[test]
    fn test_normalize_clamps_timeout() {
        let mut settings = AppSettings::default();
        settings.request_timeout_secs = 1;
        settings.normalize();
        assert_eq!(settings.request_timeout_secs, 5);

        settings.request_timeout_secs = 10_000;
        settings.normalize();
        assert_eq!(settings.request_timeout_secs, 600);
    }

    #[test]
    fn test_normalize_restores_empty_model() {
        let mut settings = AppSettings::default();
        settings.gemini_model = "  ".to_string();
        settings.normalize();
        assert_eq!(settings.gemini_model, AppSettings::default().gemini_model);
    }

    #[test]
    fn test_reset_persists_defaults() {
        let (_temp_dir, manager) = create_test_manager();

        let mut settings = AppSettings::default();
        settings.request_timeout_secs = 42;
        manager.save(&settings).unwrap();

        let reset = manager.reset().unwrap();
        assert_eq!(reset, AppSettings::default());
        assert_eq!(manager.load(), AppSettings::default());
    }
}
