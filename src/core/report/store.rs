//! Report History Store
//!
//! Persists submitted reports as a single JSON collection.
//! Storage: `{data_dir}/fir_history.json`
//!
//! Each mutation is a full read-modify-write with an atomic rename.
//! There is no cross-process locking; the last writer wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::core::{CoreError, CoreResult};

use super::StoredReport;

// =============================================================================
// Constants
// =============================================================================

/// File name for the report history collection
pub const HISTORY_FILE_NAME: &str = "fir_history.json";

/// Application directory name under the platform data dir
pub const APP_DIR_NAME: &str = "firvision";

// =============================================================================
// Report Store Trait
// =============================================================================

/// Trait for report history backends
pub trait ReportStore: Send + Sync {
    /// Returns all reports, newest submission first
    fn list(&self) -> CoreResult<Vec<StoredReport>>;

    /// Appends a report to the history
    fn append(&self, report: StoredReport) -> CoreResult<()>;

    /// Removes a report by ID. Removing a missing ID is not an error.
    fn remove(&self, id: &str) -> CoreResult<()>;
}

// =============================================================================
// File Report Store
// =============================================================================

/// File-backed report history
pub struct FileReportStore {
    /// Directory holding the history file
    data_dir: PathBuf,
}

impl FileReportStore {
    /// Creates a store rooted at the given data directory
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Creates a store in the platform default data directory
    pub fn default_location() -> CoreResult<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| CoreError::Internal("Could not determine data directory".to_string()))?;
        Ok(Self::new(&base.join(APP_DIR_NAME)))
    }

    /// Returns the history file path
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE_NAME)
    }

    /// Ensures the data directory exists
    fn ensure_dir(&self) -> CoreResult<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir).map_err(|e| {
                CoreError::HistorySaveFailed(format!(
                    "Failed to create data directory {}: {}",
                    self.data_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Loads the full collection.
    ///
    /// A missing file is an empty history. A corrupt or unreadable file is
    /// treated the same, with a warning, so one bad write never bricks the
    /// application.
    fn load_all(&self) -> Vec<StoredReport> {
        let path = self.history_path();

        if !path.exists() {
            return Vec::new();
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Failed to read report history {}: {} (starting empty)",
                    path.display(),
                    e
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<StoredReport>>(&content) {
            Ok(reports) => reports,
            Err(e) => {
                warn!(
                    "Report history {} is corrupted: {} (starting empty)",
                    path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Saves the full collection (atomic write via temp file + rename)
    fn save_all(&self, reports: &[StoredReport]) -> CoreResult<()> {
        self.ensure_dir()?;

        let path = self.history_path();
        let temp_path = self
            .data_dir
            .join(format!(".{}.tmp.{}", HISTORY_FILE_NAME, std::process::id()));

        let content = serde_json::to_string_pretty(reports).map_err(|e| {
            CoreError::HistorySaveFailed(format!("Failed to serialize report history: {}", e))
        })?;

        fs::write(&temp_path, &content).map_err(|e| {
            CoreError::HistorySaveFailed(format!(
                "Failed to write temp history file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        fs::rename(&temp_path, &path).map_err(|e| {
            // Clean up temp file if rename fails
            let _ = fs::remove_file(&temp_path);
            CoreError::HistorySaveFailed(format!(
                "Failed to rename history file {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

impl ReportStore for FileReportStore {
    fn list(&self) -> CoreResult<Vec<StoredReport>> {
        let mut reports = self.load_all();
        sort_newest_first(&mut reports);
        Ok(reports)
    }

    fn append(&self, report: StoredReport) -> CoreResult<()> {
        let mut reports = self.load_all();
        reports.push(report);
        self.save_all(&reports)
    }

    fn remove(&self, id: &str) -> CoreResult<()> {
        let mut reports = self.load_all();
        let before = reports.len();
        reports.retain(|r| r.id != id);

        if reports.len() == before {
            // Idempotent: nothing to do, nothing to rewrite
            return Ok(());
        }

        self.save_all(&reports)
    }
}

/// Orders by submission time descending, then ID descending, so the
/// ordering is total and stable across rewrites
fn sort_newest_first(reports: &mut [StoredReport]) {
    reports.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

// =============================================================================
// Memory Report Store (for testing)
// =============================================================================

/// In-memory report history for tests
#[derive(Default)]
pub struct MemoryReportStore {
    reports: Mutex<Vec<StoredReport>>,
}

impl MemoryReportStore {
    /// Creates an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for MemoryReportStore {
    fn list(&self) -> CoreResult<Vec<StoredReport>> {
        let mut reports = self
            .reports
            .lock()
            .map_err(|_| CoreError::Internal("Report store lock poisoned".to_string()))?
            .clone();
        sort_newest_first(&mut reports);
        Ok(reports)
    }

    fn append(&self, report: StoredReport) -> CoreResult<()> {
        self.reports
            .lock()
            .map_err(|_| CoreError::Internal("Report store lock poisoned".to_string()))?
            .push(report);
        Ok(())
    }

    fn remove(&self, id: &str) -> CoreResult<()> {
        self.reports
            .lock()
            .map_err(|_| CoreError::Internal("Report store lock poisoned".to_string()))?
            .retain(|r| r.id != id);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
