//! FIRVision - AI-Assisted FIR Video Evidence Core
//!
//! Library core for a First Information Report application: citizens
//! submit video evidence, an AI provider analyzes it (event narrative,
//! suggested IPC sections, authenticity forensics), and the result seeds
//! an FIR draft that can be submitted to a local history and exported
//! as a PDF.
//!
//! The crate is GUI-independent: hosts drive the [`core::session`]
//! controller and render from its broadcast events.

pub mod core;

use std::path::Path;
use std::sync::OnceLock;

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes logging to stdout and a daily-rolling file in `log_dir`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(log_dir: &Path) {
    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, "firvision.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(cfg!(debug_assertions));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);

    // Avoid panics if already initialized (tests, embedding hosts).
    let _ = tracing::subscriber::set_global_default(subscriber);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::core::analysis::provider::MockAnalysisProvider;
    use crate::core::analysis::AnalysisClient;
    use crate::core::media::VideoAsset;
    use crate::core::report::{FileReportStore, PdfExporter, ReportStore};
    use crate::core::session::{SessionController, SessionPhase, View};

    const ANALYSIS_JSON: &str = r#"{
        "eventSummary": "Two men force open a parked car and drive away.",
        "detectedActivities": ["Breaking a car lock", "Driving away", "Theft"],
        "suggestedIPCSections": [
            {
                "section": "379",
                "title": "Punishment for theft",
                "description": "Theft of movable property.",
                "reasoning": "The vehicle is taken without consent."
            },
            {
                "section": "427",
                "title": "Mischief causing damage",
                "description": "Mischief causing loss or damage.",
                "reasoning": "The door lock is visibly broken."
            }
        ],
        "authenticityAnalysis": {
            "isAuthentic": true,
            "confidenceScore": 0.93,
            "summary": "No signs of tampering.",
            "findings": []
        }
    }"#;

    /// Full flow: select, analyze, fill the form, submit, export, delete.
    #[tokio::test]
    async fn test_end_to_end_report_flow() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(FileReportStore::new(temp_dir.path()));

        let provider = Arc::new(MockAnalysisProvider::new("mock").with_response(ANALYSIS_JSON));
        let mut controller =
            SessionController::new(AnalysisClient::new(provider), store.clone());

        let asset = VideoAsset::from_file("dashcam.mp4", "video/mp4", vec![0u8; 64]).unwrap();
        controller.select_video(asset).unwrap();
        controller.analyze().await.unwrap();
        assert_eq!(controller.phase(), SessionPhase::Results);

        {
            let draft = controller.draft_mut().unwrap();
            draft.complainant_name = "S. Iyer".to_string();
            draft.address = "44 Lake View Road, Pune".to_string();
            draft.place_of_occurrence = "Sector 12 parking lot".to_string();
            draft
                .add_section("411", "Receiving stolen property", "Dishonestly receiving stolen property.")
                .unwrap();
        }

        let stored = controller.submit().unwrap();
        assert_eq!(stored.report.ipc_sections.len(), 3);

        // History survives a reopen
        let reopened = FileReportStore::new(temp_dir.path());
        let reports = reopened.list().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report.complainant_name, "S. Iyer");

        // Export
        let pdf = PdfExporter::render(&reports[0]).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert!(PdfExporter::suggested_filename(&reports[0]).starts_with("FIR_S._Iyer_"));

        // History view and delete
        controller.show_history();
        assert_eq!(controller.view(), View::History);
        controller.delete_report(&stored.id).unwrap();
        assert!(controller.list_reports().unwrap().is_empty());
    }

    #[test]
    fn test_init_logging_idempotent() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        crate::init_logging(temp_dir.path());
        crate::init_logging(temp_dir.path());
    }
}
