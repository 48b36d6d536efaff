//! Session Controller
//!
//! The state machine behind the application: which view is showing,
//! whether an analysis is in flight, and the data feeding the report
//! form. Hosts call the operations here and render from the broadcast
//! events; the controller never touches a UI.

mod events;

pub use events::*;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::core::analysis::{AnalysisClient, AnalysisResult};
use crate::core::media::VideoAsset;
use crate::core::report::{ReportDraft, ReportStore, StoredReport};
use crate::core::{CoreError, CoreResult};

// =============================================================================
// Constants
// =============================================================================

/// Shown when analysis is requested without a selected video
pub const NO_VIDEO_MESSAGE: &str = "Please select a video file first.";

/// Shown when analysis fails for any reason
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Failed to analyze video. Please check the console for details and try again.";

/// Progress messages cycled while analysis runs
pub const LOADING_MESSAGES: [&str; 6] = [
    "Initializing AI analysis...",
    "Detecting events and objects in video...",
    "Generating a chronological summary...",
    "Cross-referencing with Indian Penal Code sections...",
    "Running deepfake detection algorithms...",
    "Compiling final report...",
];

/// How often the progress message advances
pub const LOADING_MESSAGE_INTERVAL: Duration = Duration::from_secs(3);

// =============================================================================
// Session State
// =============================================================================

/// What the session is doing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    /// Waiting for input
    Idle,
    /// Analysis in flight
    Analyzing,
    /// Analysis complete, report form active
    Results,
}

/// Which screen the host should show
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    /// Capture / analysis / report screen
    Main,
    /// Submitted report history
    History,
}

// =============================================================================
// Progress Ticker
// =============================================================================

/// Cycles the loading message while analysis runs.
///
/// Dropping the ticker aborts its task, so the message stream stops on
/// every exit from the Analyzing phase.
struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    fn start(
        events: broadcast::Sender<SessionEvent>,
        message: Arc<Mutex<Option<String>>>,
    ) -> Self {
        // First message shows synchronously, before the task is scheduled
        let first = LOADING_MESSAGES[0].to_string();
        if let Ok(mut lock) = message.lock() {
            *lock = Some(first.clone());
        }
        let _ = events.send(SessionEvent::LoadingMessage { message: first });

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(LOADING_MESSAGE_INTERVAL);
            // The first tick completes immediately; index 0 is already shown
            interval.tick().await;

            let mut index = 1usize;
            loop {
                interval.tick().await;
                let text = LOADING_MESSAGES[index % LOADING_MESSAGES.len()].to_string();
                if let Ok(mut lock) = message.lock() {
                    *lock = Some(text.clone());
                }
                let _ = events.send(SessionEvent::LoadingMessage { message: text });
                index += 1;
            }
        });

        Self { handle }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Session Controller
// =============================================================================

/// Owns session state and coordinates analysis, drafting, and history
pub struct SessionController {
    phase: SessionPhase,
    view: View,
    pending_asset: Option<VideoAsset>,
    analyzed_asset: Option<VideoAsset>,
    result: Option<AnalysisResult>,
    draft: Option<ReportDraft>,
    error: Option<String>,
    loading_message: Arc<Mutex<Option<String>>>,
    ticker: Option<ProgressTicker>,
    client: AnalysisClient,
    store: Arc<dyn ReportStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    /// Creates a controller in the Idle phase, Main view
    pub fn new(client: AnalysisClient, store: Arc<dyn ReportStore>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            phase: SessionPhase::Idle,
            view: View::Main,
            pending_asset: None,
            analyzed_asset: None,
            result: None,
            draft: None,
            error: None,
            loading_message: Arc::new(Mutex::new(None)),
            ticker: None,
            client,
            store,
            events,
        }
    }

    /// Subscribes to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn pending_asset(&self) -> Option<&VideoAsset> {
        self.pending_asset.as_ref()
    }

    pub fn analyzed_asset(&self) -> Option<&VideoAsset> {
        self.analyzed_asset.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn draft(&self) -> Option<&ReportDraft> {
        self.draft.as_ref()
    }

    /// Mutable access to the draft for form editing
    pub fn draft_mut(&mut self) -> Option<&mut ReportDraft> {
        self.draft.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current progress message, when analysis is running
    pub fn loading_message(&self) -> Option<String> {
        self.loading_message.lock().ok().and_then(|m| m.clone())
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Stages a video for analysis. Clears any previous error and result.
    pub fn select_video(&mut self, asset: VideoAsset) -> CoreResult<()> {
        if self.phase != SessionPhase::Idle {
            return Err(CoreError::InvalidTransition(format!(
                "Cannot select a video while {:?}",
                self.phase
            )));
        }

        tracing::info!("Video selected: {} ({} bytes)", asset.name, asset.size);
        self.set_error(None);
        self.result = None;
        self.pending_asset = Some(asset);
        Ok(())
    }

    /// Runs analysis on the pending video.
    ///
    /// With no pending video, sets the validation error and stays Idle.
    /// On success the draft is seeded and the phase becomes Results. On
    /// failure the pending video is cleared, the failure error is set, and
    /// the phase returns to Idle. The progress ticker stops on every exit.
    pub async fn analyze(&mut self) -> CoreResult<()> {
        if self.phase != SessionPhase::Idle {
            return Err(CoreError::InvalidTransition(format!(
                "Cannot start analysis while {:?}",
                self.phase
            )));
        }

        let Some(asset) = self.pending_asset.take() else {
            self.set_error(Some(NO_VIDEO_MESSAGE.to_string()));
            return Ok(());
        };

        self.set_error(None);
        self.result = None;
        self.set_phase(SessionPhase::Analyzing);
        self.ticker = Some(ProgressTicker::start(
            self.events.clone(),
            self.loading_message.clone(),
        ));

        let outcome = self.client.analyze(&asset).await;
        self.stop_ticker();

        match outcome {
            Ok(result) => {
                self.draft = Some(ReportDraft::from_analysis(&result, Local::now()));
                self.result = Some(result);
                self.analyzed_asset = Some(asset);
                self.set_phase(SessionPhase::Results);
            }
            Err(e) => {
                tracing::error!("Video analysis failed: {}", e);
                self.set_error(Some(ANALYSIS_FAILED_MESSAGE.to_string()));
                self.set_phase(SessionPhase::Idle);
            }
        }

        Ok(())
    }

    /// Submits the draft to the history, then resets to Idle
    pub fn submit(&mut self) -> CoreResult<StoredReport> {
        if self.phase != SessionPhase::Results {
            return Err(CoreError::InvalidTransition(format!(
                "Cannot submit while {:?}",
                self.phase
            )));
        }

        let draft = self
            .draft
            .clone()
            .ok_or_else(|| CoreError::InvalidTransition("No draft to submit".to_string()))?;

        let stored = StoredReport::new(draft, self.result.clone());
        self.store.append(stored.clone())?;

        tracing::info!("Report submitted: {}", stored.id);
        self.emit(SessionEvent::ReportSubmitted {
            id: stored.id.clone(),
        });
        self.emit(SessionEvent::HistoryChanged);

        self.reset();
        Ok(stored)
    }

    /// Clears all transient state and returns to Idle
    pub fn reset(&mut self) {
        self.stop_ticker();
        self.pending_asset = None;
        self.analyzed_asset = None;
        self.result = None;
        self.draft = None;
        if self.error.is_some() {
            self.set_error(None);
        }
        if self.phase != SessionPhase::Idle {
            self.set_phase(SessionPhase::Idle);
        }
    }

    /// Switches to the history view. Allowed from any phase; performs a
    /// full reset first so nothing stale survives the switch.
    pub fn show_history(&mut self) {
        self.reset();
        if self.view != View::History {
            self.view = View::History;
            self.emit(SessionEvent::ViewChanged { view: self.view });
        }
    }

    /// Switches back to the main view
    pub fn show_main(&mut self) {
        if self.view != View::Main {
            self.view = View::Main;
            self.emit(SessionEvent::ViewChanged { view: self.view });
        }
    }

    /// Lists submitted reports, newest first
    pub fn list_reports(&self) -> CoreResult<Vec<StoredReport>> {
        self.store.list()
    }

    /// Deletes a report from the history
    pub fn delete_report(&mut self, id: &str) -> CoreResult<()> {
        self.store.remove(id)?;
        self.emit(SessionEvent::HistoryChanged);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.emit(SessionEvent::PhaseChanged { phase });
    }

    fn set_error(&mut self, message: Option<String>) {
        self.error = message.clone();
        self.emit(SessionEvent::Error { message });
    }

    fn stop_ticker(&mut self) {
        self.ticker = None;
        if let Ok(mut lock) = self.loading_message.lock() {
            *lock = None;
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::provider::{MockAnalysisProvider, VideoAnalysisProvider};
    use crate::core::report::MemoryReportStore;
    use async_trait::async_trait;

    const VALID_JSON: &str = r#"{
        "eventSummary": "A bag is snatched near the bus stop.",
        "detectedActivities": ["Snatching", "Running"],
        "suggestedIPCSections": [
            {
                "section": "356",
                "title": "Assault in attempt to commit theft",
                "description": "Assault or criminal force in attempting theft.",
                "reasoning": "Force is used while grabbing the bag."
            }
        ],
        "authenticityAnalysis": {
            "isAuthentic": true,
            "confidenceScore": 0.95,
            "summary": "Footage appears authentic.",
            "findings": []
        }
    }"#;

    /// Provider that waits before answering, for ticker timing tests
    struct SlowProvider {
        response: String,
        delay: Duration,
    }

    #[async_trait]
    impl VideoAnalysisProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn analyze(&self, _asset: &VideoAsset, _prompt: &str) -> CoreResult<String> {
            tokio::time::sleep(self.delay).await;
            Ok(self.response.clone())
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn controller_with(provider: Arc<dyn VideoAnalysisProvider>) -> SessionController {
        SessionController::new(
            AnalysisClient::new(provider),
            Arc::new(MemoryReportStore::new()),
        )
    }

    fn ok_controller() -> SessionController {
        controller_with(Arc::new(
            MockAnalysisProvider::new("mock").with_response(VALID_JSON),
        ))
    }

    fn failing_controller() -> SessionController {
        controller_with(Arc::new(MockAnalysisProvider::new("mock").with_failure()))
    }

    fn test_asset() -> VideoAsset {
        VideoAsset::from_file("clip.mp4", "video/mp4", vec![0u8; 32]).unwrap()
    }

    fn drain_loading_messages(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<String> {
        let mut messages = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::LoadingMessage { message } = event {
                messages.push(message);
            }
        }
        messages
    }

    // -------------------------------------------------------------------------
    // Initial State
    // -------------------------------------------------------------------------

    #[test]
    fn test_initial_state() {
        let controller = ok_controller();

        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert_eq!(controller.view(), View::Main);
        assert!(controller.pending_asset().is_none());
        assert!(controller.result().is_none());
        assert!(controller.draft().is_none());
        assert!(controller.error().is_none());
        assert!(controller.loading_message().is_none());
    }

    // -------------------------------------------------------------------------
    // Video Selection
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_select_video_clears_error() {
        let mut controller = ok_controller();

        // Trip the validation error first
        controller.analyze().await.unwrap();
        assert_eq!(controller.error(), Some(NO_VIDEO_MESSAGE));

        controller.select_video(test_asset()).unwrap();
        assert!(controller.error().is_none());
        assert!(controller.pending_asset().is_some());
    }

    #[tokio::test]
    async fn test_select_video_rejected_in_results() {
        let mut controller = ok_controller();
        controller.select_video(test_asset()).unwrap();
        controller.analyze().await.unwrap();
        assert_eq!(controller.phase(), SessionPhase::Results);

        assert!(controller.select_video(test_asset()).is_err());
    }

    // -------------------------------------------------------------------------
    // Analysis
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_analyze_without_video_sets_error() {
        let mut controller = ok_controller();

        controller.analyze().await.unwrap();

        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert_eq!(controller.error(), Some(NO_VIDEO_MESSAGE));
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let mut controller = ok_controller();
        controller.select_video(test_asset()).unwrap();

        controller.analyze().await.unwrap();

        assert_eq!(controller.phase(), SessionPhase::Results);
        assert!(controller.pending_asset().is_none());
        assert!(controller.analyzed_asset().is_some());
        assert!(controller.result().is_some());
        assert!(controller.loading_message().is_none());

        let draft = controller.draft().unwrap();
        assert_eq!(
            draft.incident_details,
            "A bag is snatched near the bus stop."
        );
        assert_eq!(draft.ipc_sections.len(), 1);
        assert_eq!(draft.ipc_sections[0].section, "356");
        assert!(draft.complainant_name.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_failure() {
        let mut controller = failing_controller();
        controller.select_video(test_asset()).unwrap();

        controller.analyze().await.unwrap();

        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert_eq!(controller.error(), Some(ANALYSIS_FAILED_MESSAGE));
        assert!(controller.pending_asset().is_none());
        assert!(controller.analyzed_asset().is_none());
        assert!(controller.result().is_none());
        assert!(controller.draft().is_none());
        assert!(controller.loading_message().is_none());
    }

    #[tokio::test]
    async fn test_analyze_malformed_response_is_failure() {
        let mut controller = controller_with(Arc::new(
            MockAnalysisProvider::new("mock").with_response("not json at all"),
        ));
        controller.select_video(test_asset()).unwrap();

        controller.analyze().await.unwrap();

        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert_eq!(controller.error(), Some(ANALYSIS_FAILED_MESSAGE));
    }

    // -------------------------------------------------------------------------
    // Progress Ticker
    // -------------------------------------------------------------------------

    #[test]
    fn test_loading_message_texts() {
        assert_eq!(
            LOADING_MESSAGES,
            [
                "Initializing AI analysis...",
                "Detecting events and objects in video...",
                "Generating a chronological summary...",
                "Cross-referencing with Indian Penal Code sections...",
                "Running deepfake detection algorithms...",
                "Compiling final report...",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_messages_cycle() {
        let mut controller = controller_with(Arc::new(SlowProvider {
            response: VALID_JSON.to_string(),
            delay: Duration::from_secs(20),
        }));
        let mut rx = controller.subscribe();

        controller.select_video(test_asset()).unwrap();
        controller.analyze().await.unwrap();

        let messages = drain_loading_messages(&mut rx);

        // 20 seconds at a 3-second cadence: first message plus six ticks
        assert_eq!(messages[0], LOADING_MESSAGES[0]);
        assert!(messages.len() >= 7);
        assert_eq!(messages[1], LOADING_MESSAGES[1]);
        assert_eq!(messages[5], LOADING_MESSAGES[5]);
        // Seventh message wraps back to the start
        assert_eq!(messages[6], LOADING_MESSAGES[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_after_analysis() {
        let mut controller = controller_with(Arc::new(SlowProvider {
            response: VALID_JSON.to_string(),
            delay: Duration::from_secs(5),
        }));
        let mut rx = controller.subscribe();

        controller.select_video(test_asset()).unwrap();
        controller.analyze().await.unwrap();

        let before = drain_loading_messages(&mut rx).len();

        // Let time pass; a live ticker would keep emitting
        tokio::time::sleep(Duration::from_secs(30)).await;
        let after = drain_loading_messages(&mut rx).len();

        assert_eq!(after, 0, "ticker kept running after analysis ({})", before);
        assert!(controller.loading_message().is_none());
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_submit_appends_and_resets() {
        let mut controller = ok_controller();
        controller.select_video(test_asset()).unwrap();
        controller.analyze().await.unwrap();

        controller.draft_mut().unwrap().complainant_name = "R. Mehta".to_string();
        let stored = controller.submit().unwrap();

        assert_eq!(stored.report.complainant_name, "R. Mehta");
        assert!(stored.analysis.is_some());

        // Controller reset
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert!(controller.draft().is_none());
        assert!(controller.analyzed_asset().is_none());

        // Stored in history
        let reports = controller.list_reports().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, stored.id);
    }

    #[test]
    fn test_submit_only_in_results() {
        let mut controller = ok_controller();
        assert!(controller.submit().is_err());
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    #[test]
    fn test_show_history_resets_state() {
        let mut controller = ok_controller();
        controller.select_video(test_asset()).unwrap();

        controller.show_history();

        assert_eq!(controller.view(), View::History);
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert!(controller.pending_asset().is_none());
    }

    #[tokio::test]
    async fn test_show_history_from_results_discards_session() {
        let mut controller = ok_controller();
        controller.select_video(test_asset()).unwrap();
        controller.analyze().await.unwrap();
        assert_eq!(controller.phase(), SessionPhase::Results);

        controller.show_history();

        assert_eq!(controller.view(), View::History);
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert!(controller.result().is_none());
        assert!(controller.draft().is_none());
    }

    #[test]
    fn test_show_main_returns() {
        let mut controller = ok_controller();
        controller.show_history();
        controller.show_main();
        assert_eq!(controller.view(), View::Main);
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_report() {
        let mut controller = ok_controller();
        controller.select_video(test_asset()).unwrap();
        controller.analyze().await.unwrap();
        let stored = controller.submit().unwrap();

        controller.delete_report(&stored.id).unwrap();
        assert!(controller.list_reports().unwrap().is_empty());

        // Idempotent
        controller.delete_report(&stored.id).unwrap();
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_events_on_analysis() {
        let mut controller = ok_controller();
        let mut rx = controller.subscribe();

        controller.select_video(test_asset()).unwrap();
        controller.analyze().await.unwrap();

        let mut phases = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::PhaseChanged { phase } = event {
                phases.push(phase);
            }
        }

        assert_eq!(phases, vec![SessionPhase::Analyzing, SessionPhase::Results]);
    }

    #[tokio::test]
    async fn test_events_on_submit() {
        let mut controller = ok_controller();
        controller.select_video(test_asset()).unwrap();
        controller.analyze().await.unwrap();

        let mut rx = controller.subscribe();
        let stored = controller.submit().unwrap();

        let mut saw_submitted = false;
        let mut saw_history = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                SessionEvent::ReportSubmitted { id } => {
                    assert_eq!(id, stored.id);
                    saw_submitted = true;
                }
                SessionEvent::HistoryChanged => saw_history = true,
                _ => {}
            }
        }

        assert!(saw_submitted);
        assert!(saw_history);
    }
}
