//! Session Events
//!
//! Events broadcast by the session controller on every externally
//! visible change. Hosts subscribe via [`SessionController::subscribe`]
//! and mirror the state into their UI layer.
//!
//! [`SessionController::subscribe`]: super::SessionController::subscribe

use serde::Serialize;

use crate::core::ReportId;

use super::{SessionPhase, View};

/// Event name constants (stable identifiers for host event buses)
pub mod event_names {
    pub const PHASE_CHANGED: &str = "session:phase-changed";
    pub const VIEW_CHANGED: &str = "session:view-changed";
    pub const LOADING_MESSAGE: &str = "session:loading-message";
    pub const ERROR: &str = "session:error";
    pub const REPORT_SUBMITTED: &str = "session:report-submitted";
    pub const HISTORY_CHANGED: &str = "session:history-changed";
}

/// A change broadcast by the session controller
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// The session phase changed
    PhaseChanged { phase: SessionPhase },
    /// The active view changed
    ViewChanged { view: View },
    /// The analysis progress message advanced
    LoadingMessage { message: String },
    /// The error message was set or cleared
    Error { message: Option<String> },
    /// A report was appended to the history
    ReportSubmitted { id: ReportId },
    /// The history collection changed
    HistoryChanged,
}

impl SessionEvent {
    /// Returns the stable event name
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::PhaseChanged { .. } => event_names::PHASE_CHANGED,
            SessionEvent::ViewChanged { .. } => event_names::VIEW_CHANGED,
            SessionEvent::LoadingMessage { .. } => event_names::LOADING_MESSAGE,
            SessionEvent::Error { .. } => event_names::ERROR,
            SessionEvent::ReportSubmitted { .. } => event_names::REPORT_SUBMITTED,
            SessionEvent::HistoryChanged => event_names::HISTORY_CHANGED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let event = SessionEvent::PhaseChanged {
            phase: SessionPhase::Analyzing,
        };
        assert_eq!(event.name(), "session:phase-changed");

        assert_eq!(
            SessionEvent::HistoryChanged.name(),
            "session:history-changed"
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::LoadingMessage {
            message: "Working...".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "loadingMessage");
        assert_eq!(json["message"], "Working...");
    }
}
