use std::sync::Arc;

use crate::adapters::location::ReportedLocation;
use crate::application::{
    orchestrator::DetectionOrchestrator,
    services::{FeedbackSubmitter, NotificationDispatcher},
};

/// Shared state for the axum handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Owns the pipeline state for the dashboard's detection view.
    pub orchestrator: Arc<DetectionOrchestrator>,
    /// Sends the current result to a phone number.
    pub alerts: NotificationDispatcher,
    /// Forwards user corrections to the backend.
    pub feedback: FeedbackSubmitter,
    /// Where the browser reports its geolocation fix.
    pub location: Arc<ReportedLocation>,
}
