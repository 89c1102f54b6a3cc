use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    application::ports::MessagingPort,
    domain::{
        detection::DetectionResult,
        environment::WeatherSnapshot,
        errors::DomainResult,
        notify::{Ack, AlertRequest, FeedbackRecord},
        pipeline::compose_alert_message,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Missing destination or result; nothing was sent.
    Skipped,
    Sent(Ack),
    /// The backend answered but refused the alert.
    Rejected(String),
}

/// Sends a summary of the current result to a phone number.
#[derive(Clone)]
pub struct NotificationDispatcher {
    messaging: Arc<dyn MessagingPort>,
}

impl NotificationDispatcher {
    pub fn new(messaging: Arc<dyn MessagingPort>) -> Self {
        Self { messaging }
    }

    pub async fn dispatch(
        &self,
        destination: &str,
        result: Option<&DetectionResult>,
        weather: Option<&WeatherSnapshot>,
    ) -> DomainResult<DispatchOutcome> {
        let destination = destination.trim();
        let Some(result) = result.filter(|_| !destination.is_empty()) else {
            return Ok(DispatchOutcome::Skipped);
        };

        let alert = AlertRequest {
            to_phone: destination.to_string(),
            message: compose_alert_message(result, weather),
        };
        let ack = self.messaging.send_alert(&alert).await?;
        if ack.is_rejection() {
            let reason = ack.message.unwrap_or_else(|| "alert rejected".to_string());
            warn!("Alert to {} rejected: {}", alert.to_phone, reason);
            return Ok(DispatchOutcome::Rejected(reason));
        }
        info!("Alert sent to {}", alert.to_phone);
        Ok(DispatchOutcome::Sent(ack))
    }
}

/// Records a user correction for the latest detection.
#[derive(Clone)]
pub struct FeedbackSubmitter {
    messaging: Arc<dyn MessagingPort>,
}

impl FeedbackSubmitter {
    pub fn new(messaging: Arc<dyn MessagingPort>) -> Self {
        Self { messaging }
    }

    /// An empty record is still sent and acknowledged.
    pub async fn submit(&self, record: FeedbackRecord) -> DomainResult<Ack> {
        let ack = self.messaging.submit_feedback(&record).await?;
        info!(
            "Feedback recorded (predicted: {}, corrected: {})",
            record.predicted_label.as_deref().unwrap_or("-"),
            record.correct_label.as_deref().unwrap_or("-")
        );
        Ok(ack)
    }
}
