use serde::{Deserialize, Serialize};

use crate::domain::{
    environment::Coordinates,
    errors::{DomainError, DomainResult},
    pipeline::{PipelineView, RunId},
};

/// Body shared by `POST /weather` and `POST /satellite`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CoordinatesPayload {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinates> for CoordinatesPayload {
    fn from(c: Coordinates) -> Self {
        Self { latitude: c.latitude, longitude: c.longitude }
    }
}

impl TryFrom<CoordinatesPayload> for Coordinates {
    type Error = DomainError;

    fn try_from(p: CoordinatesPayload) -> DomainResult<Self> {
        Coordinates::new(p.latitude, p.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendAlertRequest {
    pub to_phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitFeedbackRequest {
    #[serde(default)]
    pub correct_label: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectAccepted {
    pub run_id: RunId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    pub state: PipelineView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeResponse {
    pub ok: bool,
    pub notice: String,
}

impl NoticeResponse {
    pub fn ok(notice: impl Into<String>) -> Self {
        Self { ok: true, notice: notice.into() }
    }

    pub fn failed(notice: impl Into<String>) -> Self {
        Self { ok: false, notice: notice.into() }
    }
}
