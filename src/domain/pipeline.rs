use serde::{Deserialize, Serialize};

use super::detection::DetectionResult;
use super::environment::{SatelliteSnapshot, WeatherSnapshot};
use super::image::ImageSummary;

/// Monotonic identifier of a run; responses tagged with an older id are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct RunId(pub u64);

impl RunId {
    pub fn next(self) -> Self {
        RunId(self.0 + 1)
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stage of a run that a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Detecting,
    Enriching,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    ImageSelected,
    Detecting,
    Enriching,
    Complete,
    Failed { stage: Stage, message: String },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::ImageSelected => "image selected",
            Phase::Detecting => "detecting",
            Phase::Enriching => "enriching",
            Phase::Complete => "complete",
            Phase::Failed { .. } => "failed",
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, Phase::Detecting | Phase::Enriching)
    }
}

/// The record the orchestrator owns and mutates. Nothing else writes to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub phase: Phase,
    pub result: Option<DetectionResult>,
    pub weather: Option<WeatherSnapshot>,
    pub satellite: Option<SatelliteSnapshot>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self { phase: Phase::Idle, result: None, weather: None, satellite: None }
    }
}

impl PipelineState {
    /// Drops every result and snapshot and moves to `phase`.
    pub fn reset(&mut self, phase: Phase) {
        *self = PipelineState { phase, ..PipelineState::default() };
    }

    pub fn processing(&self) -> bool {
        self.phase.is_processing()
    }
}

/// Serializable snapshot published to observers after every change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineView {
    pub run_id: RunId,
    pub phase: Phase,
    pub processing: bool,
    pub image: Option<ImageSummary>,
    pub result: Option<DetectionResult>,
    pub weather: Option<WeatherSnapshot>,
    pub satellite: Option<SatelliteSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsStateMessage {
    pub r#type: String,
    pub view: PipelineView,
}

/// Human-readable summary sent with an alert.
pub fn compose_alert_message(result: &DetectionResult, weather: Option<&WeatherSnapshot>) -> String {
    let head = format!("{} ({}).", result.pest_name, result.confidence_label());
    match weather.map(|w| w.advice.trim()).filter(|a| !a.is_empty()) {
        Some(advice) => format!("{head} {advice}"),
        None => head,
    }
}
