//! In-memory port implementations for unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::application::ports::*;
use crate::domain::{
    detection::{DetectionResult, Severity},
    environment::{Coordinates, SatelliteSnapshot, WeatherSnapshot},
    errors::{DomainError, DomainResult, Operation},
    image::ImageAsset,
    notify::{Ack, AlertRequest, FeedbackRecord},
};

pub fn jpeg(name: &str) -> ImageAsset {
    ImageAsset::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00])
}

pub fn aphid() -> DetectionResult {
    aphid_with_confidence(92.3)
}

pub fn aphid_with_confidence(confidence: f64) -> DetectionResult {
    DetectionResult {
        pest_name: "Aphis craccivora".into(),
        confidence,
        description: "Small insects on leaves and stems causing leaf curling.".into(),
        severity: Severity::Medium,
        recommendations: vec!["Use insecticidal soap solution".into(), "Apply reflective mulch".into()],
    }
}

pub fn thrips() -> DetectionResult {
    DetectionResult {
        pest_name: "Thrips palmi".into(),
        confidence: 88.9,
        description: "Tiny insects causing silver-white streaks.".into(),
        severity: Severity::High,
        recommendations: vec!["Use blue sticky traps".into()],
    }
}

#[derive(Default)]
pub struct CountingPreviews {
    next: AtomicU64,
    live: Mutex<HashSet<u64>>,
    released: AtomicUsize,
}

impl CountingPreviews {
    pub fn created(&self) -> usize {
        self.next.load(Ordering::SeqCst) as usize
    }
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
    pub fn live(&self) -> usize {
        self.live.lock().len()
    }
}

impl PreviewPort for CountingPreviews {
    fn create(&self, _image: &ImageAsset) -> PreviewHandle {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        self.live.lock().insert(id);
        PreviewHandle(id)
    }

    fn render(&self, handle: &PreviewHandle) -> Option<String> {
        self.live.lock().contains(&handle.0).then(|| format!("preview:{}", handle.0))
    }

    fn release(&self, handle: PreviewHandle) {
        assert!(self.live.lock().remove(&handle.0), "preview {} released twice", handle.0);
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Previews whose `create` parks on a barrier twice: once on entry, once before returning.
pub struct BarrierPreviews {
    pub inner: CountingPreviews,
    pub barrier: std::sync::Barrier,
}

impl BarrierPreviews {
    pub fn new() -> Self {
        Self { inner: CountingPreviews::default(), barrier: std::sync::Barrier::new(2) }
    }
}

impl PreviewPort for BarrierPreviews {
    fn create(&self, image: &ImageAsset) -> PreviewHandle {
        self.barrier.wait();
        self.barrier.wait();
        self.inner.create(image)
    }

    fn render(&self, handle: &PreviewHandle) -> Option<String> {
        self.inner.render(handle)
    }

    fn release(&self, handle: PreviewHandle) {
        self.inner.release(handle)
    }
}

/// `None` behaves like a platform without location support.
pub struct FixedLocation(pub Option<Coordinates>);

#[async_trait]
impl LocationPort for FixedLocation {
    async fn locate(&self) -> DomainResult<Coordinates> {
        self.0.ok_or_else(|| DomainError::GeolocationUnavailable("no location capability".into()))
    }
}

/// A platform that never calls back.
pub struct NeverLocation;

#[async_trait]
impl LocationPort for NeverLocation {
    async fn locate(&self) -> DomainResult<Coordinates> {
        std::future::pending().await
    }
}

pub enum InferenceScript {
    Always(DetectionResult),
    ByName,
    Fail,
}

pub struct FakeInference {
    script: InferenceScript,
    calls: AtomicUsize,
}

impl Default for FakeInference {
    fn default() -> Self {
        Self::returning(aphid())
    }
}

impl FakeInference {
    pub fn returning(result: DetectionResult) -> Self {
        Self { script: InferenceScript::Always(result), calls: AtomicUsize::new(0) }
    }
    /// `leaf2*` yields thrips, anything else aphids.
    pub fn by_name() -> Self {
        Self { script: InferenceScript::ByName, calls: AtomicUsize::new(0) }
    }
    pub fn failing() -> Self {
        Self { script: InferenceScript::Fail, calls: AtomicUsize::new(0) }
    }
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferencePort for FakeInference {
    async fn classify(&self, image: &ImageAsset) -> DomainResult<DetectionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            InferenceScript::Always(r) => Ok(r.clone()),
            InferenceScript::ByName if image.name.starts_with("leaf2") => Ok(thrips()),
            InferenceScript::ByName => Ok(aphid()),
            InferenceScript::Fail => Err(DomainError::request(Operation::Detect, "HTTP 500")),
        }
    }
}

pub struct FakeEnvironment {
    fail_weather: bool,
    fail_satellite: bool,
    gate: Option<Semaphore>,
    calls: Mutex<Vec<(&'static str, Coordinates)>>,
}

impl FakeEnvironment {
    pub fn healthy() -> Self {
        Self { fail_weather: false, fail_satellite: false, gate: None, calls: Mutex::new(Vec::new()) }
    }
    /// Weather calls block until `open_gate` hands out permits.
    pub fn gated() -> Self {
        Self { gate: Some(Semaphore::new(0)), ..Self::healthy() }
    }
    pub fn failing_weather(mut self) -> Self {
        self.fail_weather = true;
        self
    }
    pub fn failing_satellite(mut self) -> Self {
        self.fail_satellite = true;
        self
    }
    pub fn open_gate(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|(name, _)| *name).collect()
    }
    pub fn coordinates(&self) -> Vec<Coordinates> {
        self.calls.lock().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl EnvironmentPort for FakeEnvironment {
    async fn weather(&self, at: Coordinates) -> DomainResult<WeatherSnapshot> {
        self.calls.lock().push(("weather", at));
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.fail_weather {
            return Err(DomainError::request(Operation::Weather, "HTTP 503"));
        }
        Ok(WeatherSnapshot { temp_c: 31.0, rain_mm_next_24h: 0.0, advice: "Spray in the early morning.".into() })
    }

    async fn satellite(&self, at: Coordinates) -> DomainResult<SatelliteSnapshot> {
        self.calls.lock().push(("satellite", at));
        if self.fail_satellite {
            return Err(DomainError::request(Operation::Satellite, "HTTP 502"));
        }
        Ok(SatelliteSnapshot { ndvi: 0.42, description: "Moderate vegetation vigour.".into() })
    }
}

pub enum MessagingScript {
    Accept,
    Reject(String),
    Fail,
}

pub struct FakeMessaging {
    script: MessagingScript,
    alerts: Mutex<Vec<AlertRequest>>,
    feedback: Mutex<Vec<FeedbackRecord>>,
}

impl Default for FakeMessaging {
    fn default() -> Self {
        Self { script: MessagingScript::Accept, alerts: Mutex::new(Vec::new()), feedback: Mutex::new(Vec::new()) }
    }
}

impl FakeMessaging {
    pub fn rejecting(message: &str) -> Self {
        Self { script: MessagingScript::Reject(message.to_string()), ..Self::default() }
    }
    pub fn failing() -> Self {
        Self { script: MessagingScript::Fail, ..Self::default() }
    }
    pub fn alerts(&self) -> Vec<AlertRequest> {
        self.alerts.lock().clone()
    }
    pub fn feedback(&self) -> Vec<FeedbackRecord> {
        self.feedback.lock().clone()
    }
}

#[async_trait]
impl MessagingPort for FakeMessaging {
    async fn send_alert(&self, alert: &AlertRequest) -> DomainResult<Ack> {
        match &self.script {
            MessagingScript::Fail => Err(DomainError::request(Operation::Alert, "HTTP 500")),
            MessagingScript::Reject(msg) => {
                Ok(Ack { status: Some("error".into()), message: Some(msg.clone()) })
            }
            MessagingScript::Accept => {
                self.alerts.lock().push(alert.clone());
                Ok(Ack { status: Some("sent".into()), message: None })
            }
        }
    }

    async fn submit_feedback(&self, record: &FeedbackRecord) -> DomainResult<Ack> {
        match &self.script {
            MessagingScript::Fail => Err(DomainError::request(Operation::Feedback, "HTTP 500")),
            _ => {
                self.feedback.lock().push(record.clone());
                Ok(Ack { status: Some("ok".into()), message: None })
            }
        }
    }
}
