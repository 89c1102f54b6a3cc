use async_trait::async_trait;

use crate::domain::{
    detection::DetectionResult,
    environment::{Coordinates, SatelliteSnapshot, WeatherSnapshot},
    errors::DomainResult,
    image::ImageAsset,
    notify::{Ack, AlertRequest, FeedbackRecord},
};

#[async_trait]
pub trait InferencePort: Send + Sync {
    async fn classify(&self, image: &ImageAsset) -> DomainResult<DetectionResult>;
}

#[async_trait]
pub trait EnvironmentPort: Send + Sync {
    async fn weather(&self, at: Coordinates) -> DomainResult<WeatherSnapshot>;
    async fn satellite(&self, at: Coordinates) -> DomainResult<SatelliteSnapshot>;
}

#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_alert(&self, alert: &AlertRequest) -> DomainResult<Ack>;
    async fn submit_feedback(&self, record: &FeedbackRecord) -> DomainResult<Ack>;
}

/// Host position source. May fail or never answer; callers go through `GeolocationResolver`.
#[async_trait]
pub trait LocationPort: Send + Sync {
    async fn locate(&self) -> DomainResult<Coordinates>;
}

/// Handle to a preview resource. Not `Clone`: releasing consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PreviewHandle(pub u64);

/// Creates and reclaims previews for selected images.
pub trait PreviewPort: Send + Sync {
    fn create(&self, image: &ImageAsset) -> PreviewHandle;
    /// Displayable form of a live preview, if one could be produced.
    fn render(&self, handle: &PreviewHandle) -> Option<String>;
    fn release(&self, handle: PreviewHandle);
}
