use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::application::dto::CoordinatesPayload;
use crate::application::ports::{EnvironmentPort, InferencePort, MessagingPort};
use crate::domain::{
    detection::DetectionResult,
    environment::{Coordinates, SatelliteSnapshot, WeatherSnapshot},
    errors::{DomainError, DomainResult, Operation},
    image::ImageAsset,
    notify::{Ack, AlertRequest, FeedbackRecord},
};

/// Client for the detection backend (`/detect`, `/weather`, `/satellite`, `/alert`, `/feedback`).
#[derive(Clone)]
pub struct PestApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PestApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<R: DeserializeOwned>(
        operation: Operation,
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> DomainResult<R> {
        let res = sent.map_err(|e| DomainError::request(operation, e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(DomainError::request(operation, format!("HTTP {status}")));
        }
        res.json::<R>()
            .await
            .map_err(|e| DomainError::request(operation, format!("undecodable response: {e}")))
    }

    async fn post_json<B, R>(&self, operation: Operation, path: &str, body: &B) -> DomainResult<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        debug!("POST {} ({})", path, operation);
        let sent = self.client.post(self.url(path)).json(body).send().await;
        Self::read(operation, sent).await
    }
}

#[async_trait]
impl InferencePort for PestApiClient {
    async fn classify(&self, image: &ImageAsset) -> DomainResult<DetectionResult> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.name.clone())
            .mime_str(&image.media_type)
            .map_err(|e| DomainError::Validation(format!("media type {}: {e}", image.media_type)))?;
        let form = Form::new().part("file", part);

        debug!("POST /detect ({} bytes)", image.bytes.len());
        let sent = self.client.post(self.url("/detect")).multipart(form).send().await;
        Self::read(Operation::Detect, sent).await
    }
}

#[async_trait]
impl EnvironmentPort for PestApiClient {
    async fn weather(&self, at: Coordinates) -> DomainResult<WeatherSnapshot> {
        self.post_json(Operation::Weather, "/weather", &CoordinatesPayload::from(at)).await
    }

    async fn satellite(&self, at: Coordinates) -> DomainResult<SatelliteSnapshot> {
        self.post_json(Operation::Satellite, "/satellite", &CoordinatesPayload::from(at)).await
    }
}

#[async_trait]
impl MessagingPort for PestApiClient {
    async fn send_alert(&self, alert: &AlertRequest) -> DomainResult<Ack> {
        self.post_json(Operation::Alert, "/alert", alert).await
    }

    async fn submit_feedback(&self, record: &FeedbackRecord) -> DomainResult<Ack> {
        self.post_json(Operation::Feedback, "/feedback", record).await
    }
}
