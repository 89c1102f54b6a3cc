//! Pest detection pipeline: a selected photo is classified by a remote model,
//! enriched with weather and NDVI context for the user's position, and can then
//! be turned into an alert or a correction.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

use std::sync::Arc;

use crate::adapters::{api::client::PestApiClient, location::ReportedLocation, preview::ThumbnailPreviews};
use crate::application::{
    enrichment::EnrichmentAggregator,
    geolocation::GeolocationResolver,
    orchestrator::DetectionOrchestrator,
    services::{FeedbackSubmitter, NotificationDispatcher},
};
use crate::config::AppConfig;
use crate::domain::environment::Coordinates;

/// The use cases wired to the HTTP backend.
pub struct Pipeline {
    pub orchestrator: Arc<DetectionOrchestrator>,
    pub alerts: NotificationDispatcher,
    pub feedback: FeedbackSubmitter,
    pub location: Arc<ReportedLocation>,
}

pub fn assemble(config: &AppConfig, initial_fix: Option<Coordinates>) -> Pipeline {
    // 1. Adapters. Shared between the use cases, hence Arc.
    let api = Arc::new(PestApiClient::new(&config.api_url, config.http_timeout));
    let location = Arc::new(ReportedLocation::new(initial_fix));
    let previews = Arc::new(ThumbnailPreviews::default());

    // 2. Pipeline stages
    let resolver = GeolocationResolver::new(location.clone(), config.geolocation_timeout, config.default_coordinates);
    let enrichment = EnrichmentAggregator::new(api.clone(), config.enrichment_mode);
    let orchestrator = Arc::new(DetectionOrchestrator::new(
        api.clone(),
        previews,
        resolver,
        enrichment,
        config.partial_enrichment,
    ));

    // 3. Follow-up actions on a finished run
    Pipeline {
        orchestrator,
        alerts: NotificationDispatcher::new(api.clone()),
        feedback: FeedbackSubmitter::new(api),
        location,
    }
}
