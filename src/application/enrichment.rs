use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::EnvironmentPort;
use crate::domain::{
    environment::{Coordinates, SatelliteSnapshot, WeatherSnapshot},
    errors::{DomainError, DomainResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnrichmentMode {
    /// Weather, then satellite. A weather failure skips satellite.
    #[default]
    Sequential,
    /// Both calls issued together.
    Concurrent,
}

impl FromStr for EnrichmentMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(EnrichmentMode::Sequential),
            "concurrent" | "parallel" => Ok(EnrichmentMode::Concurrent),
            other => Err(DomainError::Validation(format!("unknown enrichment mode: {other}"))),
        }
    }
}

/// Outcome of both enrichment calls, reported as a unit.
#[derive(Debug)]
pub struct EnrichmentReport {
    pub weather: Option<WeatherSnapshot>,
    pub satellite: Option<SatelliteSnapshot>,
    /// First failure, if any call failed or was skipped.
    pub failure: Option<DomainError>,
}

pub struct EnrichmentAggregator {
    environment: Arc<dyn EnvironmentPort>,
    mode: EnrichmentMode,
}

impl EnrichmentAggregator {
    pub fn new(environment: Arc<dyn EnvironmentPort>, mode: EnrichmentMode) -> Self {
        Self { environment, mode }
    }

    /// Both snapshots, or the first failure.
    pub async fn enrich(&self, at: Coordinates) -> DomainResult<(WeatherSnapshot, SatelliteSnapshot)> {
        let report = self.report(at).await;
        match (report.failure, report.weather, report.satellite) {
            (None, Some(w), Some(s)) => Ok((w, s)),
            (Some(e), _, _) => Err(e),
            _ => Err(DomainError::Validation("enrichment produced no snapshots".into())),
        }
    }

    /// Runs both calls and reports whatever arrived, leaving the retention policy to the caller.
    pub async fn report(&self, at: Coordinates) -> EnrichmentReport {
        debug!("Enriching {:.4}, {:.4} ({:?})", at.latitude, at.longitude, self.mode);
        let (weather, satellite) = match self.mode {
            EnrichmentMode::Sequential => match self.environment.weather(at).await {
                Ok(w) => (Ok(w), self.environment.satellite(at).await),
                Err(e) => {
                    warn!("Weather fetch failed, skipping satellite: {:?}", e);
                    return EnrichmentReport { weather: None, satellite: None, failure: Some(e) };
                }
            },
            EnrichmentMode::Concurrent => {
                tokio::join!(self.environment.weather(at), self.environment.satellite(at))
            }
        };

        let mut failure = None;
        let weather = match weather {
            Ok(w) => Some(w),
            Err(e) => {
                failure.get_or_insert(e);
                None
            }
        };
        let satellite = match satellite {
            Ok(s) => Some(s),
            Err(e) => {
                failure.get_or_insert(e);
                None
            }
        };
        if let Some(e) = &failure {
            warn!("Enrichment incomplete: {:?}", e);
        }
        EnrichmentReport { weather, satellite, failure }
    }
}
