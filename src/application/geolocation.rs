use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::application::ports::LocationPort;
use crate::domain::environment::Coordinates;

/// Best-effort position lookup. Always yields coordinates: platform errors,
/// invalid fixes and timeouts all fall back to `fallback`.
#[derive(Clone)]
pub struct GeolocationResolver {
    source: Arc<dyn LocationPort>,
    timeout: Duration,
    fallback: Coordinates,
}

impl GeolocationResolver {
    pub fn new(source: Arc<dyn LocationPort>, timeout: Duration, fallback: Coordinates) -> Self {
        Self { source, timeout, fallback }
    }

    pub async fn resolve(&self) -> Coordinates {
        match tokio::time::timeout(self.timeout, self.source.locate()).await {
            Ok(Ok(coords)) if coords.is_valid() => {
                debug!("Position resolved: {:.4}, {:.4}", coords.latitude, coords.longitude);
                coords
            }
            Ok(Ok(coords)) => {
                warn!("Ignoring invalid position {:?}, using default coordinates", coords);
                self.fallback
            }
            Ok(Err(e)) => {
                debug!("Position unavailable ({}), using default coordinates", e);
                self.fallback
            }
            Err(_) => {
                warn!("Position lookup timed out after {:?}, using default coordinates", self.timeout);
                self.fallback
            }
        }
    }
}
