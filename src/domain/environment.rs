use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Geographic centre of India, used when no position can be obtained.
    pub const NATIONAL_CENTROID: Coordinates = Coordinates { latitude: 20.5937, longitude: 78.9629 };

    pub fn new(latitude: f64, longitude: f64) -> DomainResult<Self> {
        let c = Self { latitude, longitude };
        if c.is_valid() {
            Ok(c)
        } else {
            Err(DomainError::Validation(format!("coordinates out of range: {latitude}, {longitude}")))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    pub temp_c: f64,
    pub rain_mm_next_24h: f64,
    pub advice: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SatelliteSnapshot {
    /// Roughly -1.0 ..= 1.0.
    pub ndvi: f64,
    pub description: String,
}
