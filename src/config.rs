use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::application::{enrichment::EnrichmentMode, orchestrator::PartialEnrichment};
use crate::domain::environment::Coordinates;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub http_timeout: Duration,
    pub geolocation_timeout: Duration,
    pub default_coordinates: Coordinates,
    pub partial_enrichment: PartialEnrichment,
    pub enrichment_mode: EnrichmentMode,
    pub bind: String,
    pub static_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            geolocation_timeout: Duration::from_millis(5000),
            default_coordinates: Coordinates::NATIONAL_CENTROID,
            partial_enrichment: PartialEnrichment::default(),
            enrichment_mode: EnrichmentMode::default(),
            bind: "0.0.0.0:8090".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `PEANUTGUARD_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = AppConfig::default();

        let api_url = get("PEANUTGUARD_API_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(anyhow!("PEANUTGUARD_API_URL must be an http(s) URL, got {api_url}"));
        }

        let http_timeout = match get("PEANUTGUARD_HTTP_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse(&v, "PEANUTGUARD_HTTP_TIMEOUT_SECS")?),
            None => defaults.http_timeout,
        };
        let geolocation_timeout = match get("PEANUTGUARD_GEO_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(parse(&v, "PEANUTGUARD_GEO_TIMEOUT_MS")?),
            None => defaults.geolocation_timeout,
        };

        let latitude = match get("PEANUTGUARD_DEFAULT_LAT") {
            Some(v) => parse(&v, "PEANUTGUARD_DEFAULT_LAT")?,
            None => defaults.default_coordinates.latitude,
        };
        let longitude = match get("PEANUTGUARD_DEFAULT_LON") {
            Some(v) => parse(&v, "PEANUTGUARD_DEFAULT_LON")?,
            None => defaults.default_coordinates.longitude,
        };
        let default_coordinates =
            Coordinates::new(latitude, longitude).context("invalid default coordinates")?;

        let partial_enrichment = match get("PEANUTGUARD_PARTIAL_ENRICHMENT") {
            Some(v) => v.parse::<PartialEnrichment>().context("PEANUTGUARD_PARTIAL_ENRICHMENT")?,
            None => defaults.partial_enrichment,
        };
        let enrichment_mode = match get("PEANUTGUARD_ENRICHMENT_MODE") {
            Some(v) => v.parse::<EnrichmentMode>().context("PEANUTGUARD_ENRICHMENT_MODE")?,
            None => defaults.enrichment_mode,
        };

        Ok(Self {
            api_url,
            http_timeout,
            geolocation_timeout,
            default_coordinates,
            partial_enrichment,
            enrichment_mode,
            bind: get("PEANUTGUARD_BIND").unwrap_or(defaults.bind),
            static_dir: get("PEANUTGUARD_STATIC_DIR").unwrap_or(defaults.static_dir),
        })
    }
}

fn parse<T>(value: &str, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().with_context(|| format!("{key}: cannot parse {value:?}"))
}
