//! Geocoding back ends

use crate::error::{GeoError, Result};
use crate::Coordinate;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use workorder_core::config::GeocodingSettings;

/// One match returned by a geocoder.
///
/// Nominatim reports coordinates as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    /// Latitude as text
    pub lat: String,
    /// Longitude as text
    pub lon: String,
    /// Human-readable match description
    #[serde(default)]
    pub display_name: Option<String>,
}

impl GeocodeCandidate {
    /// Candidate from numeric coordinates
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: lat.to_string(),
            lon: lon.to_string(),
            display_name: None,
        }
    }

    /// Parse the coordinate; `None` when either part is not a valid number
    /// or out of range
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lon = self.lon.trim().parse::<f64>().ok()?;
        Some(Coordinate::new(lat, lon)).filter(Coordinate::is_valid)
    }
}

/// Resolves a free-text address to candidate matches
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Look up `address`. Zero candidates is a successful "no match".
    async fn search(&self, address: &str) -> Result<Vec<GeocodeCandidate>>;
}

#[async_trait]
impl<P: GeocodeProvider + ?Sized> GeocodeProvider for Arc<P> {
    async fn search(&self, address: &str) -> Result<Vec<GeocodeCandidate>> {
        (**self).search(address).await
    }
}

/// OpenStreetMap Nominatim search API
#[derive(Debug, Clone)]
pub struct NominatimProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl NominatimProvider {
    /// Public Nominatim instance
    pub const DEFAULT_ENDPOINT: &'static str = "https://nominatim.openstreetmap.org";

    /// User-Agent required by the Nominatim usage policy
    pub const DEFAULT_USER_AGENT: &'static str = "WorkOrderManagementApp/1.0";

    /// Create a provider for `endpoint` identifying itself as `user_agent`
    pub fn new(endpoint: impl Into<String>, user_agent: &str) -> Result<Self> {
        let agent = HeaderValue::from_str(user_agent)
            .map_err(|_| GeoError::Config(format!("invalid user agent '{user_agent}'")))?;
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(USER_AGENT, agent);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a provider from the `[geocoding]` settings
    pub fn from_settings(settings: &GeocodingSettings) -> Result<Self> {
        Self::new(settings.endpoint.clone(), &settings.user_agent)
    }

    /// Search URL
    pub fn search_url(&self) -> String {
        format!("{}/search", self.endpoint)
    }
}

#[async_trait]
impl GeocodeProvider for NominatimProvider {
    async fn search(&self, address: &str) -> Result<Vec<GeocodeCandidate>> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("format", "json"), ("q", address)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown status").to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
