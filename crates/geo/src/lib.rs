//! Address geocoding for work-order locations.
//!
//! This crate provides:
//! - A [`GeocodeProvider`] seam with an OpenStreetMap Nominatim back end
//! - [`GeocodingService`]: TTL-cached lookups with doubling-backoff retries
//! - Rate-limited batch resolution and grouping of work orders by address
//!
//! # Example
//!
//! ```rust,no_run
//! use workorder_geo::{GeocodingService, NominatimProvider};
//!
//! # async fn demo() -> workorder_geo::Result<()> {
//! let provider = NominatimProvider::new(
//!     NominatimProvider::DEFAULT_ENDPOINT,
//!     NominatimProvider::DEFAULT_USER_AGENT,
//! )?;
//! let service = GeocodingService::new(provider);
//!
//! if let Some(coordinate) = service.resolve("350 5th Ave, New York").await {
//!     println!("{coordinate}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
pub mod geocoding;
mod provider;

pub use error::{GeoError, GeoErrorCode, Result};
pub use geocoding::{normalize_address, GeocodingConfig, GeocodingService};
pub use provider::{GeocodeCandidate, GeocodeProvider, NominatimProvider};

use serde::{Deserialize, Serialize};
use std::fmt;
use workorder_api_client::models::WorkOrder;

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    #[serde(rename = "lon", alias = "longitude")]
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Returns true if both parts are finite and in range.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Work orders sharing one resolved address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodedLocation {
    /// Resolved position
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Address as formatted from the location record
    pub address: String,
    /// Orders at this address
    pub work_orders: Vec<WorkOrder>,
}

impl GeocodedLocation {
    /// Group `work_orders` at `coordinate`
    pub fn new(coordinate: Coordinate, address: impl Into<String>, work_orders: Vec<WorkOrder>) -> Self {
        Self {
            coordinate,
            address: address.into(),
            work_orders,
        }
    }

    /// Number of orders at this address
    pub fn work_order_count(&self) -> usize {
        self.work_orders.len()
    }
}
