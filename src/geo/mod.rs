//! Geocoding module
//!
//! Forward and reverse geocoding against a rate-limited public provider,
//! plus the device-location and location-picker pieces built on top of it.

pub mod cache;
pub mod client;
pub mod device;
pub mod http;
pub mod picker;
pub mod queue;
pub mod rate_limit;

use crate::config::Config;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

pub use client::{GeocoderSettings, GeocodingClient};
pub use device::{DeviceLocator, DevicePosition, IpLocator, LocationError, PositionOptions};
pub use picker::{LocationPicker, PickerSettings, PickerState};

/// A resolved location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Human-readable address or "lat, lng" label
    pub address: String,
}

/// Trait for geocoding backends
///
/// Lookups never fail outright: anything that goes wrong is logged and
/// reported as "nothing found".
pub trait GeoBackend: Send + Sync {
    /// Resolve free text (an address or a "lat, lng" pair) to a location
    fn geocode_address(&self, address: &str) -> impl Future<Output = Option<GeocodeResult>> + Send;

    /// Resolve coordinates to a display name
    fn reverse_geocode(&self, lat: f64, lng: f64) -> impl Future<Output = Option<String>> + Send;
}

/// Build the production geocoding client from configuration
///
/// Must be called from within a tokio runtime.
pub fn get_geocoder(config: &Config) -> Result<GeocodingClient> {
    GeocodingClient::new(config.geocoder_settings())
}

/// Get the IP-based device locator
pub fn get_device_locator() -> Result<IpLocator> {
    IpLocator::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocode_result_serialization() {
        let result = GeocodeResult {
            lat: 37.7749,
            lng: -122.4194,
            address: "San Francisco, California, United States".to_string(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["lat"], 37.7749);
        assert_eq!(json["address"], "San Francisco, California, United States");
    }

    #[tokio::test]
    async fn test_get_geocoder_uses_config() {
        let mut config = Config::default();
        config.set("geocoding.base_url", "http://localhost:9999").unwrap();

        let client = get_geocoder(&config).unwrap();
        assert_eq!(client.settings().base_url, "http://localhost:9999");
    }
}
