//! Device position lookup
//!
//! The location picker asks the host for a one-shot position fix. On a
//! server or terminal there is no GPS, so the default locator derives the
//! position from the public IP address via ip-api.com.

use crate::constants::api::IP_API_URL;
use crate::error::Result;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Options for a one-shot position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    /// Prefer an accurate fix over a fast one
    pub high_accuracy: bool,
    /// Give up after this long
    pub timeout: Duration,
    /// Oldest cached fix that may be returned; zero demands a fresh one
    pub maximum_age: Duration,
}

/// A position reported by the device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// Why the device could not report a position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Permission to read the device location was denied")]
    PermissionDenied,

    #[error("Device position unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out waiting for the device position")]
    Timeout,

    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("Network failure while locating: {0}")]
    Network(String),
}

impl LocationError {
    /// True for failures of the device itself (as opposed to transport)
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            LocationError::PermissionDenied | LocationError::Unavailable(_) | LocationError::Timeout
        )
    }
}

/// Source of one-shot device positions
pub trait DeviceLocator: Send + Sync {
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = std::result::Result<DevicePosition, LocationError>> + Send;
}

/// Locator for hosts with no position source at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeviceLocator;

impl DeviceLocator for NoDeviceLocator {
    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> std::result::Result<DevicePosition, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

/// IP-based position source
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: reqwest::Client,
    url: String,
}

impl IpLocator {
    /// Create a locator against ip-api.com
    pub fn new() -> Result<Self> {
        Self::with_url(IP_API_URL)
    }

    /// Create a locator against another ip-api compatible endpoint
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            url: url.into(),
        })
    }

    async fn fetch_position(&self) -> std::result::Result<DevicePosition, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LocationError::Network(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| {
                LocationError::Network(format!("Failed to parse IP location response: {}", e))
            })?;

        parse_response(data)
    }
}

fn parse_response(data: IpApiResponse) -> std::result::Result<DevicePosition, LocationError> {
    if data.status != "success" {
        return Err(LocationError::Unavailable(
            data.message.unwrap_or_else(|| "IP location lookup failed".to_string()),
        ));
    }

    match (data.lat, data.lon) {
        (Some(latitude), Some(longitude)) => Ok(DevicePosition {
            latitude,
            longitude,
        }),
        _ => Err(LocationError::Unavailable(
            "No coordinates in response".to_string(),
        )),
    }
}

impl DeviceLocator for IpLocator {
    /// IP lookups have a single accuracy level and are never cached, so only
    /// the timeout option applies.
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> std::result::Result<DevicePosition, LocationError> {
        debug!(url = %self.url, "requesting IP position");
        tokio::time::timeout(options.timeout, self.fetch_position())
            .await
            .map_err(|_| LocationError::Timeout)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> IpApiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_success() {
        let position = parse_response(response(
            r#"{"status": "success", "lat": 40.7128, "lon": -74.006, "city": "New York"}"#,
        ))
        .unwrap();
        assert_eq!(position.latitude, 40.7128);
        assert_eq!(position.longitude, -74.006);
    }

    #[test]
    fn test_parse_failure_status() {
        let err = parse_response(response(
            r#"{"status": "fail", "message": "reserved range"}"#,
        ))
        .unwrap_err();
        assert_eq!(err, LocationError::Unavailable("reserved range".to_string()));
    }

    #[test]
    fn test_parse_missing_coordinates() {
        let err = parse_response(response(r#"{"status": "success"}"#)).unwrap_err();
        assert!(err.is_device_error());
    }

    #[test]
    fn test_error_classification() {
        assert!(LocationError::PermissionDenied.is_device_error());
        assert!(LocationError::Timeout.is_device_error());
        assert!(!LocationError::Unsupported.is_device_error());
        assert!(!LocationError::Network("down".to_string()).is_device_error());
    }

    #[tokio::test]
    async fn test_no_device_locator() {
        let options = PositionOptions {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        };
        let err = NoDeviceLocator.current_position(options).await.unwrap_err();
        assert_eq!(err, LocationError::Unsupported);
    }

    #[test]
    fn test_ip_locator_creation() {
        let locator = IpLocator::with_url("http://localhost:1/json").unwrap();
        assert!(format!("{:?}", locator).contains("IpLocator"));
    }
}
