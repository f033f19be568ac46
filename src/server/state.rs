//! Server shared state
//!
//! Holds configuration and the single geocoding client shared by every
//! request, so that all handlers go through the same cache and rate limiter.

use crate::config::Config;
use crate::error::Result;
use crate::geo::http::ReqwestFetcher;
use crate::geo::{get_device_locator, get_geocoder, GeocodingClient, IpLocator};
use std::sync::Arc;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState<H = ReqwestFetcher, D = IpLocator> {
    /// Configuration
    pub config: Config,

    /// Geocoding client shared by all handlers
    pub geocoder: Arc<GeocodingClient<H>>,

    /// Source of "current location" fixes
    pub device: D,

    started: Instant,
}

impl AppState {
    /// Create application state with the production client and IP locator
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        let geocoder = get_geocoder(&config)?;
        let device = get_device_locator()?;
        Ok(Self::with_parts(config, geocoder, device))
    }
}

impl<H, D> AppState<H, D> {
    /// Assemble state from already-built parts
    pub fn with_parts(config: Config, geocoder: GeocodingClient<H>, device: D) -> Self {
        Self {
            config,
            geocoder: Arc::new(geocoder),
            device,
            started: Instant::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
