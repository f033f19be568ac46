//! volunteer-geo: geocoding for volunteer event scheduling
//!
//! A library and CLI tool for turning addresses into coordinates and back,
//! against a public geocoding provider that must be called politely.
//!
//! ## Features
//!
//! - Coordinate validation and "lat, lng" parsing
//! - Cached, rate-limited, retried forward and reverse geocoding
//! - Bounded concurrency for provider requests
//! - Location picker with debounced lookups and current-location support
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```no_run
//! use volunteer_geo::{Config, GeocodingClient};
//!
//! # async fn demo() -> volunteer_geo::Result<()> {
//! let config = Config::load()?;
//! let client = GeocodingClient::new(config.geocoder_settings())?;
//!
//! if let Some(place) = client.geocode_address("Trafalgar Square, London").await {
//!     println!("{} is at {}, {}", place.address, place.lat, place.lng);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod geo;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use coord::{validate_coordinates, Coordinates};
pub use error::{Error, Result};
pub use geo::{GeocodeResult, GeocodingClient, LocationPicker};
