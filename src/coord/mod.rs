//! Coordinate validation and parsing
//!
//! This module handles:
//! - Range validation for latitude/longitude pairs
//! - Recognising typed "lat, lng" input
//! - Human-readable coordinate labels

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True if both values are finite and within range
    pub fn is_valid(&self) -> bool {
        validate_coordinates(self.lat, self.lng)
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Plain "lat, lng" label used when no address is known
    pub fn label(&self) -> String {
        format!("{}, {}", self.lat, self.lng)
    }
}

/// Check that a latitude/longitude pair is usable.
///
/// NaN and infinities fail, as does anything outside
/// `[-90, 90]` / `[-180, 180]`.
pub fn validate_coordinates(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

fn pair_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Anchored: a pair with anything around it is an address, not coordinates
        Regex::new(r"^(-?\d+\.?\d*),\s*(-?\d+\.?\d*)$").unwrap()
    })
}

/// Parse text of the strict form `number, number`.
///
/// Only the shape is checked here; the result still needs
/// [`validate_coordinates`] before it is used.
pub fn parse_coordinate_pair(text: &str) -> Option<Coordinates> {
    let caps = pair_pattern().captures(text.trim())?;
    let lat = caps.get(1)?.as_str().parse().ok()?;
    let lng = caps.get(2)?.as_str().parse().ok()?;
    Some(Coordinates::new(lat, lng))
}

/// Format coordinates with six decimal places
pub fn format_coordinates(lat: f64, lng: f64) -> String {
    format!("{:.6}, {:.6}", lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_valid_ranges() {
        assert!(validate_coordinates(0.0, 0.0));
        assert!(validate_coordinates(90.0, 180.0));
        assert!(validate_coordinates(-90.0, -180.0));
        assert!(validate_coordinates(37.7749, -122.4194));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(!validate_coordinates(91.0, 0.0));
        assert!(!validate_coordinates(0.0, -181.0));
        assert!(!validate_coordinates(-90.0001, 0.0));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(!validate_coordinates(f64::NAN, 0.0));
        assert!(!validate_coordinates(0.0, f64::NAN));
        assert!(!validate_coordinates(f64::INFINITY, 0.0));
        assert!(!validate_coordinates(0.0, f64::NEG_INFINITY));
    }

    #[test]
    fn test_validate_error_names_field() {
        let err = Coordinates::new(95.0, 0.0).validate().unwrap_err();
        assert!(err.to_string().contains("Latitude"));

        let err = Coordinates::new(0.0, f64::NAN).validate().unwrap_err();
        assert!(err.to_string().contains("Longitude"));
    }

    #[test]
    fn test_parse_pair() {
        let coords = parse_coordinate_pair("37.7749, -122.4194").unwrap();
        assert_relative_eq!(coords.lat, 37.7749);
        assert_relative_eq!(coords.lng, -122.4194);

        let coords = parse_coordinate_pair("-33,151").unwrap();
        assert_relative_eq!(coords.lat, -33.0);
        assert_relative_eq!(coords.lng, 151.0);
    }

    #[test]
    fn test_parse_pair_keeps_out_of_range_values() {
        let coords = parse_coordinate_pair("91, 10").unwrap();
        assert!(!coords.is_valid());
    }

    #[test]
    fn test_parse_pair_rejects_addresses() {
        assert!(parse_coordinate_pair("10 Downing Street, London").is_none());
        assert!(parse_coordinate_pair("12.5").is_none());
        assert!(parse_coordinate_pair("12.5, 10 east").is_none());
        assert!(parse_coordinate_pair("").is_none());
    }

    #[test]
    fn test_label_and_format() {
        let coords = Coordinates::new(37.7749, -122.4194);
        assert_eq!(coords.label(), "37.7749, -122.4194");
        assert_eq!(format_coordinates(37.7749, -122.4194), "37.774900, -122.419400");
    }
}
