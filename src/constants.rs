//! Centralized constants for the volunteer-geo crate
//!
//! Values shared by the geocoding client, the location picker and the
//! outer surfaces (CLI + HTTP API).

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";
}

/// Request headers sent with every provider call
pub mod headers {
    /// Client identifier required by Nominatim's usage policy
    pub const USER_AGENT: &str = "VolunteerEventManager/1.0";

    /// Response language for display names
    pub const ACCEPT_LANGUAGE: &str = "en";

    /// Every provider endpoint we call answers with JSON
    pub const ACCEPT: &str = "application/json";
}

/// User-facing messages produced by the location picker
pub mod messages {
    pub const LOCATION_NOT_FOUND: &str = "Location not found. Please try a different address.";

    pub const INVALID_COORDINATES: &str =
        "Coordinates must be numbers with latitude in [-90, 90] and longitude in [-180, 180].";

    pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation is not supported on this device.";

    pub const DEVICE_LOCATION_FAILED: &str =
        "Unable to get your location. Please check your device settings.";

    pub const CURRENT_LOCATION_FAILED: &str =
        "Failed to get location. Please try again or enter address manually.";
}
