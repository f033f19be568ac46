//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::constants::messages;
use crate::coord::Coordinates;
use crate::error::Error;
use crate::geo::device::DeviceLocator;
use crate::geo::http::HttpFetcher;
use crate::geo::{GeocodeResult, LocationPicker};
use crate::server::state::AppState;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router<H, D>(state: Arc<AppState<H, D>>) -> Router
where
    H: HttpFetcher + 'static,
    D: DeviceLocator + Clone + 'static,
{
    Router::new()
        .route("/api/geocode", get(geocode_handler::<H, D>))
        .route("/api/reverse", get(reverse_handler::<H, D>))
        .route("/api/location", get(location_handler::<H, D>))
        .route("/api/status", get(status_handler::<H, D>))
        .route("/api/cache", delete(clear_cache_handler::<H, D>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn api_error(
    status: StatusCode,
    error: impl Into<String>,
    code: &str,
) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Location(_) => "LOCATION_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Forward geocoding query
#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    /// Address or "lat, lng" text
    pub q: String,
}

/// Resolve an address
///
/// GET /api/geocode?q=...
async fn geocode_handler<H: HttpFetcher, D>(
    State(state): State<Arc<AppState<H, D>>>,
    Query(query): Query<GeocodeQuery>,
) -> ApiResult<GeocodeResult> {
    if query.q.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Query must not be empty",
            "INVALID_QUERY",
        ));
    }

    state
        .geocoder
        .geocode_address(&query.q)
        .await
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, messages::LOCATION_NOT_FOUND, "NOT_FOUND"))
}

/// Reverse geocoding query
#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lng: f64,
}

/// Label a coordinate pair
///
/// GET /api/reverse?lat=...&lng=...
async fn reverse_handler<H: HttpFetcher, D>(
    State(state): State<Arc<AppState<H, D>>>,
    Query(query): Query<ReverseQuery>,
) -> ApiResult<GeocodeResult> {
    let coords = Coordinates::new(query.lat, query.lng);
    coords.validate().map_err(|e| (StatusCode::BAD_REQUEST, Json(ApiError::from(e))))?;

    state
        .geocoder
        .reverse_geocode(coords.lat, coords.lng)
        .await
        .map(|address| {
            Json(GeocodeResult {
                lat: coords.lat,
                lng: coords.lng,
                address,
            })
        })
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, messages::LOCATION_NOT_FOUND, "NOT_FOUND"))
}

/// Resolve the host's current position
///
/// GET /api/location
async fn location_handler<H: HttpFetcher + 'static, D: DeviceLocator + Clone + 'static>(
    State(state): State<Arc<AppState<H, D>>>,
) -> ApiResult<GeocodeResult> {
    let picker = LocationPicker::new(
        state.geocoder.clone(),
        state.device.clone(),
        state.config.picker_settings(),
        |_| {},
    );

    match picker.use_current_location().await {
        Some(result) => Ok(Json(result)),
        None => {
            let message = picker
                .state()
                .error
                .unwrap_or_else(|| messages::CURRENT_LOCATION_FAILED.to_string());
            Err(api_error(StatusCode::SERVICE_UNAVAILABLE, message, "LOCATION_ERROR"))
        }
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Geocoding provider base URL
    pub provider: String,
    /// Responses currently cached
    pub cache_entries: usize,
    pub cache_max_size: usize,
    /// Minimum spacing between provider calls
    pub min_interval_ms: u64,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<H: HttpFetcher, D>(
    State(state): State<Arc<AppState<H, D>>>,
) -> Json<StatusResponse> {
    let settings = state.geocoder.settings();

    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: settings.base_url.clone(),
        cache_entries: state.geocoder.cache_len(),
        cache_max_size: settings.cache_max_size,
        min_interval_ms: settings.min_interval.as_millis() as u64,
        uptime_secs: state.uptime_secs(),
    })
}

/// Drop every cached provider response
///
/// DELETE /api/cache
async fn clear_cache_handler<H: HttpFetcher, D>(
    State(state): State<Arc<AppState<H, D>>>,
) -> StatusCode {
    state.geocoder.clear_cache();
    StatusCode::NO_CONTENT
}
