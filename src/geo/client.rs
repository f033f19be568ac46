//! Nominatim geocoding client (OpenStreetMap)
//!
//! Every outbound call goes through the same pipeline:
//! cache lookup, queue slot, rate limiter turn, then the HTTP request with a
//! hard timeout. Failures are retried with exponential backoff, starting over
//! from the cache lookup each time.

use crate::config::defaults::*;
use crate::constants::headers;
use crate::coord::{parse_coordinate_pair, validate_coordinates, Coordinates};
use crate::error::{Error, Result};
use crate::geo::cache::ResultCache;
use crate::geo::http::{HttpFetcher, ReqwestFetcher};
use crate::geo::queue::RequestQueue;
use crate::geo::rate_limit::RateLimiter;
use crate::geo::{GeoBackend, GeocodeResult};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Runtime settings for [`GeocodingClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderSettings {
    /// Provider base URL without trailing slash
    pub base_url: String,
    pub user_agent: String,
    pub accept_language: String,
    /// Hard timeout for a single HTTP call
    pub timeout: Duration,
    /// Minimum spacing between outbound calls
    pub min_interval: Duration,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Backoff base; attempt `n` waits `retry_delay * 2^n`
    pub retry_delay: Duration,
    pub max_concurrent: usize,
    /// Retry 4xx responses like other failures
    pub retry_client_errors: bool,
    pub cache_max_age: Duration,
    pub cache_max_size: usize,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            min_interval: Duration::from_millis(DEFAULT_MIN_INTERVAL_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            retry_client_errors: DEFAULT_RETRY_CLIENT_ERRORS,
            cache_max_age: Duration::from_secs(DEFAULT_CACHE_MAX_AGE_SECS),
            cache_max_size: DEFAULT_CACHE_MAX_SIZE,
        }
    }
}

/// Geocoding client with caching, throttling and retries
#[derive(Debug)]
pub struct GeocodingClient<H = ReqwestFetcher> {
    fetcher: H,
    settings: GeocoderSettings,
    cache: ResultCache<Value>,
    limiter: RateLimiter,
    queue: RequestQueue,
}

impl GeocodingClient<ReqwestFetcher> {
    /// Create a client backed by reqwest
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(settings: GeocoderSettings) -> Result<Self> {
        Ok(Self::with_fetcher(ReqwestFetcher::new()?, settings))
    }
}

impl<H: HttpFetcher> GeocodingClient<H> {
    /// Create a client over any transport
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_fetcher(fetcher: H, settings: GeocoderSettings) -> Self {
        Self {
            cache: ResultCache::new(settings.cache_max_age, settings.cache_max_size),
            limiter: RateLimiter::new(settings.min_interval),
            queue: RequestQueue::new(settings.max_concurrent),
            fetcher,
            settings,
        }
    }

    pub fn settings(&self) -> &GeocoderSettings {
        &self.settings
    }

    pub fn fetcher(&self) -> &H {
        &self.fetcher
    }

    /// Number of cached provider responses
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Forward search URL. Whitespace in the query is collapsed so that
    /// equivalent inputs share a cache entry.
    pub fn search_url(&self, address: &str) -> String {
        let query = address.split_whitespace().collect::<Vec<_>>().join(" ");
        format!(
            "{}/search?format=json&q={}&limit=1&addressdetails=1",
            self.settings.base_url,
            urlencoding::encode(&query)
        )
    }

    pub fn reverse_url(&self, lat: f64, lng: f64) -> String {
        format!(
            "{}/reverse?format=json&lat={}&lon={}",
            self.settings.base_url, lat, lng
        )
    }

    /// Fetch and decode a provider URL, retrying with exponential backoff.
    ///
    /// Returns the error of the last attempt once retries are used up.
    pub async fn make_request(&self, url: &str) -> Result<Value> {
        let mut retries = 0;

        loop {
            match self.attempt(url).await {
                Ok(data) => return Ok(data),
                Err(e)
                    if retries < self.settings.max_retries
                        && e.is_retryable(self.settings.retry_client_errors) =>
                {
                    let delay = self
                        .settings
                        .retry_delay
                        .saturating_mul(2u32.saturating_pow(retries));
                    warn!(
                        url,
                        error = %e,
                        retry = retries + 1,
                        ?delay,
                        "geocoding request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<Value> {
        if let Some(cached) = self.cache.get(url) {
            debug!(url, "geocoding cache hit");
            return Ok(cached);
        }

        // The turn is taken while holding the slot so the spacing applies to
        // actual sends, not to callers waiting behind a slow response
        let data = self
            .queue
            .enqueue(|| async {
                self.limiter.acquire().await?;
                self.fetch(url).await
            })
            .await?;

        self.cache.set(url, data.clone());
        Ok(data)
    }

    async fn fetch(&self, url: &str) -> Result<Value> {
        let request_headers = [
            ("Accept", headers::ACCEPT),
            ("Accept-Language", self.settings.accept_language.as_str()),
            ("User-Agent", self.settings.user_agent.as_str()),
        ];

        debug!(url, "geocoding request");
        let body = tokio::time::timeout(
            self.settings.timeout,
            self.fetcher.get(url, &request_headers),
        )
        .await
        .map_err(|_| Error::Timeout(self.settings.timeout))??;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::EmptyResponse);
        }

        match serde_json::from_slice::<Value>(&body)? {
            Value::Null => Err(Error::EmptyResponse),
            data => Ok(data),
        }
    }

    /// Resolve an address (or a typed "lat, lng" pair) to a location.
    ///
    /// Returns `None` for blank input, out-of-range pairs, no match, or any
    /// failure after retries; failures are logged, never returned.
    pub async fn geocode_address(&self, address: &str) -> Option<GeocodeResult> {
        if address.trim().is_empty() {
            return None;
        }

        if let Some(coords) = parse_coordinate_pair(address) {
            if !coords.is_valid() {
                debug!(address, "coordinate input out of range");
                return None;
            }
            let label = self.reverse_geocode(coords.lat, coords.lng).await;
            return Some(GeocodeResult {
                lat: coords.lat,
                lng: coords.lng,
                address: label.unwrap_or_else(|| coords.label()),
            });
        }

        match self.make_request(&self.search_url(address)).await {
            Ok(data) => parse_search_hit(&data),
            Err(e) => {
                error!(address, error = %e, "geocoding failed");
                None
            }
        }
    }

    /// Resolve coordinates to the provider's display name
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<String> {
        if !validate_coordinates(lat, lng) {
            return None;
        }

        match self.make_request(&self.reverse_url(lat, lng)).await {
            Ok(data) => data
                .get("display_name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            Err(e) => {
                error!(lat, lng, error = %e, "reverse geocoding failed");
                None
            }
        }
    }
}

impl<H: HttpFetcher> GeoBackend for GeocodingClient<H> {
    async fn geocode_address(&self, address: &str) -> Option<GeocodeResult> {
        GeocodingClient::geocode_address(self, address).await
    }

    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<String> {
        GeocodingClient::reverse_geocode(self, lat, lng).await
    }
}

/// Nominatim sends coordinates as strings; accept plain numbers too
fn coordinate_field(hit: &Value, key: &str) -> Option<f64> {
    match hit.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// First hit of a search response, if it carries usable coordinates
fn parse_search_hit(data: &Value) -> Option<GeocodeResult> {
    let hit = data.as_array()?.first()?;
    let coords = Coordinates::new(coordinate_field(hit, "lat")?, coordinate_field(hit, "lon")?);

    if !coords.is_valid() {
        warn!(lat = coords.lat, lng = coords.lng, "provider returned invalid coordinates");
        return None;
    }

    let address = hit
        .get("display_name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| coords.label());

    Some(GeocodeResult {
        lat: coords.lat,
        lng: coords.lng,
        address,
    })
}
