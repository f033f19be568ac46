//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{api, headers};

/// Default geocoding provider base URL
pub const DEFAULT_BASE_URL: &str = api::NOMINATIM_URL;

/// Default client identifier sent as User-Agent
pub const DEFAULT_USER_AGENT: &str = headers::USER_AGENT;

/// Default Accept-Language header value
pub const DEFAULT_ACCEPT_LANGUAGE: &str = headers::ACCEPT_LANGUAGE;

/// Default per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Minimum spacing between outbound requests in milliseconds.
/// Nominatim allows at most one request per second.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1_100;

/// Default number of retries after the first failed attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay for exponential retry backoff in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;

/// Default number of requests allowed in flight at once
pub const DEFAULT_MAX_CONCURRENT: usize = 1;

/// Retry 4xx responses like any other failure
pub const DEFAULT_RETRY_CLIENT_ERRORS: bool = true;

/// Default cache entry lifetime in seconds (24 hours)
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Default maximum number of cached responses
pub const DEFAULT_CACHE_MAX_SIZE: usize = 100;

/// Default debounce window for typed addresses in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default timeout for the one-shot device position request in milliseconds
pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 10_000;

/// Request a high-accuracy device fix by default
pub const DEFAULT_HIGH_ACCURACY: bool = true;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "volunteer-geo";
