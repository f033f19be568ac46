//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/volunteer-geo/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use crate::geo::client::GeocoderSettings;
use crate::geo::picker::PickerSettings;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Geocoding provider settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Throttling and retry settings
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Location picker settings
    #[serde(default)]
    pub picker: PickerConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Provider base URL (no trailing slash)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client identifier sent as User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header value
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Hard timeout per request in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Throttling and retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum spacing between outbound requests in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Requests allowed in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Whether 4xx responses are retried like transient failures
    #[serde(default = "default_retry_client_errors")]
    pub retry_client_errors: bool,
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds
    #[serde(default = "default_cache_max_age_secs")]
    pub max_age_secs: u64,

    /// Maximum number of cached responses
    #[serde(default = "default_cache_max_size")]
    pub max_size: usize,
}

/// Location picker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerConfig {
    /// Debounce window for typed addresses in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Timeout for the device position request in milliseconds
    #[serde(default = "default_location_timeout_ms")]
    pub location_timeout_ms: u64,

    /// Ask the device for a high-accuracy fix
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_accept_language() -> String {
    DEFAULT_ACCEPT_LANGUAGE.to_string()
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_min_interval_ms() -> u64 {
    DEFAULT_MIN_INTERVAL_MS
}
fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}
fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}
fn default_retry_client_errors() -> bool {
    DEFAULT_RETRY_CLIENT_ERRORS
}
fn default_cache_max_age_secs() -> u64 {
    DEFAULT_CACHE_MAX_AGE_SECS
}
fn default_cache_max_size() -> usize {
    DEFAULT_CACHE_MAX_SIZE
}
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_location_timeout_ms() -> u64 {
    DEFAULT_LOCATION_TIMEOUT_MS
}
fn default_high_accuracy() -> bool {
    DEFAULT_HIGH_ACCURACY
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_concurrent: default_max_concurrent(),
            retry_client_errors: default_retry_client_errors(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_cache_max_age_secs(),
            max_size: default_cache_max_size(),
        }
    }
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            location_timeout_ms: default_location_timeout_ms(),
            high_accuracy: default_high_accuracy(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoding", "base_url"] => Some(self.geocoding.base_url.clone()),
            ["geocoding", "user_agent"] => Some(self.geocoding.user_agent.clone()),
            ["geocoding", "accept_language"] => Some(self.geocoding.accept_language.clone()),
            ["geocoding", "timeout_ms"] => Some(self.geocoding.timeout_ms.to_string()),

            ["rate_limit", "min_interval_ms"] => Some(self.rate_limit.min_interval_ms.to_string()),
            ["rate_limit", "max_retries"] => Some(self.rate_limit.max_retries.to_string()),
            ["rate_limit", "retry_delay_ms"] => Some(self.rate_limit.retry_delay_ms.to_string()),
            ["rate_limit", "max_concurrent"] => Some(self.rate_limit.max_concurrent.to_string()),
            ["rate_limit", "retry_client_errors"] => {
                Some(self.rate_limit.retry_client_errors.to_string())
            }

            ["cache", "max_age_secs"] => Some(self.cache.max_age_secs.to_string()),
            ["cache", "max_size"] => Some(self.cache.max_size.to_string()),

            ["picker", "debounce_ms"] => Some(self.picker.debounce_ms.to_string()),
            ["picker", "location_timeout_ms"] => Some(self.picker.location_timeout_ms.to_string()),
            ["picker", "high_accuracy"] => Some(self.picker.high_accuracy.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoding", "base_url"] => {
                self.geocoding.base_url = value.trim_end_matches('/').to_string();
            }
            ["geocoding", "user_agent"] => {
                self.geocoding.user_agent = value.to_string();
            }
            ["geocoding", "accept_language"] => {
                self.geocoding.accept_language = value.to_string();
            }
            ["geocoding", "timeout_ms"] => {
                self.geocoding.timeout_ms = parse_value(key, value)?;
            }

            ["rate_limit", "min_interval_ms"] => {
                self.rate_limit.min_interval_ms = parse_value(key, value)?;
            }
            ["rate_limit", "max_retries"] => {
                self.rate_limit.max_retries = parse_value(key, value)?;
            }
            ["rate_limit", "retry_delay_ms"] => {
                self.rate_limit.retry_delay_ms = parse_value(key, value)?;
            }
            ["rate_limit", "max_concurrent"] => {
                let max: usize = parse_value(key, value)?;
                if max == 0 {
                    return Err(Error::Config(
                        "rate_limit.max_concurrent must be at least 1".to_string(),
                    ));
                }
                self.rate_limit.max_concurrent = max;
            }
            ["rate_limit", "retry_client_errors"] => {
                self.rate_limit.retry_client_errors = parse_value(key, value)?;
            }

            ["cache", "max_age_secs"] => {
                self.cache.max_age_secs = parse_value(key, value)?;
            }
            ["cache", "max_size"] => {
                self.cache.max_size = parse_value(key, value)?;
            }

            ["picker", "debounce_ms"] => {
                self.picker.debounce_ms = parse_value(key, value)?;
            }
            ["picker", "location_timeout_ms"] => {
                self.picker.location_timeout_ms = parse_value(key, value)?;
            }
            ["picker", "high_accuracy"] => {
                self.picker.high_accuracy = parse_value(key, value)?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(key, value)?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "geocoding.base_url",
            "geocoding.user_agent",
            "geocoding.accept_language",
            "geocoding.timeout_ms",
            "rate_limit.min_interval_ms",
            "rate_limit.max_retries",
            "rate_limit.retry_delay_ms",
            "rate_limit.max_concurrent",
            "rate_limit.retry_client_errors",
            "cache.max_age_secs",
            "cache.max_size",
            "picker.debounce_ms",
            "picker.location_timeout_ms",
            "picker.high_accuracy",
            "server.host",
            "server.port",
        ]
    }

    /// Runtime settings for the geocoding client
    pub fn geocoder_settings(&self) -> GeocoderSettings {
        GeocoderSettings {
            base_url: self.geocoding.base_url.trim_end_matches('/').to_string(),
            user_agent: self.geocoding.user_agent.clone(),
            accept_language: self.geocoding.accept_language.clone(),
            timeout: Duration::from_millis(self.geocoding.timeout_ms),
            min_interval: Duration::from_millis(self.rate_limit.min_interval_ms),
            max_retries: self.rate_limit.max_retries,
            retry_delay: Duration::from_millis(self.rate_limit.retry_delay_ms),
            max_concurrent: self.rate_limit.max_concurrent.max(1),
            retry_client_errors: self.rate_limit.retry_client_errors,
            cache_max_age: Duration::from_secs(self.cache.max_age_secs),
            cache_max_size: self.cache.max_size,
        }
    }

    /// Runtime settings for the location picker
    pub fn picker_settings(&self) -> PickerSettings {
        PickerSettings {
            debounce: Duration::from_millis(self.picker.debounce_ms),
            location_timeout: Duration::from_millis(self.picker.location_timeout_ms),
            high_accuracy: self.picker.high_accuracy,
        }
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
