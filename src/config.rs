//! Application configuration: geocoder endpoint, cache, catalog, server.
//!
//! Read from `GEOFENCE_*` environment variables (a `.env` file is honored)
//! and, when `GEOFENCE_CONFIG` names one, a config file. CLI flags override.

use crate::location::providers::{DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_CACHE_TTL_DAYS: i64 = 30;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppConfig {
    /// Nominatim base URL. Read from GEOFENCE_NOMINATIM_URL.
    #[serde(default)]
    pub nominatim_url: Option<String>,

    /// Client identification sent with every geocoder request. Read from GEOFENCE_USER_AGENT.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds. Read from GEOFENCE_TIMEOUT_SECS.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Minimum spacing between geocoder requests. Read from GEOFENCE_REQUEST_INTERVAL_MS.
    #[serde(default)]
    pub request_interval_ms: Option<u64>,

    /// Geocode cache file. Read from GEOFENCE_CACHE_PATH.
    #[serde(default)]
    pub cache_path: Option<String>,

    /// Cache entry lifetime in days. Read from GEOFENCE_CACHE_TTL_DAYS.
    #[serde(default)]
    pub cache_ttl_days: Option<i64>,

    /// Catalog JSON file; the embedded campus table is used when unset. Read from GEOFENCE_CATALOG_PATH.
    #[serde(default)]
    pub catalog_path: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("GEOFENCE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("GEOFENCE").try_parsing(true));
        c.build()?.try_deserialize()
    }

    pub fn nominatim_url(&self) -> &str {
        self.nominatim_url.as_deref().unwrap_or(DEFAULT_NOMINATIM_URL)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn request_interval_ms(&self) -> u64 {
        self.request_interval_ms.unwrap_or(DEFAULT_REQUEST_INTERVAL_MS)
    }

    /// Cache file, defaulting to `~/.campus_geofence/geocode_cache.json`.
    pub fn cache_path(&self) -> PathBuf {
        match &self.cache_path {
            Some(p) => PathBuf::from(p),
            None => crate::location::cache::GeofenceCache::default_path(),
        }
    }

    pub fn cache_ttl_days(&self) -> i64 {
        self.cache_ttl_days.unwrap_or(DEFAULT_CACHE_TTL_DAYS)
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog_path.as_ref().map(PathBuf::from)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}
