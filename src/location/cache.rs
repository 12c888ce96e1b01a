//! File-based geocode cache at ~/.campus_geofence/geocode_cache.json.
//!
//! Keys are addresses, trimmed and lowercased. Only successful resolutions
//! are stored; entries older than the TTL read as misses.

use super::types::Geofence;
use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const MS_PER_DAY: i64 = 24 * 3600 * 1000;

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    lat: f64,
    lon: f64,
    radius_km: f64,
    timestamp: i64,
}

/// The geocode cache.
pub struct GeofenceCache {
    path: PathBuf,
    ttl_ms: i64,
    entries: HashMap<String, CacheEntry>,
}

impl GeofenceCache {
    /// Load cache from the default location.
    pub fn load(ttl_days: i64) -> Self {
        Self::load_from(Self::default_path(), ttl_days)
    }

    /// Load cache from a specific path. A missing or corrupt file starts empty.
    pub fn load_from(path: PathBuf, ttl_days: i64) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        Self {
            path,
            ttl_ms: ttl_days.saturating_mul(MS_PER_DAY),
            entries,
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".campus_geofence")
            .join("geocode_cache.json")
    }

    fn read_file(path: &Path) -> Option<HashMap<String, CacheEntry>> {
        let data = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable geocode cache");
                None
            }
        }
    }

    fn key(address: &str) -> String {
        address.trim().to_lowercase()
    }

    /// Look up an address. Returns None if missing or expired.
    pub fn get(&self, address: &str) -> Option<Geofence> {
        let entry = self.entries.get(&Self::key(address))?;

        let now = chrono::Utc::now().timestamp_millis();
        if now.saturating_sub(entry.timestamp) > self.ttl_ms {
            return None;
        }

        Some(Geofence::new(Coordinate::new(entry.lat, entry.lon), entry.radius_km))
    }

    /// Store a geofence and persist to disk.
    pub fn put(&mut self, address: &str, fence: &Geofence) {
        let entry = CacheEntry {
            lat: fence.coordinates.latitude,
            lon: fence.coordinates.longitude,
            radius_km: fence.radius,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.entries.insert(Self::key(address), entry);
        self.persist();
    }

    /// Write failures are logged, never surfaced: a cache is an optimization.
    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "cannot create cache directory");
                return;
            }
        }
        let result = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&self.path, json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "cannot write geocode cache");
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
