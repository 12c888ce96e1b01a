//! Geocoding providers: the Nominatim client and its wire format.

use super::types::{Geofence, ResolveError};
use crate::config::AppConfig;
use crate::geo::{BoundingBox, Coordinate};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Source of raw geocoder results for a free-text address.
///
/// Implementations return the provider's result list in provider order;
/// picking the first entry is the resolver's job.
pub trait Geocoder {
    fn lookup(&mut self, address: &str) -> Result<Vec<NominatimPlace>, ResolveError>;
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn lookup(&mut self, address: &str) -> Result<Vec<NominatimPlace>, ResolveError> {
        (**self).lookup(address)
    }
}

/// Type-erased geocoder, for holders that cannot be generic.
pub type DynGeocoder = Box<dyn Geocoder + Send>;

// ─── Wire format ────────────────────────────────────────────────

/// One entry of a Nominatim `/search?format=json` response.
///
/// Only the fields the resolver reads are mapped: the point and box for the
/// geofence, the display name for its log line.
#[derive(Deserialize, Debug, Clone)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    pub boundingbox: Vec<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Parse a search response body into places.
pub fn parse_search_response(body: &str) -> Result<Vec<NominatimPlace>, ResolveError> {
    serde_json::from_str(body).map_err(|e| ResolveError::InvalidResponse(e.to_string()))
}

/// Derive a geofence from one place: its point as center, half its
/// bounding-box diagonal as radius.
pub fn geofence_from_place(place: &NominatimPlace) -> Result<Geofence, ResolveError> {
    let lat: f64 = parse_decimal("lat", &place.lat)?;
    let lon: f64 = parse_decimal("lon", &place.lon)?;
    let center = Coordinate::new(lat, lon);
    if !center.is_valid() {
        return Err(ResolveError::InvalidResponse(format!(
            "coordinates out of range: {}, {}",
            lat, lon
        )));
    }

    let bbox = BoundingBox::from_nominatim(place.boundingbox.as_slice()).map_err(ResolveError::InvalidResponse)?;
    Ok(Geofence::from_bounding_box(center, &bbox))
}

fn parse_decimal(field: &str, raw: &str) -> Result<f64, ResolveError> {
    raw.trim()
        .parse()
        .map_err(|_| ResolveError::InvalidResponse(format!("{} '{}' is not a decimal", field, raw)))
}

// ─── Nominatim provider ─────────────────────────────────────────

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "CampusGeofence/0.3 (campus-event-locations)";

/// Blocking Nominatim search client.
pub struct NominatimClient {
    base_url: String,
    user_agent: String,
    timeout: Duration,
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl NominatimClient {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            min_interval: Duration::from_millis(1000),
            last_request: None,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            base_url: cfg.nominatim_url().trim_end_matches('/').to_string(),
            user_agent: cfg.user_agent().to_string(),
            timeout: Duration::from_secs(cfg.timeout_secs()),
            min_interval: Duration::from_millis(cfg.request_interval_ms()),
            last_request: None,
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }

    /// Nominatim's usage policy allows at most one request per second.
    fn throttle(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last_request = Some(Instant::now());
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder for NominatimClient {
    fn lookup(&mut self, address: &str) -> Result<Vec<NominatimPlace>, ResolveError> {
        self.throttle();
        debug!(address, url = %self.search_url(), "nominatim search");

        let response = ureq::get(&self.search_url())
            .set("User-Agent", &self.user_agent)
            .timeout(self.timeout)
            .query("q", address)
            .query("format", "json")
            .query("addressdetails", "1")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => ResolveError::Status(code),
                other => ResolveError::Network(other.to_string()),
            })?;

        if response.status() != 200 {
            return Err(ResolveError::Status(response.status()));
        }

        let body = response
            .into_string()
            .map_err(|e| ResolveError::InvalidResponse(e.to_string()))?;
        parse_search_response(&body)
    }
}
