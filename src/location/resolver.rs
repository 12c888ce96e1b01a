//! Geofence resolver: address → center + radius.
//!
//! Flow:  cache → geocoder (first result only) → error
//! Offline: cache → error

use super::cache::GeofenceCache;
use super::providers::{self, Geocoder, NominatimClient};
use super::types::{Geofence, ResolveError};
use tracing::{debug, info};

/// Resolves addresses through an optional cache and a geocoder.
pub struct GeofenceResolver<G = NominatimClient> {
    geocoder: G,
    cache: Option<GeofenceCache>,
    offline: bool,
}

impl<G: Geocoder> GeofenceResolver<G> {
    /// Resolver without a cache: every call reaches the geocoder.
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            cache: None,
            offline: false,
        }
    }

    pub fn with_cache(geocoder: G, cache: GeofenceCache) -> Self {
        Self {
            geocoder,
            cache: Some(cache),
            offline: false,
        }
    }

    /// Offline mode answers only from the cache.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Resolve one address.
    ///
    /// Failures are terminal for this address only: no retry, nothing cached.
    pub fn resolve(&mut self, address: &str) -> Result<Geofence, ResolveError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ResolveError::EmptyAddress);
        }

        if let Some(fence) = self.cache.as_ref().and_then(|c| c.get(address)) {
            debug!(address, "geofence cache hit");
            return Ok(fence);
        }

        if self.offline {
            return Err(ResolveError::Offline(address.to_string()));
        }

        let places = self.geocoder.lookup(address)?;
        let first = places
            .first()
            .ok_or_else(|| ResolveError::NotFound(address.to_string()))?;
        let fence = providers::geofence_from_place(first)?;

        info!(
            address,
            lat = fence.coordinates.latitude,
            lon = fence.coordinates.longitude,
            radius_km = fence.radius,
            place = first.display_name.as_deref().unwrap_or("?"),
            "resolved geofence"
        );

        if let Some(cache) = self.cache.as_mut() {
            cache.put(address, &fence);
        }
        Ok(fence)
    }

    pub fn cache(&self) -> Option<&GeofenceCache> {
        self.cache.as_ref()
    }
}
