//! Geofence resolution subsystem.
//!
//! Turns free-text addresses into a center coordinate and a containment
//! radius via Nominatim, with an optional on-disk cache.

pub mod cache;
pub mod providers;
pub mod resolver;
pub mod types;

pub use cache::GeofenceCache;
pub use providers::{Geocoder, NominatimClient, NominatimPlace};
pub use resolver::GeofenceResolver;
pub use types::{Geofence, ResolveError};
