//! Campus geofence catalog.
//!
//! Resolves campus addresses into geofences (center + radius estimated from
//! the geocoder's bounding box) and picks event locations at random without
//! repeating a category twice in a row.

pub mod catalog;
pub mod config;
pub mod geo;
pub mod location;
pub mod sampler;
pub mod server;

pub use crate::catalog::{Catalog, CatalogBuild, CatalogError, CatalogSource, LocationEntry, LocationSpec};
pub use crate::config::AppConfig;
pub use crate::geo::{BoundingBox, Coordinate};
pub use crate::location::{Geofence, GeofenceCache, GeofenceResolver, NominatimClient, ResolveError};
pub use crate::sampler::{Pick, SampleError, Sampler};
