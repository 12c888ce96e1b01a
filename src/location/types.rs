//! Core types for the geofence resolver.

use crate::geo::{BoundingBox, Coordinate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A circular containment area: center plus radius in kilometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub coordinates: Coordinate,
    /// Kilometers.
    pub radius: f64,
}

impl Geofence {
    pub fn new(coordinates: Coordinate, radius: f64) -> Self {
        Self { coordinates, radius }
    }

    /// Center taken as given, radius estimated from the box extent.
    pub fn from_bounding_box(center: Coordinate, bbox: &BoundingBox) -> Self {
        Self {
            coordinates: center,
            radius: bbox.estimate_radius_km(),
        }
    }
}

/// Why an address could not be turned into a geofence.
///
/// Every variant means the address is unresolved; callers drop it and move on.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Address is empty")]
    EmptyAddress,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Geocoder returned HTTP {0}")]
    Status(u16),

    #[error("Address not found: '{0}'")]
    NotFound(String),

    #[error("Invalid geocoder response: {0}")]
    InvalidResponse(String),

    #[error("Offline and no cached geofence for '{0}'")]
    Offline(String),
}
