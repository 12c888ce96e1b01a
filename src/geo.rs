//! Geodesic helpers: coordinates, bounding boxes, and radius estimation.
//!
//! Distances use the haversine formula on a sphere of mean Earth radius.
//! Good to ~0.5% against the ellipsoid, which is far tighter than the
//! bounding-box radius estimate it feeds.

use serde::{Deserialize, Serialize};

/// IUGG mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "lattitude")]
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both axes inside their standard ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Great-circle distance between two coordinates, in kilometers.
pub fn great_circle_km(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards asin against h drifting a hair above 1.0 for antipodes.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Axis-aligned lat/lon rectangle around a geocoded place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Parse Nominatim's `boundingbox` array.
    ///
    /// The provider documents the order as `[south, north, west, east]`,
    /// i.e. `(min_lat, max_lat, min_lon, max_lon)`.
    pub fn from_nominatim<S: AsRef<str>>(raw: &[S]) -> Result<Self, String> {
        if raw.len() != 4 {
            return Err(format!("boundingbox has {} elements, expected 4", raw.len()));
        }

        let mut vals = [0.0_f64; 4];
        for (slot, s) in vals.iter_mut().zip(raw) {
            let s = s.as_ref().trim();
            *slot = s
                .parse()
                .map_err(|_| format!("boundingbox value '{}' is not a decimal", s))?;
        }
        let [min_lat, max_lat, min_lon, max_lon] = vals;

        let bbox = Self { min_lat, max_lat, min_lon, max_lon };
        if !bbox.south_west().is_valid() || !bbox.north_east().is_valid() {
            return Err(format!("boundingbox out of range: {:?}", vals));
        }
        Ok(bbox)
    }

    pub fn south_west(&self) -> Coordinate {
        Coordinate::new(self.min_lat, self.min_lon)
    }

    pub fn north_east(&self) -> Coordinate {
        Coordinate::new(self.max_lat, self.max_lon)
    }

    /// Corner-to-corner surface distance in kilometers.
    pub fn diagonal_km(&self) -> f64 {
        great_circle_km(self.south_west(), self.north_east())
    }

    /// Radius of a circle roughly circumscribing the box: half the diagonal.
    ///
    /// Deliberately coarse. A box collapsed to a point yields 0.
    pub fn estimate_radius_km(&self) -> f64 {
        self.diagonal_km() / 2.0
    }
}
