use crate::catalog::Catalog;
use crate::location::providers::DynGeocoder;
use crate::location::GeofenceResolver;
use crate::sampler::Sampler;
use std::sync::{Arc, Mutex};

pub struct AppState {
    pub catalog: Arc<Catalog>,
    /// One sampler for all clients; the lock keeps "no repeat" across requests.
    pub sampler: Mutex<Sampler>,
    pub resolver: Arc<Mutex<GeofenceResolver<DynGeocoder>>>,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, sampler: Sampler, resolver: GeofenceResolver<DynGeocoder>) -> Self {
        Self {
            catalog,
            sampler: Mutex::new(sampler),
            resolver: Arc::new(Mutex::new(resolver)),
        }
    }
}
