//! Category-diverse random location picker.
//!
//! Each pick excludes the category of the previous pick, falling back to
//! every category when nothing else is left. The previous category is the
//! only state and belongs to one sampler; share a sampler across threads
//! only behind a lock.

use crate::catalog::{Catalog, LocationEntry};
use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// The catalog cannot produce a location. Points at a broken build upstream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("Catalog has no categories")]
    EmptyCatalog,

    #[error("Category '{0}' has no locations")]
    EmptyCategory(String),
}

/// A sampled location as published to clients.
#[derive(Debug, Clone, Serialize)]
pub struct Pick {
    pub category: String,
    pub name: String,
    pub coordinates: Coordinate,
    /// Kilometers.
    pub radius: f64,
    pub created_at: DateTime<Utc>,
}

impl Pick {
    pub fn from_entry(entry: &LocationEntry, created_at: DateTime<Utc>) -> Self {
        Self {
            category: entry.category.clone(),
            name: entry.display_name(),
            coordinates: entry.geofence.coordinates,
            radius: entry.geofence.radius,
            created_at,
        }
    }
}

pub struct Sampler<R = StdRng> {
    catalog: Arc<Catalog>,
    rng: R,
    last_category: Option<String>,
}

impl Sampler<StdRng> {
    /// Sampler seeded from OS entropy.
    pub fn with_entropy(catalog: Arc<Catalog>) -> Self {
        Self::new(catalog, StdRng::from_entropy())
    }

    /// Reproducible sampler.
    pub fn seeded(catalog: Arc<Catalog>, seed: u64) -> Self {
        Self::new(catalog, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Sampler<R> {
    pub fn new(catalog: Arc<Catalog>, rng: R) -> Self {
        Self {
            catalog,
            rng,
            last_category: None,
        }
    }

    /// Pick a location whose category differs from the previous pick's.
    pub fn sample(&mut self) -> Result<LocationEntry, SampleError> {
        let all: Vec<&str> = self.catalog.categories().collect();
        let last = self.last_category.as_deref();
        let mut candidates: Vec<&str> = all.iter().copied().filter(|c| Some(*c) != last).collect();
        if candidates.is_empty() {
            candidates = all;
        }

        let category = *candidates.choose(&mut self.rng).ok_or(SampleError::EmptyCatalog)?;
        self.last_category = Some(category.to_string());

        let entries: Vec<&LocationEntry> = self
            .catalog
            .locations(category)
            .map(|locs| locs.values().collect())
            .unwrap_or_default();
        let entry = entries
            .choose(&mut self.rng)
            .ok_or_else(|| SampleError::EmptyCategory(category.to_string()))?;

        debug!(category, location = %entry.name, "sampled location");
        Ok((*entry).clone())
    }

    /// [`sample`](Self::sample), stamped with the current time.
    pub fn pick(&mut self) -> Result<Pick, SampleError> {
        let entry = self.sample()?;
        Ok(Pick::from_entry(&entry, Utc::now()))
    }

    pub fn last_category(&self) -> Option<&str> {
        self.last_category.as_deref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Geofence;
    use std::collections::HashSet;

    fn fence(lat: f64, lon: f64, radius: f64) -> Geofence {
        Geofence::new(Coordinate::new(lat, lon), radius)
    }

    fn two_categories() -> Arc<Catalog> {
        Arc::new(Catalog::from_entries([
            LocationEntry::new("Library", "Shannon", fence(38.0364, -78.5057, 0.07)),
            LocationEntry::new("Gym", "AFC", fence(38.0330, -78.5130, 0.12)),
        ]))
    }

    fn campus() -> Arc<Catalog> {
        Arc::new(Catalog::from_entries([
            LocationEntry::new("Library", "Shannon", fence(38.0364, -78.5057, 0.07)),
            LocationEntry::new("Library", "Clemons", fence(38.0362, -78.5060, 0.05)),
            LocationEntry::new("Library", "Brown", fence(38.0332, -78.5108, 0.05)),
            LocationEntry::new("Gym", "Slaughter", fence(38.0353, -78.5153, 0.09)),
            LocationEntry::new("Athletic", "JPJ Arena", fence(38.0460, -78.5068, 0.15)),
            LocationEntry::new("Athletic", "Lambeth Field", fence(38.0410, -78.5045, 0.10)),
            LocationEntry::new("Academic", "Rotunda", fence(38.0356, -78.5034, 0.06)),
            LocationEntry::new("Dining", "O-Hill", fence(38.0347, -78.5148, 0.07)),
        ]))
    }

    #[test]
    fn test_no_adjacent_repeat() {
        let mut sampler = Sampler::seeded(campus(), 42);
        let mut prev = sampler.sample().unwrap().category;
        for _ in 0..1000 {
            let next = sampler.sample().unwrap().category;
            assert_ne!(next, prev);
            prev = next;
        }
    }

    #[test]
    fn test_two_categories_alternate() {
        let mut sampler = Sampler::seeded(two_categories(), 7);
        let first = sampler.sample().unwrap();
        let second = sampler.sample().unwrap();
        match first.name.as_str() {
            "Shannon" => assert_eq!((second.name.as_str(), second.category.as_str()), ("AFC", "Gym")),
            "AFC" => assert_eq!((second.name.as_str(), second.category.as_str()), ("Shannon", "Library")),
            other => panic!("unexpected location {}", other),
        }
        // With two categories the sequence is forced to alternate.
        let mut prev = second.category;
        for _ in 0..100 {
            let next = sampler.sample().unwrap().category;
            assert_ne!(next, prev);
            prev = next;
        }
    }

    #[test]
    fn test_single_category_fallback() {
        let catalog = Arc::new(Catalog::from_entries([
            LocationEntry::new("Library", "Shannon", fence(38.0364, -78.5057, 0.07)),
            LocationEntry::new("Library", "Clemons", fence(38.0362, -78.5060, 0.05)),
        ]));
        let mut sampler = Sampler::seeded(catalog, 3);
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let entry = sampler.sample().unwrap();
            assert_eq!(entry.category, "Library");
            seen.insert(entry.name);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_first_pick_unconstrained() {
        let mut firsts = HashSet::new();
        for seed in 0..64 {
            let mut sampler = Sampler::seeded(two_categories(), seed);
            assert!(sampler.last_category().is_none());
            firsts.insert(sampler.sample().unwrap().category);
        }
        assert_eq!(firsts.len(), 2);
    }

    #[test]
    fn test_every_other_category_reachable() {
        let mut sampler = Sampler::seeded(campus(), 11);
        let mut after_library = HashSet::new();
        for _ in 0..2000 {
            let entry = sampler.sample().unwrap();
            if entry.category == "Library" {
                after_library.insert(sampler.sample().unwrap().category);
            }
        }
        let expected: HashSet<String> =
            ["Gym", "Athletic", "Academic", "Dining"].iter().map(|s| s.to_string()).collect();
        assert_eq!(after_library, expected);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = Sampler::seeded(campus(), 99);
        let mut b = Sampler::seeded(campus(), 99);
        for _ in 0..50 {
            assert_eq!(a.sample().unwrap(), b.sample().unwrap());
        }
    }

    #[test]
    fn test_empty_catalog() {
        let mut sampler = Sampler::seeded(Arc::new(Catalog::default()), 1);
        assert_eq!(sampler.sample(), Err(SampleError::EmptyCatalog));
    }

    #[test]
    fn test_empty_category() {
        let catalog = Arc::new(Catalog::default().with_empty_category("Dining"));
        let mut sampler = Sampler::seeded(catalog, 1);
        assert_eq!(sampler.sample(), Err(SampleError::EmptyCategory("Dining".into())));
    }

    #[test]
    fn test_pick_shape() {
        let mut sampler = Sampler::seeded(two_categories(), 5);
        let pick = sampler.pick().unwrap();
        assert!(pick.name == "Shannon Library" || pick.name == "AFC Gym");

        let json = serde_json::to_value(&pick).unwrap();
        assert!(json["coordinates"]["latitude"].is_f64());
        assert!(json["coordinates"]["longitude"].is_f64());
        assert!(json["radius"].is_f64());
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn test_mock_rng_sequence() {
        // StepRng(0, 0) always yields the first candidate.
        let mut sampler = Sampler::new(two_categories(), rand::rngs::mock::StepRng::new(0, 0));
        let categories: Vec<String> = (0..4).map(|_| sampler.sample().unwrap().category).collect();
        assert_eq!(categories, vec!["Gym", "Library", "Gym", "Library"]);
    }
}
