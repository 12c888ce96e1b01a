//! Campus location catalog: category → location name → geofence.
//!
//! Input comes in two leaf shapes, a bare address string or an already
//! resolved geofence. Both normalize to [`LocationSpec`]; only the address
//! leaves go through the resolver. The built [`Catalog`] is read-only.

use crate::location::{Geofence, ResolveError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

const EMBEDDED_CATALOG: &str = include_str!("../data/campus.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ─── Input shape ────────────────────────────────────────────────

/// One catalog leaf, before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationSpec {
    Resolved(Geofence),
    Unresolved(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorySource {
    #[serde(alias = "Locations")]
    pub locations: BTreeMap<String, LocationSpec>,
}

/// Hand-authored catalog document, keyed by category label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogSource {
    pub categories: BTreeMap<String, CategorySource>,
}

impl CatalogSource {
    /// The built-in University of Virginia address table.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let data = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data)
    }

    /// Number of leaves still carrying a bare address.
    pub fn unresolved_count(&self) -> usize {
        self.categories
            .values()
            .flat_map(|c| c.locations.values())
            .filter(|spec| matches!(spec, LocationSpec::Unresolved(_)))
            .count()
    }
}

// ─── Resolved catalog ───────────────────────────────────────────

/// A named campus location with its geofence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationEntry {
    pub category: String,
    pub name: String,
    pub geofence: Geofence,
}

impl LocationEntry {
    pub fn new(category: impl Into<String>, name: impl Into<String>, geofence: Geofence) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            geofence,
        }
    }

    /// "Shannon" in "Library" reads "Shannon Library"; a name already ending
    /// in its category label is kept as is.
    pub fn display_name(&self) -> String {
        let name = self.name.trim_end();
        if name.to_lowercase().ends_with(&self.category.to_lowercase()) {
            name.to_string()
        } else {
            format!("{} {}", name, self.category)
        }
    }
}

/// A location left out of the catalog, and why.
#[derive(Debug)]
pub struct UnresolvedLocation {
    pub category: String,
    pub name: String,
    pub reason: String,
}

/// Outcome of [`Catalog::build`].
#[derive(Debug)]
pub struct CatalogBuild {
    pub catalog: Catalog,
    pub unresolved: Vec<UnresolvedLocation>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    categories: BTreeMap<String, BTreeMap<String, LocationEntry>>,
}

impl Catalog {
    /// Resolve every address leaf with `resolve` and assemble the catalog.
    ///
    /// A leaf that fails is logged, reported in `unresolved` and left out;
    /// a category with nothing left is dropped entirely.
    pub fn build<F>(source: CatalogSource, mut resolve: F) -> CatalogBuild
    where
        F: FnMut(&str) -> Result<Geofence, ResolveError>,
    {
        let mut categories = BTreeMap::new();
        let mut unresolved = Vec::new();

        for (category, group) in source.categories {
            let mut entries = BTreeMap::new();

            for (name, spec) in group.locations {
                let fence = match spec {
                    LocationSpec::Resolved(fence) => check_geofence(fence),
                    LocationSpec::Unresolved(address) => resolve(&address).map_err(|e| e.to_string()),
                };
                match fence {
                    Ok(fence) => {
                        entries.insert(name.clone(), LocationEntry::new(category.clone(), name, fence));
                    }
                    Err(reason) => {
                        warn!(category = %category, location = %name, %reason, "dropping unresolved location");
                        unresolved.push(UnresolvedLocation {
                            category: category.clone(),
                            name,
                            reason,
                        });
                    }
                }
            }

            if entries.is_empty() {
                warn!(category = %category, "category has no resolved locations; dropped");
            } else {
                categories.insert(category, entries);
            }
        }

        let catalog = Catalog { categories };
        info!(
            categories = catalog.categories.len(),
            locations = catalog.len(),
            unresolved = unresolved.len(),
            "catalog built"
        );
        CatalogBuild { catalog, unresolved }
    }

    /// Catalog from already resolved entries.
    pub fn from_entries<I: IntoIterator<Item = LocationEntry>>(entries: I) -> Self {
        let mut categories: BTreeMap<String, BTreeMap<String, LocationEntry>> = BTreeMap::new();
        for entry in entries {
            categories
                .entry(entry.category.clone())
                .or_default()
                .insert(entry.name.clone(), entry);
        }
        Self { categories }
    }

    /// Catalog with an explicitly empty category, for exercising sampler errors.
    #[cfg(test)]
    pub(crate) fn with_empty_category(mut self, category: &str) -> Self {
        self.categories.insert(category.to_string(), BTreeMap::new());
        self
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn locations(&self, category: &str) -> Option<&BTreeMap<String, LocationEntry>> {
        self.categories.get(category)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Total number of locations across categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Fully resolved source document; reloads to an identical catalog.
    pub fn to_source(&self) -> CatalogSource {
        let categories = self
            .categories
            .iter()
            .map(|(category, entries)| {
                let locations = entries
                    .iter()
                    .map(|(name, entry)| (name.clone(), LocationSpec::Resolved(entry.geofence)))
                    .collect();
                (category.clone(), CategorySource { locations })
            })
            .collect();
        CatalogSource { categories }
    }
}

fn check_geofence(fence: Geofence) -> Result<Geofence, String> {
    if !fence.coordinates.is_valid() {
        return Err(format!(
            "coordinates out of range: {}, {}",
            fence.coordinates.latitude, fence.coordinates.longitude
        ));
    }
    if !(fence.radius >= 0.0 && fence.radius.is_finite()) {
        return Err(format!("invalid radius {}", fence.radius));
    }
    Ok(fence)
}
