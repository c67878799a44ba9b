//! In-memory gazetteer, loadable from a JSON file for offline runs.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use geo::Geometry;
use hashbrown::HashMap;
use serde::Deserialize;
use tracing::{info, warn};

use super::{Gazetteer, GazetteerError, GazetteerHit};
use crate::geometry::GeoJsonGeometry;

/// One entry of a gazetteer file:
/// `{"Paris": {"display_name": "Paris, Île-de-France, France", "geojson": {...}}}`
#[derive(Debug, Deserialize)]
struct GazetteerEntry {
    display_name: Option<String>,
    #[serde(default)]
    geojson: Option<GeoJsonGeometry>,
}

/// Fixed query → answer table. Unknown queries get an empty hit.
#[derive(Default)]
pub struct InMemoryGazetteer {
    entries: RwLock<HashMap<String, GazetteerHit>>,
    calls: AtomicUsize,
}

impl InMemoryGazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load entries from a JSON object keyed by query string.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading gazetteer entries from {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read gazetteer file: {}", path.display()))?;
        let raw: std::collections::HashMap<String, GazetteerEntry> =
            serde_json::from_str(&content).context("Failed to parse gazetteer file")?;

        let gazetteer = Self::new();
        for (query, entry) in raw {
            let geometry = entry
                .geojson
                .map(|g| g.to_geometry())
                .transpose()
                .with_context(|| format!("Invalid geometry for '{}'", query))?;
            gazetteer.insert_hit(
                query,
                GazetteerHit {
                    display_name: entry.display_name,
                    geometry,
                },
            );
        }

        info!("Loaded {} gazetteer entries", gazetteer.len());
        Ok(gazetteer)
    }

    pub fn insert(&self, query: &str, display_name: &str, geometry: Option<Geometry<f64>>) {
        self.insert_hit(
            query.to_string(),
            GazetteerHit {
                display_name: Some(display_name.to_string()),
                geometry,
            },
        );
    }

    fn insert_hit(&self, query: String, hit: GazetteerHit) {
        self.write_entries().insert(query, hit);
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, GazetteerHit>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("Gazetteer table lock was poisoned; continuing");
            poisoned.into_inner()
        })
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, GazetteerHit>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Gazetteer table lock was poisoned; continuing");
            poisoned.into_inner()
        })
    }

    /// Number of lookups served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Gazetteer for InMemoryGazetteer {
    fn lookup(&self, query: &str, with_geometry: bool) -> Result<GazetteerHit, GazetteerError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let mut hit = self.read_entries().get(query).cloned().unwrap_or_default();
        if !with_geometry {
            hit.geometry = None;
        }
        Ok(hit)
    }
}
