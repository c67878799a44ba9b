//! Process-lifetime memo of gazetteer answers, shared by every worker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use super::Gazetteer;
use crate::models::PlaceRecord;

/// Memoizing wrapper around a [`Gazetteer`].
///
/// Entries are never evicted or replaced: the first record stored for a query
/// is the one every later caller sees. The leaf-origin map remembers which raw
/// query produced each leaf label; later writers overwrite earlier ones.
pub struct GazetteerCache {
    gazetteer: Arc<dyn Gazetteer>,
    places: DashMap<String, Arc<PlaceRecord>>,
    leaf_origins: DashMap<String, String>,
    /// Number of calls made to the underlying gazetteer
    lookups: AtomicU64,
}

impl GazetteerCache {
    pub fn new(gazetteer: Arc<dyn Gazetteer>) -> Self {
        Self {
            gazetteer,
            places: DashMap::new(),
            leaf_origins: DashMap::new(),
            lookups: AtomicU64::new(0),
        }
    }

    /// Resolve a query, consulting the gazetteer only on a cache miss.
    ///
    /// Gazetteer failures are logged and stored as unresolved records.
    pub fn resolve(&self, query: &str) -> Arc<PlaceRecord> {
        if let Some(record) = self.places.get(query) {
            return Arc::clone(record.value());
        }

        // The shard lock is not held across the external call; two workers
        // racing on the same query compute the same record and the first
        // insert wins.
        let record = Arc::new(self.fetch(query));
        Arc::clone(
            self.places
                .entry(query.to_string())
                .or_insert(record)
                .value(),
        )
    }

    fn fetch(&self, query: &str) -> PlaceRecord {
        if query.trim().is_empty() {
            return PlaceRecord::unresolved(query);
        }

        self.lookups.fetch_add(1, Ordering::Relaxed);
        match self.gazetteer.lookup(query, true) {
            Ok(hit) => {
                debug!(
                    "Gazetteer: '{}' -> {:?}",
                    query,
                    hit.display_name.as_deref().unwrap_or("<none>")
                );
                PlaceRecord::new(query, hit.display_name, hit.geometry)
            }
            Err(e) => {
                warn!("Gazetteer lookup failed for '{}': {}", query, e);
                PlaceRecord::unresolved(query)
            }
        }
    }

    /// Remember that `label` was produced by resolving `query`.
    pub fn record_leaf(&self, label: String, query: &str) {
        self.leaf_origins.insert(label, query.to_string());
    }

    /// Raw query that last produced `label`
    pub fn leaf_origin(&self, label: &str) -> Option<String> {
        self.leaf_origins.get(label).map(|q| q.value().clone())
    }

    /// Number of cached queries
    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Calls made to the underlying gazetteer so far
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::{GazetteerError, GazetteerHit, InMemoryGazetteer};
    use crate::geometry::tests::square;

    struct FailingGazetteer;

    impl Gazetteer for FailingGazetteer {
        fn lookup(&self, _query: &str, _with_geometry: bool) -> Result<GazetteerHit, GazetteerError> {
            Err(GazetteerError::Response("service unavailable".to_string()))
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let gazetteer = Arc::new(InMemoryGazetteer::new());
        gazetteer.insert("Alberta", "Alberta, Canada", Some(square(-115.0, 50.0, 5.0)));
        let cache = GazetteerCache::new(gazetteer.clone());

        let first = cache.resolve("Alberta");
        let second = cache.resolve("Alberta");

        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gazetteer.calls(), 1);
        assert_eq!(cache.lookups(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_unknown_queries_are_cached_too() {
        let gazetteer = Arc::new(InMemoryGazetteer::new());
        let cache = GazetteerCache::new(gazetteer.clone());

        assert!(!cache.resolve("Atlantis").is_resolved());
        assert!(!cache.resolve("Atlantis").is_resolved());
        assert_eq!(gazetteer.calls(), 1);
    }

    #[test]
    fn test_failures_become_unresolved_records() {
        let cache = GazetteerCache::new(Arc::new(FailingGazetteer));
        let record = cache.resolve("Paris");
        assert_eq!(record.query(), "Paris");
        assert!(!record.is_resolved());
        assert!(record.area_km2().is_none());
    }

    #[test]
    fn test_empty_query_skips_gazetteer() {
        let gazetteer = Arc::new(InMemoryGazetteer::new());
        let cache = GazetteerCache::new(gazetteer.clone());
        assert!(!cache.resolve("  ").is_resolved());
        assert_eq!(gazetteer.calls(), 0);
    }

    #[test]
    fn test_leaf_origin_last_writer_wins() {
        let cache = GazetteerCache::new(Arc::new(InMemoryGazetteer::new()));
        cache.record_leaf("Springfield".to_string(), "Springfield Illinois");
        cache.record_leaf("Springfield".to_string(), "Springfield Oregon");
        assert_eq!(
            cache.leaf_origin("Springfield").as_deref(),
            Some("Springfield Oregon")
        );
        assert!(cache.leaf_origin("Shelbyville").is_none());
    }

    #[test]
    fn test_concurrent_resolution_is_consistent() {
        use rayon::prelude::*;

        let gazetteer = Arc::new(InMemoryGazetteer::new());
        gazetteer.insert("Alberta", "Alberta, Canada", Some(square(-115.0, 50.0, 5.0)));
        let cache = GazetteerCache::new(gazetteer);

        let records: Vec<_> = (0..64).into_par_iter().map(|_| cache.resolve("Alberta")).collect();
        let first = &records[0];
        assert!(records.iter().all(|r| Arc::ptr_eq(r, first)));
        assert_eq!(cache.len(), 1);
    }
}
