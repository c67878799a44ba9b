//! Place-name resolution: from candidate mentions to one place per document.
//!
//! A [`GeoParser`] owns the gazetteer cache shared by every document it
//! processes. Per document it resolves candidates (with a single fallback to
//! trailing word suffixes), builds a forest of administrative paths, climbs
//! from every leaf to the first ancestor whose area fits the configured band,
//! and emits the surviving representatives.

mod aggregate;
mod dispatch;
mod resolver;
mod roots;
mod selector;

use std::sync::Arc;

use hashbrown::HashSet;

pub use dispatch::{BatchOutput, Document};
pub use roots::root_matches;
pub use selector::{Selection, MAX_CLIMB_DEPTH};

use crate::config::ParserConfig;
use crate::extract::{EntityExtractor, HeuristicExtractor, DEFAULT_ENTITY_LABELS};
use crate::gazetteer::{Gazetteer, GazetteerCache};
use crate::models::AreaBand;

pub struct GeoParser {
    cache: GazetteerCache,
    band: AreaBand,
    extractor: Arc<dyn EntityExtractor>,
    entity_labels: HashSet<String>,
    /// Worker threads for batches, 0 for one per core
    threads: usize,
    log_trees: bool,
}

impl GeoParser {
    /// Parser with the heuristic extractor and default entity labels
    pub fn new(gazetteer: Arc<dyn Gazetteer>, band: AreaBand) -> Self {
        Self {
            cache: GazetteerCache::new(gazetteer),
            band,
            extractor: Arc::new(HeuristicExtractor::new()),
            entity_labels: DEFAULT_ENTITY_LABELS.iter().map(|s| s.to_string()).collect(),
            threads: 0,
            log_trees: false,
        }
    }

    pub fn from_config(config: &ParserConfig, gazetteer: Arc<dyn Gazetteer>) -> Self {
        Self::new(gazetteer, config.band())
            .with_entity_labels(config.entity_labels.iter().cloned())
            .with_threads(config.threads)
            .with_tree_logging(config.log_trees)
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn EntityExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_entity_labels<I>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.entity_labels = labels.into_iter().collect();
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Log each document's hierarchy forest at debug level
    pub fn with_tree_logging(mut self, enabled: bool) -> Self {
        self.log_trees = enabled;
        self
    }

    pub fn band(&self) -> AreaBand {
        self.band
    }

    pub fn cache(&self) -> &GazetteerCache {
        &self.cache
    }
}
