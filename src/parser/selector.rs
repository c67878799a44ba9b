//! Ancestor climbing: pick the granularity whose area fits the band.

use std::sync::Arc;

use tracing::debug;

use super::GeoParser;
use crate::hierarchy::{Forest, NodeId};
use crate::models::place::parent_query;
use crate::models::PlaceRecord;

/// Maximum number of steps from a leaf toward its root
pub const MAX_CLIMB_DEPTH: usize = 10;

/// The node chosen to represent a leaf, with the record that was accepted
#[derive(Debug, Clone)]
pub struct Selection {
    pub node: NodeId,
    pub record: Arc<PlaceRecord>,
    /// Steps climbed from the leaf
    pub depth: usize,
}

impl GeoParser {
    /// Climb from `leaf` toward the root and return the first node whose
    /// resolved area fits the band.
    ///
    /// The leaf is looked up by the raw query that produced it (or its label
    /// when none is known); each ancestor by its child's display name minus
    /// the first segment. Unknown areas are always accepted. Gives up after
    /// [`MAX_CLIMB_DEPTH`] steps or at the root.
    pub fn select_ancestor(&self, forest: &Forest, leaf: NodeId) -> Option<Selection> {
        let label = forest.label(leaf);
        let mut query = self
            .cache
            .leaf_origin(label)
            .unwrap_or_else(|| label.to_string());
        let mut node = leaf;
        let mut depth = 0;

        loop {
            let record = self.cache.resolve(&query);
            if self.band.accepts(record.area_km2()) {
                return Some(Selection {
                    node,
                    record,
                    depth,
                });
            }

            match (forest.parent(node), record.display_name()) {
                (Some(parent), Some(name)) if depth < MAX_CLIMB_DEPTH => {
                    query = parent_query(name);
                    node = parent;
                    depth += 1;
                }
                _ => {
                    debug!(
                        "No ancestor of '{}' fits the area band (stopped at depth {})",
                        label, depth
                    );
                    return None;
                }
            }
        }
    }
}
