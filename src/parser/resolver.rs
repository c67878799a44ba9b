//! Candidate resolution with a single level of suffix fallback.

use std::sync::Arc;

use hashbrown::HashSet;
use tracing::debug;

use super::GeoParser;
use crate::models::PlaceRecord;

/// How many times an unresolved candidate may be decomposed
const MAX_FALLBACK_DEPTH: u8 = 1;

/// Every trailing word suffix of `candidate`, longest first:
/// "Fort McMurray Alberta" -> ["Fort McMurray Alberta", "McMurray Alberta", "Alberta"]
pub fn trailing_suffixes(candidate: &str) -> Vec<String> {
    let tokens: Vec<&str> = candidate.split_whitespace().collect();
    (0..tokens.len()).map(|i| tokens[i..].join(" ")).collect()
}

impl GeoParser {
    /// Resolve a document's candidate strings.
    ///
    /// A candidate the gazetteer cannot resolve is retried once as the list of
    /// its trailing word suffixes. Every resolved query records its leaf label
    /// in the shared leaf-origin map. Returns the resolved records of this
    /// document, one per distinct query, in resolution order.
    pub fn resolve_candidates<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<Arc<PlaceRecord>> {
        let mut resolved = Vec::new();
        let mut seen = HashSet::new();

        // Work stack; suffixes are pushed in front of the remaining
        // candidates so resolution order matches a depth-first walk.
        let mut pending: Vec<(String, u8)> = candidates
            .iter()
            .rev()
            .map(|c| (c.as_ref().to_string(), 0))
            .collect();

        while let Some((query, depth)) = pending.pop() {
            let record = self.cache.resolve(&query);

            match record.leaf_label() {
                Some(label) => {
                    self.cache.record_leaf(label, &query);
                    if seen.insert(query) {
                        resolved.push(record);
                    }
                }
                None if depth < MAX_FALLBACK_DEPTH => {
                    debug!("Decomposing unresolved candidate '{}'", query);
                    pending.extend(
                        trailing_suffixes(&query)
                            .into_iter()
                            .rev()
                            .map(|suffix| (suffix, depth + 1)),
                    );
                }
                None => {}
            }
        }

        resolved
    }
}
