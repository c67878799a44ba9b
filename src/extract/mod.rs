//! Entity extraction: turning document text into candidate place mentions.

mod heuristic;

use hashbrown::HashSet;

pub use heuristic::HeuristicExtractor;

/// Labels kept by default
pub const DEFAULT_ENTITY_LABELS: &[&str] = &["LOC", "GPE"];

/// A labelled span of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub label: String,
    pub text: String,
}

impl EntitySpan {
    pub fn new(label: &str, text: &str) -> Self {
        Self {
            label: label.to_string(),
            text: text.to_string(),
        }
    }
}

/// Named-entity recognizer
pub trait EntityExtractor: Send + Sync {
    /// Entity spans of `text`, in document order
    fn extract(&self, text: &str) -> Vec<EntitySpan>;
}

/// Texts of the spans whose label is in `labels`, in extractor order.
pub fn location_candidates(spans: Vec<EntitySpan>, labels: &HashSet<String>) -> Vec<String> {
    spans
        .into_iter()
        .filter(|span| labels.contains(&span.label))
        .map(|span| span.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_candidates_filters_labels() {
        let labels: HashSet<String> = DEFAULT_ENTITY_LABELS.iter().map(|s| s.to_string()).collect();
        let spans = vec![
            EntitySpan::new("PER", "Jane Doe"),
            EntitySpan::new("LOC", "Alberta"),
            EntitySpan::new("ORG", "Suncor"),
            EntitySpan::new("GPE", "Canada"),
        ];
        assert_eq!(location_candidates(spans, &labels), vec!["Alberta", "Canada"]);
    }
}
