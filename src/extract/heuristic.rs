//! Capitalization-based location spotting.
//!
//! Stands in for a statistical NER model: every run of capitalized words is
//! reported as a `LOC` span. Leading function words that are capitalized only
//! because they open a sentence are dropped from the run.

use regex::Regex;

use super::{EntityExtractor, EntitySpan};

const LOCATION_LABEL: &str = "LOC";

/// Capitalized words that never start a place name
const LEADING_STOPWORDS: &[&str] = &[
    "A", "An", "And", "At", "But", "By", "For", "From", "In", "Near", "Of", "On", "Or", "The",
    "To", "With",
];

#[derive(Debug, Clone)]
pub struct HeuristicExtractor {
    capitalized_run: Regex,
}

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self {
            capitalized_run: Regex::new(r"\p{Lu}[\p{L}\p{M}'’\-]*(?:\s+\p{Lu}[\p{L}\p{M}'’\-]*)*")
                .expect("static regex is valid"),
        }
    }
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for HeuristicExtractor {
    fn extract(&self, text: &str) -> Vec<EntitySpan> {
        self.capitalized_run
            .find_iter(text)
            .filter_map(|m| {
                let words: Vec<&str> = m
                    .as_str()
                    .split_whitespace()
                    .skip_while(|w| LEADING_STOPWORDS.contains(w))
                    .collect();
                if words.is_empty() {
                    None
                } else {
                    Some(EntitySpan::new(LOCATION_LABEL, &words.join(" ")))
                }
            })
            .collect()
    }
}
