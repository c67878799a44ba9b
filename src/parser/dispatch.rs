//! Parallel batch processing: one task per document on a rayon pool.

use anyhow::{Context, Result};
use hashbrown::HashSet;
use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::info;

use super::GeoParser;
use crate::models::ParsedPlace;

/// A text to mine, with the index used to join results back to its source
#[derive(Debug, Clone)]
pub struct Document {
    pub index: usize,
    pub text: String,
}

impl Document {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Records of a whole batch, ordered by document index
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub records: Vec<ParsedPlace>,
    pub documents: usize,
    /// Documents with at least one record carrying a geometry
    pub documents_with_places: usize,
}

impl BatchOutput {
    pub fn new(records: Vec<ParsedPlace>, documents: usize) -> Self {
        let mut output = Self {
            records,
            documents,
            documents_with_places: 0,
        };
        output.recount();
        output
    }

    fn recount(&mut self) {
        self.documents_with_places = self
            .records
            .iter()
            .filter(|r| r.geometry.is_some())
            .map(|r| r.document_index)
            .collect::<HashSet<_>>()
            .len();
    }

    /// Keep only the records matching `keep`. Returns how many were dropped.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&ParsedPlace) -> bool,
    {
        let before = self.records.len();
        self.records.retain(keep);
        self.recount();
        before - self.records.len()
    }

    /// Share of documents geoparsed: those with a located record over all
    /// documents.
    pub fn conversion_rate(&self) -> f64 {
        if self.documents == 0 {
            0.0
        } else {
            self.documents_with_places as f64 / self.documents as f64
        }
    }
}

impl GeoParser {
    /// Parse every document in parallel.
    ///
    /// Workers share the gazetteer cache; completion order is irrelevant
    /// because each record carries its document index.
    pub fn parse_batch(
        &self,
        documents: &[Document],
        union: bool,
        progress: Option<&ProgressBar>,
    ) -> Result<BatchOutput> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .context("Failed to build worker pool")?;

        info!(
            "Parsing {} documents on {} threads",
            documents.len(),
            pool.current_num_threads()
        );

        let mut records: Vec<ParsedPlace> = pool.install(|| {
            documents
                .par_iter()
                .flat_map_iter(|doc| {
                    let places = self.parse_text(&doc.text, union, doc.index);
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                    places
                })
                .collect()
        });
        records.sort_by_key(|r| r.document_index);

        info!(
            "Parsed {} documents into {} records ({} gazetteer lookups, {} cached queries)",
            documents.len(),
            records.len(),
            self.cache.lookups(),
            self.cache.len()
        );

        Ok(BatchOutput::new(records, documents.len()))
    }
}
