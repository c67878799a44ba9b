//! CSV input rows and GeoJSON output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use serde_json::{json, Map, Value};

use geoparse::text::join_fields;
use geoparse::Document;

/// Rows of the input CSV, kept in memory so results can be joined back.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        let headers = reader
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(String::from)
            .collect();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read CSV rows")?;
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of the named column
    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("Column '{}' not found in input", name))
    }

    /// One document per row: the given columns, punctuation-free and joined.
    /// Empty cells are skipped.
    pub fn documents(&self, columns: &[String]) -> Result<Vec<Document>> {
        let indices = columns
            .iter()
            .map(|c| self.column(c))
            .collect::<Result<Vec<_>>>()?;

        Ok(self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let fields = indices
                    .iter()
                    .map(|&col| row.get(col).filter(|v| !v.trim().is_empty()));
                Document::new(i, join_fields(fields))
            })
            .collect())
    }

    /// Value of `column` in row `index`
    pub fn field(&self, index: usize, column: &str) -> Result<Option<&str>> {
        let col = self.column(column)?;
        Ok(self.rows.get(index).and_then(|row| row.get(col)))
    }

    /// All fields of row `index` as GeoJSON properties
    pub fn properties(&self, index: usize) -> Map<String, Value> {
        let mut properties = Map::new();
        if let Some(row) = self.rows.get(index) {
            for (header, value) in self.headers.iter().zip(row.iter()) {
                properties.insert(header.clone(), Value::String(value.to_string()));
            }
        }
        properties
    }
}

/// Write `features` as a FeatureCollection to `output`, or stdout when absent.
pub fn write_collection(features: Vec<Value>, output: Option<&Path>) -> Result<()> {
    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file: {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    serde_json::to_writer(&mut writer, &collection).context("Failed to write output")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
