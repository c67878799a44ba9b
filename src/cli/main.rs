//! Geoparse CSV rows.
//!
//! Mines the selected text columns of every row for place names, resolves
//! them against a gazetteer and writes the selected places as GeoJSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geoparse::gazetteer::{Gazetteer, InMemoryGazetteer, NominatimGazetteer};
use geoparse::geometry::clean_geometry;
use geoparse::parser::root_matches;
use geoparse::{Config, GeoParser};

mod table;
use table::{write_collection, Table};

#[derive(Parser, Debug)]
#[command(name = "geoparse")]
#[command(about = "Resolve place names in CSV rows into administrative places")]
struct Args {
    /// Input CSV file with a header row
    #[arg(short, long)]
    input: PathBuf,

    /// Comma-separated text columns to mine
    #[arg(short, long, value_delimiter = ',', required = true)]
    columns: Vec<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Smallest accepted area in km²
    #[arg(long)]
    area_low: Option<f64>,

    /// Largest accepted area in km²
    #[arg(long)]
    area_high: Option<f64>,

    /// Emit one record per selected place instead of one per row
    #[arg(long)]
    no_union: bool,

    /// Column of `;`-separated countries every selected root must belong to
    #[arg(long)]
    root_column: Option<String>,

    /// Offline gazetteer JSON file used instead of Nominatim
    #[arg(long, conflicts_with = "endpoint")]
    gazetteer_file: Option<PathBuf>,

    /// Nominatim endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Output GeoJSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args);
    config.validate()?;

    info!("Geoparse");
    info!("Input: {}", args.input.display());

    let gazetteer: Arc<dyn Gazetteer> = match &args.gazetteer_file {
        Some(path) => Arc::new(InMemoryGazetteer::load_from_file(path)?),
        None => {
            info!("Using Nominatim at {}", config.gazetteer.endpoint);
            Arc::new(NominatimGazetteer::new(config.gazetteer.settings())?)
        }
    };
    let parser = GeoParser::from_config(&config.parser, gazetteer);

    let table = Table::read(&args.input)?;
    let documents = table.documents(&args.columns)?;
    info!("Loaded {} rows", table.len());

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );
    let mut output = parser.parse_batch(&documents, config.parser.union, Some(&pb))?;
    pb.finish_and_clear();

    if let Some(column) = &args.root_column {
        table.column(column)?;
        let rejected = output.retain(|record| {
            let countries = table
                .field(record.document_index, column)
                .ok()
                .flatten()
                .unwrap_or("");
            root_matches(record, &parser.geocode_roots(countries))
        });
        if rejected > 0 {
            warn!("Dropped {} records outside their expected countries", rejected);
        }
    }

    info!(
        "Conversion rate: {:.2}% ({} of {} rows geoparsed)",
        output.conversion_rate() * 100.0,
        output.documents_with_places,
        output.documents
    );

    let features: Vec<_> = output
        .records
        .into_iter()
        .map(|mut record| {
            record.geometry = record.geometry.take().map(clean_geometry);
            record.to_feature(table.properties(record.document_index))
        })
        .collect();

    info!("Writing {} features", features.len());
    write_collection(features, args.output.as_deref())?;

    Ok(())
}

/// Command-line flags take precedence over the configuration file.
fn apply_overrides(config: &mut Config, args: &Args) {
    if args.area_low.is_some() {
        config.parser.area_low = args.area_low;
    }
    if args.area_high.is_some() {
        config.parser.area_high = args.area_high;
    }
    if args.no_union {
        config.parser.union = false;
    }
    if let Some(threads) = args.threads {
        config.parser.threads = threads;
    }
    if let Some(endpoint) = &args.endpoint {
        config.gazetteer.endpoint = endpoint.clone();
    }
    if args.verbose {
        config.parser.log_trees = true;
    }
}
