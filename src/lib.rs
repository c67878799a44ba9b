//! Geoparse - resolve free-text place mentions into administrative places
//!
//! Each document's mentions are looked up in a gazetteer, arranged into
//! administrative hierarchies, and reduced to the places whose area fits a
//! configured band. The `geoparse` binary applies this to CSV rows.

pub mod config;
pub mod extract;
pub mod gazetteer;
pub mod geometry;
pub mod hierarchy;
pub mod models;
pub mod parser;
pub mod text;

pub use config::Config;
pub use models::{AreaBand, ParsedPlace, PlaceRecord};
pub use parser::{BatchOutput, Document, GeoParser};
