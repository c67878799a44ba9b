//! Core data models for the geoparser.

pub mod band;
pub mod output;
pub mod place;

pub use band::AreaBand;
pub use output::ParsedPlace;
pub use place::PlaceRecord;
