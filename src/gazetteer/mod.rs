//! Gazetteer lookups: the external name → geometry service and its cache.

mod cache;
mod memory;
mod nominatim;

use geo::Geometry;
use thiserror::Error;

pub use cache::GazetteerCache;
pub use memory::InMemoryGazetteer;
pub use nominatim::{NominatimGazetteer, NominatimSettings, DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};

/// Answer from a gazetteer for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GazetteerHit {
    /// Canonical comma-separated name, most specific segment first
    pub display_name: Option<String>,
    pub geometry: Option<Geometry<f64>>,
}

#[derive(Debug, Error)]
pub enum GazetteerError {
    #[error("gazetteer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gazetteer returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed gazetteer response: {0}")]
    Response(String),

    #[error("unusable geometry: {0}")]
    Geometry(String),
}

/// External place-name lookup.
///
/// Implementations must answer identical queries identically so that their
/// results can be memoized.
pub trait Gazetteer: Send + Sync {
    fn lookup(&self, query: &str, with_geometry: bool) -> Result<GazetteerHit, GazetteerError>;
}
