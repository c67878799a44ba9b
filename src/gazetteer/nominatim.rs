//! Nominatim search client.

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use geo::Geometry;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{Gazetteer, GazetteerError, GazetteerHit};
use crate::geometry::GeoJsonGeometry;

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "geoparse/0.1 (place-name resolver)";

/// Connection settings for a Nominatim instance
#[derive(Debug, Clone)]
pub struct NominatimSettings {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Minimum spacing between two outbound requests, across all threads
    pub min_interval: Duration,
    pub max_attempts: u32,
}

impl Default for NominatimSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            min_interval: Duration::from_millis(1000),
            max_attempts: 2,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    display_name: Option<String>,
    /// Kept raw so a malformed geometry cannot fail the whole response
    #[serde(default)]
    geojson: Option<Value>,
}

/// Gazetteer backed by the Nominatim `/search` API
pub struct NominatimGazetteer {
    client: Client,
    search_url: String,
    settings: NominatimSettings,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGazetteer {
    pub fn new(settings: NominatimSettings) -> Result<Self, GazetteerError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client,
            search_url: format!("{}/search", settings.endpoint.trim_end_matches('/')),
            settings,
            last_request: Mutex::new(None),
        })
    }

    /// Block until the courtesy interval since the previous request has passed.
    fn throttle(&self) {
        let mut last = self.last_request.lock().unwrap_or_else(|poisoned| {
            warn!("Request throttle lock was poisoned; continuing");
            poisoned.into_inner()
        });
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.settings.min_interval {
                thread::sleep(self.settings.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }

    fn search(&self, query: &str, with_geometry: bool) -> Result<GazetteerHit, GazetteerError> {
        self.throttle();

        let mut params = vec![("q", query), ("format", "jsonv2"), ("limit", "1")];
        if with_geometry {
            params.push(("polygon_geojson", "1"));
        }

        let url = Url::parse_with_params(&self.search_url, &params)
            .map_err(|e| GazetteerError::Response(e.to_string()))?;

        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(GazetteerError::Status(response.status()));
        }

        let results: Vec<SearchResult> = response
            .json()
            .map_err(|e| GazetteerError::Response(e.to_string()))?;

        Ok(best_hit(query, results, with_geometry))
    }
}

fn parse_geometry(geojson: Value) -> Result<Geometry<f64>, GazetteerError> {
    serde_json::from_value::<GeoJsonGeometry>(geojson)
        .map_err(|e| GazetteerError::Geometry(e.to_string()))?
        .to_geometry()
}

/// First search result as a hit. A geometry that cannot be converted is
/// dropped so the name still resolves, with unknown area.
fn best_hit(query: &str, results: Vec<SearchResult>, with_geometry: bool) -> GazetteerHit {
    let Some(best) = results.into_iter().next() else {
        return GazetteerHit::default();
    };

    let geometry = match (with_geometry, best.geojson) {
        (true, Some(geojson)) => match parse_geometry(geojson) {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                warn!("Discarding geometry for '{}': {}", query, e);
                None
            }
        },
        _ => None,
    };

    GazetteerHit {
        display_name: best.display_name,
        geometry,
    }
}

impl Gazetteer for NominatimGazetteer {
    fn lookup(&self, query: &str, with_geometry: bool) -> Result<GazetteerHit, GazetteerError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.search(query, with_geometry) {
                Ok(hit) => {
                    debug!("Nominatim answered '{}' (attempt {})", query, attempts);
                    return Ok(hit);
                }
                // Bad payloads do not get better on retry
                Err(e @ GazetteerError::Response(_)) => {
                    return Err(e)
                }
                Err(e) if attempts < max_attempts => {
                    warn!(
                        "Nominatim request failed (attempt {}/{}): {}",
                        attempts, max_attempts, e
                    );
                    thread::sleep(Duration::from_secs(2));
                }
                Err(e) => return Err(e),
            }
        }
    }
}
