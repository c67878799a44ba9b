//! Resolved-or-unresolved gazetteer results.

use geo::Geometry;

use crate::geometry::geodesic_area_km2;

/// Result of geocoding one query string.
///
/// A record without a display name never carries geometry or area. Area is
/// derived once from the geometry when the record is built.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    query: String,
    display_name: Option<String>,
    geometry: Option<Geometry<f64>>,
    area_km2: Option<f64>,
}

impl PlaceRecord {
    /// A query the gazetteer could not resolve
    pub fn unresolved(query: &str) -> Self {
        Self {
            query: query.to_string(),
            display_name: None,
            geometry: None,
            area_km2: None,
        }
    }

    /// Build a record from a gazetteer answer.
    ///
    /// Geometry without a display name is discarded.
    pub fn new(query: &str, display_name: Option<String>, geometry: Option<Geometry<f64>>) -> Self {
        let Some(display_name) = display_name else {
            return Self::unresolved(query);
        };
        let area_km2 = geometry.as_ref().and_then(geodesic_area_km2);

        Self {
            query: query.to_string(),
            display_name: Some(display_name),
            geometry,
            area_km2,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Canonical comma-separated name, most specific segment first
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn geometry(&self) -> Option<&Geometry<f64>> {
        self.geometry.as_ref()
    }

    pub fn area_km2(&self) -> Option<f64> {
        self.area_km2
    }

    pub fn is_resolved(&self) -> bool {
        self.display_name.is_some()
    }

    /// Label of the most specific place, e.g. "McMurray" for
    /// "McMurray, Alberta, Canada".
    pub fn leaf_label(&self) -> Option<String> {
        self.display_name
            .as_deref()
            .and_then(|name| name.split(',').next())
            .map(normalize_segment)
    }

    /// Hierarchy path, broadest region first.
    pub fn path(&self) -> Option<Vec<String>> {
        self.display_name
            .as_deref()
            .map(|name| name.split(',').rev().map(normalize_segment).collect())
    }
}

/// Trim a display-name segment and replace path separators.
pub fn normalize_segment(segment: &str) -> String {
    segment.replace('/', "-").trim().to_string()
}

/// Name of the enclosing place: the display name without its first segment.
pub fn parent_query(display_name: &str) -> String {
    match display_name.split_once(',') {
        Some((_, rest)) => rest.trim().to_string(),
        None => String::new(),
    }
}
