//! Per-document output records.

use geo::Geometry;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::geometry::GeoJsonGeometry;

/// A place selected for one document.
///
/// In union mode `name` and `root` hold comma-joined lists covering every
/// representative of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPlace {
    pub name: String,
    pub root: String,
    pub geometry: Option<Geometry<f64>>,
    pub area_km2: Option<f64>,
    pub document_index: usize,
}

/// Properties written alongside the geometry in GeoJSON output
#[derive(Debug, Serialize)]
struct PlaceProperties<'a> {
    name: &'a str,
    root: &'a str,
    area_km: Option<f64>,
    join_index: usize,
}

impl ParsedPlace {
    /// Roots covered by this record
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.root.split(',').map(str::trim)
    }

    /// Encode as a GeoJSON feature, merging `extra` into its properties.
    ///
    /// Record fields win over `extra` keys with the same name.
    pub fn to_feature(&self, extra: Map<String, Value>) -> Value {
        let mut properties = extra;
        let own = json!(PlaceProperties {
            name: &self.name,
            root: &self.root,
            area_km: self.area_km2,
            join_index: self.document_index,
        });
        if let Value::Object(own) = own {
            properties.extend(own);
        }

        let geometry = self
            .geometry
            .as_ref()
            .map(|g| json!(GeoJsonGeometry::from_geometry(g)))
            .unwrap_or(Value::Null);

        json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": properties,
        })
    }
}
