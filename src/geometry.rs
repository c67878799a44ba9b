//! Geometry helpers: geodesic area, unions, hull cleanup and GeoJSON conversion.

use geo::{
    BooleanOps, ConvexHull, Coord, GeodesicArea, Geometry, LineString, MultiLineString,
    MultiPoint, MultiPolygon, Point, Polygon, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gazetteer::GazetteerError;

const SQUARE_METERS_PER_KM2: f64 = 1e6;

/// Geodesic area on the WGS84 ellipsoid, in km².
///
/// Returns `None` for geometries that fail validation; those are kept by the
/// caller but never filtered on area.
pub fn geodesic_area_km2(geometry: &Geometry<f64>) -> Option<f64> {
    if !geometry.is_valid() {
        return None;
    }
    let area = geometry.geodesic_area_unsigned() / SQUARE_METERS_PER_KM2;
    area.is_finite().then_some(area)
}

/// Whether the geometry is a polygon or multipolygon
pub fn is_polygonal(geometry: &Geometry<f64>) -> bool {
    matches!(geometry, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
}

/// Replace any non-polygonal geometry by its convex hull.
pub fn clean_geometry(geometry: Geometry<f64>) -> Geometry<f64> {
    if is_polygonal(&geometry) {
        geometry
    } else {
        Geometry::Polygon(geometry.convex_hull())
    }
}

fn to_multi_polygon(geometry: &Geometry<f64>) -> MultiPolygon<f64> {
    match geometry {
        Geometry::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
        Geometry::MultiPolygon(mp) => mp.clone(),
        other => MultiPolygon::new(vec![other.convex_hull()]),
    }
}

/// Geometric union of all given geometries.
///
/// Non-polygonal members contribute their convex hull.
pub fn union_all<'a, I>(geometries: I) -> Option<Geometry<f64>>
where
    I: IntoIterator<Item = &'a Geometry<f64>>,
{
    let mut acc: Option<MultiPolygon<f64>> = None;
    for geometry in geometries {
        let part = to_multi_polygon(geometry);
        acc = Some(match acc {
            Some(merged) => merged.union(&part),
            None => part,
        });
    }

    acc.map(|mp| {
        if mp.0.len() == 1 {
            Geometry::Polygon(mp.0[0].clone())
        } else {
            Geometry::MultiPolygon(mp)
        }
    })
}

/// GeoJSON geometry object as returned by Nominatim and written to output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoJsonGeometry {
    #[serde(rename = "type")]
    pub geo_type: String,
    pub coordinates: Value,
}

type Position = Vec<f64>;

fn coord(position: &[f64]) -> Result<Coord<f64>, GazetteerError> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(GazetteerError::Geometry(format!(
            "position needs two ordinates, got {}",
            position.len()
        ))),
    }
}

fn line(positions: &[Position]) -> Result<LineString<f64>, GazetteerError> {
    positions
        .iter()
        .map(|p| coord(p))
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>, GazetteerError> {
    let mut rings = rings.iter().map(|r| line(r));
    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => return Err(GazetteerError::Geometry("polygon without rings".to_string())),
    };
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_coordinates<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, GazetteerError> {
    serde_json::from_value(value.clone()).map_err(|e| GazetteerError::Geometry(e.to_string()))
}

impl GeoJsonGeometry {
    /// Convert into a `geo` geometry
    pub fn to_geometry(&self) -> Result<Geometry<f64>, GazetteerError> {
        let c = &self.coordinates;
        let geometry = match self.geo_type.as_str() {
            "Point" => Geometry::Point(Point::from(coord(&parse_coordinates::<Position>(c)?)?)),
            "MultiPoint" => {
                let positions: Vec<Position> = parse_coordinates(c)?;
                let points = positions
                    .iter()
                    .map(|p| coord(p).map(Point::from))
                    .collect::<Result<Vec<_>, _>>()?;
                Geometry::MultiPoint(MultiPoint::new(points))
            }
            "LineString" => Geometry::LineString(line(&parse_coordinates::<Vec<Position>>(c)?)?),
            "MultiLineString" => {
                let lines: Vec<Vec<Position>> = parse_coordinates(c)?;
                let lines = lines
                    .iter()
                    .map(|l| line(l))
                    .collect::<Result<Vec<_>, _>>()?;
                Geometry::MultiLineString(MultiLineString::new(lines))
            }
            "Polygon" => Geometry::Polygon(polygon(&parse_coordinates::<Vec<Vec<Position>>>(c)?)?),
            "MultiPolygon" => {
                let polygons: Vec<Vec<Vec<Position>>> = parse_coordinates(c)?;
                let polygons = polygons
                    .iter()
                    .map(|p| polygon(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Geometry::MultiPolygon(MultiPolygon::new(polygons))
            }
            other => {
                return Err(GazetteerError::Geometry(format!(
                    "unsupported geometry type {}",
                    other
                )))
            }
        };
        Ok(geometry)
    }

    /// Encode a `geo` geometry. Geometry kinds GeoJSON has no direct
    /// equivalent for (rects, triangles, lines) are encoded as polygons or
    /// line strings; collections are encoded as their convex hull.
    pub fn from_geometry(geometry: &Geometry<f64>) -> Self {
        fn pos(c: &Coord<f64>) -> Value {
            Value::from(vec![c.x, c.y])
        }
        fn ring(ls: &LineString<f64>) -> Value {
            Value::Array(ls.coords().map(pos).collect())
        }
        fn poly(p: &Polygon<f64>) -> Value {
            let mut rings = vec![ring(p.exterior())];
            rings.extend(p.interiors().iter().map(ring));
            Value::Array(rings)
        }

        let (geo_type, coordinates) = match geometry {
            Geometry::Point(p) => ("Point", pos(&p.0)),
            Geometry::MultiPoint(mp) => (
                "MultiPoint",
                Value::Array(mp.0.iter().map(|p| pos(&p.0)).collect()),
            ),
            Geometry::Line(l) => ("LineString", Value::Array(vec![pos(&l.start), pos(&l.end)])),
            Geometry::LineString(ls) => ("LineString", ring(ls)),
            Geometry::MultiLineString(mls) => (
                "MultiLineString",
                Value::Array(mls.0.iter().map(ring).collect()),
            ),
            Geometry::Polygon(p) => ("Polygon", poly(p)),
            Geometry::MultiPolygon(mp) => (
                "MultiPolygon",
                Value::Array(mp.0.iter().map(poly).collect()),
            ),
            Geometry::Rect(r) => ("Polygon", poly(&r.to_polygon())),
            Geometry::Triangle(t) => ("Polygon", poly(&t.to_polygon())),
            Geometry::GeometryCollection(gc) => ("Polygon", poly(&gc.convex_hull())),
        };

        Self {
            geo_type: geo_type.to_string(),
            coordinates,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Axis-aligned square with its south-west corner at (lon, lat).
    pub(crate) fn square(lon: f64, lat: f64, size: f64) -> Geometry<f64> {
        let ring = vec![
            Coord { x: lon, y: lat },
            Coord { x: lon + size, y: lat },
            Coord { x: lon + size, y: lat + size },
            Coord { x: lon, y: lat + size },
            Coord { x: lon, y: lat },
        ];
        Geometry::Polygon(Polygon::new(LineString::new(ring), vec![]))
    }

    #[test]
    fn test_geodesic_area_of_one_degree_square() {
        // 1°x1° at the equator is roughly 12,300 km²
        let area = geodesic_area_km2(&square(0.0, 0.0, 1.0)).unwrap();
        assert!(area > 12_000.0 && area < 12_500.0, "area = {}", area);
    }

    #[test]
    fn test_invalid_geometry_has_no_area() {
        // Self-intersecting bow tie
        let ring = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 0.0, y: 1.0 },
            Coord { x: 0.0, y: 0.0 },
        ];
        let bow_tie = Geometry::Polygon(Polygon::new(LineString::new(ring), vec![]));
        assert!(geodesic_area_km2(&bow_tie).is_none());
    }

    #[test]
    fn test_clean_geometry_hulls_points() {
        let points = Geometry::MultiPoint(MultiPoint::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ]));
        assert!(matches!(clean_geometry(points), Geometry::Polygon(_)));

        let poly = square(0.0, 0.0, 1.0);
        assert_eq!(clean_geometry(poly.clone()), poly);
    }

    #[test]
    fn test_union_of_disjoint_squares() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(5.0, 5.0, 1.0);
        match union_all([&a, &b]) {
            Some(Geometry::MultiPolygon(mp)) => assert_eq!(mp.0.len(), 2),
            other => panic!("expected multipolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_union_of_overlapping_squares_is_single_polygon() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.5, 0.0, 1.0);
        assert!(matches!(union_all([&a, &b]), Some(Geometry::Polygon(_))));
        assert!(union_all(std::iter::empty()).is_none());
    }

    #[test]
    fn test_geojson_polygon_conversion() {
        let geojson: GeoJsonGeometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        }))
        .unwrap();
        let geometry = geojson.to_geometry().unwrap();
        assert_eq!(geometry, square(0.0, 0.0, 1.0));

        let encoded = GeoJsonGeometry::from_geometry(&geometry);
        assert_eq!(encoded.geo_type, "Polygon");
        assert_eq!(encoded.coordinates, geojson.coordinates);
    }

    #[test]
    fn test_geojson_rejects_unknown_type() {
        let geojson = GeoJsonGeometry {
            geo_type: "Circle".to_string(),
            coordinates: json!([0.0, 0.0]),
        };
        assert!(geojson.to_geometry().is_err());
    }
}
