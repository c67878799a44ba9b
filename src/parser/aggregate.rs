//! Per-document aggregation of selected representatives.

use hashbrown::HashSet;
use tracing::debug;

use super::{GeoParser, Selection};
use crate::extract::location_candidates;
use crate::geometry::union_all;
use crate::hierarchy::{build_forest, Forest};
use crate::models::ParsedPlace;

/// Identity of a representative: its root and the labels from root to node.
///
/// Two leaves climbing to the same ancestor share a key even if the ancestor
/// was reached through different records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RepresentativeKey {
    root: String,
    path: Vec<String>,
}

impl RepresentativeKey {
    fn of(forest: &Forest, selection: &Selection) -> Self {
        Self {
            root: forest.label(forest.root_of(selection.node)).to_string(),
            path: forest
                .path(selection.node)
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl GeoParser {
    /// Mine `text` for place mentions and resolve them.
    pub fn parse_text(&self, text: &str, union: bool, document_index: usize) -> Vec<ParsedPlace> {
        let spans = self.extractor.extract(text);
        let candidates = location_candidates(spans, &self.entity_labels);
        self.parse_candidates(&candidates, union, document_index)
    }

    /// Resolve one document's candidate strings into output records.
    ///
    /// In union mode all representatives collapse into a single record; the
    /// result is empty when no leaf finds an acceptable ancestor.
    pub fn parse_candidates<S: AsRef<str>>(
        &self,
        candidates: &[S],
        union: bool,
        document_index: usize,
    ) -> Vec<ParsedPlace> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let places = self.resolve_candidates(candidates);
        let forest = build_forest(places.iter().map(|p| p.as_ref()));
        if self.log_trees && !forest.is_empty() {
            debug!("Document {} hierarchy:\n{}", document_index, forest.render());
        }

        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        for leaf in forest.leaves() {
            let Some(selection) = self.select_ancestor(&forest, leaf) else {
                continue;
            };
            if seen.insert(RepresentativeKey::of(&forest, &selection)) {
                selected.push(selection);
            }
        }

        let records: Vec<ParsedPlace> = selected
            .iter()
            .map(|s| ParsedPlace {
                name: forest.label(s.node).to_string(),
                root: forest.label(forest.root_of(s.node)).to_string(),
                geometry: s.record.geometry().cloned(),
                area_km2: s.record.area_km2(),
                document_index,
            })
            .collect();

        if union && !records.is_empty() {
            vec![merge_places(&records, document_index)]
        } else {
            records
        }
    }
}

/// Collapse several records into one: names and roots comma-joined, geometries
/// unioned, known areas summed.
fn merge_places(places: &[ParsedPlace], document_index: usize) -> ParsedPlace {
    let areas: Vec<f64> = places.iter().filter_map(|p| p.area_km2).collect();
    let area_km2 = if areas.is_empty() {
        None
    } else {
        Some(areas.iter().sum())
    };

    ParsedPlace {
        name: places
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(","),
        root: places
            .iter()
            .map(|p| p.root.as_str())
            .collect::<Vec<_>>()
            .join(","),
        geometry: union_all(places.iter().filter_map(|p| p.geometry.as_ref())),
        area_km2,
        document_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{EntityExtractor, EntitySpan};
    use crate::gazetteer::InMemoryGazetteer;
    use crate::geometry::{geodesic_area_km2, tests::square};
    use crate::models::AreaBand;
    use crate::parser::tests::alberta_gazetteer;
    use crate::text::join_fields;
    use geo::Geometry;
    use std::sync::Arc;

    fn two_town_gazetteer() -> Arc<InMemoryGazetteer> {
        let gazetteer = Arc::new(InMemoryGazetteer::new());
        gazetteer.insert("TownA", "TownA, Region, Country", Some(square(0.0, 0.0, 0.03)));
        gazetteer.insert("TownB", "TownB, Region, Country", Some(square(5.0, 5.0, 0.04)));
        gazetteer.insert("Region, Country", "Region, Country", Some(square(0.0, 0.0, 6.0)));
        gazetteer.insert("Country", "Country", Some(square(0.0, 0.0, 20.0)));
        gazetteer
    }

    #[test]
    fn test_union_mode_emits_single_record() {
        let parser = GeoParser::new(two_town_gazetteer(), AreaBand::default());
        let records = parser.parse_candidates(&["TownA", "TownB"], true, 7);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "TownA,TownB");
        assert_eq!(record.root, "Country,Country");
        assert_eq!(record.document_index, 7);

        let a = geodesic_area_km2(&square(0.0, 0.0, 0.03)).unwrap();
        let b = geodesic_area_km2(&square(5.0, 5.0, 0.04)).unwrap();
        assert!((record.area_km2.unwrap() - (a + b)).abs() < 1e-6);

        match &record.geometry {
            Some(Geometry::MultiPolygon(mp)) => assert_eq!(mp.0.len(), 2),
            other => panic!("expected union of two polygons, got {:?}", other),
        }
    }

    #[test]
    fn test_non_union_mode_emits_one_record_per_representative() {
        let parser = GeoParser::new(two_town_gazetteer(), AreaBand::default());
        let records = parser.parse_candidates(&["TownA", "TownB"], false, 3);

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.document_index == 3));
        assert_eq!(records[0].name, "TownA");
        assert_eq!(records[1].name, "TownB");
    }

    #[test]
    fn test_leaves_climbing_to_same_ancestor_are_deduplicated() {
        // Both towns are too small; both climb to the shared region
        let parser = GeoParser::new(two_town_gazetteer(), AreaBand::new(Some(1000.0), None));
        let records = parser.parse_candidates(&["TownA", "TownB"], false, 0);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Region");
        assert_eq!(records[0].root, "Country");
    }

    #[test]
    fn test_nothing_resolvable_yields_empty_result() {
        let parser = GeoParser::new(Arc::new(InMemoryGazetteer::new()), AreaBand::default());
        assert!(parser.parse_candidates(&["Atlantis"], true, 0).is_empty());
        assert!(parser.parse_candidates::<&str>(&[], true, 0).is_empty());
    }

    #[test]
    fn test_rejected_leaves_yield_empty_result() {
        let parser = GeoParser::new(two_town_gazetteer(), AreaBand::new(None, Some(0.001)));
        assert!(parser.parse_candidates(&["TownA"], true, 0).is_empty());
    }

    #[test]
    fn test_fort_mcmurray_end_to_end() {
        let parser = GeoParser::new(alberta_gazetteer(), AreaBand::default());
        let text = join_fields([Some("Fort McMurray, Alberta")]);

        let records = parser.parse_text(&text, false, 12);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "McMurray");
        assert_eq!(records[0].root, "Canada");
        assert_eq!(records[0].document_index, 12);
        assert_eq!(
            parser.cache().leaf_origin("McMurray").as_deref(),
            Some("McMurray Alberta")
        );
    }

    struct FixedExtractor;

    impl EntityExtractor for FixedExtractor {
        fn extract(&self, _text: &str) -> Vec<EntitySpan> {
            vec![
                EntitySpan::new("PER", "Alberta"),
                EntitySpan::new("GPE", "Canada"),
            ]
        }
    }

    #[test]
    fn test_only_allowed_labels_become_candidates() {
        let parser = GeoParser::new(alberta_gazetteer(), AreaBand::default())
            .with_extractor(Arc::new(FixedExtractor));
        let records = parser.parse_text("ignored", false, 0);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Canada");
        assert!(parser.cache().leaf_origin("Alberta").is_none());
    }
}
