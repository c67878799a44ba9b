//! Root validation against an expected list of countries.

use super::GeoParser;
use crate::models::ParsedPlace;

impl GeoParser {
    /// Geocode a `;`-separated list of country names into their canonical
    /// display names, rejoined with `;`. Names that do not resolve are dropped.
    pub fn geocode_roots(&self, countries: &str) -> String {
        countries
            .split(';')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .filter_map(|country| {
                self.cache
                    .resolve(country)
                    .display_name()
                    .map(|name| name.replace('/', "-"))
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Whether every root of `place` is among the `;`-separated `expected` names.
pub fn root_matches(place: &ParsedPlace, expected: &str) -> bool {
    let expected: Vec<&str> = expected.split(';').map(str::trim).collect();
    place.roots().all(|root| expected.contains(&root))
}
