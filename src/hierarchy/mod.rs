//! Administrative hierarchy trees built from resolved display names.

mod tree;

use hashbrown::HashSet;

pub use tree::{Forest, NodeId};

use crate::models::PlaceRecord;

/// Build one tree per distinct root from the display names of `places`.
///
/// Each distinct display name is inserted once, broadest segment first;
/// unresolved records are skipped.
pub fn build_forest<'a, I>(places: I) -> Forest
where
    I: IntoIterator<Item = &'a PlaceRecord>,
{
    let mut forest = Forest::new();
    let mut seen = HashSet::new();

    for place in places {
        let Some(name) = place.display_name() else {
            continue;
        };
        if !seen.insert(name.to_string()) {
            continue;
        }
        if let Some(path) = place.path() {
            forest.insert_path(&path);
        }
    }

    forest
}
