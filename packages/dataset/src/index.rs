//! R-tree hit testing over tract polygons.
//!
//! The map surface reports pointer positions as longitude/latitude; the
//! index answers which tract (if any) lies under the pointer.

use geo::{BoundingRect, Intersects};
use rstar::{AABB, RTree, RTreeObject};
use tract_explorer_tract_models::LngLat;

use crate::{Dataset, Tract};

/// Envelope of one tract, referring back into the dataset by position.
struct TractEntry {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for TractEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over the tracts of a [`Dataset`].
///
/// Only envelopes are stored; polygons are read from the dataset at query
/// time, so the same dataset must be passed to [`TractIndex::hit_test`].
pub struct TractIndex {
    tree: RTree<TractEntry>,
}

impl TractIndex {
    /// Builds the index. Tracts with empty geometry are skipped.
    #[must_use]
    pub fn build(dataset: &Dataset) -> Self {
        let entries: Vec<TractEntry> = dataset
            .iter()
            .enumerate()
            .filter_map(|(position, tract)| {
                let Some(rect) = tract.geometry().bounding_rect() else {
                    log::warn!("Tract {} has empty geometry; not hit-testable", tract.geoid());
                    return None;
                };
                Some(TractEntry {
                    position,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();

        log::debug!("Indexed {} tracts for hit testing", entries.len());

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Returns the tract under `point`.
    ///
    /// A point on a tract's boundary counts as inside it. Neighbouring tracts
    /// share edges, and malformed input may overlap; either way the tract
    /// earliest in load order wins.
    #[must_use]
    pub fn hit_test<'a>(&self, dataset: &'a Dataset, point: LngLat) -> Option<&'a Tract> {
        let geo_point = geo::Point::new(point.lng, point.lat);
        let query_env = AABB::from_point([point.lng, point.lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .filter_map(|entry| dataset.tracts().get(entry.position))
            .filter(|tract| tract.geometry().intersects(&geo_point))
            .min_by_key(|tract| dataset.position(tract.geoid()))
    }

    /// Number of indexed tracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, load::parse_feature_collection};

    #[test]
    fn hit_test_finds_containing_tract() {
        let dataset =
            parse_feature_collection(&fixtures::squares(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]))
                .unwrap();
        let index = TractIndex::build(&dataset);
        assert_eq!(index.len(), 3);

        let hit = index.hit_test(&dataset, LngLat::new(1.5, 0.5)).unwrap();
        assert_eq!(hit.geoid(), "b");

        let hit = index.hit_test(&dataset, LngLat::new(2.25, 0.75)).unwrap();
        assert_eq!(hit.geoid(), "c");
    }

    #[test]
    fn shared_edge_resolves_to_earliest_tract() {
        let dataset =
            parse_feature_collection(&fixtures::squares(&[("a", 1.0), ("b", 2.0)])).unwrap();
        let index = TractIndex::build(&dataset);

        let hit = index.hit_test(&dataset, LngLat::new(1.0, 0.5)).unwrap();
        assert_eq!(hit.geoid(), "a");

        let hit = index.hit_test(&dataset, LngLat::new(2.0, 0.5)).unwrap();
        assert_eq!(hit.geoid(), "b");

        let hit = index.hit_test(&dataset, LngLat::new(0.0, 0.0)).unwrap();
        assert_eq!(hit.geoid(), "a");
    }

    #[test]
    fn hit_test_outside_is_none() {
        let dataset = parse_feature_collection(&fixtures::squares(&[("a", 1.0)])).unwrap();
        let index = TractIndex::build(&dataset);

        assert!(index.hit_test(&dataset, LngLat::new(5.0, 0.5)).is_none());
        assert!(index.hit_test(&dataset, LngLat::new(0.5, -3.0)).is_none());
    }

    #[test]
    fn empty_dataset_has_empty_index() {
        let index = TractIndex::build(&Dataset::default());
        assert!(index.is_empty());
        assert!(
            index
                .hit_test(&Dataset::default(), LngLat::new(0.0, 0.0))
                .is_none()
        );
    }
}
