#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tract dataset loading, lookup, and point-in-polygon hit testing.
//!
//! The dataset is a single `GeoJSON` `FeatureCollection` of census tracts,
//! loaded once (from disk or a single HTTP GET) and never mutated. Each
//! feature becomes a [`Tract`] keyed by its unique `GEOID`. A
//! [`TractIndex`] provides R-tree backed hit testing for pointer events.

pub mod index;
pub mod load;

use std::collections::BTreeMap;

use geo::{BoundingRect, MultiPolygon};
use thiserror::Error;
use tract_explorer_tract_models::{Bounds, TractProperties};

pub use index::TractIndex;
pub use load::{DatasetSource, load};

/// Errors that can occur while loading the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Reading the local file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Request for {url} failed with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document is valid `GeoJSON` but not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// A feature lacks a usable identifier or geometry.
    #[error("Invalid feature at index {index}: {message}")]
    InvalidFeature {
        /// Position of the feature in the collection.
        index: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Two features share a `GEOID`.
    #[error("Duplicate GEOID: {geoid}")]
    DuplicateGeoid {
        /// The repeated identifier.
        geoid: String,
    },
}

/// One census tract.
#[derive(Debug, Clone)]
pub struct Tract {
    geoid: String,
    name: String,
    geometry: MultiPolygon<f64>,
    bounds: Option<Bounds>,
    properties: TractProperties,
}

impl Tract {
    /// Creates a tract, computing its bounding box from the geometry.
    #[must_use]
    pub fn new(
        geoid: impl Into<String>,
        name: impl Into<String>,
        geometry: MultiPolygon<f64>,
        properties: TractProperties,
    ) -> Self {
        let bounds = geometry
            .bounding_rect()
            .map(|rect| Bounds::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y));

        Self {
            geoid: geoid.into(),
            name: name.into(),
            geometry,
            bounds,
            properties,
        }
    }

    /// Census GEOID.
    #[must_use]
    pub fn geoid(&self) -> &str {
        &self.geoid
    }

    /// Display name (e.g. `"40.02"`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tract polygons.
    #[must_use]
    pub const fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Bounding box of the geometry, `None` for an empty geometry.
    #[must_use]
    pub const fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Metric properties.
    #[must_use]
    pub const fn properties(&self) -> &TractProperties {
        &self.properties
    }

    /// Numeric value of `metric`, `None` when missing.
    #[must_use]
    pub fn metric(&self, metric: &str) -> Option<f64> {
        self.properties.metric(metric)
    }

    /// Numeric value of `metric`, treating missing as zero.
    #[must_use]
    pub fn metric_or_zero(&self, metric: &str) -> f64 {
        self.properties.metric_or_zero(metric)
    }
}

/// The loaded, immutable sequence of tracts.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    tracts: Vec<Tract>,
    by_geoid: BTreeMap<String, usize>,
}

impl Dataset {
    /// Builds a dataset, enforcing `GEOID` uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::DuplicateGeoid`] if two tracts share a
    /// `GEOID`.
    pub fn new(tracts: Vec<Tract>) -> Result<Self, DatasetError> {
        let mut by_geoid = BTreeMap::new();
        for (position, tract) in tracts.iter().enumerate() {
            if by_geoid.insert(tract.geoid.clone(), position).is_some() {
                return Err(DatasetError::DuplicateGeoid {
                    geoid: tract.geoid.clone(),
                });
            }
        }
        Ok(Self { tracts, by_geoid })
    }

    /// Looks up a tract by `GEOID`.
    #[must_use]
    pub fn get(&self, geoid: &str) -> Option<&Tract> {
        self.by_geoid.get(geoid).map(|&idx| &self.tracts[idx])
    }

    /// Position of a tract in load order.
    #[must_use]
    pub fn position(&self, geoid: &str) -> Option<usize> {
        self.by_geoid.get(geoid).copied()
    }

    /// All tracts in load order.
    #[must_use]
    pub fn tracts(&self) -> &[Tract] {
        &self.tracts
    }

    /// Iterates over tracts in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tract> {
        self.tracts.iter()
    }

    /// Number of tracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracts.len()
    }

    /// Whether the dataset has no tracts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracts.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Tract;
    type IntoIter = std::slice::Iter<'a, Tract>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracts.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_geoids() {
        let body = fixtures::squares(&[("a", 1.0), ("b", 2.0), ("a", 3.0)]);
        let err = load::parse_feature_collection(&body).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateGeoid { geoid } if geoid == "a"));
    }

    #[test]
    fn lookup_by_geoid_preserves_order() {
        let body = fixtures::squares(&[("c", 1.0), ("a", 2.0), ("b", 3.0)]);
        let dataset = load::parse_feature_collection(&body).unwrap();

        assert_eq!(dataset.len(), 3);
        let order: Vec<&str> = dataset.iter().map(Tract::geoid).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert_eq!(dataset.position("b"), Some(2));
        assert_eq!(dataset.get("a").unwrap().metric("Total_Population"), Some(2.0));
        assert!(dataset.get("zzz").is_none());
    }

    #[test]
    fn tract_bounds_from_geometry() {
        let body = fixtures::squares(&[("a", 1.0), ("b", 2.0)]);
        let dataset = load::parse_feature_collection(&body).unwrap();
        let bounds = dataset.get("b").unwrap().bounds().unwrap();
        assert_eq!(bounds, Bounds::new(1.0, 0.0, 2.0, 1.0));
    }
}
