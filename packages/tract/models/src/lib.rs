#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census tract record and property value types.
//!
//! A tract carries an open-ended property map of metric name to value as
//! found in the source `GeoJSON`. Values may be numbers, numeric strings
//! (optionally with a trailing `%`), or missing. Everything downstream
//! reads metrics through [`TractProperties::metric`] so that the
//! missing-value policy lives in one place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Property holding the census GEOID of a tract.
pub const GEOID_PROPERTY: &str = "GEOID";

/// Property holding the human-readable tract name.
pub const NAME_PROPERTY: &str = "NAME";

/// A single property value from a tract's `GeoJSON` properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A JSON number.
    Number(f64),
    /// A JSON string (possibly numeric, e.g. `"14.2"` or `"14.2%"`).
    Text(String),
    /// `null`, booleans, nested values, or an absent key.
    Missing,
}

impl PropertyValue {
    /// Converts a raw JSON value into a [`PropertyValue`].
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Missing, Self::Number),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            _ => Self::Missing,
        }
    }

    /// Returns the numeric reading of this value, if it has one.
    ///
    /// Non-finite numbers are treated as missing.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Self::Text(s) => {
                let trimmed = s.trim();
                let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            Self::Missing => None,
        }
    }

    /// Returns the textual reading of this value.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(format_plain_number(*n)),
            Self::Text(s) => Some(s.clone()),
            Self::Missing => None,
        }
    }
}

/// Renders a number without a trailing `.0` when it is integral.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn format_plain_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// The property map of one tract.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TractProperties {
    values: BTreeMap<String, PropertyValue>,
}

impl TractProperties {
    /// Creates an empty property map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a property map from a `GeoJSON` `properties` object.
    #[must_use]
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let values = object
            .iter()
            .map(|(key, value)| (key.clone(), PropertyValue::from_json(value)))
            .collect();
        Self { values }
    }

    /// Inserts or replaces a property.
    pub fn insert(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.values.insert(key.into(), value);
    }

    /// Returns the raw property value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    /// Returns the numeric value of metric `key`, or `None` if it is
    /// absent, null, or not numeric.
    #[must_use]
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(PropertyValue::as_number)
    }

    /// Returns the numeric value of metric `key`, treating missing as zero.
    #[must_use]
    pub fn metric_or_zero(&self, key: &str) -> f64 {
        self.metric(key).unwrap_or(0.0)
    }

    /// Returns the textual value of property `key`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(PropertyValue::as_text)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over all `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, PropertyValue)> for TractProperties {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A longitude/latitude pair (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    /// Longitude in degrees.
    pub lng: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl LngLat {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// A geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Western longitude.
    pub west: f64,
    /// Southern latitude.
    pub south: f64,
    /// Eastern longitude.
    pub east: f64,
    /// Northern latitude.
    pub north: f64,
}

impl Bounds {
    /// Creates a bounding box from its edges.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> LngLat {
        LngLat::new(
            f64::midpoint(self.west, self.east),
            f64::midpoint(self.south, self.north),
        )
    }

    /// Whether `point` falls inside (or on the edge of) the box.
    #[must_use]
    pub fn contains(&self, point: LngLat) -> bool {
        point.lng >= self.west
            && point.lng <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_are_metrics() {
        let object = serde_json::json!({
            "GEOID": "22033000100",
            "ASTHMA": "11.4",
            "OBESITY": "41.2%",
            "Total_Population": 3120,
            "Median_Household_Income": null,
            "Flag": true,
        });
        let props = TractProperties::from_json_object(object.as_object().unwrap());

        assert_eq!(props.metric("ASTHMA"), Some(11.4));
        assert_eq!(props.metric("OBESITY"), Some(41.2));
        assert_eq!(props.metric("Total_Population"), Some(3120.0));
        assert_eq!(props.metric("Median_Household_Income"), None);
        assert_eq!(props.metric("Flag"), None);
        assert_eq!(props.metric("Nope"), None);
        assert!(props.metric_or_zero("Median_Household_Income").abs() < f64::EPSILON);
    }

    #[test]
    fn geoid_text_from_number() {
        let object = serde_json::json!({ "GEOID": 22_033_000_100_i64, "NAME": "1" });
        let props = TractProperties::from_json_object(object.as_object().unwrap());
        assert_eq!(props.text(GEOID_PROPERTY).as_deref(), Some("22033000100"));
        assert_eq!(props.text(NAME_PROPERTY).as_deref(), Some("1"));
    }

    #[test]
    fn non_numeric_text_is_missing() {
        assert_eq!(PropertyValue::Text("n/a".to_string()).as_number(), None);
        assert_eq!(PropertyValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn bounds_center_and_contains() {
        let bounds = Bounds::new(-91.2, 30.4, -91.0, 30.6);
        let center = bounds.center();
        assert!((center.lng + 91.1).abs() < 1e-9);
        assert!((center.lat - 30.5).abs() < 1e-9);
        assert!(bounds.contains(center));
        assert!(!bounds.contains(LngLat::new(-90.0, 30.5)));
    }
}
