//! Loading the tract `FeatureCollection` from disk or over HTTP.
//!
//! The collection is fetched exactly once per session. There are no
//! retries: a failure is reported to the caller, which shows it to the
//! user and stops initializing.

use std::path::{Path, PathBuf};

use geo::MultiPolygon;
use geojson::GeoJson;
use tract_explorer_tract_models::{GEOID_PROPERTY, NAME_PROPERTY, TractProperties};

use crate::{Dataset, DatasetError, Tract};

/// Where the tract collection comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// A local file path.
    File(PathBuf),
    /// An HTTP(S) URL fetched with a single GET.
    Url(String),
}

impl DatasetSource {
    /// Interprets a location string: `http://` and `https://` prefixes
    /// are URLs, anything else is a file path.
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Loads the dataset from `source`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read, the request
/// fails, or the body is not a valid tract collection.
pub async fn load(source: &DatasetSource) -> Result<Dataset, DatasetError> {
    log::info!("Loading tract data from {source}");

    let dataset = match source {
        DatasetSource::File(path) => load_file(path)?,
        DatasetSource::Url(url) => {
            let client = reqwest::Client::new();
            fetch(&client, url).await?
        }
    };

    log::info!("Data loaded successfully: {} features", dataset.len());
    Ok(dataset)
}

/// Reads and parses a local `GeoJSON` file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> Result<Dataset, DatasetError> {
    let body = std::fs::read_to_string(path)?;
    parse_feature_collection(&body)
}

/// Fetches and parses a `GeoJSON` `FeatureCollection` from a URL.
///
/// # Errors
///
/// Returns [`DatasetError`] if the request fails, the response status is
/// not a success, or the body cannot be parsed.
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Dataset, DatasetError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(DatasetError::Status {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }
    let body = resp.text().await?;
    parse_feature_collection(&body)
}

/// Parses a `GeoJSON` `FeatureCollection` body into a [`Dataset`].
///
/// Every feature needs a `GEOID` property and a `Polygon` or
/// `MultiPolygon` geometry. A missing `NAME` falls back to the `GEOID`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the body is not a `FeatureCollection`, a
/// feature is invalid, or `GEOID`s repeat.
pub fn parse_feature_collection(body: &str) -> Result<Dataset, DatasetError> {
    let geojson: GeoJson = body.parse()?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(DatasetError::NotFeatureCollection);
    };

    let tracts = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| parse_feature(index, feature))
        .collect::<Result<Vec<_>, _>>()?;

    Dataset::new(tracts)
}

fn parse_feature(index: usize, feature: geojson::Feature) -> Result<Tract, DatasetError> {
    let properties = feature
        .properties
        .as_ref()
        .map(TractProperties::from_json_object)
        .unwrap_or_default();

    let geoid = properties
        .text(GEOID_PROPERTY)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DatasetError::InvalidFeature {
            index,
            message: format!("missing {GEOID_PROPERTY} property"),
        })?;

    let name = properties
        .text(NAME_PROPERTY)
        .unwrap_or_else(|| geoid.clone());

    let geometry = feature
        .geometry
        .ok_or_else(|| DatasetError::InvalidFeature {
            index,
            message: format!("tract {geoid} has no geometry"),
        })?;

    let geometry = to_multipolygon(geometry).ok_or_else(|| DatasetError::InvalidFeature {
        index,
        message: format!("tract {geoid} geometry is not a Polygon or MultiPolygon"),
    })?;

    Ok(Tract::new(geoid, name, geometry, properties))
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
