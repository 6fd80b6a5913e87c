//! Timezone polygon dataset normalisation.
//!
//! The polygon dataset is a GeoJSON feature collection supplied by an
//! external loader. Only Polygon and MultiPolygon features carrying a
//! recognisable zone identifier survive normalisation; everything else is
//! dropped rather than failing the whole pass, and the loader warns about
//! how many were skipped.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::logger::Log;

/// Property keys searched, in order, for a zone identifier.
pub const ZONE_ID_PROPERTY_KEYS: &[&str] = &[
    "tzid",
    "TZID",
    "tz_name",
    "tzName",
    "timezone",
    "time_zone",
    "zone",
    "zone_id",
    "name",
];

/// A GeoJSON position: `[lon, lat]`, optionally followed by altitude.
pub type Position = Vec<f64>;

/// One linear ring of positions.
pub type Ring = Vec<Position>;

/// Polygon geometries accepted from the dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum PolygonGeometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

/// A normalised timezone polygon: geometry plus its zone identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TimezonePolygonFeature {
    pub zone_id: String,
    pub geometry: PolygonGeometry,
}

/// Raw GeoJSON feature as found in the dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// Raw GeoJSON feature collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<RawFeature>,
}

/// Best-effort zone identifier lookup over a feature's properties.
///
/// Returns the first value under [`ZONE_ID_PROPERTY_KEYS`] that is a string
/// containing a `/`, trimmed.
///
/// # Examples
/// ```
/// use deadline_meridian::geo::polygons::extract_zone_id;
/// let props = serde_json::json!({"name": "Prague", "tzid": " Europe/Prague "});
/// assert_eq!(extract_zone_id(props.as_object().unwrap()), Some("Europe/Prague".to_string()));
/// ```
pub fn extract_zone_id(properties: &Map<String, Value>) -> Option<String> {
    ZONE_ID_PROPERTY_KEYS
        .iter()
        .filter_map(|key| properties.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|candidate| candidate.contains('/'))
        .map(str::to_string)
}

/// Convert one raw feature, or `None` if it has no usable geometry or zone id.
pub fn normalize_feature(feature: RawFeature) -> Option<TimezonePolygonFeature> {
    let RawFeature { geometry, properties } = feature;
    let zone_id = extract_zone_id(properties.as_ref()?)?;
    let geometry = serde_json::from_value(geometry?).ok()?;
    Some(TimezonePolygonFeature { zone_id, geometry })
}

/// Normalise a whole collection, dropping features that fail [`normalize_feature`].
///
/// Takes the collection by value so each geometry is moved, not copied.
pub fn normalize_features(collection: FeatureCollection) -> Vec<TimezonePolygonFeature> {
    collection.features.into_iter().filter_map(normalize_feature).collect()
}

/// Read a GeoJSON feature collection from disk and normalise it.
///
/// The returned features are owned by the caller; nothing is cached here.
pub fn load_feature_collection(path: &Path) -> Result<Vec<TimezonePolygonFeature>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read timezone polygons from {}", path.display()))?;
    let collection: FeatureCollection = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse timezone polygons from {}", path.display()))?;

    let total = collection.features.len();
    let features = normalize_features(collection);
    let dropped = total - features.len();

    Log::log_decorated(&format!(
        "Loaded {} timezone polygons from {}",
        features.len(),
        path.display()
    ));
    if dropped > 0 {
        Log::log_warning(&format!(
            "Skipped {} features without a polygon geometry or zone id",
            dropped
        ));
    }
    Ok(features)
}
