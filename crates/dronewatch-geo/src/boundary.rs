//! Boundary dataset parsing.

use std::path::Path;
use std::str::FromStr;

use geo::{Geometry, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{BoundaryError, Result};

/// Rendered when a feature has no name.
pub const UNNAMED: &str = "Unnamed boundary";
/// Rendered when a classification property is missing.
pub const UNKNOWN: &str = "unknown";

/// One safety zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub name: String,
    pub zone_type: String,
    pub security_level: String,
    pub polygon: Polygon<f64>,
}

impl Boundary {
    fn from_feature(index: usize, feature: &Feature) -> Option<Self> {
        let Some(geometry) = &feature.geometry else {
            warn!(index, "Boundary feature without geometry skipped");
            return None;
        };
        if !matches!(geometry.value, geojson::Value::Polygon(_)) {
            warn!(index, kind = value_name(&geometry.value), "Non-polygon boundary skipped");
            return None;
        }
        let polygon = match Geometry::<f64>::try_from(geometry.clone()) {
            Ok(Geometry::Polygon(polygon)) => polygon,
            Ok(_) => return None,
            Err(err) => {
                warn!(index, error = %err, "Unreadable boundary geometry skipped");
                return None;
            }
        };

        Some(Self {
            name: text_property(feature, "name").unwrap_or_else(|| UNNAMED.to_string()),
            zone_type: text_property(feature, "type").unwrap_or_else(|| UNKNOWN.to_string()),
            security_level: text_property(feature, "security_level")
                .unwrap_or_else(|| UNKNOWN.to_string()),
            polygon,
        })
    }
}

const fn value_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// String or numeric property as text; `null` counts as missing.
fn text_property(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// A parsed boundary file. The original text is kept verbatim.
#[derive(Debug, Clone)]
pub struct BoundaryDataset {
    raw: String,
    collection: FeatureCollection,
}

impl BoundaryDataset {
    /// Read and parse the dataset at `path`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the file is absent, `MalformedInput` when it is not a
    /// GeoJSON `FeatureCollection`, `Io` for other read failures.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(BoundaryError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        let dataset = raw.parse::<Self>()?;
        debug!(
            path = %path.display(),
            features = dataset.collection.features.len(),
            "Boundary dataset loaded"
        );
        Ok(dataset)
    }

    /// The file contents exactly as read.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub const fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    /// Document as JSON, for transports that embed it.
    ///
    /// # Errors
    ///
    /// `MalformedInput` if the text is not valid JSON (cannot happen for a
    /// dataset that parsed).
    pub fn to_json(&self) -> Result<Value> {
        serde_json::from_str(&self.raw).map_err(|e| BoundaryError::MalformedInput(e.to_string()))
    }

    /// Every polygon feature; other geometries are skipped with a warning.
    #[must_use]
    pub fn boundaries(&self) -> Vec<Boundary> {
        self.collection
            .features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| Boundary::from_feature(index, feature))
            .collect()
    }
}

impl FromStr for BoundaryDataset {
    type Err = BoundaryError;

    fn from_str(raw: &str) -> Result<Self> {
        match GeoJson::from_str(raw)? {
            GeoJson::FeatureCollection(collection) => Ok(Self {
                raw: raw.to_string(),
                collection,
            }),
            GeoJson::Feature(_) => Err(BoundaryError::MalformedInput(
                "expected a FeatureCollection, found a Feature".to_string(),
            )),
            GeoJson::Geometry(_) => Err(BoundaryError::MalformedInput(
                "expected a FeatureCollection, found a Geometry".to_string(),
            )),
        }
    }
}
