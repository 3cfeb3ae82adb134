//! # DroneWatch Geo
//!
//! Static safety-boundary dataset: served as-is in GeoJSON or converted to
//! KML for mapping tools. The dataset is read from disk on every call so an
//! edited file is picked up without a restart.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod boundary;
pub mod error;
pub mod kml;

use std::path::{Path, PathBuf};

use tracing::info;

pub use boundary::{Boundary, BoundaryDataset};
pub use error::{BoundaryError, Result};
pub use kml::{KML_CONTENT_TYPE, to_kml};

/// Media type for GeoJSON documents.
pub const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";

/// Serves the boundary dataset at a fixed path.
#[derive(Debug, Clone)]
pub struct BoundaryExporter {
    path: PathBuf,
}

impl BoundaryExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The dataset exactly as stored.
    ///
    /// # Errors
    ///
    /// `NotFound` if the file is absent, `MalformedInput` if it is not a
    /// GeoJSON `FeatureCollection`.
    pub async fn boundaries(&self) -> Result<BoundaryDataset> {
        BoundaryDataset::load(&self.path).await
    }

    /// Every polygon feature rendered as a KML document.
    ///
    /// # Errors
    ///
    /// Same as [`BoundaryExporter::boundaries`].
    pub async fn boundaries_as_kml(&self) -> Result<String> {
        let dataset = self.boundaries().await?;
        let boundaries = dataset.boundaries();
        info!(
            placemarks = boundaries.len(),
            features = dataset.collection().features.len(),
            "Boundary KML rendered"
        );
        Ok(to_kml(&boundaries))
    }
}
