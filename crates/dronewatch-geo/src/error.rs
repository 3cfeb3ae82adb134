//! Boundary export error types.

use std::path::PathBuf;

use thiserror::Error;

/// Boundary dataset errors.
#[derive(Error, Debug)]
pub enum BoundaryError {
    #[error("Boundary dataset not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed boundary dataset: {0}")]
    MalformedInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<geojson::Error> for BoundaryError {
    fn from(err: geojson::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

/// Result type for boundary operations.
pub type Result<T> = std::result::Result<T, BoundaryError>;
