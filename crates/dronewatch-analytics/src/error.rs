//! Analytics error types.

use dronewatch_persistence::PersistenceError;
use thiserror::Error;

/// Analytics errors.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Reading the snapshot failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Data conversion error
    #[error("Data conversion error: {0}")]
    Conversion(String),
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Conversion(err.to_string())
    }
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
