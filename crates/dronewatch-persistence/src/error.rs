//! Persistence layer error types

use chrono::NaiveDate;
use dronewatch_domain::ValidationErrors;
use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("A report for drone {drone_id} on {date} already exists")]
    DuplicateReport { drone_id: String, date: NaiveDate },

    #[error("Violation {id} already exists")]
    DuplicateViolation { id: String },

    #[error("Entity not found: {entity_type} with key {key}")]
    NotFound { entity_type: String, key: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PersistenceError {
    pub fn not_found(entity_type: &str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            key: key.into(),
        }
    }

    /// True when the caller can fix the failure by changing its input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::DuplicateReport { .. } | Self::DuplicateViolation { .. }
        )
    }
}

impl From<duckdb::Error> for PersistenceError {
    fn from(err: duckdb::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for PersistenceError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Storage(format!("storage task failed: {err}"))
    }
}

/// Whether a DuckDB error is a PRIMARY KEY or UNIQUE constraint violation.
pub(crate) fn is_duplicate_key(err: &duckdb::Error) -> bool {
    let message = err.to_string();
    message.contains("Duplicate key")
        || message.contains("violates primary key constraint")
        || message.contains("violates unique constraint")
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        let dup = PersistenceError::DuplicateReport {
            drone_id: "D1".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        assert!(dup.is_client_error());
        assert_eq!(dup.to_string(), "A report for drone D1 on 2025-01-01 already exists");
        assert!(!PersistenceError::Storage("disk".into()).is_client_error());
        assert!(!PersistenceError::not_found("violation", "v9").is_client_error());
    }
}
