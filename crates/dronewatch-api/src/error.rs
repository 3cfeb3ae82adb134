//! # API Error Types
//!
//! Unified error handling for the GraphQL and REST layers. Every core error
//! maps to a stable code and HTTP status; storage details are logged and
//! replaced by a generic message.

use async_graphql::{Error as GraphQLError, ErrorExtensions};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use thiserror::Error;

use dronewatch_analytics::AnalyticsError;
use dronewatch_domain::ValidationErrors;
use dronewatch_geo::BoundaryError;
use dronewatch_persistence::PersistenceError;

/// API-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("A report for drone {drone_id} on {date} already exists")]
    DuplicateReport { drone_id: String, date: NaiveDate },

    #[error("Violation {id} already exists")]
    DuplicateViolation { id: String },

    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Storage error")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateReport { .. } | Self::DuplicateViolation { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MalformedInput(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code for GraphQL extensions
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateReport { .. } => "DUPLICATE_REPORT",
            Self::DuplicateViolation { .. } => "DUPLICATE_VIOLATION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::MalformedInput(_) => "MALFORMED_INPUT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn storage(detail: String) -> Self {
        tracing::error!(error = %detail, "Storage failure");
        Self::Storage(detail)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Validation(errors) => Self::Validation(errors),
            PersistenceError::DuplicateReport { drone_id, date } => {
                Self::DuplicateReport { drone_id, date }
            }
            PersistenceError::DuplicateViolation { id } => Self::DuplicateViolation { id },
            PersistenceError::NotFound { entity_type, key } => Self::NotFound {
                entity_type,
                id: key,
            },
            PersistenceError::Storage(detail) | PersistenceError::Serialization(detail) => {
                Self::storage(detail)
            }
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Persistence(inner) => inner.into(),
            AnalyticsError::Conversion(detail) => Self::Internal(detail),
        }
    }
}

impl From<BoundaryError> for ApiError {
    fn from(err: BoundaryError) -> Self {
        match err {
            BoundaryError::NotFound { path } => {
                tracing::debug!(path = %path.display(), "Boundary dataset missing");
                Self::NotFound {
                    entity_type: "boundary dataset".to_string(),
                    id: path.display().to_string(),
                }
            }
            BoundaryError::MalformedInput(detail) => Self::MalformedInput(detail),
            BoundaryError::Io(io) => Self::Internal(io.to_string()),
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> GraphQLError {
        GraphQLError::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.error_code());
            e.set("status", self.status_code().as_u16());

            match self {
                Self::Validation(errors) => {
                    let fields = serde_json::to_value(&errors.errors)
                        .ok()
                        .and_then(|json| async_graphql::Value::from_json(json).ok())
                        .unwrap_or_default();
                    e.set("fields", fields);
                }
                Self::DuplicateReport { drone_id, date } => {
                    e.set("drone_id", drone_id.as_str());
                    e.set("date", date.to_string());
                }
                Self::DuplicateViolation { id } => {
                    e.set("violation_id", id.as_str());
                }
                Self::NotFound { entity_type, id } => {
                    e.set("entity_type", entity_type.as_str());
                    e.set("entity_id", id.as_str());
                }
                _ => {}
            }
        })
    }
}

impl From<ApiError> for GraphQLError {
    fn from(err: ApiError) -> Self {
        err.extend()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut error = serde_json::json!({
            "message": self.to_string(),
            "code": self.error_code(),
        });
        if let Self::Validation(errors) = &self {
            error["fields"] = serde_json::to_value(&errors.errors).unwrap_or_default();
        }

        (status, axum::Json(serde_json::json!({ "error": error }))).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_mapping() {
        let dup: ApiError = PersistenceError::DuplicateReport {
            drone_id: "D1".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
        .into();
        assert_eq!(dup.error_code(), "DUPLICATE_REPORT");
        assert_eq!(dup.status_code(), StatusCode::CONFLICT);

        let missing: ApiError = PersistenceError::not_found("violation", "v9").into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_detail_is_hidden() {
        let err: ApiError = PersistenceError::Storage("IO Error: disk full at /var/x".into()).into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(err.to_string(), "Storage error");
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logs_at(level: tracing::Level, f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_missing_boundary_logs_at_debug_only() {
        let missing = || {
            let err = ApiError::from(BoundaryError::NotFound {
                path: "/srv/zones.geojson".into(),
            });
            assert_eq!(err.error_code(), "NOT_FOUND");
        };

        assert!(logs_at(tracing::Level::INFO, missing).is_empty());
        assert!(logs_at(tracing::Level::DEBUG, missing).contains("Boundary dataset missing"));
    }

    #[test]
    fn test_validation_extensions_list_fields() {
        let err = ApiError::from(ValidationErrors::single("violations[0].latitude", "must be <= 90"));
        let gql = err.extend();
        let ext = gql.extensions.unwrap();
        assert_eq!(ext.get("code"), Some(&async_graphql::Value::from("VALIDATION_ERROR")));
        assert!(ext.get("fields").is_some());
    }
}
