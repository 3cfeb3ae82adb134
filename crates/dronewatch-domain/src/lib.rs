//! # DroneWatch - Domain Model
//!
//! Core entities, value objects and query types for drone incident
//! reporting. A field drone submits one report per day; each report carries
//! the violations the drone detected. These types are shared by the
//! persistence, analytics and API layers.
//!
//! Input arriving from outside (report uploads, query strings) is turned
//! into these types by the validators in [`validation`] and [`params`].

pub mod params;
pub mod validation;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub use params::{
    RawParams, parse_map_params, parse_query_params, parse_search_params,
};
pub use validation::{FieldError, ValidationErrors, validate_report};

/// Canonical date format for report days (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical time-of-day format for violations (`HH:MM:SS`).
pub const TIME_FORMAT: &str = "%H:%M:%S";

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// A point on the earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting coordinates outside the geographic bounds.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidCoordinates`] when latitude is outside
    /// `-90..=90` or longitude is outside `-180..=180`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !Self::latitude_in_range(latitude) || !Self::longitude_in_range(longitude) {
            return Err(DomainError::InvalidCoordinates {
                lat: latitude,
                lon: longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude_in_range(latitude: f64) -> bool {
        (-90.0..=90.0).contains(&latitude)
    }

    #[must_use]
    pub fn longitude_in_range(longitude: f64) -> bool {
        (-180.0..=180.0).contains(&longitude)
    }
}

// =============================================================================
// SUBMISSION TYPES
// =============================================================================

/// A single detected incident as submitted by a drone, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationSubmission {
    pub id: String,
    #[serde(rename = "type")]
    pub violation_type: String,
    pub timestamp: NaiveTime,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
}

/// A validated daily report from one drone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub drone_id: String,
    pub date: NaiveDate,
    pub location: String,
    pub violations: Vec<ViolationSubmission>,
}

// =============================================================================
// ENTITY TYPES
// =============================================================================

/// Persisted report - one ingestion batch from a single drone on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,
    pub drone_id: String,
    pub date: NaiveDate,
    pub location: String,
    pub uploaded_at: DateTime<Utc>,
    pub violations: Vec<Violation>,
}

/// Persisted violation row.
///
/// Drone id, date and location are copied from the owning report so that
/// queries never need a join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub id: String,
    pub report_id: String,
    pub drone_id: String,
    pub date: NaiveDate,
    pub location: String,
    #[serde(rename = "type")]
    pub violation_type: String,
    pub timestamp: NaiveTime,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    pub uploaded_at: DateTime<Utc>,
}

// =============================================================================
// QUERY/FILTER TYPES
// =============================================================================

/// Whitelisted sort keys for violation listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Date,
    Timestamp,
    Type,
    DroneId,
}

impl SortKey {
    pub const ALL: [Self; 4] = [Self::Date, Self::Timestamp, Self::Type, Self::DroneId];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Type => "type",
            Self::DroneId => "drone_id",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DomainError::UnknownSortKey(s.to_string()))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::UnknownSortOrder(other.to_string())),
        }
    }
}

/// Optional violation filters. `None` means "do not narrow".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationFilters {
    pub drone_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub violation_type: Option<String>,
    /// Case-sensitive substring of the location label.
    pub location: Option<String>,
}

impl ViolationFilters {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.drone_id.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.violation_type.is_none()
            && self.location.is_none()
    }
}

/// Requested page window (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Fully normalized violation listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationQuery {
    pub filters: ViolationFilters,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

/// Free-text search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: String,
    pub page: PageRequest,
}

/// Pagination metadata returned alongside every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub per_page: u32,
}

impl Pagination {
    /// Derive metadata for `request` over a filtered set of `total_items`.
    #[must_use]
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        let per_page = u64::from(request.limit.max(1));
        Self {
            current_page: request.page,
            total_pages: total_items.div_ceil(per_page),
            total_items,
            per_page: request.limit,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Observed date range of stored violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
    pub all: Vec<NaiveDate>,
}

impl DateBounds {
    /// Build from a list of distinct dates sorted ascending.
    #[must_use]
    pub fn from_sorted(all: Vec<NaiveDate>) -> Self {
        Self {
            min: all.first().copied(),
            max: all.last().copied(),
            all,
        }
    }
}

/// Distinct values available for populating filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub drone_ids: Vec<String>,
    pub violation_types: Vec<String>,
    pub locations: Vec<String>,
    pub dates: DateBounds,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Unknown sort key '{0}' (expected one of: date, timestamp, type, drone_id)")]
    UnknownSortKey(String),

    #[error("Unknown sort order '{0}' (expected asc or desc)")]
    UnknownSortOrder(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_bounds() {
        assert!(GeoPoint::new(90.0, -180.0).is_ok());
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
        assert_eq!(
            GeoPoint::new(91.0, 0.0),
            Err(DomainError::InvalidCoordinates { lat: 91.0, lon: 0.0 })
        );
        assert!(GeoPoint::new(0.0, 180.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_sort_key_whitelist() {
        assert_eq!("drone_id".parse::<SortKey>(), Ok(SortKey::DroneId));
        assert_eq!("timestamp".parse::<SortKey>(), Ok(SortKey::Timestamp));
        assert!("latitude".parse::<SortKey>().is_err());
        assert!("DATE".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(PageRequest { page: 2, limit: 10 }, 21);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.total_items, 21);
        assert_eq!(p.per_page, 10);

        let empty = Pagination::new(PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);

        assert_eq!(PageRequest { page: 3, limit: 25 }.offset(), 50);
    }

    #[test]
    fn test_date_bounds() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        let bounds = DateBounds::from_sorted(vec![d(10), d(11), d(12)]);
        assert_eq!(bounds.min, Some(d(10)));
        assert_eq!(bounds.max, Some(d(12)));
        assert_eq!(DateBounds::from_sorted(Vec::new()), DateBounds::default());
    }

    #[test]
    fn test_violation_serializes_type_field() {
        let v = ViolationSubmission {
            id: "v1".into(),
            violation_type: "Fire Detected".into(),
            timestamp: NaiveTime::from_hms_opt(10, 32, 14).unwrap(),
            latitude: 23.5,
            longitude: 85.9,
            image_url: "https://x/1".into(),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "Fire Detected");
        assert_eq!(json["timestamp"], "10:32:14");
    }
}
