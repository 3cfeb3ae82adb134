//! Report schema validation.
//!
//! Checks an arbitrary JSON value against the report submission schema and
//! collects every violated constraint instead of stopping at the first one.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DATE_FORMAT, GeoPoint, ReportSubmission, TIME_FORMAT, ViolationSubmission};

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d:[0-5]\d$").expect("valid time regex"));

// scheme ":" then either "//authority..." or a rootless/absolute path
static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:(//[^\s/?#]+[^\s]*|/?[^\s/][^\s]*)$")
        .expect("valid uri regex")
});

const REPORT_KEYS: [&str; 4] = ["drone_id", "date", "location", "violations"];
const VIOLATION_KEYS: [&str; 6] = ["id", "type", "timestamp", "latitude", "longitude", "image_url"];

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending field, e.g. `violations[1].latitude`.
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Every constraint an input violated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// True if any error refers to `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: ")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate an arbitrary JSON value as a report submission.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing every field that failed.
pub fn validate_report(input: &Value) -> Result<ReportSubmission, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let Some(obj) = input.as_object() else {
        return Err(ValidationErrors::single("report", "must be an object"));
    };

    reject_unknown_keys(obj, &REPORT_KEYS, "", &mut errors);

    let drone_id = required_text(obj, "drone_id", "drone_id", &mut errors);
    let date = match obj.get("date") {
        None => {
            errors.push("date", "is required");
            None
        }
        Some(Value::String(s)) => parse_date(s, "date", &mut errors),
        Some(_) => {
            errors.push("date", "must be a string");
            None
        }
    };
    let location = required_text(obj, "location", "location", &mut errors);

    let violations = match obj.get("violations") {
        None => {
            errors.push("violations", "is required");
            None
        }
        Some(Value::Array(items)) if items.is_empty() => {
            errors.push("violations", "must contain at least one violation");
            None
        }
        Some(Value::Array(items)) => {
            let parsed: Vec<Option<ViolationSubmission>> = items
                .iter()
                .enumerate()
                .map(|(i, item)| validate_violation(item, i, &mut errors))
                .collect();
            check_unique_ids(items, &mut errors);
            parsed.into_iter().collect::<Option<Vec<_>>>()
        }
        Some(_) => {
            errors.push("violations", "must be an array");
            None
        }
    };

    match (drone_id, date, location, violations) {
        (Some(drone_id), Some(date), Some(location), Some(violations)) if errors.is_empty() => {
            Ok(ReportSubmission {
                drone_id,
                date,
                location,
                violations,
            })
        }
        _ => Err(errors),
    }
}

fn validate_violation(
    item: &Value,
    index: usize,
    errors: &mut ValidationErrors,
) -> Option<ViolationSubmission> {
    let prefix = format!("violations[{index}]");
    let Some(obj) = item.as_object() else {
        errors.push(prefix, "must be an object");
        return None;
    };

    reject_unknown_keys(obj, &VIOLATION_KEYS, &prefix, errors);

    let id = required_text(obj, "id", &format!("{prefix}.id"), errors);
    let violation_type = required_text(obj, "type", &format!("{prefix}.type"), errors);

    let timestamp_field = format!("{prefix}.timestamp");
    let timestamp = match obj.get("timestamp") {
        None => {
            errors.push(timestamp_field, "is required");
            None
        }
        Some(Value::String(s)) => parse_time(s, &timestamp_field, errors),
        Some(_) => {
            errors.push(timestamp_field, "must be a string");
            None
        }
    };

    let latitude = required_coordinate(
        obj,
        "latitude",
        &format!("{prefix}.latitude"),
        GeoPoint::latitude_in_range,
        "must be between -90 and 90",
        errors,
    );
    let longitude = required_coordinate(
        obj,
        "longitude",
        &format!("{prefix}.longitude"),
        GeoPoint::longitude_in_range,
        "must be between -180 and 180",
        errors,
    );

    let image_field = format!("{prefix}.image_url");
    let image_url = required_text(obj, "image_url", &image_field, errors).and_then(|url| {
        if URI_RE.is_match(&url) {
            Some(url)
        } else {
            errors.push(image_field, "must be a valid URI");
            None
        }
    });

    Some(ViolationSubmission {
        id: id?,
        violation_type: violation_type?,
        timestamp: timestamp?,
        latitude: latitude?,
        longitude: longitude?,
        image_url: image_url?,
    })
}

fn check_unique_ids(items: &[Value], errors: &mut ValidationErrors) {
    let mut seen = HashSet::new();
    for (i, item) in items.iter().enumerate() {
        if let Some(id) = item.get("id").and_then(Value::as_str) {
            if !seen.insert(id) {
                errors.push(
                    format!("violations[{i}].id"),
                    format!("duplicates id '{id}' within the report"),
                );
            }
        }
    }
}

fn reject_unknown_keys(
    obj: &Map<String, Value>,
    allowed: &[&str],
    prefix: &str,
    errors: &mut ValidationErrors,
) {
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            errors.push(field, "is not allowed");
        }
    }
}

fn required_text(
    obj: &Map<String, Value>,
    key: &str,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match obj.get(key) {
        None => {
            errors.push(field, "is required");
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.push(field, "must not be empty");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(field, "must be a string");
            None
        }
    }
}

fn required_coordinate(
    obj: &Map<String, Value>,
    key: &str,
    field: &str,
    in_range: fn(f64) -> bool,
    range_message: &str,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    match obj.get(key) {
        None => {
            errors.push(field, "is required");
            None
        }
        Some(Value::Number(n)) => match n.as_f64() {
            Some(value) if in_range(value) => Some(value),
            _ => {
                errors.push(field, range_message);
                None
            }
        },
        Some(_) => {
            errors.push(field, "must be a number");
            None
        }
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(s: &str, field: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    if !DATE_RE.is_match(s) {
        errors.push(field, "must match YYYY-MM-DD");
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_or_else(
        |_| {
            errors.push(field, "is not a valid calendar date");
            None
        },
        Some,
    )
}

fn parse_time(s: &str, field: &str, errors: &mut ValidationErrors) -> Option<NaiveTime> {
    if !TIME_RE.is_match(s) {
        errors.push(field, "must match HH:MM:SS (00:00:00 - 23:59:59)");
        return None;
    }
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_or_else(
        |_| {
            errors.push(field, "is not a valid time of day");
            None
        },
        Some,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "drone_id": "D1",
            "date": "2025-01-01",
            "location": "Zone A",
            "violations": [{
                "id": "v1",
                "type": "Fire Detected",
                "timestamp": "10:00:00",
                "latitude": 23.0,
                "longitude": 85.0,
                "image_url": "https://x/1"
            }]
        })
    }

    #[test]
    fn test_valid_report() {
        let report = validate_report(&sample()).unwrap();
        assert_eq!(report.drone_id, "D1");
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].violation_type, "Fire Detected");
        assert_eq!(report.violations[0].timestamp.to_string(), "10:00:00");
    }

    #[test]
    fn test_latitude_out_of_range() {
        let mut input = sample();
        input["violations"][0]["latitude"] = json!(91);
        let err = validate_report(&input).unwrap_err();
        assert!(err.has_field("violations[0].latitude"));
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn test_reports_every_error() {
        let input = json!({
            "drone_id": "",
            "date": "2025-13-40",
            "location": 7,
            "violations": [{
                "id": "v1",
                "type": "Fire Detected",
                "timestamp": "24:00:00",
                "latitude": "23.0",
                "longitude": -181,
                "image_url": "not a uri"
            }]
        });
        let err = validate_report(&input).unwrap_err();
        for field in [
            "drone_id",
            "date",
            "location",
            "violations[0].timestamp",
            "violations[0].latitude",
            "violations[0].longitude",
            "violations[0].image_url",
        ] {
            assert!(err.has_field(field), "missing error for {field}: {err}");
        }
        assert_eq!(err.len(), 7);
    }

    #[test]
    fn test_empty_and_missing_violations() {
        let mut input = sample();
        input["violations"] = json!([]);
        assert!(validate_report(&input).unwrap_err().has_field("violations"));

        input.as_object_mut().unwrap().remove("violations");
        assert!(validate_report(&input).unwrap_err().has_field("violations"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let mut input = sample();
        input["operator"] = json!("bob");
        input["violations"][0]["severity"] = json!("high");
        let err = validate_report(&input).unwrap_err();
        assert!(err.has_field("operator"));
        assert!(err.has_field("violations[0].severity"));
    }

    #[test]
    fn test_duplicate_ids_in_one_report() {
        let mut input = sample();
        let first = input["violations"][0].clone();
        input["violations"].as_array_mut().unwrap().push(first);
        let err = validate_report(&input).unwrap_err();
        assert!(err.has_field("violations[1].id"));
    }

    #[test]
    fn test_time_requires_two_digit_hours() {
        let mut input = sample();
        input["violations"][0]["timestamp"] = json!("9:15:33");
        assert!(validate_report(&input).is_err());
    }

    #[test]
    fn test_uri_shapes() {
        for ok in ["https://picsum.photos/id/23/150/150", "s3://bucket/key.jpg", "urn:isbn:123"] {
            assert!(URI_RE.is_match(ok), "{ok}");
        }
        for bad in ["picsum.photos/1.jpg", "https:///nohost", "http://a b", ""] {
            assert!(!URI_RE.is_match(bad), "{bad}");
        }
    }

    #[test]
    fn test_non_object_input() {
        let err = validate_report(&json!([1, 2, 3])).unwrap_err();
        assert!(err.has_field("report"));
    }
}
