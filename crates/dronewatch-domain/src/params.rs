//! Query-parameter validation.
//!
//! Turns the raw string map of a listing, search or map request into the
//! normalized query types. Unknown keys and malformed values are rejected;
//! the only substitutions are the documented defaults.

use std::collections::BTreeMap;

use crate::validation::parse_date;
use crate::{PageRequest, SearchQuery, SortKey, SortOrder, ValidationErrors, ViolationFilters, ViolationQuery};

/// Raw query parameters as received from the transport layer.
pub type RawParams = BTreeMap<String, String>;

const FILTER_KEYS: [&str; 5] = ["drone_id", "date_from", "date_to", "violation_type", "location"];
const PAGE_KEYS: [&str; 2] = ["page", "limit"];
const SORT_KEYS: [&str; 2] = ["sort_by", "sort_order"];
const MAP_KEYS: [&str; 4] = ["drone_id", "date_from", "date_to", "violation_type"];

/// Validate listing parameters.
///
/// # Errors
///
/// Returns [`ValidationErrors`] naming every rejected parameter.
pub fn parse_query_params(raw: &RawParams) -> Result<ViolationQuery, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    reject_unknown(raw, &[&FILTER_KEYS[..], &PAGE_KEYS[..], &SORT_KEYS[..]], &mut errors);

    let filters = parse_filters(raw, &mut errors);
    let page = parse_page(raw, &mut errors);

    let sort_by = match non_blank(raw, "sort_by") {
        None => SortKey::default(),
        Some(value) => value.parse::<SortKey>().unwrap_or_else(|_| {
            errors.push("sort_by", "must be one of [date, timestamp, type, drone_id]");
            SortKey::default()
        }),
    };
    let sort_order = match non_blank(raw, "sort_order") {
        None => SortOrder::default(),
        Some(value) => value.parse::<SortOrder>().unwrap_or_else(|_| {
            errors.push("sort_order", "must be one of [asc, desc]");
            SortOrder::default()
        }),
    };

    if errors.is_empty() {
        Ok(ViolationQuery {
            filters,
            sort_by,
            sort_order,
            page,
        })
    } else {
        Err(errors)
    }
}

/// Validate free-text search parameters. `term` comes from the path.
///
/// # Errors
///
/// Returns [`ValidationErrors`] for a blank term or bad `page`/`limit`.
pub fn parse_search_params(term: &str, raw: &RawParams) -> Result<SearchQuery, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    reject_unknown(raw, &[&PAGE_KEYS[..]], &mut errors);

    if term.trim().is_empty() {
        errors.push("term", "must not be empty");
    }
    let page = parse_page(raw, &mut errors);

    if errors.is_empty() {
        Ok(SearchQuery {
            term: term.to_string(),
            page,
        })
    } else {
        Err(errors)
    }
}

/// Validate map-marker filters (drone, type and date range only).
///
/// # Errors
///
/// Returns [`ValidationErrors`] for unknown keys or malformed dates.
pub fn parse_map_params(raw: &RawParams) -> Result<ViolationFilters, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    reject_unknown(raw, &[&MAP_KEYS[..]], &mut errors);
    let filters = parse_filters(raw, &mut errors);
    if errors.is_empty() { Ok(filters) } else { Err(errors) }
}

fn reject_unknown(raw: &RawParams, allowed: &[&[&str]], errors: &mut ValidationErrors) {
    for key in raw.keys() {
        if !allowed.iter().any(|group| group.contains(&key.as_str())) {
            errors.push(key.clone(), "is not allowed");
        }
    }
}

fn non_blank<'a>(raw: &'a RawParams, key: &str) -> Option<&'a str> {
    raw.get(key)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
}

fn parse_filters(raw: &RawParams, errors: &mut ValidationErrors) -> ViolationFilters {
    ViolationFilters {
        drone_id: non_blank(raw, "drone_id").map(str::to_string),
        date_from: non_blank(raw, "date_from").and_then(|v| parse_date(v, "date_from", errors)),
        date_to: non_blank(raw, "date_to").and_then(|v| parse_date(v, "date_to", errors)),
        violation_type: non_blank(raw, "violation_type").map(str::to_string),
        location: non_blank(raw, "location").map(str::to_string),
    }
}

fn parse_page(raw: &RawParams, errors: &mut ValidationErrors) -> PageRequest {
    let page = parse_bounded(raw, "page", PageRequest::DEFAULT_PAGE, 1, u32::MAX, errors);
    let limit = parse_bounded(
        raw,
        "limit",
        PageRequest::DEFAULT_LIMIT,
        1,
        PageRequest::MAX_LIMIT,
        errors,
    );
    PageRequest { page, limit }
}

fn parse_bounded(
    raw: &RawParams,
    key: &str,
    default: u32,
    min: u32,
    max: u32,
    errors: &mut ValidationErrors,
) -> u32 {
    let Some(value) = non_blank(raw, key) else {
        return default;
    };
    match value.trim().parse::<i64>() {
        Ok(n) if n < i64::from(min) => {
            errors.push(key, format!("must be greater than or equal to {min}"));
            default
        }
        Ok(n) if n > i64::from(max) => {
            errors.push(key, format!("must be less than or equal to {max}"));
            default
        }
        Ok(n) => u32::try_from(n).unwrap_or(default),
        Err(_) => {
            errors.push(key, "must be an integer");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let q = parse_query_params(&RawParams::new()).unwrap();
        assert_eq!(q.page, PageRequest { page: 1, limit: 10 });
        assert_eq!(q.sort_by, SortKey::Date);
        assert_eq!(q.sort_order, SortOrder::Desc);
        assert!(q.filters.is_empty());
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let q = parse_query_params(&params(&[
            ("drone_id", ""),
            ("date_from", ""),
            ("location", "  "),
        ]))
        .unwrap();
        assert!(q.filters.is_empty());
    }

    #[test]
    fn test_full_params() {
        let q = parse_query_params(&params(&[
            ("drone_id", "DRONE_ZONE_1"),
            ("date_from", "2025-01-10"),
            ("date_to", "2025-01-12"),
            ("violation_type", "Fire Detected"),
            ("location", "Zone"),
            ("page", "2"),
            ("limit", "100"),
            ("sort_by", "type"),
            ("sort_order", "asc"),
        ]))
        .unwrap();
        assert_eq!(q.filters.drone_id.as_deref(), Some("DRONE_ZONE_1"));
        assert_eq!(q.filters.date_from, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(q.page, PageRequest { page: 2, limit: 100 });
        assert_eq!(q.sort_by, SortKey::Type);
        assert_eq!(q.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_rejects_malformed_values() {
        let err = parse_query_params(&params(&[
            ("page", "0"),
            ("limit", "101"),
            ("sort_by", "latitude"),
            ("sort_order", "up"),
            ("date_to", "12/01/2025"),
            ("colour", "red"),
        ]))
        .unwrap_err();
        for field in ["page", "limit", "sort_by", "sort_order", "date_to", "colour"] {
            assert!(err.has_field(field), "missing {field}: {err}");
        }
    }

    #[test]
    fn test_non_integer_page() {
        let err = parse_query_params(&params(&[("page", "two")])).unwrap_err();
        assert!(err.has_field("page"));
        let err = parse_query_params(&params(&[("limit", "2.5")])).unwrap_err();
        assert!(err.has_field("limit"));
    }

    #[test]
    fn test_search_params() {
        let q = parse_search_params("fire", &params(&[("page", "3")])).unwrap();
        assert_eq!(q.term, "fire");
        assert_eq!(q.page.page, 3);
        assert!(parse_search_params("   ", &RawParams::new()).is_err());
        assert!(parse_search_params("fire", &params(&[("sort_by", "date")])).is_err());
    }

    #[test]
    fn test_map_params_reject_paging() {
        assert!(parse_map_params(&params(&[("drone_id", "D1")])).is_ok());
        assert!(parse_map_params(&params(&[("page", "1")])).is_err());
    }
}
