//! # GraphQL Input Types
//!
//! Inputs are flattened back into raw parameter maps so the domain
//! validators see exactly what a query string would carry.

use async_graphql::InputObject;
use dronewatch_domain::{RawParams, SortKey, SortOrder};

use super::enums::{SortDirection, ViolationSortKey};

fn put(raw: &mut RawParams, key: &str, value: Option<String>) {
    if let Some(value) = value {
        raw.insert(key.to_string(), value);
    }
}

/// Raw `page`/`limit` parameters for search and listing
pub fn page_params(page: Option<i32>, limit: Option<i32>) -> RawParams {
    let mut raw = RawParams::new();
    put(&mut raw, "page", page.map(|p| p.to_string()));
    put(&mut raw, "limit", limit.map(|l| l.to_string()));
    raw
}

/// Filters, sort and page for the violation listing
#[derive(Debug, Clone, Default, InputObject)]
pub struct ViolationQueryInput {
    /// Exact drone id
    pub drone_id: Option<String>,
    /// Inclusive lower bound, `YYYY-MM-DD`
    pub date_from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`
    pub date_to: Option<String>,
    /// Exact violation type
    pub violation_type: Option<String>,
    /// Substring of the location
    pub location: Option<String>,
    /// 1-based page (default 1)
    pub page: Option<i32>,
    /// Page size (default 10, max 100)
    pub limit: Option<i32>,
    /// Sort column (default DATE)
    pub sort_by: Option<ViolationSortKey>,
    /// Sort direction (default DESC)
    pub sort_order: Option<SortDirection>,
}

impl ViolationQueryInput {
    #[must_use]
    pub fn to_raw_params(&self) -> RawParams {
        let mut raw = page_params(self.page, self.limit);
        put(&mut raw, "drone_id", self.drone_id.clone());
        put(&mut raw, "date_from", self.date_from.clone());
        put(&mut raw, "date_to", self.date_to.clone());
        put(&mut raw, "violation_type", self.violation_type.clone());
        put(&mut raw, "location", self.location.clone());
        put(
            &mut raw,
            "sort_by",
            self.sort_by.map(|k| SortKey::from(k).as_str().to_string()),
        );
        put(
            &mut raw,
            "sort_order",
            self.sort_order.map(|o| SortOrder::from(o).as_str().to_string()),
        );
        raw
    }
}

/// Filters accepted by the map view
#[derive(Debug, Clone, Default, InputObject)]
pub struct MapFilterInput {
    pub drone_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub violation_type: Option<String>,
}

impl MapFilterInput {
    #[must_use]
    pub fn to_raw_params(&self) -> RawParams {
        let mut raw = RawParams::new();
        put(&mut raw, "drone_id", self.drone_id.clone());
        put(&mut raw, "date_from", self.date_from.clone());
        put(&mut raw, "date_to", self.date_to.clone());
        put(&mut raw, "violation_type", self.violation_type.clone());
        raw
    }
}
