//! # GraphQL Enum Types
//!
//! Enum definitions for the GraphQL schema.

use async_graphql::Enum;
use dronewatch_domain as domain;

/// Column a violation listing is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum ViolationSortKey {
    /// Report day, ties broken by time of day
    #[default]
    Date,
    /// Time of day
    Timestamp,
    /// Violation type label
    Type,
    /// Reporting drone
    DroneId,
}

impl From<ViolationSortKey> for domain::SortKey {
    fn from(key: ViolationSortKey) -> Self {
        match key {
            ViolationSortKey::Date => Self::Date,
            ViolationSortKey::Timestamp => Self::Timestamp,
            ViolationSortKey::Type => Self::Type,
            ViolationSortKey::DroneId => Self::DroneId,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl From<SortDirection> for domain::SortOrder {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_maps_to_whitelisted_column() {
        let key: domain::SortKey = ViolationSortKey::DroneId.into();
        assert_eq!(key.as_str(), "drone_id");
        let order: domain::SortOrder = SortDirection::default().into();
        assert_eq!(order, domain::SortOrder::Desc);
    }
}
