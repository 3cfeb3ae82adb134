//! # Repository Traits
//!
//! Abstract storage interfaces for reports and violations.
//! Implementations can be swapped for different backends (DuckDB, mock, etc.)

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::ViolationSelect;
use dronewatch_domain::{FilterOptions, PageRequest, Report, Violation};

// =============================================================================
// REPORT REPOSITORY
// =============================================================================

/// Repository for Report rows
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Whether a report already exists for the drone on that day
    async fn exists(&self, drone_id: &str, date: NaiveDate) -> Result<bool>;

    /// Insert the report and all of its violations atomically.
    ///
    /// A clash on (drone id, date) fails with `DuplicateReport`, a clash on a
    /// violation id with `DuplicateViolation`; nothing is written in either
    /// case.
    async fn insert(&self, report: &Report) -> Result<()>;

    /// Number of persisted reports
    async fn count(&self) -> Result<u64>;
}

// =============================================================================
// VIOLATION REPOSITORY
// =============================================================================

/// Count of violations for one (drone, location, date, type) group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedCount {
    pub drone_id: String,
    pub location: String,
    pub date: NaiveDate,
    pub violation_type: String,
    pub count: i64,
}

/// Consistent read of everything the analytics roll-ups need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationSnapshot {
    pub groups: Vec<GroupedCount>,
    pub recent: Vec<Violation>,
    pub total_reports: u64,
}

/// Repository for Violation reads
#[async_trait]
pub trait ViolationRepository: Send + Sync {
    /// One page of matching rows plus the total matching count
    async fn find_page(
        &self,
        select: &ViolationSelect,
        window: PageRequest,
    ) -> Result<(Vec<Violation>, u64)>;

    /// Every matching row
    async fn find_all(&self, select: &ViolationSelect) -> Result<Vec<Violation>>;

    /// Get violation by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Violation>>;

    /// Sorted distinct values for filter controls
    async fn filter_options(&self) -> Result<FilterOptions>;

    /// Grouped counts plus the `recent_limit` newest violations, read in one
    /// transaction
    async fn snapshot(&self, recent_limit: u32) -> Result<ViolationSnapshot>;
}
