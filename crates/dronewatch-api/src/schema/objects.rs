//! # GraphQL Output Types
//!
//! Object type definitions for GraphQL responses.

use std::collections::BTreeMap;

use async_graphql::{ComplexObject, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use dronewatch_analytics as analytics;
use dronewatch_domain as domain;

// =============================================================================
// VIOLATION TYPES
// =============================================================================

/// A persisted incident
#[derive(Debug, Clone, SimpleObject)]
pub struct Violation {
    /// Violation id as submitted
    pub id: ID,
    /// Owning report
    pub report_id: String,
    pub drone_id: String,
    /// Report day
    pub date: NaiveDate,
    pub location: String,
    /// Violation type label
    #[graphql(name = "type")]
    pub violation_type: String,
    /// Time of day
    pub timestamp: NaiveTime,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    /// When the owning report was ingested
    pub uploaded_at: DateTime<Utc>,
}

impl From<domain::Violation> for Violation {
    fn from(v: domain::Violation) -> Self {
        Self {
            id: ID(v.id),
            report_id: v.report_id,
            drone_id: v.drone_id,
            date: v.date,
            location: v.location,
            violation_type: v.violation_type,
            timestamp: v.timestamp,
            latitude: v.latitude,
            longitude: v.longitude,
            image_url: v.image_url,
            uploaded_at: v.uploaded_at,
        }
    }
}

fn violations(items: Vec<domain::Violation>) -> Vec<Violation> {
    items.into_iter().map(Violation::from).collect()
}

/// Page position and totals
#[derive(Debug, Clone, Copy, SimpleObject)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub per_page: u32,
}

impl From<domain::Pagination> for Pagination {
    fn from(p: domain::Pagination) -> Self {
        Self {
            current_page: p.current_page,
            total_pages: p.total_pages,
            total_items: p.total_items,
            per_page: p.per_page,
        }
    }
}

/// One page of violations
#[derive(Debug, Clone, SimpleObject)]
pub struct ViolationPage {
    pub items: Vec<Violation>,
    pub pagination: Pagination,
}

impl From<domain::Page<domain::Violation>> for ViolationPage {
    fn from(page: domain::Page<domain::Violation>) -> Self {
        Self {
            items: violations(page.items),
            pagination: page.pagination.into(),
        }
    }
}

/// Known report days
#[derive(Debug, Clone, SimpleObject)]
pub struct DateRange {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
    /// Every distinct day, ascending
    pub all: Vec<NaiveDate>,
}

/// Distinct values available to the filter controls
#[derive(Debug, Clone, SimpleObject)]
pub struct FilterOptions {
    pub drone_ids: Vec<String>,
    pub violation_types: Vec<String>,
    pub locations: Vec<String>,
    pub dates: DateRange,
}

impl From<domain::FilterOptions> for FilterOptions {
    fn from(o: domain::FilterOptions) -> Self {
        Self {
            drone_ids: o.drone_ids,
            violation_types: o.violation_types,
            locations: o.locations,
            dates: DateRange {
                min: o.dates.min,
                max: o.dates.max,
                all: o.dates.all,
            },
        }
    }
}

// =============================================================================
// REPORT TYPES
// =============================================================================

/// An ingested daily report
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Report {
    pub report_id: ID,
    pub drone_id: String,
    pub date: NaiveDate,
    pub location: String,
    pub uploaded_at: DateTime<Utc>,
    pub violations: Vec<Violation>,
}

#[ComplexObject]
impl Report {
    /// Number of violations carried by the report
    async fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

impl From<domain::Report> for Report {
    fn from(r: domain::Report) -> Self {
        Self {
            report_id: ID(r.report_id),
            drone_id: r.drone_id,
            date: r.date,
            location: r.location,
            uploaded_at: r.uploaded_at,
            violations: violations(r.violations),
        }
    }
}

/// Outcome of loading the sample data set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, SimpleObject)]
pub struct SeedResult {
    /// Reports newly ingested
    pub ingested: u32,
    /// Reports already present
    pub skipped: u32,
}

// =============================================================================
// ANALYTICS TYPES
// =============================================================================

/// A label and its violation count
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
pub struct CountEntry {
    pub name: String,
    pub count: i64,
}

fn entries(counts: BTreeMap<String, i64>) -> Vec<CountEntry> {
    counts
        .into_iter()
        .map(|(name, count)| CountEntry { name, count })
        .collect()
}

fn ranked(counts: Vec<analytics::RankedCount>) -> Vec<CountEntry> {
    counts
        .into_iter()
        .map(|r| CountEntry {
            name: r.name,
            count: r.count,
        })
        .collect()
}

/// Headline counts
#[derive(Debug, Clone, Copy, SimpleObject)]
pub struct Kpis {
    pub total_violations: i64,
    pub distinct_drones: i64,
    pub distinct_locations: i64,
    pub distinct_types: i64,
}

impl From<analytics::Kpis> for Kpis {
    fn from(k: analytics::Kpis) -> Self {
        Self {
            total_violations: k.total_violations,
            distinct_drones: k.distinct_drones,
            distinct_locations: k.distinct_locations,
            distinct_types: k.distinct_types,
        }
    }
}

/// Violations on one day
#[derive(Debug, Clone, Copy, SimpleObject)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

impl From<analytics::DailyCount> for DailyCount {
    fn from(d: analytics::DailyCount) -> Self {
        Self {
            date: d.date,
            count: d.count,
        }
    }
}

/// Violations per type for one drone
#[derive(Debug, Clone, SimpleObject)]
pub struct DroneBreakdown {
    pub drone_id: String,
    pub total: i64,
    pub by_type: Vec<CountEntry>,
}

/// KPIs and every breakdown
#[derive(Debug, Clone, SimpleObject)]
pub struct Analytics {
    pub kpis: Kpis,
    pub type_distribution: Vec<CountEntry>,
    /// Date ascending
    pub time_series: Vec<DailyCount>,
    pub drone_breakdown: Vec<DroneBreakdown>,
    pub location_breakdown: Vec<CountEntry>,
}

impl From<analytics::Analytics> for Analytics {
    fn from(a: analytics::Analytics) -> Self {
        Self {
            kpis: a.kpis.into(),
            type_distribution: entries(a.type_distribution),
            time_series: a.time_series.into_iter().map(DailyCount::from).collect(),
            drone_breakdown: a
                .drone_breakdown
                .into_iter()
                .map(|(drone_id, breakdown)| DroneBreakdown {
                    drone_id,
                    total: breakdown.total,
                    by_type: entries(breakdown.by_type),
                })
                .collect(),
            location_breakdown: entries(a.location_breakdown),
        }
    }
}

/// Dashboard summary
#[derive(Debug, Clone, SimpleObject)]
pub struct Summary {
    pub kpis: Kpis,
    /// Newest violations first
    pub recent: Vec<Violation>,
    pub top_types: Vec<CountEntry>,
    pub top_drones: Vec<CountEntry>,
}

impl From<analytics::Summary> for Summary {
    fn from(s: analytics::Summary) -> Self {
        Self {
            kpis: s.kpis.into(),
            recent: violations(s.recent),
            top_types: ranked(s.top_types),
            top_drones: ranked(s.top_drones),
        }
    }
}

/// Ingestion totals
#[derive(Debug, Clone, Copy, SimpleObject)]
pub struct UploadStatus {
    pub total_reports: u64,
    pub total_violations: i64,
    pub distinct_drones: i64,
    pub distinct_locations: i64,
}

impl From<analytics::UploadStatus> for UploadStatus {
    fn from(u: analytics::UploadStatus) -> Self {
        Self {
            total_reports: u.total_reports,
            total_violations: u.total_violations,
            distinct_drones: u.distinct_drones,
            distinct_locations: u.distinct_locations,
        }
    }
}

// =============================================================================
// SERVICE TYPES
// =============================================================================

/// Liveness and store reachability
#[derive(Debug, Clone, SimpleObject)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub database: String,
    pub timestamp: DateTime<Utc>,
}
