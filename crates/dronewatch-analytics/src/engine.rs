//! Analytics aggregator over persisted violations.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use dronewatch_domain::Violation;
use dronewatch_persistence::{ViolationRepository, ViolationSnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::queries::{self, DailyCount, DroneBreakdown, Kpis, RankedCount};

/// Number of violations in the summary's recent list.
pub const RECENT_LIMIT: u32 = 5;
/// Number of entries in the summary's top-types list.
pub const TOP_TYPES: usize = 3;
/// Number of entries in the summary's top-drones list.
pub const TOP_DRONES: usize = 5;

/// Every roll-up over the full violation set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytics {
    pub kpis: Kpis,
    pub type_distribution: BTreeMap<String, i64>,
    pub time_series: Vec<DailyCount>,
    pub drone_breakdown: BTreeMap<String, DroneBreakdown>,
    pub location_breakdown: BTreeMap<String, i64>,
}

impl Analytics {
    /// Fold grouped counts into every breakdown.
    #[must_use]
    pub fn from_snapshot(snapshot: &ViolationSnapshot) -> Self {
        let groups = &snapshot.groups;
        Self {
            kpis: queries::kpis(groups),
            type_distribution: queries::type_distribution(groups),
            time_series: queries::time_series(groups),
            drone_breakdown: queries::drone_breakdown(groups),
            location_breakdown: queries::location_breakdown(groups),
        }
    }
}

/// Dashboard summary: latest activity plus leaders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub kpis: Kpis,
    pub recent: Vec<Violation>,
    pub top_types: Vec<RankedCount>,
    pub top_drones: Vec<RankedCount>,
}

impl Summary {
    /// Leaders and latest activity from one snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: ViolationSnapshot) -> Self {
        let groups = &snapshot.groups;
        let per_drone: BTreeMap<String, i64> = queries::drone_breakdown(groups)
            .into_iter()
            .map(|(drone, breakdown)| (drone, breakdown.total))
            .collect();

        Self {
            kpis: queries::kpis(groups),
            top_types: queries::top_n(&queries::type_distribution(groups), TOP_TYPES),
            top_drones: queries::top_n(&per_drone, TOP_DRONES),
            recent: snapshot.recent,
        }
    }
}

/// Ingestion totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStatus {
    pub total_reports: u64,
    pub total_violations: i64,
    pub distinct_drones: i64,
    pub distinct_locations: i64,
}

/// Computes analytics from the violation repository.
#[derive(Clone)]
pub struct AnalyticsAggregator {
    violations: Arc<dyn ViolationRepository>,
}

impl AnalyticsAggregator {
    pub fn new(violations: Arc<dyn ViolationRepository>) -> Self {
        Self { violations }
    }

    pub(crate) async fn snapshot(&self, recent_limit: u32) -> Result<ViolationSnapshot> {
        let snapshot = self.violations.snapshot(recent_limit).await?;
        debug!(
            groups = snapshot.groups.len(),
            recent = snapshot.recent.len(),
            "Analytics snapshot read"
        );
        Ok(snapshot)
    }

    /// KPIs and all breakdowns.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot cannot be read.
    pub async fn analytics(&self) -> Result<Analytics> {
        let snapshot = self.snapshot(0).await?;
        Ok(Analytics::from_snapshot(&snapshot))
    }

    /// # Errors
    ///
    /// Fails if the snapshot cannot be read.
    pub async fn kpis(&self) -> Result<Kpis> {
        let snapshot = self.snapshot(0).await?;
        Ok(queries::kpis(&snapshot.groups))
    }

    /// Daily counts within an inclusive window.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot cannot be read.
    pub async fn time_series_between(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyCount>> {
        let snapshot = self.snapshot(0).await?;
        Ok(queries::restrict_series(
            queries::time_series(&snapshot.groups),
            from,
            to,
        ))
    }

    /// # Errors
    ///
    /// Fails if the snapshot cannot be read.
    pub async fn summary(&self) -> Result<Summary> {
        let snapshot = self.snapshot(RECENT_LIMIT).await?;
        Ok(Summary::from_snapshot(snapshot))
    }

    /// # Errors
    ///
    /// Fails if the snapshot cannot be read.
    pub async fn upload_status(&self) -> Result<UploadStatus> {
        let snapshot = self.snapshot(0).await?;
        let kpis = queries::kpis(&snapshot.groups);
        Ok(UploadStatus {
            total_reports: snapshot.total_reports,
            total_violations: kpis.total_violations,
            distinct_drones: kpis.distinct_drones,
            distinct_locations: kpis.distinct_locations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dronewatch_domain::ViolationQuery;
    use dronewatch_persistence::{Persistence, StoreLocation};
    use serde_json::json;

    async fn seeded() -> (Persistence, AnalyticsAggregator) {
        let persistence = Persistence::open(&StoreLocation::InMemory).unwrap();
        let ingestor = persistence.ingestor();
        let reports = [
            ("D1", "2025-01-10", "Zone A", vec![("a1", "Fire", "10:00:00"), ("a2", "PPE", "11:00:00")]),
            ("D2", "2025-01-10", "Zone B", vec![("b1", "Fire", "09:00:00")]),
            ("D1", "2025-01-11", "Zone A", vec![("a3", "Fire", "08:00:00")]),
            ("D3", "2025-01-12", "Zone C", vec![
                ("c1", "Intruder", "07:00:00"),
                ("c2", "Intruder", "07:00:00"),
                ("c3", "PPE", "23:00:00"),
            ]),
        ];
        for (drone, date, location, violations) in reports {
            let violations: Vec<_> = violations
                .into_iter()
                .map(|(id, kind, time)| {
                    json!({
                        "id": id, "type": kind, "timestamp": time,
                        "latitude": 20.0, "longitude": 80.0,
                        "image_url": "https://img.example/x.jpg"
                    })
                })
                .collect();
            ingestor
                .ingest_raw(&json!({
                    "drone_id": drone, "date": date, "location": location,
                    "violations": violations
                }))
                .await
                .unwrap();
        }
        let aggregator = AnalyticsAggregator::new(persistence.violations.clone());
        (persistence, aggregator)
    }

    #[tokio::test]
    async fn test_empty_store() {
        let persistence = Persistence::open(&StoreLocation::InMemory).unwrap();
        let aggregator = AnalyticsAggregator::new(persistence.violations.clone());
        assert_eq!(aggregator.analytics().await.unwrap(), Analytics::default());
        let summary = aggregator.summary().await.unwrap();
        assert!(summary.recent.is_empty());
        assert!(summary.top_types.is_empty());
    }

    #[tokio::test]
    async fn test_analytics_totals_match_unfiltered_query() {
        let (persistence, aggregator) = seeded().await;
        let analytics = aggregator.analytics().await.unwrap();

        let mut query = ViolationQuery::default();
        query.page.limit = 100;
        let page = persistence.query_engine().query(&query).await.unwrap();
        assert_eq!(analytics.kpis.total_violations, page.items.len() as i64);

        assert_eq!(analytics.kpis.distinct_drones, 3);
        assert_eq!(analytics.type_distribution["Fire"], 3);
        assert_eq!(analytics.location_breakdown["Zone C"], 3);
        assert_eq!(analytics.drone_breakdown["D1"].total, 3);
        assert_eq!(analytics.drone_breakdown["D1"].by_type["Fire"], 2);
        let days: Vec<i64> = analytics.time_series.iter().map(|d| d.count).collect();
        assert_eq!(days, [3, 1, 3]);
    }

    #[tokio::test]
    async fn test_summary() {
        let (_persistence, aggregator) = seeded().await;
        let summary = aggregator.summary().await.unwrap();

        let recent: Vec<&str> = summary.recent.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(recent, ["c3", "c1", "c2", "a3", "a2"]);
        assert_eq!(summary.top_types[0], RankedCount { name: "Fire".into(), count: 3 });
        assert_eq!(summary.top_types.len(), 3);
        let drones: Vec<&str> = summary.top_drones.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(drones, ["D1", "D3", "D2"]);
    }

    #[tokio::test]
    async fn test_report_figures_come_from_one_snapshot() {
        let (_persistence, aggregator) = seeded().await;
        let report = aggregator.generate_report().await.unwrap();

        assert_eq!(report.analytics.kpis, report.summary.kpis);
        assert_eq!(report.analytics.kpis.total_violations, 7);
        assert_eq!(report.summary.recent.len(), RECENT_LIMIT as usize);
        assert_eq!(report.summary, aggregator.summary().await.unwrap());
        assert_eq!(report.analytics, aggregator.analytics().await.unwrap());
    }

    #[tokio::test]
    async fn test_time_series_window_and_upload_status() {
        let (_persistence, aggregator) = seeded().await;
        let from = NaiveDate::from_ymd_opt(2025, 1, 11);
        let series = aggregator.time_series_between(from, None).await.unwrap();
        assert_eq!(series.len(), 2);

        let status = aggregator.upload_status().await.unwrap();
        assert_eq!(status.total_reports, 4);
        assert_eq!(status.total_violations, 7);
        assert_eq!(status.distinct_locations, 3);
    }
}
