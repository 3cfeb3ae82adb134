//! Printable analytics reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::engine::{Analytics, AnalyticsAggregator, RECENT_LIMIT, Summary};
use crate::error::Result;

/// Full analytics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub analytics: Analytics,
    pub summary: Summary,
}

impl AnalyticsAggregator {
    /// Gather everything a printable report needs from a single snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read.
    pub async fn generate_report(&self) -> Result<AnalyticsReport> {
        let snapshot = self.snapshot(RECENT_LIMIT).await?;
        Ok(AnalyticsReport {
            generated_at: Utc::now(),
            analytics: Analytics::from_snapshot(&snapshot),
            summary: Summary::from_snapshot(snapshot),
        })
    }
}

/// Pretty-printed JSON.
///
/// # Errors
///
/// Returns `Conversion` if serialization fails.
pub fn render_json(report: &AnalyticsReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Make text safe inside a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn count_table(md: &mut String, title: &str, label: &str, rows: impl IntoIterator<Item = (String, i64)>) {
    let rows: Vec<_> = rows.into_iter().collect();
    if rows.is_empty() {
        return;
    }
    let _ = writeln!(md, "## {title}\n");
    let _ = writeln!(md, "| {label} | Violations |");
    md.push_str("|---|---|\n");
    for (name, count) in rows {
        let _ = writeln!(md, "| {} | {count} |", cell(&name));
    }
    md.push('\n');
}

/// Markdown rendering for humans.
#[must_use]
pub fn render_markdown(report: &AnalyticsReport) -> String {
    let kpis = &report.analytics.kpis;
    let mut md = String::new();
    md.push_str("# Drone Safety Analytics Report\n\n");
    let _ = writeln!(md, "**Generated:** {}\n", report.generated_at.to_rfc3339());

    md.push_str("## Overview\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    let _ = writeln!(md, "| Total Violations | {} |", kpis.total_violations);
    let _ = writeln!(md, "| Drones | {} |", kpis.distinct_drones);
    let _ = writeln!(md, "| Locations | {} |", kpis.distinct_locations);
    let _ = writeln!(md, "| Violation Types | {} |", kpis.distinct_types);
    md.push('\n');

    count_table(
        &mut md,
        "Violations by Type",
        "Type",
        report.analytics.type_distribution.clone(),
    );
    count_table(
        &mut md,
        "Violations by Location",
        "Location",
        report.analytics.location_breakdown.clone(),
    );
    count_table(
        &mut md,
        "Daily Violations",
        "Date",
        report
            .analytics
            .time_series
            .iter()
            .map(|day| (day.date.to_string(), day.count)),
    );

    if !report.analytics.drone_breakdown.is_empty() {
        md.push_str("## Drones\n\n");
        md.push_str("| Drone | Total | Breakdown |\n");
        md.push_str("|-------|-------|-----------|\n");
        for (drone, breakdown) in &report.analytics.drone_breakdown {
            let detail: Vec<String> = breakdown
                .by_type
                .iter()
                .map(|(kind, n)| format!("{}: {n}", cell(kind)))
                .collect();
            let _ = writeln!(md, "| {} | {} | {} |", cell(drone), breakdown.total, detail.join(", "));
        }
        md.push('\n');
    }

    if !report.summary.recent.is_empty() {
        md.push_str("## Recent Violations\n\n");
        md.push_str("| Date | Time | Drone | Type | Location |\n");
        md.push_str("|------|------|-------|------|----------|\n");
        for v in &report.summary.recent {
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} | {} |",
                v.date,
                v.timestamp,
                cell(&v.drone_id),
                cell(&v.violation_type),
                cell(&v.location)
            );
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{DailyCount, Kpis};
    use chrono::NaiveDate;

    fn report() -> AnalyticsReport {
        let mut analytics = Analytics {
            kpis: Kpis {
                total_violations: 3,
                distinct_drones: 1,
                distinct_locations: 1,
                distinct_types: 2,
            },
            ..Analytics::default()
        };
        analytics.type_distribution.insert("Fire Detected".into(), 2);
        analytics.type_distribution.insert("No PPE Kit".into(), 1);
        analytics.time_series.push(DailyCount {
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            count: 3,
        });
        AnalyticsReport {
            generated_at: Utc::now(),
            analytics,
            summary: Summary::default(),
        }
    }

    #[test]
    fn test_markdown_sections() {
        let md = render_markdown(&report());
        assert!(md.starts_with("# Drone Safety Analytics Report"));
        assert!(md.contains("| Total Violations | 3 |"));
        assert!(md.contains("| Fire Detected | 2 |"));
        assert!(md.contains("| 2025-01-10 | 3 |"));
        assert!(!md.contains("## Recent Violations"));
    }

    #[test]
    fn test_pipes_in_labels_are_escaped() {
        let mut report = report();
        report.analytics.location_breakdown.insert("Gate 1|North".into(), 4);
        let md = render_markdown(&report);
        assert!(md.contains("| Gate 1\\|North | 4 |"));
        assert_eq!(cell("a|b\nc"), "a\\|b c");
    }

    #[test]
    fn test_json_round_trips() {
        let json = render_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["analytics"]["kpis"]["total_violations"], 3);
        assert_eq!(value["analytics"]["type_distribution"]["No PPE Kit"], 1);
    }
}
