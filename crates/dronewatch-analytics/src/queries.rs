//! Roll-ups folded from grouped violation counts.
//!
//! Everything here is pure: the storage layer hands over one row per
//! (drone, location, date, type) and these functions derive every breakdown
//! from it, so all figures in one response agree with each other.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use dronewatch_persistence::GroupedCount;
use serde::{Deserialize, Serialize};

/// Headline counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_violations: i64,
    pub distinct_drones: i64,
    pub distinct_locations: i64,
    pub distinct_types: i64,
}

/// Violations recorded on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Per-drone totals with a nested type breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroneBreakdown {
    pub total: i64,
    pub by_type: BTreeMap<String, i64>,
}

/// A label and its count, used for top-N lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCount {
    pub name: String,
    pub count: i64,
}

fn distinct<'a>(groups: &'a [GroupedCount], key: impl Fn(&'a GroupedCount) -> &'a str) -> i64 {
    let set: BTreeSet<&str> = groups.iter().map(key).collect();
    i64::try_from(set.len()).unwrap_or(i64::MAX)
}

#[must_use]
pub fn kpis(groups: &[GroupedCount]) -> Kpis {
    Kpis {
        total_violations: groups.iter().map(|g| g.count).sum(),
        distinct_drones: distinct(groups, |g| g.drone_id.as_str()),
        distinct_locations: distinct(groups, |g| g.location.as_str()),
        distinct_types: distinct(groups, |g| g.violation_type.as_str()),
    }
}

fn tally<K: Ord>(groups: &[GroupedCount], key: impl Fn(&GroupedCount) -> K) -> BTreeMap<K, i64> {
    let mut out = BTreeMap::new();
    for group in groups {
        *out.entry(key(group)).or_insert(0) += group.count;
    }
    out
}

/// Type label to count.
#[must_use]
pub fn type_distribution(groups: &[GroupedCount]) -> BTreeMap<String, i64> {
    tally(groups, |g| g.violation_type.clone())
}

/// Location label to count.
#[must_use]
pub fn location_breakdown(groups: &[GroupedCount]) -> BTreeMap<String, i64> {
    tally(groups, |g| g.location.clone())
}

/// Daily counts, date ascending.
#[must_use]
pub fn time_series(groups: &[GroupedCount]) -> Vec<DailyCount> {
    tally(groups, |g| g.date)
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Keep the days inside the inclusive window; either bound may be open.
#[must_use]
pub fn restrict_series(
    series: Vec<DailyCount>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<DailyCount> {
    series
        .into_iter()
        .filter(|day| from.is_none_or(|f| day.date >= f) && to.is_none_or(|t| day.date <= t))
        .collect()
}

/// Drone to total and type breakdown.
///
/// Counts are first summed per (drone, type), then regrouped under each
/// drone.
#[must_use]
pub fn drone_breakdown(groups: &[GroupedCount]) -> BTreeMap<String, DroneBreakdown> {
    let per_pair = tally(groups, |g| (g.drone_id.clone(), g.violation_type.clone()));

    let mut drones: BTreeMap<String, DroneBreakdown> = BTreeMap::new();
    for ((drone_id, violation_type), count) in per_pair {
        let entry = drones.entry(drone_id).or_default();
        entry.total += count;
        entry.by_type.insert(violation_type, count);
    }
    drones
}

/// The `n` largest entries, count descending then name ascending.
#[must_use]
pub fn top_n(counts: &BTreeMap<String, i64>, n: usize) -> Vec<RankedCount> {
    let mut ranked: Vec<RankedCount> = counts
        .iter()
        .map(|(name, count)| RankedCount {
            name: name.clone(),
            count: *count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(n);
    ranked
}
