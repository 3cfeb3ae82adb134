//! DuckDB repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use duckdb::{Connection, Row, params, params_from_iter};
use tracing::debug;

use crate::error::{PersistenceError, Result, is_duplicate_key};
use crate::query::{FilterSet, OrderBy, ViolationSelect};
use crate::query::filter::VIOLATION_COLUMNS;
use crate::repository::traits::{
    GroupedCount, ReportRepository, ViolationRepository, ViolationSnapshot,
};
use crate::store::DuckDbStore;
use dronewatch_domain::{
    DATE_FORMAT, DateBounds, FilterOptions, PageRequest, Report, TIME_FORMAT, Violation,
};

// =============================================================================
// ROW MAPPING
// =============================================================================

/// Raw column values, in `VIOLATION_COLUMNS` order.
struct ViolationRow {
    id: String,
    report_id: String,
    drone_id: String,
    date: String,
    location: String,
    violation_type: String,
    timestamp: String,
    latitude: f64,
    longitude: f64,
    image_url: String,
    uploaded_at: String,
}

impl ViolationRow {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            report_id: row.get(1)?,
            drone_id: row.get(2)?,
            date: row.get(3)?,
            location: row.get(4)?,
            violation_type: row.get(5)?,
            timestamp: row.get(6)?,
            latitude: row.get(7)?,
            longitude: row.get(8)?,
            image_url: row.get(9)?,
            uploaded_at: row.get(10)?,
        })
    }

    fn into_violation(self) -> Result<Violation> {
        let timestamp = NaiveTime::parse_from_str(&self.timestamp, TIME_FORMAT).map_err(|e| {
            PersistenceError::Serialization(format!("violation {} timestamp: {e}", self.id))
        })?;
        Ok(Violation {
            date: parse_date(&self.date)?,
            uploaded_at: parse_instant(&self.uploaded_at)?,
            timestamp,
            id: self.id,
            report_id: self.report_id,
            drone_id: self.drone_id,
            location: self.location,
            violation_type: self.violation_type,
            latitude: self.latitude,
            longitude: self.longitude,
            image_url: self.image_url,
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| PersistenceError::Serialization(format!("stored date '{raw}': {e}")))
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PersistenceError::Serialization(format!("stored instant '{raw}': {e}")))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn select_violations(
    conn: &Connection,
    sql: &str,
    bindings: &[String],
) -> Result<Vec<Violation>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(bindings.iter()), ViolationRow::from_row)?;
    rows.collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(ViolationRow::into_violation)
        .collect()
}

fn count_rows(conn: &Connection, sql: &str, bindings: &[String]) -> Result<u64> {
    let count: i64 = conn.query_row(sql, params_from_iter(bindings.iter()), |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or_default())
}

fn distinct_values(conn: &Connection, column: &'static str) -> Result<Vec<String>> {
    let sql = format!("SELECT DISTINCT {column} FROM violations ORDER BY {column}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(PersistenceError::from)
}

// =============================================================================
// REPORT REPOSITORY
// =============================================================================

/// Report rows in DuckDB.
#[derive(Debug, Clone)]
pub struct DuckDbReportRepository {
    store: DuckDbStore,
}

impl DuckDbReportRepository {
    #[must_use]
    pub const fn new(store: DuckDbStore) -> Self {
        Self { store }
    }
}

fn insert_report(conn: &mut Connection, report: &Report) -> Result<()> {
    let date = format_date(report.date);
    let uploaded_at = format_instant(report.uploaded_at);

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO reports (report_id, drone_id, date, location, uploaded_at)
         VALUES (?, ?, ?, ?, ?)",
        params![report.report_id, report.drone_id, date, report.location, uploaded_at],
    )
    .map_err(|err| {
        if is_duplicate_key(&err) {
            PersistenceError::DuplicateReport {
                drone_id: report.drone_id.clone(),
                date: report.date,
            }
        } else {
            err.into()
        }
    })?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO violations
                (id, report_id, drone_id, date, location, type, timestamp,
                 latitude, longitude, image_url, uploaded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )?;
        for violation in &report.violations {
            stmt.execute(params![
                violation.id,
                report.report_id,
                report.drone_id,
                date,
                report.location,
                violation.violation_type,
                violation.timestamp.format(TIME_FORMAT).to_string(),
                violation.latitude,
                violation.longitude,
                violation.image_url,
                uploaded_at,
            ])
            .map_err(|err| {
                if is_duplicate_key(&err) {
                    PersistenceError::DuplicateViolation {
                        id: violation.id.clone(),
                    }
                } else {
                    err.into()
                }
            })?;
        }
    }

    tx.commit()?;
    Ok(())
}

#[async_trait]
impl ReportRepository for DuckDbReportRepository {
    async fn exists(&self, drone_id: &str, date: NaiveDate) -> Result<bool> {
        let drone_id = drone_id.to_string();
        self.store
            .run(move |conn| {
                let found: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM reports WHERE drone_id = ? AND date = ?",
                    params![drone_id, format_date(date)],
                    |row| row.get(0),
                )?;
                Ok(found > 0)
            })
            .await
    }

    async fn insert(&self, report: &Report) -> Result<()> {
        let report = report.clone();
        self.store
            .run(move |conn| {
                insert_report(conn, &report)?;
                debug!(
                    report_id = %report.report_id,
                    violations = report.violations.len(),
                    "Report rows committed"
                );
                Ok(())
            })
            .await
    }

    async fn count(&self) -> Result<u64> {
        self.store
            .run(|conn| count_rows(conn, "SELECT COUNT(*) FROM reports", &[]))
            .await
    }
}

// =============================================================================
// VIOLATION REPOSITORY
// =============================================================================

/// Violation reads in DuckDB.
#[derive(Debug, Clone)]
pub struct DuckDbViolationRepository {
    store: DuckDbStore,
}

impl DuckDbViolationRepository {
    #[must_use]
    pub const fn new(store: DuckDbStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ViolationRepository for DuckDbViolationRepository {
    async fn find_page(
        &self,
        select: &ViolationSelect,
        window: PageRequest,
    ) -> Result<(Vec<Violation>, u64)> {
        let select = select.clone();
        self.store
            .run(move |conn| {
                let bindings = select.bindings();
                let total = count_rows(conn, &select.count_sql(), &bindings)?;
                let items = select_violations(conn, &select.select_sql(Some(window)), &bindings)?;
                Ok((items, total))
            })
            .await
    }

    async fn find_all(&self, select: &ViolationSelect) -> Result<Vec<Violation>> {
        let select = select.clone();
        self.store
            .run(move |conn| select_violations(conn, &select.select_sql(None), &select.bindings()))
            .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Violation>> {
        let id = id.to_string();
        self.store
            .run(move |conn| {
                let sql = format!("SELECT {VIOLATION_COLUMNS} FROM violations WHERE id = ?");
                Ok(select_violations(conn, &sql, &[id])?.into_iter().next())
            })
            .await
    }

    async fn filter_options(&self) -> Result<FilterOptions> {
        self.store
            .run(|conn| {
                let dates = distinct_values(conn, "date")?
                    .iter()
                    .map(|raw| parse_date(raw))
                    .collect::<Result<Vec<_>>>()?;
                Ok(FilterOptions {
                    drone_ids: distinct_values(conn, "drone_id")?,
                    violation_types: distinct_values(conn, "type")?,
                    locations: distinct_values(conn, "location")?,
                    dates: DateBounds::from_sorted(dates),
                })
            })
            .await
    }

    async fn snapshot(&self, recent_limit: u32) -> Result<ViolationSnapshot> {
        self.store
            .run(move |conn| {
                let tx = conn.transaction()?;

                let groups = {
                    let mut stmt = tx.prepare(
                        "SELECT drone_id, location, date, type, COUNT(*) AS n
                         FROM violations
                         GROUP BY drone_id, location, date, type
                         ORDER BY drone_id, location, date, type",
                    )?;
                    let rows = stmt.query_map([], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, i64>(4)?,
                        ))
                    })?;
                    rows.collect::<std::result::Result<Vec<_>, _>>()?
                        .into_iter()
                        .map(|(drone_id, location, date, violation_type, count)| {
                            Ok(GroupedCount {
                                date: parse_date(&date)?,
                                drone_id,
                                location,
                                violation_type,
                                count,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?
                };

                let recent = if recent_limit == 0 {
                    Vec::new()
                } else {
                    let select = ViolationSelect::new(FilterSet::new(), OrderBy::newest_first());
                    let window = PageRequest {
                        page: 1,
                        limit: recent_limit,
                    };
                    select_violations(&tx, &select.select_sql(Some(window)), &[])?
                };

                let total_reports = count_rows(&tx, "SELECT COUNT(*) FROM reports", &[])?;
                tx.commit()?;

                Ok(ViolationSnapshot {
                    groups,
                    recent,
                    total_reports,
                })
            })
            .await
    }
}

