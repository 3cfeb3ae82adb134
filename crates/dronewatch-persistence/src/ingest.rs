//! Report ingestion.
//!
//! A report becomes one report row plus one row per violation, written in
//! a single transaction. One report per (drone, date): the existence check
//! gives a fast answer, the UNIQUE constraint is what actually decides.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{PersistenceError, Result};
use crate::repository::ReportRepository;
use dronewatch_domain::{Report, ReportSubmission, Violation, validate_report};

/// Build a report identifier: drone, day and a time-ordered UUID.
#[must_use]
pub fn report_id(submission: &ReportSubmission) -> String {
    format!(
        "{}_{}_{}",
        submission.drone_id,
        submission.date.format(dronewatch_domain::DATE_FORMAT),
        Uuid::now_v7()
    )
}

/// Expand a validated submission into the rows to persist.
#[must_use]
pub fn build_report(submission: ReportSubmission, uploaded_at: DateTime<Utc>) -> Report {
    let report_id = report_id(&submission);
    let violations = submission
        .violations
        .into_iter()
        .map(|v| Violation {
            id: v.id,
            report_id: report_id.clone(),
            drone_id: submission.drone_id.clone(),
            date: submission.date,
            location: submission.location.clone(),
            violation_type: v.violation_type,
            timestamp: v.timestamp,
            latitude: v.latitude,
            longitude: v.longitude,
            image_url: v.image_url,
            uploaded_at,
        })
        .collect();

    Report {
        report_id,
        drone_id: submission.drone_id,
        date: submission.date,
        location: submission.location,
        uploaded_at,
        violations,
    }
}

/// Turns validated reports into persisted rows.
#[derive(Clone)]
pub struct ReportIngestor {
    reports: Arc<dyn ReportRepository>,
}

impl ReportIngestor {
    pub fn new(reports: Arc<dyn ReportRepository>) -> Self {
        Self { reports }
    }

    /// Persist a validated report.
    ///
    /// # Errors
    ///
    /// - [`PersistenceError::DuplicateReport`] if the drone already reported
    ///   for that date, whether caught by the pre-check or by the constraint
    /// - [`PersistenceError::DuplicateViolation`] if a violation id is taken
    /// - [`PersistenceError::Storage`] on any other store failure
    pub async fn ingest(&self, submission: ReportSubmission) -> Result<Report> {
        if self.reports.exists(&submission.drone_id, submission.date).await? {
            debug!(
                drone_id = %submission.drone_id,
                date = %submission.date,
                "Report rejected: already exists"
            );
            return Err(PersistenceError::DuplicateReport {
                drone_id: submission.drone_id,
                date: submission.date,
            });
        }

        // Stored with microsecond precision; truncate so the returned value
        // matches what a later read yields.
        let report = build_report(submission, Utc::now().trunc_subsecs(6));

        match self.reports.insert(&report).await {
            Ok(()) => {
                info!(
                    report_id = %report.report_id,
                    drone_id = %report.drone_id,
                    date = %report.date,
                    violations = report.violations.len(),
                    "Report ingested"
                );
                Ok(report)
            }
            Err(err @ PersistenceError::DuplicateReport { .. }) => {
                warn!(
                    drone_id = %report.drone_id,
                    date = %report.date,
                    "Concurrent duplicate report rejected by constraint"
                );
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Validate an arbitrary JSON value, then ingest it.
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Validation`] listing every invalid field, or any
    /// error from [`ReportIngestor::ingest`].
    pub async fn ingest_raw(&self, value: &Value) -> Result<Report> {
        let submission = validate_report(value)?;
        self.ingest(submission).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;

    /// Repository whose pre-check always passes but whose insert reports a
    /// constraint clash, as happens when two uploads race.
    #[derive(Default)]
    struct RacingRepository {
        inserted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReportRepository for RacingRepository {
        async fn exists(&self, _drone_id: &str, _date: NaiveDate) -> Result<bool> {
            Ok(false)
        }

        async fn insert(&self, report: &Report) -> Result<()> {
            let mut inserted = self.inserted.lock().unwrap();
            if !inserted.is_empty() {
                return Err(PersistenceError::DuplicateReport {
                    drone_id: report.drone_id.clone(),
                    date: report.date,
                });
            }
            inserted.push(report.report_id.clone());
            Ok(())
        }

        async fn count(&self) -> Result<u64> {
            Ok(self.inserted.lock().unwrap().len() as u64)
        }
    }

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
    fn test_report_id_shape() {
        let submission = validate_report(&sample()).unwrap();
        let a = report_id(&submission);
        let b = report_id(&submission);
        assert!(a.starts_with("D1_2025-01-01_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_build_report_denormalizes() {
        let submission = validate_report(&sample()).unwrap();
        let now = Utc::now();
        let report = build_report(submission, now);
        let v = &report.violations[0];
        assert_eq!(v.report_id, report.report_id);
        assert_eq!(v.drone_id, "D1");
        assert_eq!(v.location, "Zone A");
        assert_eq!(v.uploaded_at, now);
    }

    #[tokio::test]
    async fn test_constraint_clash_surfaces_as_duplicate() {
        let ingestor = ReportIngestor::new(Arc::new(RacingRepository::default()));
        ingestor.ingest_raw(&sample()).await.unwrap();

        let err = ingestor.ingest_raw(&sample()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::DuplicateReport { .. }));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_storage() {
        let repo = Arc::new(RacingRepository::default());
        let ingestor = ReportIngestor::new(repo.clone());
        let mut bad = sample();
        bad["violations"][0]["latitude"] = json!(91);

        let err = ingestor.ingest_raw(&bad).await.unwrap_err();
        match err {
            PersistenceError::Validation(errors) => {
                assert!(errors.has_field("violations[0].latitude"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
