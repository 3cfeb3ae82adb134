//! Sample data loading.
//!
//! The sample file is a JSON array of report submissions. Reports already
//! present are skipped; nothing is ever deleted.

use std::path::Path;

use dronewatch_persistence::PersistenceError;
use serde_json::Value;

use crate::context::ApiContext;
use crate::error::{ApiError, ApiResult};
use crate::schema::SeedResult;

async fn load_sample_reports(path: &Path) -> ApiResult<Vec<Value>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound {
                entity_type: "sample data".to_string(),
                id: path.display().to_string(),
            });
        }
        Err(err) => return Err(ApiError::Internal(err.to_string())),
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(reports)) => Ok(reports),
        Ok(_) => Err(ApiError::MalformedInput(format!(
            "{} must contain a JSON array of reports",
            path.display()
        ))),
        Err(err) => Err(ApiError::MalformedInput(err.to_string())),
    }
}

/// Ingest every sample report that is not stored yet.
///
/// # Errors
///
/// Fails if the sample file is missing or malformed, or a sample report is
/// rejected for any reason other than being a duplicate.
pub async fn seed_sample_data(ctx: &ApiContext) -> ApiResult<SeedResult> {
    let reports = load_sample_reports(&ctx.sample_reports_path).await?;
    let mut result = SeedResult::default();

    for report in &reports {
        match ctx.ingestor.ingest_raw(report).await {
            Ok(_) => result.ingested += 1,
            Err(PersistenceError::DuplicateReport { .. }) => result.skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }

    tracing::info!(
        path = %ctx.sample_reports_path.display(),
        ingested = result.ingested,
        skipped = result.skipped,
        "Sample data seeded"
    );
    Ok(result)
}

/// Seed only when the store holds no reports.
///
/// # Errors
///
/// Same as [`seed_sample_data`], plus storage failures while counting.
pub async fn seed_if_empty(ctx: &ApiContext) -> ApiResult<Option<SeedResult>> {
    let existing = ctx.queries.report_count().await?;
    if existing > 0 {
        tracing::debug!(reports = existing, "Store already populated, skipping seed");
        return Ok(None);
    }
    seed_sample_data(ctx).await.map(Some)
}
