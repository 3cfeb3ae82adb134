//! # GraphQL Mutation Resolver
//!
//! Write operations for the DroneWatch API.

use async_graphql::{Context, Json, Object, Result};
use serde_json::Value;

use crate::context::ApiContext;
use crate::error::ApiError;
use crate::schema::*;
use crate::seed;

/// GraphQL Mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Submit one drone's daily report
    ///
    /// The payload is arbitrary JSON; every offending field is listed in the
    /// `fields` extension when validation fails. A second report for the same
    /// drone and day is rejected with `DUPLICATE_REPORT`.
    #[graphql(name = "ingestReport")]
    async fn ingest_report(&self, ctx: &Context<'_>, report: Json<Value>) -> Result<Report> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let stored = api_ctx
            .ingestor
            .ingest_raw(&report.0)
            .await
            .map_err(ApiError::from)?;
        Ok(stored.into())
    }

    /// Load the bundled sample reports, skipping any already stored
    #[graphql(name = "seedSampleData")]
    async fn seed_sample_data(&self, ctx: &Context<'_>) -> Result<SeedResult> {
        let api_ctx = ctx.data::<ApiContext>()?;
        Ok(seed::seed_sample_data(api_ctx).await?)
    }
}
