//! # GraphQL Query Resolver
//!
//! Read operations for the DroneWatch API.

use async_graphql::{Context, ID, Json, Object, Result};
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use dronewatch_domain::parse_map_params;

use crate::context::ApiContext;
use crate::error::ApiError;
use crate::schema::*;

/// GraphQL Query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    // =========================================================================
    // VIOLATION QUERIES
    // =========================================================================

    /// Filtered, sorted, paginated violation listing
    async fn violations(
        &self,
        ctx: &Context<'_>,
        params: Option<ViolationQueryInput>,
    ) -> Result<ViolationPage> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let raw = params.unwrap_or_default().to_raw_params();

        let page = api_ctx.queries.query_raw(&raw).await.map_err(ApiError::from)?;
        Ok(page.into())
    }

    /// Case-insensitive search over type, drone id and location
    #[graphql(name = "searchViolations")]
    async fn search_violations(
        &self,
        ctx: &Context<'_>,
        term: String,
        page: Option<i32>,
        limit: Option<i32>,
    ) -> Result<ViolationPage> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let page = api_ctx
            .queries
            .search_raw(&term, &page_params(page, limit))
            .await
            .map_err(ApiError::from)?;
        Ok(page.into())
    }

    /// Single violation by id
    async fn violation(&self, ctx: &Context<'_>, id: ID) -> Result<Violation> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let violation = api_ctx
            .queries
            .get_by_id(id.as_str())
            .await
            .map_err(ApiError::from)?;
        Ok(violation.into())
    }

    /// Distinct drones, types, locations and dates
    #[graphql(name = "filterOptions")]
    async fn filter_options(&self, ctx: &Context<'_>) -> Result<FilterOptions> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let options = api_ctx.queries.filter_options().await.map_err(ApiError::from)?;
        Ok(options.into())
    }

    /// Every violation matching the map filters, unpaginated
    #[graphql(name = "mapMarkers")]
    async fn map_markers(
        &self,
        ctx: &Context<'_>,
        params: Option<MapFilterInput>,
    ) -> Result<Vec<Violation>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let raw = params.unwrap_or_default().to_raw_params();
        let filters = parse_map_params(&raw).map_err(ApiError::from)?;

        let markers = api_ctx
            .queries
            .map_markers(&filters)
            .await
            .map_err(ApiError::from)?;
        Ok(markers.into_iter().map(Violation::from).collect())
    }

    // =========================================================================
    // ANALYTICS QUERIES
    // =========================================================================

    /// KPIs plus type, day, drone and location breakdowns
    async fn analytics(&self, ctx: &Context<'_>) -> Result<Analytics> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let analytics = api_ctx.analytics.analytics().await.map_err(ApiError::from)?;
        Ok(analytics.into())
    }

    async fn kpis(&self, ctx: &Context<'_>) -> Result<Kpis> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let kpis = api_ctx.analytics.kpis().await.map_err(ApiError::from)?;
        Ok(kpis.into())
    }

    /// Daily counts, optionally limited to an inclusive window
    #[graphql(name = "timeSeries")]
    async fn time_series(
        &self,
        ctx: &Context<'_>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<DailyCount>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let series = api_ctx
            .analytics
            .time_series_between(date_from, date_to)
            .await
            .map_err(ApiError::from)?;
        Ok(series.into_iter().map(DailyCount::from).collect())
    }

    /// Recent violations and top types and drones
    async fn summary(&self, ctx: &Context<'_>) -> Result<Summary> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let summary = api_ctx.analytics.summary().await.map_err(ApiError::from)?;
        Ok(summary.into())
    }

    #[graphql(name = "uploadStatus")]
    async fn upload_status(&self, ctx: &Context<'_>) -> Result<UploadStatus> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let status = api_ctx.analytics.upload_status().await.map_err(ApiError::from)?;
        Ok(status.into())
    }

    // =========================================================================
    // BOUNDARY QUERIES
    // =========================================================================

    /// Safety-zone `FeatureCollection`
    async fn boundaries(&self, ctx: &Context<'_>) -> Result<Json<Value>> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let dataset = api_ctx.boundaries.boundaries().await.map_err(ApiError::from)?;
        let json = dataset.to_json().map_err(ApiError::from)?;
        Ok(Json(json))
    }

    /// Safety zones as a KML document
    #[graphql(name = "boundariesKml")]
    async fn boundaries_kml(&self, ctx: &Context<'_>) -> Result<String> {
        let api_ctx = ctx.data::<ApiContext>()?;
        Ok(api_ctx
            .boundaries
            .boundaries_as_kml()
            .await
            .map_err(ApiError::from)?)
    }

    // =========================================================================
    // SYSTEM QUERIES
    // =========================================================================

    /// API health check
    async fn health(&self, ctx: &Context<'_>) -> Result<HealthStatus> {
        let api_ctx = ctx.data::<ApiContext>()?;
        let database = match api_ctx.persistence.store.ping().await {
            Ok(()) => "up",
            Err(err) => {
                tracing::warn!(error = %err, "Store ping failed");
                "down"
            }
        };

        Ok(HealthStatus {
            status: if database == "up" { "healthy" } else { "degraded" }.to_string(),
            version: crate::VERSION.to_string(),
            database: database.to_string(),
            timestamp: Utc::now(),
        })
    }

    /// API version
    async fn version(&self) -> &'static str {
        crate::VERSION
    }
}

