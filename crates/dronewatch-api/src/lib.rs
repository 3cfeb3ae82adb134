//! # DroneWatch API
//!
//! GraphQL and REST service over the DroneWatch incident store.
//!
//! ## Features
//!
//! - **Report ingestion**: validated daily reports via the `ingestReport` mutation
//! - **Violation queries**: filtering, sorting, pagination and free-text search
//! - **Analytics**: KPIs, breakdowns and a printable Markdown report
//! - **Boundaries**: safety zones as GeoJSON or KML
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Axum HTTP Server                         │
//! │        (GraphQL Endpoint + Playground + REST exports)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                async-graphql Schema                         │
//! │                (QueryRoot, MutationRoot)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ApiContext                               │
//! │   (Ingestor, QueryEngine, AnalyticsAggregator, Boundaries)  │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │     DuckDB store        │   │     GeoJSON boundary file    │
//! │  (reports, violations)  │   │        (safety zones)        │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod error;
pub mod resolvers;
pub mod schema;
pub mod seed;

use async_graphql::{EmptySubscription, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{Html, IntoResponse},
    routing::get,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use dronewatch_analytics::{render_json, render_markdown};
use dronewatch_geo::{GEOJSON_CONTENT_TYPE, KML_CONTENT_TYPE};

pub use config::Config;
pub use context::ApiContext;
pub use error::{ApiError, ApiResult};
pub use resolvers::{MutationRoot, QueryRoot};

/// GraphQL schema type
pub type ApiSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema with context and the configured limits
pub fn build_schema(ctx: ApiContext, config: &Config) -> ApiSchema {
    let builder = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(ctx)
        .limit_depth(config.max_query_depth)
        .limit_complexity(config.max_query_complexity);

    if config.enable_introspection {
        builder.finish()
    } else {
        builder.disable_introspection().finish()
    }
}

/// Application state for Axum handlers
#[derive(Clone)]
pub struct AppState {
    pub schema: ApiSchema,
    pub ctx: ApiContext,
}

/// GraphQL endpoint handler
pub async fn graphql_handler(
    State(state): State<AppState>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    state.schema.execute(req.into_inner()).await.into()
}

/// GraphQL Playground HTML
pub async fn graphql_playground() -> impl IntoResponse {
    Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}

/// Health check endpoint, reports the store as well
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.ctx.persistence.store.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(err) => {
            tracing::warn!(error = %err, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable")
        }
    }
}

/// Boundary dataset exactly as stored
pub async fn boundaries_geojson(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let dataset = state.ctx.boundaries.boundaries().await?;
    Ok((
        [(header::CONTENT_TYPE, GEOJSON_CONTENT_TYPE)],
        dataset.raw().to_string(),
    ))
}

/// Boundary dataset rendered as KML
pub async fn boundaries_kml(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let kml = state.ctx.boundaries.boundaries_as_kml().await?;
    Ok(([(header::CONTENT_TYPE, KML_CONTENT_TYPE)], kml))
}

/// Printable analytics report
pub async fn analytics_markdown(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let report = state.ctx.analytics.generate_report().await?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_markdown(&report),
    ))
}

/// Analytics report as JSON
pub async fn analytics_json(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let report = state.ctx.analytics.generate_report().await?;
    let body = render_json(&report)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Build the Axum router
pub fn build_router(ctx: ApiContext, config: &Config) -> Router {
    let schema = build_schema(ctx.clone(), config);
    let state = AppState { schema, ctx };

    let graphql = if config.enable_playground {
        get(graphql_playground).post(graphql_handler)
    } else {
        axum::routing::post(graphql_handler)
    };

    Router::new()
        // GraphQL endpoint
        .route("/graphql", graphql)
        // REST exports
        .route("/api/boundaries", get(boundaries_geojson))
        .route("/api/boundaries/kml", get(boundaries_kml))
        .route("/api/analytics/report.md", get(analytics_markdown))
        .route("/api/analytics/report.json", get(analytics_json))
        // Health check
        .route("/health", get(health_check))
        .route("/", get(|| async { "DroneWatch API" }))
        // State and middleware
        .with_state(state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
