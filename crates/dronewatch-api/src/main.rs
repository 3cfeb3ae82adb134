//! # DroneWatch API Server
//!
//! Binary entry point for the GraphQL/REST service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dronewatch_api::{ApiContext, Config, build_router, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!(version = dronewatch_api::VERSION, "Starting DroneWatch API");
    for warning in &config.warnings {
        tracing::warn!(%warning, "Configuration value ignored");
    }

    tracing::info!(database = %config.database, "Opening store");
    let ctx = ApiContext::from_config(&config)?;

    if config.seed_on_empty {
        match seed::seed_if_empty(&ctx).await {
            Ok(Some(result)) => {
                tracing::info!(ingested = result.ingested, "Store was empty, sample data loaded");
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "Sample data not loaded"),
        }
    }

    tracing::info!(
        playground = config.enable_playground,
        introspection = config.enable_introspection,
        max_depth = config.max_query_depth,
        max_complexity = config.max_query_complexity,
        boundaries = %config.boundary_path.display(),
        "GraphQL schema built"
    );

    let app = build_router(ctx, &config);

    let addr = config.server_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "GraphQL endpoint available at http://{}/graphql", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
