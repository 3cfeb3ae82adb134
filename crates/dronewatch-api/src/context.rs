//! # API Context
//!
//! Application state and dependency injection for GraphQL resolvers and
//! REST handlers.

use std::path::{Path, PathBuf};

use dronewatch_analytics::AnalyticsAggregator;
use dronewatch_geo::BoundaryExporter;
use dronewatch_persistence::{
    Persistence, QueryEngine, ReportIngestor, Result as PersistenceResult, StoreLocation,
};

use crate::config::Config;

/// Application context shared across all resolvers and handlers
#[derive(Clone)]
pub struct ApiContext {
    /// Store handle plus repositories
    pub persistence: Persistence,

    /// Report ingestion
    pub ingestor: ReportIngestor,

    /// Listing, search and lookup
    pub queries: QueryEngine,

    /// Dashboard roll-ups
    pub analytics: AnalyticsAggregator,

    /// Safety-zone dataset
    pub boundaries: BoundaryExporter,

    /// Sample reports used by `seedSampleData`
    pub sample_reports_path: PathBuf,
}

impl ApiContext {
    /// Wire every component onto one persistence handle
    pub fn new(
        persistence: Persistence,
        boundary_path: impl Into<PathBuf>,
        sample_reports_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ingestor: persistence.ingestor(),
            queries: persistence.query_engine(),
            analytics: AnalyticsAggregator::new(persistence.violations.clone()),
            boundaries: BoundaryExporter::new(boundary_path),
            sample_reports_path: sample_reports_path.into(),
            persistence,
        }
    }

    /// Open the configured store and build the context around it
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened.
    pub fn from_config(config: &Config) -> PersistenceResult<Self> {
        let persistence = Persistence::open(&config.database)?;
        Ok(Self::new(
            persistence,
            &config.boundary_path,
            &config.sample_reports_path,
        ))
    }

    /// In-memory store with the given data files, for tests
    ///
    /// # Errors
    ///
    /// Fails if `DuckDB` cannot open an in-memory database.
    pub fn in_memory(boundary_path: &Path, sample_reports_path: &Path) -> PersistenceResult<Self> {
        let persistence = Persistence::open(&StoreLocation::InMemory)?;
        Ok(Self::new(persistence, boundary_path, sample_reports_path))
    }
}
