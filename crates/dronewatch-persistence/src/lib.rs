//! # DroneWatch Persistence Library
//!
//! Storage, ingestion and query layer for drone incident reports.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application Layer                       │
//! └─────────────────────────────────────────────────────────────┘
//!                │                              │
//!                ▼                              ▼
//! ┌─────────────────────────────┐  ┌────────────────────────────┐
//! │       ReportIngestor        │  │        QueryEngine         │
//! │ (dedupe, ids, transaction)  │  │ (FilterSet, OrderBy, page) │
//! └─────────────────────────────┘  └────────────────────────────┘
//!                │                              │
//!                ▼                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │     Repository Traits (ReportRepository, ViolationRepo)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │           DuckDbStore (one connection, blocking pool)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dronewatch_persistence::{Persistence, StoreLocation};
//!
//! let persistence = Persistence::open(&StoreLocation::InMemory)?;
//! let report = persistence.ingestor().ingest_raw(&json).await?;
//! let page = persistence.query_engine().query(&ViolationQuery::default()).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod ingest;
pub mod query;
pub mod repository;
pub mod store;

use std::sync::Arc;

pub use error::{PersistenceError, Result};
pub use ingest::ReportIngestor;
pub use query::{FilterClause, FilterSet, OrderBy, QueryEngine, ViolationSelect};
pub use repository::{
    DuckDbReportRepository, DuckDbViolationRepository, GroupedCount, ReportRepository,
    ViolationRepository, ViolationSnapshot,
};
pub use store::{DuckDbStore, StoreLocation};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A store plus the repositories built on it.
#[derive(Clone)]
pub struct Persistence {
    pub store: DuckDbStore,
    pub reports: Arc<dyn ReportRepository>,
    pub violations: Arc<dyn ViolationRepository>,
}

impl Persistence {
    #[must_use]
    pub fn new(store: DuckDbStore) -> Self {
        Self {
            reports: Arc::new(DuckDbReportRepository::new(store.clone())),
            violations: Arc::new(DuckDbViolationRepository::new(store.clone())),
            store,
        }
    }

    /// Open the store at `location` and wire up the repositories.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(location: &StoreLocation) -> Result<Self> {
        DuckDbStore::open_location(location).map(Self::new)
    }

    #[must_use]
    pub fn ingestor(&self) -> ReportIngestor {
        ReportIngestor::new(Arc::clone(&self.reports))
    }

    #[must_use]
    pub fn query_engine(&self) -> QueryEngine {
        QueryEngine::new(Arc::clone(&self.violations), Arc::clone(&self.reports))
    }
}
