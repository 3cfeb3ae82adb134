//! DuckDB store handle and schema.
//!
//! One connection is shared by every repository. DuckDB calls are blocking,
//! so all work runs on the tokio blocking pool while holding the connection
//! lock.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use duckdb::Connection;
use tracing::{debug, info};

use crate::error::{PersistenceError, Result};

/// Location string that selects a transient in-memory database.
pub const IN_MEMORY: &str = ":memory:";

const SCHEMA: &str = r"
    CREATE SEQUENCE IF NOT EXISTS violation_arrival_seq START 1;

    CREATE TABLE IF NOT EXISTS reports (
        report_id   VARCHAR PRIMARY KEY,
        drone_id    VARCHAR NOT NULL,
        date        VARCHAR NOT NULL,
        location    VARCHAR NOT NULL,
        uploaded_at VARCHAR NOT NULL,
        UNIQUE (drone_id, date)
    );

    CREATE TABLE IF NOT EXISTS violations (
        id          VARCHAR PRIMARY KEY,
        report_id   VARCHAR NOT NULL REFERENCES reports (report_id),
        drone_id    VARCHAR NOT NULL,
        date        VARCHAR NOT NULL,
        location    VARCHAR NOT NULL,
        type        VARCHAR NOT NULL,
        timestamp   VARCHAR NOT NULL,
        latitude    DOUBLE  NOT NULL,
        longitude   DOUBLE  NOT NULL,
        image_url   VARCHAR NOT NULL,
        uploaded_at VARCHAR NOT NULL,
        arrival_seq BIGINT  NOT NULL DEFAULT nextval('violation_arrival_seq')
    );

    CREATE INDEX IF NOT EXISTS idx_violations_drone ON violations (drone_id);
    CREATE INDEX IF NOT EXISTS idx_violations_date ON violations (date);
    CREATE INDEX IF NOT EXISTS idx_violations_type ON violations (type);
";

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    InMemory,
    File(PathBuf),
}

impl StoreLocation {
    /// Interpret a configured path; `:memory:` selects an in-memory store.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == IN_MEMORY {
            Self::InMemory
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InMemory => f.write_str(IN_MEMORY),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Shared handle to the relational store. Cloning is cheap.
#[derive(Clone)]
pub struct DuckDbStore {
    conn: Arc<Mutex<Connection>>,
    location: StoreLocation,
}

impl std::fmt::Debug for DuckDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl DuckDbStore {
    /// Open a transient in-memory store with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Storage`] if DuckDB cannot start.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, StoreLocation::InMemory)
    }

    /// Open (or create) a file-backed store, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Storage`] if the directory or database
    /// cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                PersistenceError::Storage(format!("cannot create {}: {err}", parent.display()))
            })?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn, StoreLocation::File(path.to_path_buf()))
    }

    /// Open whatever `location` names.
    ///
    /// # Errors
    ///
    /// See [`DuckDbStore::open`].
    pub fn open_location(location: &StoreLocation) -> Result<Self> {
        match location {
            StoreLocation::InMemory => Self::open_in_memory(),
            StoreLocation::File(path) => Self::open(path),
        }
    }

    fn with_connection(conn: Connection, location: StoreLocation) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        info!(location = %location, "DuckDB store ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location,
        })
    }

    #[must_use]
    pub const fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Run `op` against the connection on the blocking pool.
    ///
    /// The lock is held for the whole closure, so everything `op` does is
    /// isolated from other store calls.
    ///
    /// # Errors
    ///
    /// Propagates the closure's error, or [`PersistenceError::Storage`] if
    /// the task panicked or the lock was poisoned.
    pub async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| PersistenceError::Storage("connection lock poisoned".to_string()))?;
            op(&mut guard)
        })
        .await?
    }

    /// Cheap liveness probe.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Storage`] when the store does not answer.
    pub async fn ping(&self) -> Result<()> {
        self.run(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))?;
            debug!("DuckDB ping ok");
            Ok(())
        })
        .await
    }
}
