//! # API Configuration
//!
//! Environment-based configuration for the DroneWatch service. Values that
//! fail to parse fall back to their defaults; the reasons are kept in
//! [`Config::warnings`] and logged once tracing is up.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use dronewatch_persistence::StoreLocation;

const DEFAULT_DATABASE_PATH: &str = "data/dronewatch.duckdb";
const DEFAULT_BOUNDARY_PATH: &str = "data/sample_boundary.geojson";
const DEFAULT_SAMPLE_REPORTS_PATH: &str = "data/sample_reports.json";

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// DuckDB file, or `:memory:`
    pub database: StoreLocation,

    /// GeoJSON boundary dataset
    pub boundary_path: PathBuf,

    /// Sample reports loaded by the seeder
    pub sample_reports_path: PathBuf,

    /// Seed sample data when the store has no reports
    pub seed_on_empty: bool,

    /// Enable GraphQL Playground
    pub enable_playground: bool,

    /// Enable GraphQL introspection
    pub enable_introspection: bool,

    /// Maximum query depth
    pub max_query_depth: usize,

    /// Maximum query complexity
    pub max_query_complexity: usize,

    /// Logging level
    pub log_level: String,

    /// CORS allowed origins (`*` allows any)
    pub cors_origins: Vec<String>,

    /// Values that were rejected and replaced by defaults
    pub warnings: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut warnings = Vec::new();

        let server_addr = parsed(&lookup, "SERVER_ADDR", &mut warnings)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));

        Self {
            server_addr,
            database: StoreLocation::parse(
                &lookup("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            ),
            boundary_path: lookup("BOUNDARY_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_BOUNDARY_PATH), PathBuf::from),
            sample_reports_path: lookup("SAMPLE_REPORTS_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_SAMPLE_REPORTS_PATH), PathBuf::from),
            seed_on_empty: flag(&lookup, "SEED_ON_EMPTY", true, &mut warnings),
            enable_playground: flag(&lookup, "ENABLE_PLAYGROUND", true, &mut warnings),
            enable_introspection: flag(&lookup, "ENABLE_INTROSPECTION", true, &mut warnings),
            max_query_depth: parsed(&lookup, "MAX_QUERY_DEPTH", &mut warnings).unwrap_or(10),
            max_query_complexity: parsed(&lookup, "MAX_QUERY_COMPLEXITY", &mut warnings)
                .unwrap_or(1000),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            warnings,
        }
    }

    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    warnings: &mut Vec<String>,
) -> Option<T> {
    let raw = lookup(key)?;
    raw.trim().parse().map_or_else(
        |_| {
            warnings.push(format!("{key}={raw:?} is invalid, using the default"));
            None
        },
        Some,
    )
}

fn flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
    warnings: &mut Vec<String>,
) -> bool {
    match lookup(key).as_deref().map(str::trim) {
        None => default,
        Some("true" | "1" | "yes") => true,
        Some("false" | "0" | "no") => false,
        Some(other) => {
            warnings.push(format!("{key}={other:?} is not a boolean, using {default}"));
            default
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.server_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.database, StoreLocation::File(PathBuf::from(DEFAULT_DATABASE_PATH)));
        assert!(c.seed_on_empty);
        assert!(c.allows_any_origin());
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("SERVER_ADDR", "127.0.0.1:9000"),
            ("DATABASE_PATH", ":memory:"),
            ("SEED_ON_EMPTY", "false"),
            ("CORS_ORIGINS", "http://localhost:3000, http://localhost:5173"),
            ("MAX_QUERY_DEPTH", "6"),
        ]);
        assert_eq!(c.server_addr.port(), 9000);
        assert_eq!(c.database, StoreLocation::InMemory);
        assert!(!c.seed_on_empty);
        assert_eq!(c.cors_origins, ["http://localhost:3000", "http://localhost:5173"]);
        assert!(!c.allows_any_origin());
        assert_eq!(c.max_query_depth, 6);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let c = config(&[
            ("SERVER_ADDR", "not-an-address"),
            ("MAX_QUERY_COMPLEXITY", "lots"),
            ("ENABLE_PLAYGROUND", "maybe"),
        ]);
        assert_eq!(c.server_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.max_query_complexity, 1000);
        assert!(c.enable_playground);
        assert_eq!(c.warnings.len(), 3);
    }
}
