//! # Repository Module
//!
//! Storage interfaces and their DuckDB implementation.

pub mod duckdb_impl;
pub mod traits;

pub use duckdb_impl::{DuckDbReportRepository, DuckDbViolationRepository};
pub use traits::{
    GroupedCount, ReportRepository, ViolationRepository, ViolationSnapshot,
};
