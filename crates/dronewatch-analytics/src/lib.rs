//! # DroneWatch Analytics
//!
//! Roll-up analytics over persisted violations.
//!
//! ## Features
//!
//! - Headline KPIs (violations, drones, locations, types)
//! - Type, location and daily breakdowns
//! - Per-drone totals with a nested type breakdown
//! - Dashboard summary (recent activity, top types, top drones)
//! - JSON and Markdown reports
//!
//! Every breakdown in a response is folded from a single grouped read, so
//! the numbers always add up.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod queries;
pub mod reports;

pub use engine::{Analytics, AnalyticsAggregator, Summary, UploadStatus};
pub use error::AnalyticsError;
pub use queries::{DailyCount, DroneBreakdown, Kpis, RankedCount};
pub use reports::{AnalyticsReport, render_json, render_markdown};
