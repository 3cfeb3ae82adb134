//! # DroneWatch Simulator
//!
//! Report generator for exercising the DroneWatch service.
//!
//! ## Features
//!
//! - Randomized daily reports for a fleet of site drones
//! - Weighted incident mix clustered around shift hours
//! - Gaussian scatter of incident positions around each patrol zone
//! - Submission through the `ingestReport` GraphQL mutation

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod client;
pub mod fleet;
pub mod incident;
pub mod patrol;

pub use client::{IngestClient, IngestOutcome};
pub use fleet::{FleetConfig, FleetSimulator};
pub use incident::{IncidentGenerator, ViolationKind};
pub use patrol::PatrolArea;
