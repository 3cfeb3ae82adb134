//! DroneWatch Simulator CLI
//!
//! Generates daily drone reports and posts them to the GraphQL API.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use dronewatch_domain::GeoPoint;
use dronewatch_simulator::{FleetConfig, FleetSimulator, IngestClient, IngestOutcome};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dronewatch-simulator")]
#[command(about = "Generate drone incident reports and submit them to DroneWatch")]
struct Args {
    /// API endpoint
    #[arg(long, default_value = "http://localhost:8080/graphql")]
    api_url: String,

    /// Number of drones
    #[arg(short, long, default_value = "3")]
    drones: usize,

    /// Number of consecutive days
    #[arg(long, default_value = "7")]
    days: u32,

    /// First report day (YYYY-MM-DD); defaults to `days` ago
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Site latitude
    #[arg(long, default_value = "23.7489", allow_hyphen_values = true)]
    base_lat: f64,

    /// Site longitude
    #[arg(long, default_value = "85.9856", allow_hyphen_values = true)]
    base_lon: f64,

    /// Scatter of incident positions in metres
    #[arg(long, default_value = "80")]
    spread_m: f64,

    /// Maximum violations per report
    #[arg(long, default_value = "4")]
    max_violations: usize,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Submit the reports in this JSON array file instead of generating
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Pause between submissions in milliseconds
    #[arg(long, default_value = "0")]
    delay_ms: u64,

    /// Dry run (print reports instead of posting)
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Default)]
struct Tally {
    ingested: usize,
    duplicates: usize,
    rejected: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("dronewatch_simulator=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let reports = build_reports(&args).await?;
    info!(reports = reports.len(), dry_run = args.dry_run, "Reports prepared");

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let client = IngestClient::new(&args.api_url);
    let mut tally = Tally::default();

    for report in &reports {
        let drone_id = report["drone_id"].as_str().unwrap_or("?");
        let date = report["date"].as_str().unwrap_or("?");

        match client.submit(report).await {
            Ok(IngestOutcome::Ingested {
                report_id,
                violations,
            }) => {
                tally.ingested += 1;
                info!(%report_id, violations, "Report ingested");
            }
            Ok(IngestOutcome::Duplicate) => {
                tally.duplicates += 1;
                info!(drone_id, date, "Report already stored, skipped");
            }
            Ok(IngestOutcome::Rejected { code, message }) => {
                tally.rejected += 1;
                warn!(drone_id, date, %code, %message, "Report rejected");
            }
            Err(err) => {
                tally.rejected += 1;
                warn!(drone_id, date, error = %err, "Failed to post report");
            }
        }

        if args.delay_ms > 0 {
            sleep(Duration::from_millis(args.delay_ms)).await;
        }
    }

    info!(
        ingested = tally.ingested,
        duplicates = tally.duplicates,
        rejected = tally.rejected,
        "Simulation complete"
    );
    Ok(())
}

async fn build_reports(args: &Args) -> Result<Vec<Value>> {
    if let Some(path) = &args.replay {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("{} is not a JSON array of reports", path.display()));
    }

    let base = GeoPoint::new(args.base_lat, args.base_lon)?;
    let start_date = args.start_date.unwrap_or_else(|| {
        let today = Utc::now().date_naive();
        today
            .checked_sub_days(Days::new(u64::from(args.days)))
            .unwrap_or(today)
    });

    info!(
        drones = args.drones,
        days = args.days,
        %start_date,
        lat = base.latitude,
        lon = base.longitude,
        "Generating fleet reports"
    );

    let mut fleet = FleetSimulator::new(FleetConfig {
        drones: args.drones,
        days: args.days,
        start_date,
        base,
        spread_m: args.spread_m,
        max_violations: args.max_violations,
        seed: args.seed,
    })?;

    fleet
        .generate()
        .iter()
        .map(|report| serde_json::to_value(report).map_err(Into::into))
        .collect()
}
