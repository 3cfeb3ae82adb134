//! Fleet-level simulation producing daily reports.

use chrono::{Days, NaiveDate};
use dronewatch_domain::{GeoPoint, ReportSubmission};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::incident::IncidentGenerator;
use crate::patrol::PatrolArea;

/// Fleet scenario parameters.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    pub drones: usize,
    pub days: u32,
    pub start_date: NaiveDate,
    pub base: GeoPoint,
    pub spread_m: f64,
    pub max_violations: usize,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

/// A site drone and the zone it patrols.
#[derive(Debug, Clone)]
pub struct SimulatedDrone {
    pub drone_id: String,
    pub location: String,
    pub area: PatrolArea,
}

impl SimulatedDrone {
    #[must_use]
    pub fn new(index: usize, base: GeoPoint, spread_m: f64) -> Self {
        Self {
            drone_id: format!("DRONE_ZONE_{}", index + 1),
            location: zone_name(index),
            area: PatrolArea::for_drone(base, spread_m, index),
        }
    }
}

/// `Zone A` .. `Zone Z`, then numbered zones.
fn zone_name(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map_or_else(|| format!("Zone {}", index + 1), |i| format!("Zone {}", char::from(b'A' + i)))
}

/// Fleet simulator generating one report per drone per day.
pub struct FleetSimulator {
    pub drones: Vec<SimulatedDrone>,
    config: FleetConfig,
    incidents: IncidentGenerator,
    rng: StdRng,
}

impl FleetSimulator {
    /// # Errors
    ///
    /// Fails only if the incident weights are unusable.
    pub fn new(config: FleetConfig) -> Result<Self, rand::distributions::WeightedError> {
        let drones = (0..config.drones)
            .map(|i| SimulatedDrone::new(i, config.base, config.spread_m))
            .collect();
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Ok(Self {
            drones,
            incidents: IncidentGenerator::new()?,
            config,
            rng,
        })
    }

    /// Every report of the scenario, day by day.
    pub fn generate(&mut self) -> Vec<ReportSubmission> {
        let mut reports = Vec::with_capacity(self.drones.len() * self.config.days as usize);
        let max = self.config.max_violations.max(1);

        for day in 0..self.config.days {
            let Some(date) = self
                .config
                .start_date
                .checked_add_days(Days::new(u64::from(day)))
            else {
                break;
            };

            for drone in &self.drones {
                let count = self.rng.gen_range(1..=max);
                let violations = self.incidents.generate(
                    &mut self.rng,
                    &drone.drone_id,
                    date,
                    &drone.area,
                    count,
                );
                reports.push(ReportSubmission {
                    drone_id: drone.drone_id.clone(),
                    date,
                    location: drone.location.clone(),
                    violations,
                });
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dronewatch_domain::validate_report;

    fn config(seed: u64) -> FleetConfig {
        FleetConfig {
            drones: 3,
            days: 4,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            base: PatrolArea::default().center,
            spread_m: 80.0,
            max_violations: 5,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_one_report_per_drone_per_day() {
        let reports = FleetSimulator::new(config(9)).unwrap().generate();
        assert_eq!(reports.len(), 12);
        assert_eq!(reports[0].drone_id, "DRONE_ZONE_1");
        assert_eq!(reports[2].location, "Zone C");
        assert_eq!(reports[11].date, NaiveDate::from_ymd_opt(2025, 1, 13).unwrap());
    }

    #[test]
    fn test_generated_reports_pass_validation() {
        for report in FleetSimulator::new(config(11)).unwrap().generate() {
            assert!((1..=5).contains(&report.violations.len()));
            let json = serde_json::to_value(&report).unwrap();
            let parsed = validate_report(&json).unwrap();
            assert_eq!(parsed.drone_id, report.drone_id);
            assert_eq!(parsed.violations.len(), report.violations.len());
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = FleetSimulator::new(config(5)).unwrap().generate();
        let b = FleetSimulator::new(config(5)).unwrap().generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zone_names() {
        assert_eq!(zone_name(0), "Zone A");
        assert_eq!(zone_name(25), "Zone Z");
        assert_eq!(zone_name(26), "Zone 27");
    }
}
