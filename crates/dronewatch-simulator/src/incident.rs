//! Incident generation for patrol simulation.

use chrono::{NaiveDate, NaiveTime};
use dronewatch_domain::ViolationSubmission;
use rand::Rng;
use rand::distributions::WeightedIndex;
use rand_distr::{Distribution, StandardNormal};

use crate::patrol::PatrolArea;

/// Incident categories a site drone can flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    FireDetected,
    UnauthorizedPerson,
    NoPpeKit,
    EquipmentMalfunction,
    HazardousMaterialSpill,
    UnauthorizedVehicle,
    StructuralDamage,
}

impl ViolationKind {
    pub const ALL: [Self; 7] = [
        Self::FireDetected,
        Self::UnauthorizedPerson,
        Self::NoPpeKit,
        Self::EquipmentMalfunction,
        Self::HazardousMaterialSpill,
        Self::UnauthorizedVehicle,
        Self::StructuralDamage,
    ];

    /// Label as stored in reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FireDetected => "Fire Detected",
            Self::UnauthorizedPerson => "Unauthorized Person",
            Self::NoPpeKit => "No PPE Kit",
            Self::EquipmentMalfunction => "Equipment Malfunction",
            Self::HazardousMaterialSpill => "Hazardous Material Spill",
            Self::UnauthorizedVehicle => "Unauthorized Vehicle",
            Self::StructuralDamage => "Structural Damage",
        }
    }

    /// Relative frequency on a typical site.
    #[must_use]
    pub const fn weight(&self) -> u32 {
        match self {
            Self::NoPpeKit => 30,
            Self::UnauthorizedPerson => 20,
            Self::FireDetected => 15,
            Self::EquipmentMalfunction => 12,
            Self::UnauthorizedVehicle => 10,
            Self::StructuralDamage => 8,
            Self::HazardousMaterialSpill => 5,
        }
    }
}

/// Shift hours incidents are spread over.
const SHIFT_START_SECS: f64 = 6.0 * 3600.0;
const SHIFT_END_SECS: f64 = 20.0 * 3600.0;
const SHIFT_PEAK_SECS: f64 = 13.0 * 3600.0;
const SHIFT_SPREAD_SECS: f64 = 3.0 * 3600.0;

/// Generates violations for one drone's daily report.
pub struct IncidentGenerator {
    kinds: WeightedIndex<u32>,
}

impl IncidentGenerator {
    /// # Errors
    ///
    /// Never in practice; the weights are fixed and non-zero.
    pub fn new() -> Result<Self, rand::distributions::WeightedError> {
        let kinds = WeightedIndex::new(ViolationKind::ALL.iter().map(ViolationKind::weight))?;
        Ok(Self { kinds })
    }

    pub fn random_kind<R: Rng>(&self, rng: &mut R) -> ViolationKind {
        ViolationKind::ALL[self.kinds.sample(rng)]
    }

    /// Time of day clustered around early afternoon, whole seconds.
    pub fn random_time<R: Rng>(rng: &mut R) -> NaiveTime {
        let z: f64 = StandardNormal.sample(rng);
        let secs = z
            .mul_add(SHIFT_SPREAD_SECS, SHIFT_PEAK_SECS)
            .clamp(SHIFT_START_SECS, SHIFT_END_SECS);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let secs = secs as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN)
    }

    /// `count` violations with ids unique to this drone and day, sorted by time.
    pub fn generate<R: Rng>(
        &self,
        rng: &mut R,
        drone_id: &str,
        date: NaiveDate,
        area: &PatrolArea,
        count: usize,
    ) -> Vec<ViolationSubmission> {
        let mut times: Vec<NaiveTime> = (0..count).map(|_| Self::random_time(rng)).collect();
        times.sort_unstable();

        times
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| {
                let point = area.random_point(rng);
                ViolationSubmission {
                    id: format!("{drone_id}-{}-{:02}", date.format("%Y%m%d"), i + 1),
                    violation_type: self.random_kind(rng).as_str().to_string(),
                    timestamp,
                    latitude: point.latitude,
                    longitude: point.longitude,
                    image_url: format!(
                        "https://picsum.photos/id/{}/150/150",
                        rng.gen_range(1..=300)
                    ),
                }
            })
            .collect()
    }
}
