//! Patrol area around a site.

use dronewatch_domain::GeoPoint;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Metres per degree of latitude.
const METRES_PER_DEGREE: f64 = 111_320.0;

/// Circular area a drone patrols.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolArea {
    pub center: GeoPoint,
    /// One standard deviation of the scatter, in metres
    pub spread_m: f64,
}

impl Default for PatrolArea {
    fn default() -> Self {
        Self {
            center: GeoPoint {
                latitude: 23.7489,
                longitude: 85.9856,
            },
            spread_m: 80.0,
        }
    }
}

impl PatrolArea {
    #[must_use]
    pub const fn new(center: GeoPoint, spread_m: f64) -> Self {
        Self { center, spread_m }
    }

    /// Area for the `index`-th drone, offset east of the base.
    #[must_use]
    pub fn for_drone(base: GeoPoint, spread_m: f64, index: usize) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let east_m = index as f64 * spread_m * 2.0;
        let center = Self::offset(base, 0.0, east_m);
        Self { center, spread_m }
    }

    fn offset(base: GeoPoint, north_m: f64, east_m: f64) -> GeoPoint {
        let lat = (base.latitude + north_m / METRES_PER_DEGREE).clamp(-90.0, 90.0);
        let lon_scale = METRES_PER_DEGREE * base.latitude.to_radians().cos().max(1e-6);
        let mut lon = base.longitude + east_m / lon_scale;
        if lon > 180.0 {
            lon -= 360.0;
        } else if lon < -180.0 {
            lon += 360.0;
        }
        GeoPoint {
            latitude: lat,
            longitude: lon.clamp(-180.0, 180.0),
        }
    }

    /// Gaussian scatter around the center, always a valid coordinate.
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> GeoPoint {
        let north: f64 = StandardNormal.sample(rng);
        let east: f64 = StandardNormal.sample(rng);
        let point = Self::offset(self.center, north * self.spread_m, east * self.spread_m);
        GeoPoint {
            latitude: round5(point.latitude),
            longitude: round5(point.longitude),
        }
    }
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_points_near_center() {
        let mut rng = StdRng::seed_from_u64(42);
        let area = PatrolArea::default();
        for _ in 0..200 {
            let p = area.random_point(&mut rng);
            assert!((p.latitude - area.center.latitude).abs() < 0.01);
            assert!((p.longitude - area.center.longitude).abs() < 0.01);
        }
    }

    #[test]
    fn test_points_valid_near_pole() {
        let mut rng = StdRng::seed_from_u64(3);
        let area = PatrolArea::new(
            GeoPoint {
                latitude: 89.9999,
                longitude: 179.9999,
            },
            5_000.0,
        );
        for _ in 0..200 {
            let p = area.random_point(&mut rng);
            assert!(GeoPoint::new(p.latitude, p.longitude).is_ok());
        }
    }

    #[test]
    fn test_drone_areas_are_distinct() {
        let base = PatrolArea::default().center;
        let first = PatrolArea::for_drone(base, 80.0, 0);
        let second = PatrolArea::for_drone(base, 80.0, 1);
        assert_eq!(first.center, base);
        assert!(second.center.longitude > first.center.longitude);
    }
}
