//! Synthetic fallback series.
//!
//! Used whenever the upstream cannot deliver. Points are drawn uniformly
//! inside the region (inside the circle for radius regions) and values
//! uniformly from the variable's catalog mock range. Unseeded generators
//! are not reproducible; pass a seed for deterministic output.

use std::sync::{Mutex, PoisonError};

use rand::{Rng as _, SeedableRng as _};
use rand_chacha::ChaCha8Rng;
use solaris_variable_models::{Region, Variable, VariableReading, VariableSeries};

use crate::round_to;

/// Points in every synthetic series.
pub const MOCK_POINT_COUNT: usize = 50;

/// Rejection-sampling attempts per point before falling back to the
/// region's centre.
const MAX_ATTEMPTS: usize = 64;

const COORD_DECIMALS: u32 = 6;
const VALUE_DECIMALS: u32 = 2;

/// Generator for synthetic variable series.
#[derive(Debug)]
pub struct MockGenerator {
    rng: Mutex<ChaCha8Rng>,
}

impl MockGenerator {
    /// A generator seeded from ambient randomness.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    /// A generator whose output is fully determined by `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Produces [`MOCK_POINT_COUNT`] readings for `variable` inside
    /// `region`.
    pub fn series(&self, variable: Variable, region: &Region) -> VariableSeries {
        let range = solaris_variable::definition(variable).mock_range;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        let series: VariableSeries = (0..MOCK_POINT_COUNT)
            .map(|_| {
                let (latitude, longitude) = sample_point(&mut rng, region);
                let value = round_to(
                    rng.gen_range(0.0..1.0_f64).mul_add(range.max - range.min, range.min),
                    VALUE_DECIMALS,
                )
                .clamp(range.min, range.max);
                VariableReading::new(latitude, longitude, value)
            })
            .collect();

        log::warn!(
            "Using synthetic data for {variable}: {} points",
            series.len()
        );
        series
    }
}

/// Draws one rounded coordinate inside `region`.
fn sample_point(rng: &mut ChaCha8Rng, region: &Region) -> (f64, f64) {
    let bbox = region.bounding_box();

    for _ in 0..MAX_ATTEMPTS {
        let lat = round_to(
            rng.gen_range(0.0..1.0_f64)
                .mul_add(bbox.north - bbox.south, bbox.south),
            COORD_DECIMALS,
        )
        .clamp(bbox.south, bbox.north);
        let lng = round_to(
            rng.gen_range(0.0..1.0_f64)
                .mul_add(bbox.east - bbox.west, bbox.west),
            COORD_DECIMALS,
        )
        .clamp(bbox.west, bbox.east);

        if region.contains(lat, lng) {
            return (lat, lng);
        }
    }

    match *region {
        Region::Circle { center, .. } | Region::Point(center) => (center.lat, center.lng),
        Region::Bounds(b) => (
            f64::midpoint(b.south, b.north),
            f64::midpoint(b.west, b.east),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solaris_variable_models::{BoundingBox, GeoPoint};

    #[test]
    fn every_variable_stays_in_range_and_region() {
        let generator = MockGenerator::seeded(7);
        let region = Region::Bounds(BoundingBox::new(-46.8, -23.7, -46.4, -23.4));

        for variable in Variable::all() {
            let range = solaris_variable::definition(*variable).mock_range;
            let series = generator.series(*variable, &region);

            assert_eq!(series.len(), MOCK_POINT_COUNT);
            for reading in &series {
                assert!(range.contains(reading.value), "{variable}: {}", reading.value);
                assert!(
                    region.contains(reading.latitude, reading.longitude),
                    "{variable}: ({}, {})",
                    reading.latitude,
                    reading.longitude
                );
            }
        }
    }

    #[test]
    fn circle_points_fall_inside_the_circle() {
        let generator = MockGenerator::seeded(11);
        let center = GeoPoint::new(51.5, -0.12);
        let region = Region::around(center, Some(2_000.0));

        for reading in generator.series(Variable::Lst, &region) {
            assert!(center.haversine_distance_m(reading.latitude, reading.longitude) <= 2_000.0);
        }
    }

    #[test]
    fn same_seed_gives_same_series() {
        let region = Region::Point(GeoPoint::new(-3.1, -60.0));
        let a = MockGenerator::seeded(42).series(Variable::Ndvi, &region);
        let b = MockGenerator::seeded(42).series(Variable::Ndvi, &region);
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_box_yields_its_single_point() {
        let generator = MockGenerator::seeded(3);
        let region = Region::Bounds(BoundingBox::new(10.0, 20.0, 10.0, 20.0));

        for reading in generator.series(Variable::Ndwi, &region) {
            assert!((reading.latitude - 20.0).abs() < f64::EPSILON);
            assert!((reading.longitude - 10.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn coordinates_are_rounded_to_six_decimals() {
        let generator = MockGenerator::seeded(5);
        let region = Region::Point(GeoPoint::new(0.0, 0.0));

        for reading in generator.series(Variable::PopDens, &region) {
            let scaled = reading.latitude * 1e6;
            assert!((scaled - scaled.round()).abs() < 1e-6);
        }
    }
}
