//! Linear trend projection of a risk score.

use solaris_analysis_models::{Projection, ProjectionPoint};

use crate::round2;

/// Yearly growth applied to the base score.
pub const ANNUAL_GROWTH: f64 = 0.02;

/// Projects `base` forward `years` years from `reference_year`.
///
/// Entry `i` (1-based) is `min(100, base * (1 + 0.02 i))` for year
/// `reference_year + i`. Zero years yields an empty projection.
#[must_use]
pub fn project(base: f64, years: u32, reference_year: i32) -> Projection {
    (1..=years)
        .map(|offset| {
            let year = i32::try_from(offset)
                .map_or(i32::MAX, |offset| reference_year.saturating_add(offset));
            let risk = (base * ANNUAL_GROWTH.mul_add(f64::from(offset), 1.0)).min(100.0);
            ProjectionPoint::new(year, round2(risk))
        })
        .collect()
}
