#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types produced by the solaris analysis crate.
//!
//! These are serialized directly into API responses, so field names follow
//! the camelCase wire format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Coarse heat-island risk tier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    /// Score at or below 40.
    Low,
    /// Score above 40, at or below 70.
    Medium,
    /// Score above 70.
    High,
}

impl RiskLevel {
    /// Score strictly above which a region is [`RiskLevel::Medium`].
    pub const MEDIUM_THRESHOLD: f64 = 40.0;
    /// Score strictly above which a region is [`RiskLevel::High`].
    pub const HIGH_THRESHOLD: f64 = 70.0;

    /// Classifies an (unrounded) score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > Self::HIGH_THRESHOLD {
            Self::High
        } else if score > Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// One contributor to the overall vulnerability score.
///
/// Variants are declared in weight order, which is also the order
/// recommendations are emitted in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Factor {
    /// Land surface temperature.
    Temperature,
    /// Lack of vegetation.
    Vegetation,
    /// Built-up surface.
    Construction,
    /// Lack of surface water.
    Water,
    /// Population density.
    Population,
}

impl Factor {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Temperature,
            Self::Vegetation,
            Self::Construction,
            Self::Water,
            Self::Population,
        ]
    }

    /// Fixed weight of this factor in the overall score. The weights sum
    /// to one.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Temperature => 0.30,
            Self::Vegetation => 0.25,
            Self::Construction => 0.20,
            Self::Water => 0.15,
            Self::Population => 0.10,
        }
    }
}

/// Current vulnerability of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityResult {
    /// Overall score in `[0, 100]`, rounded to 2 decimals.
    pub current_risk: f64,
    /// Scores of the factors that had data, each in `[0, 100]`.
    pub factors: BTreeMap<Factor, f64>,
    /// Tier derived from the unrounded overall score.
    pub level: RiskLevel,
}

impl VulnerabilityResult {
    /// Score of `factor`, if it had data.
    #[must_use]
    pub fn factor(&self, factor: Factor) -> Option<f64> {
        self.factors.get(&factor).copied()
    }
}

/// Projected risk for one future year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    /// Calendar year.
    pub year: i32,
    /// Projected score in `[0, 100]`, rounded to 2 decimals.
    pub risk: f64,
    /// Display label, e.g. `"Year 2027"`.
    pub timeframe: String,
    /// Same as `risk`; kept for chart consumers that plot `value`.
    pub value: f64,
}

impl ProjectionPoint {
    /// Creates a point, deriving the label and `value` field.
    #[must_use]
    pub fn new(year: i32, risk: f64) -> Self {
        Self {
            year,
            risk,
            timeframe: format!("Year {year}"),
            value: risk,
        }
    }
}

/// Yearly projections in increasing year order.
pub type Projection = Vec<ProjectionPoint>;

/// Descriptive statistics over the values of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// Number of readings.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (mean of the two middle values for even counts).
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}
