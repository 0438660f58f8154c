#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Compile-time catalog of the variables solaris can serve.
//!
//! Each variable is described by a TOML file under `variables/`: display
//! metadata, the value range used for synthetic fallback data, and (when
//! the variable is backed by satellite imagery) the upstream product the
//! Earth Engine adapter samples. The files are embedded at compile time and
//! parsed once on first access.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use solaris_variable_models::Variable;

/// Catalog entry for one variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Variable identifier (e.g. `LST`).
    pub id: Variable,
    /// Human-readable name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Unit label.
    pub unit: String,
    /// Upstream data source label (e.g. `MODIS`).
    pub source: String,
    /// Range synthetic fallback values are drawn from.
    #[serde(skip_serializing)]
    pub mock_range: ValueRange,
    /// Imagery product to sample, if the variable has one.
    #[serde(default, skip_serializing)]
    pub upstream: Option<UpstreamProduct>,
}

/// A closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl ValueRange {
    /// Whether `value` lies inside the range (bounds included).
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// How a variable is computed from an upstream image collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamProduct {
    /// Image collection identifier (e.g. `MODIS/006/MOD11A1`).
    pub collection: String,
    /// Band selection applied to every image before the temporal mean.
    pub band: BandSelection,
    /// Sampling scale in metres.
    pub scale_m: u32,
    /// Factor applied to raw band values.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Offset added after `multiplier`.
    #[serde(default)]
    pub offset: f64,
    /// Decimal places sampled values are rounded to.
    pub decimals: u32,
    /// Drop images whose cloudy pixel percentage exceeds this value.
    #[serde(default)]
    pub max_cloud_percentage: Option<f64>,
}

impl UpstreamProduct {
    /// Property name the sampled value is reported under.
    #[must_use]
    pub fn output_property(&self) -> &str {
        match &self.band {
            BandSelection::Single { name } => name,
            BandSelection::NormalizedDifference { output, .. } => output,
        }
    }
}

/// Band selection, tagged by `type` in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BandSelection {
    /// Use a single band as-is.
    Single {
        /// Band name.
        name: String,
    },
    /// `(a - b) / (a + b)` over two bands.
    NormalizedDifference {
        /// Name of the computed band.
        output: String,
        /// The `[a, b]` band pair.
        bands: [String; 2],
    },
}

const fn default_multiplier() -> f64 {
    1.0
}

// ── Compile-time embedded TOML files ────────────────────────────────

const VARIABLE_TOMLS: &[(&str, &str)] = &[
    ("lst", include_str!("../variables/lst.toml")),
    ("ndvi", include_str!("../variables/ndvi.toml")),
    ("ndbi", include_str!("../variables/ndbi.toml")),
    ("ndwi", include_str!("../variables/ndwi.toml")),
    ("pop_dens", include_str!("../variables/pop_dens.toml")),
    ("night_lights", include_str!("../variables/night_lights.toml")),
];

static CATALOG: LazyLock<Vec<VariableDefinition>> = LazyLock::new(|| {
    VARIABLE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse variable definition '{name}': {e}"))
        })
        .collect()
});

/// Returns every variable definition, in catalog order.
///
/// # Panics
///
/// Panics if any embedded TOML definition is malformed (the definitions are
/// compiled in, so this is covered by the crate's tests).
#[must_use]
pub fn all_variables() -> &'static [VariableDefinition] {
    &CATALOG
}

/// Returns the definition for `variable`.
///
/// # Panics
///
/// Panics if the catalog has no entry for `variable`; every variant has an
/// embedded definition.
#[must_use]
pub fn definition(variable: Variable) -> &'static VariableDefinition {
    all_variables()
        .iter()
        .find(|def| def.id == variable)
        .unwrap_or_else(|| panic!("No catalog entry for variable {variable}"))
}
