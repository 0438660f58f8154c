#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Satellite variable identifiers and the point readings sampled for them.
//!
//! Every other crate in the workspace speaks in terms of these types: the
//! Earth Engine adapter produces [`VariableSeries`] values, the analysis
//! crate averages them and the exporter renders them. A request for several
//! variables is carried around as a [`Dataset`].

pub mod region;

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

pub use region::{BoundingBox, DateRange, GeoPoint, Region};

/// A satellite-derived (or modelled) variable the service can sample.
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
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Variable {
    /// Land surface temperature in degrees Celsius.
    Lst,
    /// Normalized difference vegetation index.
    Ndvi,
    /// Normalized difference built-up index.
    Ndbi,
    /// Normalized difference water index.
    Ndwi,
    /// Population density in people per square kilometre.
    #[strum(to_string = "POP_DENS", serialize = "popDens")]
    PopDens,
    /// Nighttime radiance, used as an urbanization proxy.
    NightLights,
}

impl Variable {
    /// Returns all variants of this enum, in catalog order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Lst,
            Self::Ndvi,
            Self::Ndbi,
            Self::Ndwi,
            Self::PopDens,
            Self::NightLights,
        ]
    }

    /// Lowercase key used for this variable inside a serialized
    /// [`Dataset`] (e.g. `"pop_dens"`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Lst => "lst",
            Self::Ndvi => "ndvi",
            Self::Ndbi => "ndbi",
            Self::Ndwi => "ndwi",
            Self::PopDens => "pop_dens",
            Self::NightLights => "night_lights",
        }
    }
}

/// Error returned when a string does not name a known [`Variable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariableError {
    /// The identifier that failed to parse.
    pub identifier: String,
}

impl std::fmt::Display for UnknownVariableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown variable '{}': expected one of LST, NDVI, NDBI, NDWI, POP_DENS, NIGHT_LIGHTS",
            self.identifier
        )
    }
}

impl std::error::Error for UnknownVariableError {}

impl Variable {
    /// Parses a variable identifier, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownVariableError`] if `identifier` names no variable.
    pub fn parse(identifier: &str) -> Result<Self, UnknownVariableError> {
        identifier
            .trim()
            .parse()
            .map_err(|_| UnknownVariableError {
                identifier: identifier.to_string(),
            })
    }
}

impl<'de> Deserialize<'de> for Variable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

/// A single sampled value at a point.
///
/// The variable the value belongs to is the key of the [`Dataset`] entry
/// holding the reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableReading {
    /// Latitude (WGS84).
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude (WGS84).
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// Sampled value, in the variable's unit.
    pub value: f64,
}

impl VariableReading {
    /// Creates a new reading.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, value: f64) -> Self {
        Self {
            latitude,
            longitude,
            value,
        }
    }
}

/// All readings for one variable over one region and date range.
pub type VariableSeries = Vec<VariableReading>;

/// Readings for several variables, keyed by variable.
///
/// Serializes as a JSON object keyed by [`Variable::key`]; deserializes any
/// spelling [`Variable::parse`] accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset(BTreeMap<Variable, VariableSeries>);

impl Dataset {
    /// Creates an empty dataset.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts (or replaces) the series for `variable`.
    pub fn insert(&mut self, variable: Variable, series: VariableSeries) {
        self.0.insert(variable, series);
    }

    /// Returns the series for `variable`, if present.
    #[must_use]
    pub fn get(&self, variable: Variable) -> Option<&VariableSeries> {
        self.0.get(&variable)
    }

    /// Iterates over `(variable, series)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, &VariableSeries)> {
        self.0.iter().map(|(variable, series)| (*variable, series))
    }

    /// Variables present in this dataset.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.0.keys().copied()
    }

    /// Number of variables present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of readings across all variables.
    #[must_use]
    pub fn reading_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl FromIterator<(Variable, VariableSeries)> for Dataset {
    fn from_iter<T: IntoIterator<Item = (Variable, VariableSeries)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (variable, series) in &self.0 {
            map.serialize_entry(variable.key(), series)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, VariableSeries>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, series)| {
                Variable::parse(&key)
                    .map(|variable| (variable, series))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

/// A dataset as a client submitted it.
///
/// Holds the JSON as received next to its parsed [`Dataset`]. Pass-through
/// renderings use [`SubmittedDataset::raw`], which keeps the client's key
/// spellings and any reading fields the typed form ignores.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedDataset {
    raw: serde_json::Value,
    dataset: Dataset,
}

impl SubmittedDataset {
    /// The submitted JSON, unchanged.
    #[must_use]
    pub const fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// The parsed readings.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl Default for SubmittedDataset {
    fn default() -> Self {
        Self {
            raw: serde_json::Value::Object(serde_json::Map::new()),
            dataset: Dataset::new(),
        }
    }
}

impl TryFrom<serde_json::Value> for SubmittedDataset {
    type Error = serde_json::Error;

    fn try_from(raw: serde_json::Value) -> Result<Self, Self::Error> {
        let dataset = Dataset::deserialize(&raw)?;
        Ok(Self { raw, dataset })
    }
}

impl Serialize for SubmittedDataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SubmittedDataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Self::try_from(raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_identifiers_case_insensitively() {
        assert_eq!(Variable::parse("LST").unwrap(), Variable::Lst);
        assert_eq!(Variable::parse("ndvi").unwrap(), Variable::Ndvi);
        assert_eq!(Variable::parse("pop_dens").unwrap(), Variable::PopDens);
        assert_eq!(Variable::parse("popDens").unwrap(), Variable::PopDens);
        assert_eq!(
            Variable::parse("Night_Lights").unwrap(),
            Variable::NightLights
        );
        assert!(Variable::parse("albedo").is_err());
    }

    #[test]
    fn display_uses_catalog_identifier() {
        assert_eq!(Variable::PopDens.to_string(), "POP_DENS");
        assert_eq!(Variable::NightLights.to_string(), "NIGHT_LIGHTS");
        assert_eq!(Variable::Lst.as_ref(), "LST");
    }

    #[test]
    fn every_variable_round_trips_through_its_key() {
        for variable in Variable::all() {
            assert_eq!(Variable::parse(variable.key()).unwrap(), *variable);
            assert_eq!(Variable::parse(&variable.to_string()).unwrap(), *variable);
        }
    }

    #[test]
    fn reading_uses_short_wire_names() {
        let json = serde_json::to_value(VariableReading::new(-23.5, -46.6, 31.2)).unwrap();
        assert_eq!(json, serde_json::json!({"lat": -23.5, "lon": -46.6, "value": 31.2}));
    }

    #[test]
    fn dataset_serializes_with_lowercase_keys() {
        let dataset: Dataset = [
            (Variable::PopDens, vec![VariableReading::new(1.0, 2.0, 3.0)]),
            (Variable::Lst, vec![]),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&dataset).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lst": [],
                "pop_dens": [{"lat": 1.0, "lon": 2.0, "value": 3.0}],
            })
        );
    }

    #[test]
    fn dataset_accepts_any_key_spelling() {
        let dataset: Dataset = serde_json::from_value(serde_json::json!({
            "LST": [{"lat": 0.0, "lon": 0.0, "value": 30.0, "timestamp": "2024-01-01"}],
            "popDens": [],
        }))
        .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(Variable::Lst).map(Vec::len), Some(1));
        assert!(dataset.get(Variable::PopDens).is_some());
        assert_eq!(dataset.reading_count(), 1);
    }

    #[test]
    fn submitted_dataset_keeps_raw_json() {
        let input = serde_json::json!({
            "LST": [{"lat": 1.0, "lon": 2.0, "timestamp": "2024-06-01", "value": 31.5}],
            "popDens": [],
        });
        let submitted: SubmittedDataset = serde_json::from_value(input.clone()).unwrap();

        assert_eq!(submitted.raw(), &input);
        assert_eq!(submitted.dataset().len(), 2);
        assert_eq!(serde_json::to_value(&submitted).unwrap(), input);
    }

    #[test]
    fn submitted_dataset_rejects_unknown_keys() {
        let result: Result<SubmittedDataset, _> =
            serde_json::from_value(serde_json::json!({"albedo": []}));
        assert!(result.is_err());
        assert!(SubmittedDataset::default().dataset().is_empty());
    }

    #[test]
    fn dataset_rejects_unknown_keys() {
        let result: Result<Dataset, _> =
            serde_json::from_value(serde_json::json!({"albedo": []}));
        assert!(result.is_err());
    }
}
