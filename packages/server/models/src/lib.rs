#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the solaris server.
//!
//! These types are serialized to JSON for the REST API. Request fields that
//! need a human-readable validation message (dates, variable identifiers,
//! export formats) arrive as strings and are checked by the server.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use solaris_analysis_models::{Projection, SummaryStats, VulnerabilityResult};
use solaris_variable::VariableDefinition;
use solaris_variable_models::{BoundingBox, Dataset, GeoPoint, SubmittedDataset, Variable};

/// Years projected when a prediction request does not say.
pub const DEFAULT_PREDICTION_YEARS: i64 = 5;

/// Body of `POST /api/solaris/fetchData`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchDataRequest {
    /// Centre point. One of `coords` or `bounds` is required.
    pub coords: Option<GeoPoint>,
    /// Explicit rectangle; takes precedence over `coords`.
    pub bounds: Option<BoundingBox>,
    /// Radius around `coords` in metres, clamped to 50 km.
    pub radius: Option<f64>,
    /// Variable identifiers. Defaults to LST and NDVI.
    pub variables: Option<Vec<String>>,
    /// First day, `YYYY-MM-DD`. Defaults to 30 days before `end_date`.
    pub start_date: Option<String>,
    /// Last day, `YYYY-MM-DD`. Defaults to today.
    pub end_date: Option<String>,
}

/// Body of `POST /api/solaris/predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// Readings to score.
    #[serde(default)]
    pub data: Dataset,
    /// Years to project, 0 to 100.
    #[serde(default = "default_years")]
    pub years: i64,
}

const fn default_years() -> i64 {
    DEFAULT_PREDICTION_YEARS
}

/// Body of `POST /api/solaris/export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Readings to export, kept as submitted for the JSON format.
    #[serde(default)]
    pub data: SubmittedDataset,
    /// `csv`, `json` or `pdf`, case-insensitive. Defaults to `csv`.
    pub format: Option<String>,
    /// Download file name. Defaults to `solaris_export.<ext>`.
    pub filename: Option<String>,
}

/// Body of `POST /api/solaris/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequest {
    /// Readings to summarize.
    #[serde(default)]
    pub data: Dataset,
}

/// Body of `POST /api/solaris/cache/clear`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheRequest {
    /// Substring to match against cache keys; `*` (the default) clears
    /// everything.
    pub pattern: Option<String>,
}

/// `GET /` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiServiceInfo {
    /// Always `"online"`.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Crate version.
    pub version: String,
    /// Short description.
    pub message: String,
}

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `"healthy"` while the server answers.
    pub status: String,
    /// Per-component state.
    pub services: ApiServices,
}

/// Component states reported by the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiServices {
    /// HTTP layer.
    pub api: ComponentState,
    /// Earth Engine gateway; [`ComponentState::Mock`] when unconfigured.
    pub earth_engine: ComponentState,
    /// Result cache.
    pub cache: ComponentState,
    /// Scoring and projection.
    pub analysis: ComponentState,
}

/// State of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    /// Serving real requests.
    Operational,
    /// Serving synthetic data.
    Mock,
}

/// Where a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// A cached earlier result.
    Cache,
    /// A fresh upstream (or fallback) fetch.
    Gee,
}

/// `POST /api/solaris/fetchData` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFetchData {
    /// Always `"ok"`.
    pub status: String,
    /// Readings per variable.
    pub data: Dataset,
    /// Cache hit or fresh fetch.
    pub source: DataSource,
    /// Requested variables, in request order.
    pub variables: Vec<Variable>,
}

/// `POST /api/solaris/predict` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrediction {
    /// Always `"ok"`.
    pub status: String,
    /// Current vulnerability.
    pub vulnerability: VulnerabilityResult,
    /// One entry per projected year.
    pub predictions: Projection,
    /// Number of projected years.
    pub years: u32,
    /// Mitigation advice for high-scoring factors.
    pub recommendations: Vec<String>,
}

/// `POST /api/solaris/stats` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStats {
    /// Always `"ok"`.
    pub status: String,
    /// Statistics keyed by lowercase variable identifier.
    pub stats: BTreeMap<String, SummaryStats>,
}

/// `POST /api/solaris/cache/clear` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCacheCleared {
    /// Always `"ok"`.
    pub status: String,
    /// Pattern that was applied.
    pub pattern: String,
    /// Entries removed.
    pub removed: usize,
}

/// A variable as listed by `GET /api/solaris/variables`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVariable {
    /// Identifier, serialized upper-case.
    pub id: Variable,
    /// Display name.
    pub name: String,
    /// What the variable measures.
    pub description: String,
    /// Unit of the values.
    pub unit: String,
    /// Data provider.
    pub source: String,
}

impl From<&VariableDefinition> for ApiVariable {
    fn from(definition: &VariableDefinition) -> Self {
        Self {
            id: definition.id,
            name: definition.name.clone(),
            description: definition.description.clone(),
            unit: definition.unit.clone(),
            source: definition.source.clone(),
        }
    }
}

/// `GET /api/solaris/variables` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVariables {
    /// Every variable in catalog order.
    pub variables: Vec<ApiVariable>,
}
