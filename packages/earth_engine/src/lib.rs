#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Satellite variable sampling for solaris.
//!
//! Requests are sent to an Earth Engine sampling gateway through a
//! [`SampleProvider`]. The [`GeoQueryAdapter`] wraps a provider and never
//! fails: when the provider is not configured, unreachable, or returns
//! nothing usable, the adapter logs the problem and substitutes a synthetic
//! series from the [`MockGenerator`].

pub mod adapter;
pub mod client;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solaris_variable::UpstreamProduct;
use solaris_variable_models::{DateRange, Region, Variable, VariableSeries};
use thiserror::Error;

pub use adapter::GeoQueryAdapter;
pub use client::EarthEngineClient;
pub use mock::MockGenerator;

/// Errors from upstream sampling.
///
/// These never reach API callers; the adapter recovers from all of them.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No base URL or credentials were configured.
    #[error("Earth Engine provider is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Response body preview.
        body: String,
    },

    /// The response body was not a usable `GeoJSON` feature collection.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },

    /// The query succeeded but yielded no samples inside the region.
    #[error("No samples returned for {variable}")]
    Empty {
        /// Variable that came back empty.
        variable: Variable,
    },
}

/// One sampling request for a single variable.
#[derive(Debug, Clone)]
pub struct SampleRequest {
    /// Variable being sampled.
    pub variable: Variable,
    /// Imagery product to sample.
    pub product: UpstreamProduct,
    /// Region to sample inside.
    pub region: Region,
    /// Dates the temporal mean covers.
    pub date_range: DateRange,
    /// Maximum number of pixels to sample.
    pub num_pixels: u32,
}

/// A source of sampled satellite values.
#[async_trait]
pub trait SampleProvider: Send + Sync {
    /// Whether the provider has what it needs to attempt real requests.
    fn is_configured(&self) -> bool;

    /// Samples `request.variable` over the request's region.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the upstream cannot be reached or its
    /// response cannot be used.
    async fn sample(&self, request: &SampleRequest) -> Result<VariableSeries, ProviderError>;
}

/// Connection settings for the Earth Engine sampling gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthEngineConfig {
    /// Gateway base URL. Without it every request uses synthetic data.
    pub base_url: Option<String>,
    /// Cloud project requests are billed to.
    pub project: String,
    /// Bearer token. Without it every request uses synthetic data.
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Pixels sampled per variable.
    pub sample_pixels: u32,
}

/// Rounds `value` to `decimals` decimal places.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(i32::try_from(decimals.min(15)).unwrap_or(15));
    (value * factor).round() / factor
}

impl Default for EarthEngineConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            project: "earthengine-legacy".to_string(),
            token: None,
            timeout_secs: 60,
            sample_pixels: 100,
        }
    }
}
