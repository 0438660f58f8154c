//! The fetch entry point used by the API server.

use std::sync::Arc;

use futures::future::join_all;
use solaris_variable_models::{Dataset, DateRange, Region, Variable, VariableSeries};

use crate::{MockGenerator, ProviderError, SampleProvider, SampleRequest};

/// Fetches variable series for a region, falling back to synthetic data.
///
/// Owns the provider (normally an [`crate::EarthEngineClient`]) and the
/// fallback generator; built once at start-up and shared by every request.
pub struct GeoQueryAdapter {
    provider: Arc<dyn SampleProvider>,
    mock: MockGenerator,
    sample_pixels: u32,
}

impl GeoQueryAdapter {
    /// Creates an adapter.
    #[must_use]
    pub fn new(provider: Arc<dyn SampleProvider>, mock: MockGenerator, sample_pixels: u32) -> Self {
        Self {
            provider,
            mock,
            sample_pixels,
        }
    }

    /// Whether requests can reach a real upstream.
    #[must_use]
    pub fn is_upstream_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Fetches one variable. Never fails: upstream errors are logged and
    /// replaced with a synthetic series.
    pub async fn fetch(
        &self,
        region: &Region,
        date_range: &DateRange,
        variable: Variable,
    ) -> VariableSeries {
        match self.fetch_upstream(region, date_range, variable).await {
            Ok(series) => series,
            Err(ProviderError::NotConfigured) => {
                log::debug!("{variable}: upstream not configured");
                self.mock.series(variable, region)
            }
            Err(e) => {
                log::warn!("{variable}: upstream sampling failed: {e}");
                self.mock.series(variable, region)
            }
        }
    }

    /// Fetches every variable in `variables` concurrently.
    pub async fn fetch_all(
        &self,
        region: &Region,
        date_range: &DateRange,
        variables: &[Variable],
    ) -> Dataset {
        join_all(variables.iter().map(|&variable| async move {
            (variable, self.fetch(region, date_range, variable).await)
        }))
        .await
        .into_iter()
        .collect()
    }

    async fn fetch_upstream(
        &self,
        region: &Region,
        date_range: &DateRange,
        variable: Variable,
    ) -> Result<VariableSeries, ProviderError> {
        let Some(product) = solaris_variable::definition(variable).upstream.clone() else {
            log::debug!("{variable}: no upstream product, using synthetic data");
            return Err(ProviderError::NotConfigured);
        };

        let request = SampleRequest {
            variable,
            product,
            region: *region,
            date_range: *date_range,
            num_pixels: self.sample_pixels,
        };

        self.provider.sample(&request).await
    }
}
