//! HTTP client for the Earth Engine sampling gateway.
//!
//! The gateway computes the temporal mean of an image collection over a
//! date range, samples up to `numPixels` points inside a rectangle and
//! answers with a `GeoJSON` `FeatureCollection` of points whose properties
//! hold the raw band value. Unit conversion (`multiplier`, `offset`) and
//! rounding happen here, per the variable's catalog entry.

use std::time::Duration;

use async_trait::async_trait;
use geojson::GeoJson;
use solaris_variable_models::{VariableReading, VariableSeries};

use crate::{EarthEngineConfig, ProviderError, SampleProvider, SampleRequest, round_to};

/// Maximum length of the response body preview kept in errors.
const BODY_PREVIEW_LEN: usize = 500;

/// [`SampleProvider`] backed by the Earth Engine sampling gateway.
#[derive(Debug, Clone)]
pub struct EarthEngineClient {
    http: reqwest::Client,
    base_url: Option<String>,
    project: String,
    token: Option<String>,
}

impl EarthEngineClient {
    /// Builds a client from `config`.
    ///
    /// A config without a base URL or token still yields a client; it
    /// reports itself as unconfigured and every request fails with
    /// [`ProviderError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &EarthEngineConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config
                .base_url
                .as_deref()
                .map(|url| url.trim_end_matches('/').to_string()),
            project: config.project.clone(),
            token: config.token.clone(),
        })
    }

    fn endpoint(&self, base_url: &str) -> String {
        format!("{base_url}/v1/projects/{}/sample", self.project)
    }
}

#[async_trait]
impl SampleProvider for EarthEngineClient {
    fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.token.is_some()
    }

    async fn sample(&self, request: &SampleRequest) -> Result<VariableSeries, ProviderError> {
        let (Some(base_url), Some(token)) = (self.base_url.as_deref(), self.token.as_deref()) else {
            return Err(ProviderError::NotConfigured);
        };

        let url = self.endpoint(base_url);
        log::debug!("Sampling {} from {url}", request.variable);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&request_body(request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = if text.chars().count() > BODY_PREVIEW_LEN {
                format!("{}...", text.chars().take(BODY_PREVIEW_LEN).collect::<String>())
            } else {
                text
            };
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let series = parse_samples(&text, request)?;
        if series.is_empty() {
            return Err(ProviderError::Empty {
                variable: request.variable,
            });
        }

        log::info!("{}: {} points sampled", request.variable, series.len());
        Ok(series)
    }
}

/// JSON body for a sampling request.
fn request_body(request: &SampleRequest) -> serde_json::Value {
    let bbox = request.region.bounding_box();
    let product = &request.product;

    serde_json::json!({
        "collection": product.collection,
        "band": product.band,
        "startDate": request.date_range.start.to_string(),
        "endDate": request.date_range.end.to_string(),
        "region": {
            "west": bbox.west,
            "south": bbox.south,
            "east": bbox.east,
            "north": bbox.north,
        },
        "scale": product.scale_m,
        "numPixels": request.num_pixels,
        "geometries": true,
        "cloudyPixelPercentageMax": product.max_cloud_percentage,
    })
}

/// Converts a gateway `FeatureCollection` into readings.
///
/// Features without a point geometry or without a numeric value for the
/// product's output property (masked pixels) are skipped, as are points
/// outside the request's region.
fn parse_samples(body: &str, request: &SampleRequest) -> Result<VariableSeries, ProviderError> {
    let geojson: GeoJson = body.parse().map_err(|e: geojson::Error| ProviderError::Decode {
        message: e.to_string(),
    })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(ProviderError::Decode {
            message: "expected a FeatureCollection".to_string(),
        });
    };

    let product = &request.product;
    let property = product.output_property();

    Ok(collection
        .features
        .iter()
        .filter_map(|feature| {
            let geometry = feature.geometry.as_ref()?;
            let geojson::Value::Point(position) = &geometry.value else {
                return None;
            };
            let longitude = *position.first()?;
            let latitude = *position.get(1)?;
            let raw = feature.property(property)?.as_f64()?;
            let value = round_to(raw.mul_add(product.multiplier, product.offset), product.decimals);

            request
                .region
                .contains(latitude, longitude)
                .then(|| VariableReading::new(latitude, longitude, value))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use solaris_variable_models::{BoundingBox, DateRange, GeoPoint, Region, Variable};

    fn lst_request(region: Region) -> SampleRequest {
        SampleRequest {
            variable: Variable::Lst,
            product: solaris_variable::definition(Variable::Lst)
                .upstream
                .clone()
                .unwrap(),
            region,
            date_range: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            ),
            num_pixels: 100,
        }
    }

    fn feature(lon: f64, lat: f64, value: &serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [lon, lat]},
            "properties": {"LST_Day_1km": value},
        })
    }

    #[test]
    fn converts_raw_lst_to_celsius() {
        let request = lst_request(Region::Bounds(BoundingBox::new(-47.0, -24.0, -46.0, -23.0)));
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [feature(-46.5, -23.5, &serde_json::json!(15_000.0))],
        });

        let series = parse_samples(&body.to_string(), &request).unwrap();

        assert_eq!(series.len(), 1);
        assert!((series[0].latitude - -23.5).abs() < f64::EPSILON);
        assert!((series[0].longitude - -46.5).abs() < f64::EPSILON);
        // 15000 * 0.02 - 273.15 = 26.85
        assert!((series[0].value - 26.85).abs() < 1e-9);
    }

    #[test]
    fn skips_masked_pixels_and_points_outside_region() {
        let request = lst_request(Region::around(GeoPoint::new(0.0, 0.0), Some(10_000.0)));
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                feature(0.01, 0.01, &serde_json::json!(15_000.0)),
                feature(0.02, 0.02, &serde_json::Value::Null),
                feature(0.085, 0.085, &serde_json::json!(15_000.0)),
            ],
        });

        let series = parse_samples(&body.to_string(), &request).unwrap();

        assert_eq!(series.len(), 1);
    }

    #[test]
    fn rejects_non_collection_bodies() {
        let request = lst_request(Region::Point(GeoPoint::new(0.0, 0.0)));
        let body = serde_json::json!({"type": "Point", "coordinates": [0.0, 0.0]});

        assert!(matches!(
            parse_samples(&body.to_string(), &request),
            Err(ProviderError::Decode { .. })
        ));
        assert!(matches!(
            parse_samples("not json", &request),
            Err(ProviderError::Decode { .. })
        ));
    }

    #[test]
    fn request_body_carries_region_and_band() {
        let request = lst_request(Region::Bounds(BoundingBox::new(-47.0, -24.0, -46.0, -23.0)));
        let body = request_body(&request);

        assert_eq!(body["collection"], "MODIS/006/MOD11A1");
        assert_eq!(body["band"]["type"], "single");
        assert_eq!(body["band"]["name"], "LST_Day_1km");
        assert_eq!(body["startDate"], "2024-01-01");
        assert_eq!(body["endDate"], "2024-01-31");
        assert_eq!(body["region"]["north"], -23.0);
        assert_eq!(body["numPixels"], 100);
        assert!(body["cloudyPixelPercentageMax"].is_null());
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_to_sample() {
        let client = EarthEngineClient::new(&EarthEngineConfig::default()).unwrap();
        assert!(!client.is_configured());

        let request = lst_request(Region::Point(GeoPoint::new(0.0, 0.0)));
        assert!(matches!(
            client.sample(&request).await,
            Err(ProviderError::NotConfigured)
        ));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = EarthEngineClient::new(&EarthEngineConfig {
            base_url: Some("https://gateway.example/".to_string()),
            token: Some("secret".to_string()),
            ..EarthEngineConfig::default()
        })
        .unwrap();

        assert!(client.is_configured());
        assert_eq!(
            client.endpoint(client.base_url.as_deref().unwrap()),
            "https://gateway.example/v1/projects/earthengine-legacy/sample"
        );
    }
}
