//! HTTP handler functions for the solaris API.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use solaris_server_models::{
    ApiCacheCleared, ApiFetchData, ApiHealth, ApiPrediction, ApiServiceInfo, ApiServices,
    ApiStats, ApiVariable, ApiVariables, ClearCacheRequest, ComponentState, DataSource,
    ExportRequest, FetchDataRequest, PredictRequest, StatsRequest,
};
use solaris_variable_models::{DateRange, Region, Variable};

use crate::AppState;
use crate::validation::{self, ValidationError};

/// Prefix of every fetch cache key.
const FETCH_KEY_PREFIX: &str = "satellite_data";

/// `GET /`
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(ApiServiceInfo {
        status: "online".to_string(),
        service: "SOLARIS API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Urban heat island analysis from satellite data".to_string(),
    })
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let earth_engine = if state.adapter.is_upstream_configured() {
        ComponentState::Operational
    } else {
        ComponentState::Mock
    };

    HttpResponse::Ok().json(ApiHealth {
        status: "healthy".to_string(),
        services: ApiServices {
            api: ComponentState::Operational,
            earth_engine,
            cache: ComponentState::Operational,
            analysis: ComponentState::Operational,
        },
    })
}

/// `POST /api/solaris/fetchData`
///
/// Fetches the requested variables for a region, serving repeated
/// requests from the cache.
pub async fn fetch_data(
    state: web::Data<AppState>,
    body: web::Json<FetchDataRequest>,
) -> HttpResponse {
    let request = body.into_inner();

    let parsed = validation::region(&request).and_then(|region| {
        let range = validation::date_range(
            request.start_date.as_deref(),
            request.end_date.as_deref(),
            Utc::now().date_naive(),
        )?;
        let variables = validation::variables(request.variables.as_deref())?;
        Ok((region, range, variables))
    });
    let (region, range, variables) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return bad_request(&e),
    };

    let key = fetch_key(&region, &range, &variables);

    if let Some(data) = state.cache.get(&key) {
        log::info!("Cache hit: {key}");
        return HttpResponse::Ok().json(ApiFetchData {
            status: "ok".to_string(),
            data,
            source: DataSource::Cache,
            variables,
        });
    }

    log::info!("Fetching {} variables for {region}", variables.len());
    let data = state.adapter.fetch_all(&region, &range, &variables).await;
    state.cache.put(key, data.clone(), state.cache_ttl);

    HttpResponse::Ok().json(ApiFetchData {
        status: "ok".to_string(),
        data,
        source: DataSource::Gee,
        variables,
    })
}

/// `POST /api/solaris/predict`
///
/// Scores the submitted data and projects the score forward.
pub async fn predict(state: web::Data<AppState>, body: web::Json<PredictRequest>) -> HttpResponse {
    let request = body.into_inner();

    let years = match validation::dataset(&request.data)
        .and_then(|()| validation::years(request.years))
    {
        Ok(years) => years,
        Err(e) => return bad_request(&e),
    };

    let vulnerability = solaris_analysis::score(&request.data);
    let predictions =
        solaris_analysis::project(vulnerability.current_risk, years, state.reference_year());
    let recommendations = solaris_analysis::recommendations(&vulnerability);

    log::debug!(
        "Predicted {years} years from risk {} ({})",
        vulnerability.current_risk,
        vulnerability.level
    );

    HttpResponse::Ok().json(ApiPrediction {
        status: "ok".to_string(),
        vulnerability,
        predictions,
        years,
        recommendations,
    })
}

/// `POST /api/solaris/export`
///
/// Renders the submitted data as a downloadable file.
pub async fn export(body: web::Json<ExportRequest>) -> HttpResponse {
    let request = body.into_inner();

    let format = match validation::export_format(request.format.as_deref())
        .and_then(|format| validation::dataset(request.data.dataset()).map(|()| format))
    {
        Ok(format) => format,
        Err(e) => return bad_request(&e),
    };

    let filename = request
        .filename
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("solaris_export.{}", format.extension()));

    match solaris_export::render(&request.data, format) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(format.media_type())
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            })
            .body(bytes),
        Err(e) => {
            log::error!("Failed to render {format} export: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to render {format} export")
            }))
        }
    }
}

/// `GET /api/solaris/variables`
///
/// Lists the variable catalog.
pub async fn variables() -> HttpResponse {
    HttpResponse::Ok().json(ApiVariables {
        variables: solaris_variable::all_variables()
            .iter()
            .map(ApiVariable::from)
            .collect(),
    })
}

/// `POST /api/solaris/stats`
pub async fn stats(body: web::Json<StatsRequest>) -> HttpResponse {
    let request = body.into_inner();

    if let Err(e) = validation::dataset(&request.data) {
        return bad_request(&e);
    }

    let stats = solaris_analysis::summarize_dataset(&request.data)
        .into_iter()
        .map(|(variable, stats)| (variable.key().to_string(), stats))
        .collect();

    HttpResponse::Ok().json(ApiStats {
        status: "ok".to_string(),
        stats,
    })
}

/// `POST /api/solaris/cache/clear`
pub async fn clear_cache(
    state: web::Data<AppState>,
    body: web::Json<ClearCacheRequest>,
) -> HttpResponse {
    let pattern = body
        .into_inner()
        .pattern
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "*".to_string());
    let removed = state.cache.clear(&pattern);

    HttpResponse::Ok().json(ApiCacheCleared {
        status: "ok".to_string(),
        pattern,
        removed,
    })
}

/// Cache key for a fetch. Variables are sorted so request order does not
/// matter.
fn fetch_key(region: &Region, range: &DateRange, variables: &[Variable]) -> String {
    let mut sorted = variables.to_vec();
    sorted.sort_unstable();
    let variables = sorted
        .iter()
        .map(|v| v.key())
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{FETCH_KEY_PREFIX}:{region}:{}:{}:{variables}",
        range.start, range.end
    )
}

fn bad_request(error: &ValidationError) -> HttpResponse {
    log::debug!("Rejected request: {error}");
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": error.to_string()
    }))
}
