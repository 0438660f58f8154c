#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the solaris heat-island service.
//!
//! Fetches satellite variables for a region (with a synthetic fallback
//! when Earth Engine is unavailable), scores current heat-island
//! vulnerability, projects it forward and exports datasets as CSV, JSON or
//! PDF. Fetch results are cached in process; analysis is recomputed on
//! every request.

pub mod config;
mod handlers;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, middleware, web};
use chrono::{Datelike as _, Utc};
use solaris_cache::ResultCache;
use solaris_earth_engine::{EarthEngineClient, GeoQueryAdapter, MockGenerator, ProviderError};
use solaris_variable_models::Dataset;
use thiserror::Error;

pub use config::{ConfigError, ServerConfig};

/// Errors that can stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The Earth Engine client could not be built.
    #[error("Failed to build Earth Engine client: {0}")]
    Provider(#[from] ProviderError),

    /// Binding or serving failed.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Fetches variable series, falling back to synthetic data.
    pub adapter: GeoQueryAdapter,
    /// Cached fetch results keyed by region, dates and variables.
    pub cache: ResultCache<Dataset>,
    /// Lifetime of cache entries.
    pub cache_ttl: Duration,
    /// Fixed projection reference year; `None` means the current UTC year.
    pub reference_year: Option<i32>,
}

impl AppState {
    /// Creates state around an existing adapter with an empty cache.
    #[must_use]
    pub const fn new(
        adapter: GeoQueryAdapter,
        cache_ttl: Duration,
        reference_year: Option<i32>,
    ) -> Self {
        Self {
            adapter,
            cache: ResultCache::new(),
            cache_ttl,
            reference_year,
        }
    }

    /// Builds the Earth Engine client, mock generator and cache described
    /// by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be built.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ProviderError> {
        let client = EarthEngineClient::new(&config.earth_engine)?;
        let mock = config
            .mock
            .seed
            .map_or_else(MockGenerator::from_entropy, MockGenerator::seeded);
        let adapter = GeoQueryAdapter::new(
            Arc::new(client),
            mock,
            config.earth_engine.sample_pixels,
        );

        Ok(Self::new(
            adapter,
            config.cache.ttl(),
            config.analysis.reference_year,
        ))
    }

    /// Year projections count from.
    #[must_use]
    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Utc::now().year())
    }
}

/// Registers every route and the JSON body error handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/", web::get().to(handlers::root))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .service(
                    web::scope("/solaris")
                        .route("/fetchData", web::post().to(handlers::fetch_data))
                        .route("/predict", web::post().to(handlers::predict))
                        .route("/export", web::post().to(handlers::export))
                        .route("/variables", web::get().to(handlers::variables))
                        .route("/stats", web::post().to(handlers::stats))
                        .route("/cache/clear", web::post().to(handlers::clear_cache)),
                ),
        );
}

/// Turns malformed JSON bodies into the API's `{"error": ...}` shape.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid request body: {err}");
    log::debug!("{message}");
    let response = HttpResponse::BadRequest().json(serde_json::json!({ "error": message }));
    InternalError::from_response(err, response).into()
}

/// Starts the solaris API server.
///
/// Builds the application state from `config` and serves until the
/// process is stopped. This is a regular async function; the caller
/// provides the runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the Earth Engine client cannot be built or
/// the HTTP server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let state = web::Data::new(AppState::from_config(&config)?);

    if state.adapter.is_upstream_configured() {
        log::info!(
            "Earth Engine gateway configured for project {}",
            config.earth_engine.project
        );
    } else {
        log::warn!("Earth Engine not configured, serving synthetic data");
    }

    let bind_addr = config.server.bind_addr;
    let port = config.server.port;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
