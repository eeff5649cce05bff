#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for NYC building record lookups.
//!
//! `GET /api/building-lookup?address=...&zip_code=...[&count=...][&category=...]`
//! runs one [`BuildingLookup`] and returns the correlated records.
//! `GET /api/health`, `GET /api/datasets` and `GET /api/datasets/{id}`
//! report server state.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use nyc_housing_lookup::{BuildingLookup, LookupConfig};

/// Shared application state.
pub struct AppState {
    /// Lookup pipeline shared by every worker.
    pub lookup: Arc<BuildingLookup>,
}

/// Bind address and port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `BIND_ADDR`, default `127.0.0.1`.
    pub bind_addr: String,
    /// `PORT`, default 8080.
    pub port: u16,
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT`. An unparsable port falls back to 8080.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        Self { bind_addr, port }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/datasets", web::get().to(handlers::datasets))
            .route("/datasets/{id}", web::get().to(handlers::dataset))
            .route("/building-lookup", web::get().to(handlers::building_lookup)),
    );
}

/// Builds the lookup pipeline from the environment and serves it.
///
/// Logging is initialised by the caller. This is a regular async function;
/// the caller provides the actix runtime.
///
/// # Errors
///
/// Returns an `std::io::Error` if the configuration is invalid, or the
/// server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let config = LookupConfig::from_env().map_err(std::io::Error::other)?;
    let lookup = BuildingLookup::from_config(&config).map_err(std::io::Error::other)?;
    serve(lookup, ServerConfig::from_env()).await
}

/// Serves an already-built pipeline.
///
/// # Errors
///
/// Returns an `std::io::Error` if the server fails to bind or encounters a
/// runtime error.
#[allow(clippy::future_not_send)]
pub async fn serve(lookup: BuildingLookup, server: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        lookup: Arc::new(lookup),
    });

    log::info!("Starting server on {}:{}", server.bind_addr, server.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((server.bind_addr, server.port))?
    .run()
    .await
}
