#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the disease surveillance map.
//!
//! Serves the chat and map-overlay API over an in-memory record snapshot
//! plus the static frontend. Records are loaded once at startup and
//! reloaded on demand via `/api/refresh-data`; district boundaries are
//! loaded once and never change while the server runs.

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use geojson::FeatureCollection;
use surveillance_map_ai::{TextGenerator, create_generator_from_env};
use surveillance_map_geography::{DEFAULT_DISTRICT_PROPERTY, load_boundaries};
use surveillance_map_records::{RecordStore, RecordsError};
use surveillance_map_records::sources::{RecordSource, source_from_env};

/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`).
    pub port: u16,
    /// District boundary `GeoJSON` file (`BOUNDARIES_PATH`).
    pub boundaries_path: PathBuf,
    /// Feature property holding district names (`DISTRICT_PROPERTY`).
    pub district_property: String,
    /// Frontend directory served at `/` (`STATIC_DIR`).
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Reads the configuration, falling back to defaults for unset or
    /// unparseable variables.
    #[must_use]
    pub fn from_env() -> Self {
        let static_dir =
            PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()));
        let boundaries_path = std::env::var("BOUNDARIES_PATH").map_or_else(
            |_| static_dir.join("data").join("maharashtradist.geojson"),
            PathBuf::from,
        );

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            boundaries_path,
            district_property: std::env::var("DISTRICT_PROPERTY")
                .unwrap_or_else(|_| DEFAULT_DISTRICT_PROPERTY.to_string()),
            static_dir,
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Current record snapshot.
    pub store: Arc<RecordStore>,
    /// Where refreshes read from.
    pub source: Arc<dyn RecordSource>,
    /// District boundaries, if they could be loaded.
    pub boundaries: Option<Arc<FeatureCollection>>,
    /// Feature property holding district names.
    pub district_property: String,
    /// Answer generator. `None` answers with summary headlines only.
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    /// Wires up the record source, boundaries and text generator from the
    /// environment and performs the initial record load.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Config`] if no record source is configured.
    pub async fn from_env(config: &ServerConfig) -> Result<Self, RecordsError> {
        let source = source_from_env()?;
        Ok(Self::with_source(config, source).await)
    }

    /// Builds the state around `source` and performs the initial record
    /// load.
    ///
    /// A failed initial load, missing boundaries or a missing text
    /// generator are logged and the dependent endpoints degrade.
    pub async fn with_source(config: &ServerConfig, source: Arc<dyn RecordSource>) -> Self {
        let store = Arc::new(RecordStore::default());
        match store.refresh(source.as_ref()).await {
            Ok(outcome) => log::info!("Initial record load: {outcome:?}"),
            Err(e) => log::error!("Initial record load failed: {e}"),
        }

        let boundaries = load_boundaries(&config.boundaries_path)
            .inspect_err(|e| {
                log::warn!(
                    "Failed to load boundaries from {}: {e}",
                    config.boundaries_path.display()
                );
            })
            .ok()
            .map(Arc::new);

        let generator = create_generator_from_env()
            .inspect_err(|e| log::warn!("AI answers disabled: {e}"))
            .ok()
            .map(Arc::from);

        Self {
            store,
            source,
            boundaries,
            district_property: config.district_property.clone(),
            generator,
        }
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/data", web::get().to(handlers::data))
            .route("/refresh-data", web::post().to(handlers::refresh))
            .route("/refresh-data", web::get().to(handlers::refresh))
            .route("/chat", web::post().to(handlers::chat))
            .route("/map-data/{year}", web::get().to(handlers::map_data)),
    );
}

/// Starts the surveillance map API server.
///
/// Loads `.env`, initializes logging, builds the [`AppState`] and starts
/// the Actix-Web HTTP server. This is a regular async function; the caller
/// is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if no record source is configured,
/// or if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();
    let state = AppState::from_env(&config).await.map_err(|e| {
        log::error!("Cannot start without a record source: {e}");
        std::io::Error::other(e)
    })?;
    let state = web::Data::new(state);
    let static_dir = config.static_dir.clone();

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Serve frontend static files
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
