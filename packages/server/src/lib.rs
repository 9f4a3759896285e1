#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the fitboard challenge dashboard.
//!
//! Serves the dashboard HTML shell, the JSON API it polls and a
//! server-rendered team page. Every request fetches the source tables
//! afresh; nothing is cached between requests.

mod handlers;
pub mod pages;

use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use chrono::Utc;
use fitboard_config::{ConfigError, DashboardConfig};
use fitboard_scoring::dashboard::build_dashboard;
use fitboard_scoring::{ActivitySnapshot, DashboardError, load_snapshot};
use fitboard_scoring_models::ScoringOptions;
use fitboard_server_models::ApiDashboard;
use fitboard_source::{SourceError, TableChains};
use thiserror::Error;

/// Errors that can occur while starting the server or running a CLI
/// command.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A fetch strategy is misconfigured.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The dashboard could not be produced.
    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    /// Binding or serving failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Output serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    /// Validated configuration.
    pub config: DashboardConfig,
    /// Scoring options derived from `config`.
    pub options: ScoringOptions,
    /// Fetch chains for the configured tables.
    pub chains: TableChains,
}

impl AppState {
    /// Builds the HTTP client and fetch chains for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the client cannot be built, a strategy is
    /// misconfigured or the timezone is unknown.
    pub fn from_config(config: DashboardConfig) -> Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.source.timeout_seconds))
            .user_agent(concat!("fitboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let chains = config.tables.build(&client)?;
        Self::with_chains(config, chains)
    }

    /// Uses pre-built chains instead of the configured strategies.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] for an unknown timezone.
    pub fn with_chains(config: DashboardConfig, chains: TableChains) -> Result<Self, ServerError> {
        let options = config.scoring_options()?;
        Ok(Self {
            config,
            options,
            chains,
        })
    }

    /// Fetches and normalizes every table.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the activity table is unavailable.
    pub async fn snapshot(&self) -> Result<ActivitySnapshot, DashboardError> {
        load_snapshot(&self.chains, &self.config.tables, self.options.timezone).await
    }

    /// Fetches the tables and scores them.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the activity table is unavailable.
    pub async fn dashboard(&self) -> Result<ApiDashboard, DashboardError> {
        let snapshot = self.snapshot().await?;
        Ok(ApiDashboard {
            title: self.config.challenge.title.clone(),
            refresh_seconds: self.config.challenge.refresh_seconds,
            no_data: snapshot.is_empty(),
            dashboard: build_dashboard(&snapshot, &self.options, Utc::now()),
        })
    }
}

/// Registers every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/team/{team_id}", web::get().to(handlers::team_page))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/data", web::get().to(handlers::data))
                .route("/athlete/{athlete_id}", web::get().to(handlers::athlete))
                .route("/team/{team_id}", web::get().to(handlers::team)),
        );
}

/// Starts the dashboard server.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the state cannot be built or the server
/// fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: DashboardConfig) -> Result<(), ServerError> {
    let bind_addr = config.server.bind_addr.clone();
    let port = config.server.port;

    for (role, strategies) in config.tables.describe() {
        log::info!("{role} table: {}", strategies.join(" -> "));
    }

    let state = web::Data::new(AppState::from_config(config)?);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
