//! Gift card storefront backend
//!
//! Serves a static gift card catalog and a single shopping cart. Cart lines
//! live in a relational database when one is configured and reachable, and in
//! process memory otherwise; see [`repositories::CompositeBackend`].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod migrator;
pub mod repositories;
pub mod services;

use axum::{http::Request, routing::get, Router};
use http::HeaderValue;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, warn};

use crate::config::AppConfig;
use crate::db::DbConfig;
use crate::repositories::{CompositeBackend, InMemoryCartBackend, SqlCartBackend};
use crate::services::CartService;

// App state definition
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cart: CartService,
    /// Durable store, if one was configured at startup
    pub db: Option<Arc<DatabaseConnection>>,
}

impl AppState {
    pub fn new(config: AppConfig, cart: CartService, db: Option<Arc<DatabaseConnection>>) -> Self {
        Self {
            config: Arc::new(config),
            cart,
            db,
        }
    }

    /// State whose cart lives only in process memory
    pub fn in_memory(config: AppConfig) -> Self {
        let cart = CartService::new(CompositeBackend::memory_only(Arc::new(
            InMemoryCartBackend::new(),
        )));
        Self::new(config, cart, None)
    }

    /// State backed by an existing database connection, with the in-memory
    /// store as per-call fallback
    pub fn with_database(config: AppConfig, db: Arc<DatabaseConnection>) -> Self {
        let cart = CartService::new(CompositeBackend::durable(
            Arc::new(SqlCartBackend::new(db.clone())),
            Arc::new(InMemoryCartBackend::new()),
        ));
        Self::new(config, cart, Some(db))
    }

    /// Builds the state from configuration.
    ///
    /// Never fails: a missing or unusable database URL leaves the service in
    /// memory-only mode, and an unreachable database is handled per call.
    pub async fn from_config(config: AppConfig) -> Self {
        match connect_durable_store(&config).await {
            Some(db) => {
                info!("Cart backend: database with in-memory fallback");
                Self::with_database(config, db)
            }
            None => {
                info!("Cart backend: in-memory only");
                Self::in_memory(config)
            }
        }
    }
}

async fn connect_durable_store(cfg: &AppConfig) -> Option<Arc<DatabaseConnection>> {
    let db_config = DbConfig::from_app_config(cfg)?;

    let db = match db::establish_connection_with_config(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database, running without durable store: {}", e);
            return None;
        }
    };

    if cfg.auto_migrate {
        if let Err(e) = db::run_migrations(&db).await {
            error!("Failed running migrations: {}", e);
        }
    }

    Some(Arc::new(db))
}

/// Storefront API: cart plus catalog
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/cart", handlers::cart_routes())
        .merge(handlers::catalog_routes())
}

/// Routes without middleware
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "giftcard-store up" }))
        .nest("/api", api_routes())
        .nest("/health", health::health_routes())
        .with_state(state)
}

/// Full application: routes plus timeout, CORS, request id and HTTP tracing
pub fn build_app(state: Arc<AppState>) -> Router {
    let cfg = state.config.clone();

    app_router(state)
        .layer(TimeoutLayer::new(cfg.request_timeout()))
        .layer(cors_layer(&cfg))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn cors_layer(cfg: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.is_production() {
        warn!("No CORS origins configured; cross-origin requests will be rejected");
        CorsLayer::new()
    } else {
        CorsLayer::permissive()
    }
}
