/*!
 * # Health Check Module
 *
 * `/health` reports which cart backend the service was started with and,
 * when a durable store is configured, whether it currently answers a ping.
 * An unreachable database only degrades the service: cart calls are still
 * served from the in-memory store, so the endpoint always answers 200.
 */

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::{repositories::BackendMode, AppState};

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
    Degraded,
}

/// State of the durable store
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
    Up,
    Down,
    NotConfigured,
}

#[derive(Serialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub backend: BackendMode,
    pub database: DatabaseStatus,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthInfo {
    pub fn new(backend: BackendMode, database: DatabaseStatus) -> Self {
        let status = match database {
            DatabaseStatus::Down => HealthStatus::Degraded,
            DatabaseStatus::Up | DatabaseStatus::NotConfigured => HealthStatus::Up,
        };

        Self {
            status,
            backend,
            database,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
        }
    }
}

/// Health check routes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(health_check))
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match &state.db {
        None => DatabaseStatus::NotConfigured,
        Some(db) => match db.ping().await {
            Ok(()) => DatabaseStatus::Up,
            Err(e) => {
                warn!("Database health check failed: {}", e);
                DatabaseStatus::Down
            }
        },
    };

    Json(HealthInfo::new(state.cart.mode(), database))
}
