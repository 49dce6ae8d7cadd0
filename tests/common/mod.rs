#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use giftcard_store::{
    build_app,
    config::AppConfig,
    db::{self, DbConfig, DbPool},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper harness driving the full router without a network listener.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
}

impl TestApp {
    /// Cart kept only in process memory.
    pub fn in_memory() -> Self {
        Self::from_state(AppState::in_memory(test_config()))
    }

    /// Cart stored in a migrated in-memory SQLite database.
    pub async fn with_sqlite() -> Self {
        let db = migrated_sqlite().await;
        Self::from_state(AppState::with_database(test_config(), Arc::new(db)))
    }

    /// Database configured but unusable: the connection works, the cart
    /// table does not exist, so every durable call fails.
    pub async fn with_broken_database() -> Self {
        let db = db::establish_connection_with_config(&DbConfig::sqlite_memory())
            .await
            .expect("failed to open sqlite");
        Self::from_state(AppState::with_database(test_config(), Arc::new(db)))
    }

    fn from_state(state: AppState) -> Self {
        let state = Arc::new(state);
        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a request with a raw body and content type.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: &str,
        body: &'static str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");
        let status = response.status();
        (status, read_json(response).await)
    }

    /// Send a request and decode the JSON response body.
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        (status, read_json(response).await)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: "test".to_string(),
        ..Default::default()
    }
}

pub async fn migrated_sqlite() -> DbPool {
    let db = db::establish_connection_with_config(&DbConfig::sqlite_memory())
        .await
        .expect("failed to open sqlite");
    db::run_migrations(&db).await.expect("migrations failed");
    db
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not json")
}

/// Add-to-cart body in the storefront's field naming
pub fn add_body(card_id: i32, amount: Value, quantity: Option<i32>) -> Value {
    let mut body = json!({
        "cardId": card_id,
        "cardName": format!("Card {card_id}"),
        "category": "Gaming",
        "image": "🎮",
        "selectedAmount": amount,
    });
    if let Some(quantity) = quantity {
        body["quantity"] = json!(quantity);
    }
    body
}
