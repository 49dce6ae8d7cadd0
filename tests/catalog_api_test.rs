mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;

#[tokio::test]
async fn lists_every_card_by_default() {
    let app = TestApp::in_memory();

    let (status, body) = app.request_json(Method::GET, "/api/cards", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cards"].as_array().unwrap().len(), 12);
    assert_eq!(body["cards"][0]["name"], "Amazon");
    assert_eq!(body["cards"][0]["minValue"], 10);
}

#[tokio::test]
async fn filters_by_category_term_and_featured() {
    let app = TestApp::in_memory();

    let (_, gaming) = app
        .request_json(Method::GET, "/api/cards?category=Gaming", None)
        .await;
    assert_eq!(gaming["cards"].as_array().unwrap().len(), 3);

    let (_, search) = app
        .request_json(Method::GET, "/api/cards?q=net", None)
        .await;
    assert_eq!(search["cards"][0]["name"], "Netflix");

    let (_, featured) = app
        .request_json(Method::GET, "/api/cards?featured=true", None)
        .await;
    assert_eq!(featured["cards"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn card_lookup() {
    let app = TestApp::in_memory();

    let (status, body) = app.request_json(Method::GET, "/api/cards/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["name"], "Spotify");

    let (status, body) = app.request_json(Method::GET, "/api/cards/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = app.request_json(Method::GET, "/api/cards/xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn categories_start_with_all() {
    let app = TestApp::in_memory();

    let (status, body) = app.request_json(Method::GET, "/api/categories", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"][0], "All");
    assert_eq!(body["categories"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn health_reports_backend_mode() {
    let memory = TestApp::in_memory();
    let (status, body) = memory.request_json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["database"], "not_configured");

    let durable = TestApp::with_sqlite().await;
    let (status, body) = durable.request_json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "durable");
    assert_eq!(body["database"], "up");
    assert_eq!(body["status"], "up");
}
