use crate::handlers::common::{parse_id, success_response};
use crate::{
    catalog::{self, CatalogQuery},
    errors::ApiError,
    AppState,
};
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;

/// Creates the router for gift card catalog endpoints
pub fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cards", get(list_cards))
        .route("/cards/:id", get(get_card))
        .route("/categories", get(list_categories))
}

async fn list_cards(Query(query): Query<CatalogQuery>) -> impl IntoResponse {
    let cards = catalog::search(&query);
    success_response(json!({ "cards": cards, "success": true }))
}

async fn get_card(Path(id): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "card")?;
    let card = catalog::find(id)
        .ok_or_else(|| ApiError::NotFound(format!("Gift card {} not found", id)))?;

    Ok(success_response(json!({ "card": card, "success": true })))
}

async fn list_categories() -> impl IntoResponse {
    success_response(json!({ "categories": catalog::categories(), "success": true }))
}
