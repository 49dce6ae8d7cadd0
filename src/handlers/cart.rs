use crate::handlers::common::{created_response, map_service_error, parse_id, success_response};
use crate::{
    catalog,
    entities::CartLine,
    errors::{ApiError, ServiceError},
    services::cart_service::AddToCartInput,
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// Creates the router for cart endpoints
pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_cart).post(add_to_cart).delete(clear_cart))
        .route("/count", get(cart_count))
        .route("/:id", patch(update_cart_item).delete(remove_cart_item))
}

/// List every cart line
async fn list_cart(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let items = state.cart.list().await.map_err(map_service_error)?;

    Ok(success_response(json!({ "items": items, "success": true })))
}

/// Add an item, merging into an existing line with the same item and amount
async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) =
        payload.map_err(|_| ApiError::ValidationError("Invalid request body".to_string()))?;
    let input = AddToCartInput::try_from(payload)?;
    check_catalog_range(&input)?;

    let outcome = state.cart.add(input).await.map_err(map_service_error)?;

    let created = outcome.is_created();
    let body = json!({ "item": outcome.into_line(), "success": true });
    Ok(if created {
        created_response(body)
    } else {
        success_response(body)
    })
}

/// Replace a line's quantity
async fn update_cart_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "item")?;
    let Json(payload) = payload.map_err(|_| invalid_quantity())?;
    let quantity = payload.checked_quantity()?;

    let item = state
        .cart
        .update_quantity(id, quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "item": item, "success": true })))
}

/// Remove a single line
async fn remove_cart_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "item")?;

    state.cart.remove(id).await.map_err(map_service_error)?;

    Ok(success_response(json!({ "success": true })))
}

/// Remove every line
async fn clear_cart(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state.cart.clear().await.map_err(map_service_error)?;

    Ok(success_response(json!({ "success": true })))
}

/// Badge totals for the header
async fn cart_count(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let items = state.cart.list().await.map_err(map_service_error)?;
    let summary = CartSummary::from_lines(&items).map_err(map_service_error)?;

    Ok(success_response(CartSummaryResponse {
        summary,
        success: true,
    }))
}

/// Amounts for known catalog cards must lie within the card's range.
/// Ids outside the catalog are stored as given.
fn check_catalog_range(input: &AddToCartInput) -> Result<(), ApiError> {
    match catalog::find(input.catalog_item_id) {
        Some(card) if !card.accepts_amount(input.unit_amount) => {
            Err(ApiError::ValidationError(format!(
                "Amount for {} must be between {} and {}",
                card.name, card.min_value, card.max_value
            )))
        }
        _ => Ok(()),
    }
}

fn invalid_quantity() -> ApiError {
    ApiError::ValidationError("Invalid quantity".to_string())
}

/// Read-side totals over the cart lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Number of distinct lines
    pub lines: usize,
    /// Sum of quantities across all lines
    pub count: i64,
    pub subtotal: Decimal,
}

impl CartSummary {
    /// Fails when the subtotal does not fit in a `Decimal`
    pub fn from_lines(lines: &[CartLine]) -> Result<Self, ServiceError> {
        let subtotal = lines.iter().try_fold(Decimal::ZERO, |total, line| {
            line.unit_amount
                .checked_mul(Decimal::from(line.quantity))
                .and_then(|line_total| total.checked_add(line_total))
        });

        Ok(Self {
            lines: lines.len(),
            count: lines.iter().map(|line| i64::from(line.quantity)).sum(),
            subtotal: subtotal.ok_or_else(|| {
                ServiceError::InternalError("cart subtotal overflowed".to_string())
            })?,
        })
    }
}

#[derive(Debug, Serialize)]
struct CartSummaryResponse {
    #[serde(flatten)]
    summary: CartSummary,
    success: bool,
}

// Request DTOs

/// Body of `POST /api/cart`. Every field is optional here so that a missing
/// field is reported as a validation failure rather than a decode error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[serde(alias = "cardId")]
    pub catalog_item_id: Option<i32>,
    #[serde(alias = "cardName")]
    pub display_name: Option<String>,
    #[serde(alias = "category")]
    pub display_category: Option<String>,
    #[serde(alias = "image")]
    pub display_image: Option<String>,
    #[serde(alias = "selectedAmount")]
    pub unit_amount: Option<Decimal>,
    /// Defaults to 1
    pub quantity: Option<i32>,
}

impl TryFrom<AddItemRequest> for AddToCartInput {
    type Error = ApiError;

    fn try_from(req: AddItemRequest) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        if req.catalog_item_id.is_none() {
            missing.push("catalogItemId");
        }
        if req.display_name.is_none() {
            missing.push("displayName");
        }
        if req.display_category.is_none() {
            missing.push("displayCategory");
        }
        if req.display_image.is_none() {
            missing.push("displayImage");
        }
        if req.unit_amount.is_none() {
            missing.push("unitAmount");
        }

        match (
            req.catalog_item_id,
            req.display_name,
            req.display_category,
            req.display_image,
            req.unit_amount,
        ) {
            (
                Some(catalog_item_id),
                Some(display_name),
                Some(display_category),
                Some(display_image),
                Some(unit_amount),
            ) => Ok(AddToCartInput {
                catalog_item_id,
                display_name,
                display_category,
                display_image,
                unit_amount,
                quantity: req.quantity.unwrap_or(1),
            }),
            _ => Err(ApiError::ValidationError(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(required, range(min = 1))]
    pub quantity: Option<i32>,
}

impl UpdateQuantityRequest {
    fn checked_quantity(&self) -> Result<i32, ApiError> {
        match (self.validate(), self.quantity) {
            (Ok(()), Some(quantity)) => Ok(quantity),
            _ => Err(invalid_quantity()),
        }
    }
}
