use crate::{
    entities::{CartLine, NewCartLine},
    errors::ServiceError,
    repositories::{BackendMode, CartBackend, CompositeBackend},
};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Decimal places the durable `unit_amount` column keeps
const AMOUNT_SCALE: u32 = 2;
/// Largest value a `DECIMAL(10, 2)` column holds: 99_999_999.99
const MAX_UNIT_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, AMOUNT_SCALE);
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

/// Shopping cart service for the gift card storefront.
///
/// The single authority for cart contents. Adding a catalog item at an
/// amount already in the cart increases that line's quantity; any other
/// addition creates a new line. All operations go through a
/// [`CompositeBackend`], so a failing durable store degrades to the
/// in-memory store instead of failing the request.
///
/// # Examples
///
/// ```ignore
/// let service = CartService::new(CompositeBackend::memory_only(Arc::new(InMemoryCartBackend::new())));
///
/// let outcome = service.add(AddToCartInput {
///     catalog_item_id: 5,
///     display_name: "Steam".into(),
///     display_category: "Gaming".into(),
///     display_image: "🎮".into(),
///     unit_amount: dec!(10),
///     quantity: 1,
/// }).await?;
/// assert!(outcome.is_created());
/// ```
#[derive(Clone, Debug)]
pub struct CartService {
    backend: CompositeBackend,
}

impl CartService {
    pub fn new(backend: CompositeBackend) -> Self {
        Self { backend }
    }

    /// Backend mode chosen at startup
    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    /// Returns every line in the cart, oldest first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CartLine>, ServiceError> {
        self.backend
            .run("list", |backend| async move { backend.list().await })
            .await
    }

    /// Adds an item to the cart or merges it into a matching line.
    ///
    /// A line matches when it has the same catalog item id and a numerically
    /// equal unit amount (`10` matches `10.00`). Every line for the catalog
    /// item is considered.
    ///
    /// # Returns
    ///
    /// * `Ok(AddOutcome::Created)` - A new line was stored
    /// * `Ok(AddOutcome::Merged)` - An existing line's quantity was increased
    /// * `Err(ServiceError::ValidationError)` - A field is missing or out of range
    #[instrument(skip(self), fields(catalog_item_id = input.catalog_item_id))]
    pub async fn add(&self, input: AddToCartInput) -> Result<AddOutcome, ServiceError> {
        input.validate()?;

        let outcome = self
            .backend
            .run("add", |backend| {
                let input = input.clone();
                async move { merge_or_insert(backend.as_ref(), input).await }
            })
            .await?;

        match &outcome {
            AddOutcome::Created(line) => info!(
                "Added cart line {}: item {} at {} x{}",
                line.id, line.catalog_item_id, line.unit_amount, line.quantity
            ),
            AddOutcome::Merged(line) => info!(
                "Merged into cart line {}: item {} at {} now x{}",
                line.id, line.catalog_item_id, line.unit_amount, line.quantity
            ),
        }

        Ok(outcome)
    }

    /// Replaces the quantity of a cart line.
    ///
    /// # Returns
    ///
    /// * `Ok(CartLine)` - The updated line
    /// * `Err(ServiceError::ValidationError)` - `quantity` is below 1
    /// * `Err(ServiceError::NotFound)` - No line has that id
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, id: i32, quantity: i32) -> Result<CartLine, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        self.backend
            .run("update_quantity", |backend| async move {
                backend
                    .set_quantity(id, quantity)
                    .await?
                    .ok_or_else(|| line_not_found(id))
            })
            .await
    }

    /// Removes a single line from the cart.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i32) -> Result<(), ServiceError> {
        self.backend
            .run("remove", |backend| async move {
                if backend.delete(id).await? {
                    Ok(())
                } else {
                    Err(line_not_found(id))
                }
            })
            .await?;

        info!("Removed cart line {}", id);
        Ok(())
    }

    /// Removes every line. Clearing an empty cart succeeds.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ServiceError> {
        let removed = self
            .backend
            .run("clear", |backend| async move { backend.clear().await })
            .await?;

        info!("Cleared cart ({} lines removed)", removed);
        Ok(())
    }
}

async fn merge_or_insert(
    backend: &dyn CartBackend,
    input: AddToCartInput,
) -> Result<AddOutcome, ServiceError> {
    let existing = backend
        .find_by_catalog_item(input.catalog_item_id)
        .await?
        .into_iter()
        .find(|line| line.unit_amount == input.unit_amount);

    if let Some(line) = existing {
        let quantity = line.quantity.checked_add(input.quantity).ok_or_else(|| {
            ServiceError::ValidationError("Quantity exceeds the supported maximum".to_string())
        })?;

        // A concurrent removal between the read and the write falls through to insert
        if let Some(updated) = backend.set_quantity(line.id, quantity).await? {
            return Ok(AddOutcome::Merged(updated));
        }
    }

    backend
        .insert(input.into_new_line())
        .await
        .map(AddOutcome::Created)
}

fn line_not_found(id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Cart line {} not found", id))
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_unit_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(ValidationError::new("non_positive_amount"));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(ValidationError::new("amount_precision"));
    }
    if *amount > MAX_UNIT_AMOUNT {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}

/// Input for adding an item to the cart
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddToCartInput {
    #[validate(range(min = 1))]
    pub catalog_item_id: i32,
    #[validate(custom = "validate_not_blank")]
    pub display_name: String,
    #[validate(custom = "validate_not_blank")]
    pub display_category: String,
    #[validate(custom = "validate_not_blank")]
    pub display_image: String,
    #[validate(custom = "validate_unit_amount")]
    pub unit_amount: Decimal,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

impl AddToCartInput {
    fn into_new_line(self) -> NewCartLine {
        NewCartLine {
            catalog_item_id: self.catalog_item_id,
            display_name: self.display_name,
            display_category: self.display_category,
            display_image: self.display_image,
            unit_amount: self.unit_amount,
            quantity: self.quantity,
        }
    }
}

/// Result of [`CartService::add`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// No matching line existed; a new one was stored
    Created(CartLine),
    /// A matching line's quantity was increased
    Merged(CartLine),
}

impl AddOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn line(&self) -> &CartLine {
        match self {
            Self::Created(line) | Self::Merged(line) => line,
        }
    }

    pub fn into_line(self) -> CartLine {
        match self {
            Self::Created(line) | Self::Merged(line) => line,
        }
    }
}
