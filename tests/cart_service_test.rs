mod common;

use assert_matches::assert_matches;
use common::migrated_sqlite;
use giftcard_store::{
    errors::ServiceError,
    repositories::{CartBackend, CompositeBackend, InMemoryCartBackend, SqlCartBackend},
    services::{AddOutcome, AddToCartInput, CartService},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::Arc;

struct Harness {
    service: CartService,
    db: Arc<DatabaseConnection>,
    memory: Arc<InMemoryCartBackend>,
}

async fn durable_harness() -> Harness {
    let db = Arc::new(migrated_sqlite().await);
    let memory = Arc::new(InMemoryCartBackend::new());
    let service = CartService::new(CompositeBackend::durable(
        Arc::new(SqlCartBackend::new(db.clone())),
        memory.clone(),
    ));
    Harness { service, db, memory }
}

fn item(catalog_item_id: i32, amount: Decimal, quantity: i32) -> AddToCartInput {
    AddToCartInput {
        catalog_item_id,
        display_name: format!("Card {catalog_item_id}"),
        display_category: "Shopping".to_string(),
        display_image: "🛒".to_string(),
        unit_amount: amount,
        quantity,
    }
}

#[tokio::test]
async fn test_durable_round_trip() {
    let h = durable_harness().await;

    let a = h.service.add(item(1, dec!(10), 1)).await.unwrap().into_line();
    let b = h.service.add(item(2, dec!(25), 2)).await.unwrap().into_line();
    assert!(b.id > a.id);

    let updated = h.service.update_quantity(a.id, 5).await.unwrap();
    assert_eq!(updated.quantity, 5);

    h.service.remove(b.id).await.unwrap();
    let lines = h.service.list().await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].id, a.id);
    assert_eq!(lines[0].quantity, 5);

    h.service.clear().await.unwrap();
    assert!(h.service.list().await.unwrap().is_empty());
    assert!(h.memory.is_empty().await);
}

#[tokio::test]
async fn test_durable_lines_read_back_unchanged() {
    let h = durable_harness().await;

    let added = h
        .service
        .add(item(3, dec!(12.50), 2))
        .await
        .unwrap()
        .into_line();
    assert_eq!(h.service.list().await.unwrap(), vec![added.clone()]);

    let updated = h.service.update_quantity(added.id, 6).await.unwrap();
    let listed = h.service.list().await.unwrap();
    assert_eq!(listed, vec![updated.clone()]);
    assert_eq!(listed[0].created_at, added.created_at);
    assert_eq!(listed[0].unit_amount, dec!(12.5));
}

#[tokio::test]
async fn test_list_without_mutation_is_stable() {
    let h = durable_harness().await;
    h.service.add(item(1, dec!(10), 1)).await.unwrap();
    h.service.add(item(2, dec!(25), 3)).await.unwrap();

    let first = h.service.list().await.unwrap();
    let second = h.service.list().await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_durable_merge_uses_numeric_amount_equality() {
    let h = durable_harness().await;

    h.service.add(item(7, dec!(10.00), 1)).await.unwrap();
    let outcome = h.service.add(item(7, dec!(10), 3)).await.unwrap();

    assert_matches!(outcome, AddOutcome::Merged(line) if line.quantity == 4);
    assert_eq!(h.service.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_same_amount_different_items_do_not_merge() {
    let h = durable_harness().await;

    h.service.add(item(1, dec!(10), 1)).await.unwrap();
    let outcome = h.service.add(item(2, dec!(10), 1)).await.unwrap();

    assert!(outcome.is_created());
    assert_eq!(h.service.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_durable_writes_do_not_touch_memory() {
    let h = durable_harness().await;

    h.service.add(item(1, dec!(10), 1)).await.unwrap();

    assert!(h.memory.is_empty().await);
}

#[tokio::test]
async fn test_failure_mid_session_switches_to_memory_without_reconciling() {
    let h = durable_harness().await;
    h.service.add(item(1, dec!(10), 1)).await.unwrap();

    h.db.execute_unprepared("DROP TABLE cart_items")
        .await
        .unwrap();

    // Durable lines are no longer visible; the fallback starts empty
    assert!(h.service.list().await.unwrap().is_empty());

    let outcome = h.service.add(item(1, dec!(10), 1)).await.unwrap();
    assert!(outcome.is_created());
    assert_eq!(h.memory.len().await, 1);
}

#[tokio::test]
async fn test_not_found_from_durable_store_is_not_retried() {
    let h = durable_harness().await;

    let result = h.service.update_quantity(404, 2).await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
    assert!(h.memory.is_empty().await);
}

#[tokio::test]
async fn test_sql_backend_directly() {
    let db = Arc::new(migrated_sqlite().await);
    let backend = SqlCartBackend::new(db);

    assert_eq!(backend.name(), "database");
    assert!(backend.list().await.unwrap().is_empty());
    assert!(!backend.delete(1).await.unwrap());
    assert!(backend.set_quantity(1, 2).await.unwrap().is_none());
    assert_eq!(backend.clear().await.unwrap(), 0);
}
