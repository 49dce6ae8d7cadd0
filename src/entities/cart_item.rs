use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One cart line: a distinct (catalog item, unit amount) selection and its
/// quantity. Display fields are copied from the catalog when the line is
/// created.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub catalog_item_id: i32,
    pub display_name: String,
    pub display_category: String,
    pub display_image: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub unit_amount: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Fields supplied by the caller when a line is first created; the store
/// assigns `id` and both timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCartLine {
    pub catalog_item_id: i32,
    pub display_name: String,
    pub display_category: String,
    pub display_image: String,
    pub unit_amount: Decimal,
    pub quantity: i32,
}
