use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::debug;

use super::CartBackend;
use crate::entities::cart_item::{self, ActiveModel as CartItemActiveModel, Column};
use crate::entities::{CartItem, CartLine, NewCartLine};
use crate::errors::ServiceError;

/// Durable cart storage over a sea-orm connection pool
#[derive(Debug, Clone)]
pub struct SqlCartBackend {
    db: Arc<DatabaseConnection>,
}

impl SqlCartBackend {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartBackend for SqlCartBackend {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn list(&self) -> Result<Vec<CartLine>, ServiceError> {
        let lines = CartItem::find()
            .order_by_asc(Column::Id)
            .all(&*self.db)
            .await?;
        Ok(lines)
    }

    async fn find_by_catalog_item(
        &self,
        catalog_item_id: i32,
    ) -> Result<Vec<CartLine>, ServiceError> {
        let lines = CartItem::find()
            .filter(Column::CatalogItemId.eq(catalog_item_id))
            .order_by_asc(Column::Id)
            .all(&*self.db)
            .await?;
        Ok(lines)
    }

    async fn insert(&self, line: NewCartLine) -> Result<CartLine, ServiceError> {
        let now = Utc::now();
        let model = CartItemActiveModel {
            catalog_item_id: Set(line.catalog_item_id),
            display_name: Set(line.display_name),
            display_category: Set(line.display_category),
            display_image: Set(line.display_image),
            unit_amount: Set(line.unit_amount),
            quantity: Set(line.quantity),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model.insert(&*self.db).await?;
        debug!(line_id = inserted.id, "Inserted cart line");
        Ok(inserted)
    }

    async fn set_quantity(
        &self,
        id: i32,
        quantity: i32,
    ) -> Result<Option<CartLine>, ServiceError> {
        let Some(line) = CartItem::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active: cart_item::ActiveModel = line.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(Utc::now());

        Ok(Some(active.update(&*self.db).await?))
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = CartItem::delete_by_id(id).exec(&*self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn clear(&self) -> Result<u64, ServiceError> {
        let result = CartItem::delete_many().exec(&*self.db).await?;
        Ok(result.rows_affected)
    }
}
