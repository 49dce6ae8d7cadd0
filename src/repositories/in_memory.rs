use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::CartBackend;
use crate::entities::{CartLine, NewCartLine};
use crate::errors::ServiceError;

#[derive(Debug)]
struct CartState {
    lines: Vec<CartLine>,
    next_id: i32,
}

/// Process-local cart storage.
///
/// Nothing is persisted across restarts and every caller shares the same
/// cart. Each instance owns its own state, so tests can create isolated
/// stores.
#[derive(Debug)]
pub struct InMemoryCartBackend {
    state: RwLock<CartState>,
}

impl Default for InMemoryCartBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCartBackend {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CartState {
                lines: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of lines currently held
    pub async fn len(&self) -> usize {
        self.state.read().await.lines.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CartBackend for InMemoryCartBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<CartLine>, ServiceError> {
        Ok(self.state.read().await.lines.clone())
    }

    async fn find_by_catalog_item(
        &self,
        catalog_item_id: i32,
    ) -> Result<Vec<CartLine>, ServiceError> {
        let state = self.state.read().await;
        Ok(state
            .lines
            .iter()
            .filter(|line| line.catalog_item_id == catalog_item_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, line: NewCartLine) -> Result<CartLine, ServiceError> {
        let mut state = self.state.write().await;

        let id = state.next_id;
        state.next_id = id
            .checked_add(1)
            .ok_or_else(|| ServiceError::InternalError("cart line ids exhausted".into()))?;

        let now = Utc::now();
        let line = CartLine {
            id,
            catalog_item_id: line.catalog_item_id,
            display_name: line.display_name,
            display_category: line.display_category,
            display_image: line.display_image,
            unit_amount: line.unit_amount,
            quantity: line.quantity,
            created_at: now,
            updated_at: now,
        };
        state.lines.push(line.clone());
        Ok(line)
    }

    async fn set_quantity(
        &self,
        id: i32,
        quantity: i32,
    ) -> Result<Option<CartLine>, ServiceError> {
        let mut state = self.state.write().await;
        Ok(state.lines.iter_mut().find(|line| line.id == id).map(|line| {
            line.quantity = quantity;
            line.updated_at = Utc::now().max(line.created_at);
            line.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let mut state = self.state.write().await;
        match state.lines.iter().position(|line| line.id == id) {
            Some(index) => {
                state.lines.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear(&self) -> Result<u64, ServiceError> {
        let mut state = self.state.write().await;
        let removed = state.lines.len() as u64;
        state.lines.clear();
        Ok(removed)
    }
}
