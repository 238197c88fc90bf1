//! Menu service - menu item reads and admin writes.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use domain::{CreateMenuItem, MenuItem, UpdateMenuItem};

/// Menu service trait for dependency injection.
#[async_trait]
pub trait MenuService: Send + Sync {
    async fn list_items(&self) -> AppResult<Vec<MenuItem>>;

    async fn get_item(&self, id: Uuid) -> AppResult<MenuItem>;

    async fn create_item(&self, input: CreateMenuItem) -> AppResult<MenuItem>;

    /// Apply a partial update; an empty update is a validation error
    async fn update_item(&self, id: Uuid, changes: UpdateMenuItem) -> AppResult<MenuItem>;

    async fn delete_item(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of MenuService using Unit of Work.
pub struct MenuManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> MenuManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> MenuService for MenuManager<U> {
    async fn list_items(&self) -> AppResult<Vec<MenuItem>> {
        self.uow.menu_items().list().await
    }

    async fn get_item(&self, id: Uuid) -> AppResult<MenuItem> {
        self.uow
            .menu_items()
            .find_by_id(id)
            .await?
            .ok_or_not_found()
    }

    async fn create_item(&self, input: CreateMenuItem) -> AppResult<MenuItem> {
        let item = self.uow.menu_items().create(MenuItem::create(input)).await?;
        tracing::info!(menu_item_id = %item.id, name = %item.name, "Menu item created");
        Ok(item)
    }

    async fn update_item(&self, id: Uuid, changes: UpdateMenuItem) -> AppResult<MenuItem> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }

        let repo = self.uow.menu_items();
        let mut item = repo.find_by_id(id).await?.ok_or_not_found()?;
        item.apply(changes);

        let item = repo.update(item).await?;
        tracing::info!(menu_item_id = %item.id, "Menu item updated");
        Ok(item)
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<()> {
        self.uow.menu_items().delete(id).await?;
        tracing::info!(menu_item_id = %id, "Menu item deleted");
        Ok(())
    }
}
