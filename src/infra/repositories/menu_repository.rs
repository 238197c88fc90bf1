//! Menu item repository implementation.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder};
use uuid::Uuid;

use super::entities::menu_item::{self, ActiveModel, Entity as MenuItemEntity};
use crate::errors::{AppError, AppResult};
use domain::MenuItem;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Menu item repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// List all menu items grouped by category, then name
    async fn list(&self) -> AppResult<Vec<MenuItem>>;

    /// Find a menu item by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MenuItem>>;

    /// Persist a new menu item
    async fn create(&self, item: MenuItem) -> AppResult<MenuItem>;

    /// Overwrite an existing menu item
    async fn update(&self, item: MenuItem) -> AppResult<MenuItem>;

    /// Delete a menu item, `NotFound` when it does not exist
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of MenuRepository
pub struct MenuStore {
    db: DatabaseConnection,
}

impl MenuStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MenuRepository for MenuStore {
    async fn list(&self) -> AppResult<Vec<MenuItem>> {
        let models = MenuItemEntity::find()
            .order_by_asc(menu_item::Column::Category)
            .order_by_asc(menu_item::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(MenuItem::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MenuItem>> {
        let result = MenuItemEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(MenuItem::from))
    }

    async fn create(&self, item: MenuItem) -> AppResult<MenuItem> {
        let model = ActiveModel::from(&item)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(MenuItem::from(model))
    }

    async fn update(&self, item: MenuItem) -> AppResult<MenuItem> {
        let model = ActiveModel::from(&item)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => AppError::NotFound,
                other => AppError::from(other),
            })?;

        Ok(MenuItem::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = MenuItemEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
