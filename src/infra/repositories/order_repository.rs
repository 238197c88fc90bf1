//! Order repository implementation.
//!
//! Orders are never deleted. Status writes are compare-and-swap on the
//! status the caller last read, so two racing writers cannot both win.
//! The guest-arrived flag has its own write and is never part of a status
//! write, except that entering `completed` clears it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use super::entities::order::{self, into_orders, ActiveModel, Entity as OrderEntity};
use crate::errors::{AppError, AppResult, OptionExt};
use domain::{Order, OrderStatus};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a freshly placed order
    async fn create(&self, order: Order) -> AppResult<Order>;

    /// Find order by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// Most recent orders across all users, newest first
    async fn list_recent(&self, limit: u64) -> AppResult<Vec<Order>>;

    /// Orders owned by `firebase_uid`, newest first
    async fn list_by_owner(&self, firebase_uid: &str) -> AppResult<Vec<Order>>;

    /// Write `order` only if the stored status still equals `expected`.
    ///
    /// Only the status, its side-fields and `updated_at` are written;
    /// `guest_arrived` is written only when `order` is `completed`. Returns
    /// the stored order, `Conflict` when another writer changed the status
    /// first and `NotFound` when the order does not exist.
    async fn update(&self, order: Order, expected: OrderStatus) -> AppResult<Order>;

    /// Set `guest_arrived` regardless of status.
    ///
    /// Returns the stored order when this call flipped the flag and `None`
    /// when it was already set.
    async fn set_guest_arrived(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Option<Order>>;
}

/// Concrete implementation of OrderRepository
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn create(&self, order: Order) -> AppResult<Order> {
        let model = ActiveModel::from_order(&order)?
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Order::try_from(model)?)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let result = OrderEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Order::try_from).transpose()?)
    }

    async fn list_recent(&self, limit: u64) -> AppResult<Vec<Order>> {
        let models = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(into_orders(models)?)
    }

    async fn list_by_owner(&self, firebase_uid: &str) -> AppResult<Vec<Order>> {
        let models = OrderEntity::find()
            .filter(order::Column::FirebaseUid.eq(firebase_uid))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(into_orders(models)?)
    }

    async fn update(&self, order: Order, expected: OrderStatus) -> AppResult<Order> {
        let mut active = ActiveModel::from_order(&order)?;
        // Identity, ownership and the cart snapshot never change
        active.id = ActiveValue::NotSet;
        active.firebase_uid = ActiveValue::NotSet;
        active.user_email = ActiveValue::NotSet;
        active.user_name = ActiveValue::NotSet;
        active.items = ActiveValue::NotSet;
        active.subtotal = ActiveValue::NotSet;
        active.tax = ActiveValue::NotSet;
        active.total = ActiveValue::NotSet;
        active.created_at = ActiveValue::NotSet;
        if order.status != OrderStatus::Completed {
            active.guest_arrived = ActiveValue::NotSet;
        }

        let result = OrderEntity::update_many()
            .set(active)
            .filter(order::Column::Id.eq(order.id))
            .filter(order::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return match self.find_by_id(order.id).await? {
                None => Err(AppError::NotFound),
                Some(current) => {
                    tracing::warn!(
                        order_id = %order.id,
                        expected = %expected,
                        actual = %current.status,
                        "Order status changed by another writer"
                    );
                    Err(AppError::conflict(format!(
                        "Order was changed by someone else, it is now {}",
                        current.status
                    )))
                }
            };
        }

        self.find_by_id(order.id).await?.ok_or_not_found()
    }

    async fn set_guest_arrived(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Option<Order>> {
        let result = OrderEntity::update_many()
            .col_expr(order::Column::GuestArrived, Expr::value(true))
            .col_expr(order::Column::UpdatedAt, Expr::value(at))
            .filter(order::Column::Id.eq(id))
            .filter(order::Column::GuestArrived.eq(false))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        let current = self.find_by_id(id).await?.ok_or_not_found()?;
        Ok((result.rows_affected > 0).then_some(current))
    }
}
