//! Order database entity for SeaORM.
//!
//! Line items are stored as a JSONB array; status and `cancelled_by`
//! as their lowercase wire strings.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{CancelledBy, Order, OrderItem, OrderStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub firebase_uid: String,
    pub user_email: String,
    pub user_name: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub items: Json,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub status: String,
    pub preparation_time: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub cancelled_by: Option<String>,
    pub guest_arrived: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert a stored row back into the domain aggregate.
impl TryFrom<Model> for Order {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let items: Vec<OrderItem> = serde_json::from_value(model.items)
            .map_err(|e| DbErr::Custom(format!("order {} has malformed items: {}", model.id, e)))?;
        let status: OrderStatus = model
            .status
            .parse()
            .map_err(|e| DbErr::Custom(format!("order {}: {}", model.id, e)))?;
        let cancelled_by = model
            .cancelled_by
            .as_deref()
            .map(str::parse::<CancelledBy>)
            .transpose()
            .map_err(|e| DbErr::Custom(format!("order {}: {}", model.id, e)))?;

        Ok(Order {
            id: model.id,
            firebase_uid: model.firebase_uid,
            user_email: model.user_email,
            user_name: model.user_name,
            items,
            subtotal: model.subtotal,
            tax: model.tax,
            total: model.total,
            status,
            preparation_time: model.preparation_time,
            rejection_reason: model.rejection_reason,
            cancelled_by,
            guest_arrived: model.guest_arrived,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl ActiveModel {
    /// Build a fully-set active model from the aggregate.
    pub fn from_order(order: &Order) -> Result<Self, DbErr> {
        let items = serde_json::to_value(&order.items)
            .map_err(|e| DbErr::Custom(format!("cannot encode order items: {}", e)))?;

        Ok(ActiveModel {
            id: Set(order.id),
            firebase_uid: Set(order.firebase_uid.clone()),
            user_email: Set(order.user_email.clone()),
            user_name: Set(order.user_name.clone()),
            items: Set(items),
            subtotal: Set(order.subtotal.clone()),
            tax: Set(order.tax.clone()),
            total: Set(order.total.clone()),
            status: Set(order.status.as_str().to_string()),
            preparation_time: Set(order.preparation_time.clone()),
            rejection_reason: Set(order.rejection_reason.clone()),
            cancelled_by: Set(order.cancelled_by.map(|c| c.as_str().to_string())),
            guest_arrived: Set(order.guest_arrived),
            created_at: Set(order.created_at),
            updated_at: Set(order.updated_at),
        })
    }
}

/// Convert multiple models, failing on the first malformed row.
pub fn into_orders(models: Vec<Model>) -> Result<Vec<Order>, DbErr> {
    models.into_iter().map(Order::try_from).collect()
}
