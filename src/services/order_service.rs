//! Order service - authorization around the order status engine.
//!
//! Who may do what:
//!
//! | operation                          | caller                          |
//! |------------------------------------|---------------------------------|
//! | place order                        | any authenticated user (owner)  |
//! | list all orders                    | admin                           |
//! | list orders of user X              | user X or admin                 |
//! | get one order                      | owner or admin                  |
//! | status → preparing/rejected/completed | admin                        |
//! | status → cancelled                 | owner, only while pending       |
//! | guest arrived                      | owner                           |
//!
//! The role always comes from the persisted user behind the `Actor`.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::order_events::{OrderEventKind, OrderEvents};
use crate::config::MAX_ORDER_LIMIT;
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use domain::{Actor, CancelledBy, NewOrder, Order, OrderStatus, TransitionPayload};

/// Order service trait for dependency injection.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Place a pending order owned by the caller
    async fn place_order(&self, actor: &Actor, new_order: NewOrder) -> AppResult<Order>;

    /// Most recent orders across all users (admin only), capped at the maximum limit
    async fn list_orders(&self, actor: &Actor, limit: u64) -> AppResult<Vec<Order>>;

    /// Orders placed by `firebase_uid` (that user or admin)
    async fn list_user_orders(&self, actor: &Actor, firebase_uid: &str) -> AppResult<Vec<Order>>;

    /// Single order (owner or admin)
    async fn get_order(&self, actor: &Actor, id: Uuid) -> AppResult<Order>;

    /// Drive the status engine. `cancelled` takes the owner-cancel path,
    /// every other target is admin only.
    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        target: OrderStatus,
        payload: TransitionPayload,
    ) -> AppResult<Order>;

    /// Owner cancels a pending order
    async fn cancel_order(&self, actor: &Actor, id: Uuid) -> AppResult<Order>;

    /// Owner flags that they are at the restaurant. Idempotent.
    async fn mark_guest_arrived(&self, actor: &Actor, id: Uuid) -> AppResult<Order>;
}

/// Concrete implementation of OrderService using Unit of Work.
pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
    events: OrderEvents,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(uow: Arc<U>, events: OrderEvents) -> Self {
        Self { uow, events }
    }

    async fn load(&self, id: Uuid) -> AppResult<Order> {
        self.uow
            .orders()
            .find_by_id(id)
            .await?
            .ok_or_not_found()
    }

    /// Run one engine transition and persist it against the status it was
    /// computed from.
    async fn apply_transition(
        &self,
        mut order: Order,
        target: OrderStatus,
        payload: TransitionPayload,
    ) -> AppResult<Order> {
        let expected = order.status;
        order.transition(target, payload)?;

        let order = self.uow.orders().update(order, expected).await?;
        tracing::info!(
            order_id = %order.id,
            from = %expected,
            status = %order.status,
            "Order status changed"
        );
        self.events.publish(OrderEventKind::StatusChanged, &order);

        Ok(order)
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn place_order(&self, actor: &Actor, new_order: NewOrder) -> AppResult<Order> {
        let order = Order::place(actor, new_order)?;
        let order = self.uow.orders().create(order).await?;

        tracing::info!(
            order_id = %order.id,
            firebase_uid = %order.firebase_uid,
            items = order.items.len(),
            total = %order.total,
            "Order placed"
        );
        self.events.publish(OrderEventKind::Created, &order);

        Ok(order)
    }

    async fn list_orders(&self, actor: &Actor, limit: u64) -> AppResult<Vec<Order>> {
        actor.require_admin()?;
        self.uow
            .orders()
            .list_recent(limit.clamp(1, MAX_ORDER_LIMIT))
            .await
    }

    async fn list_user_orders(&self, actor: &Actor, firebase_uid: &str) -> AppResult<Vec<Order>> {
        if actor.firebase_uid != firebase_uid {
            actor.require_admin()?;
        }
        self.uow.orders().list_by_owner(firebase_uid).await
    }

    async fn get_order(&self, actor: &Actor, id: Uuid) -> AppResult<Order> {
        let order = self.load(id).await?;
        actor.require_owner_or_admin(&order)?;
        Ok(order)
    }

    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        target: OrderStatus,
        payload: TransitionPayload,
    ) -> AppResult<Order> {
        if target == OrderStatus::Cancelled {
            return self.cancel_order(actor, id).await;
        }

        if let Err(e) = actor.require_admin() {
            tracing::warn!(
                order_id = %id,
                firebase_uid = %actor.firebase_uid,
                status = %target,
                "Non-admin attempted an admin status change"
            );
            return Err(e.into());
        }

        let order = self.load(id).await?;
        // Only the side-field for the target is meaningful here
        let payload = TransitionPayload {
            cancelled_by: None,
            ..payload
        };
        self.apply_transition(order, target, payload).await
    }

    async fn cancel_order(&self, actor: &Actor, id: Uuid) -> AppResult<Order> {
        let order = self.load(id).await?;
        actor.require_owner(&order)?;

        self.apply_transition(
            order,
            OrderStatus::Cancelled,
            TransitionPayload::cancelled(CancelledBy::Guest),
        )
        .await
    }

    async fn mark_guest_arrived(&self, actor: &Actor, id: Uuid) -> AppResult<Order> {
        let mut order = self.load(id).await?;
        actor.require_owner(&order)?;

        if !order.mark_guest_arrived() {
            return Ok(order);
        }

        // Independent of status, so a concurrent status change is not a conflict
        match self.uow.orders().set_guest_arrived(id, order.updated_at).await? {
            Some(order) => {
                tracing::info!(order_id = %order.id, status = %order.status, "Guest arrived");
                self.events.publish(OrderEventKind::GuestArrived, &order);
                Ok(order)
            }
            None => self.load(id).await,
        }
    }
}
