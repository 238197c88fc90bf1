//! Order event hub - in-process fan-out of order changes.
//!
//! ```text
//! OrderManager (after a successful write)
//!       │ OrderEvent
//!       ▼
//! OrderEvents ── broadcast::Sender ──► SSE handler per client
//!                                       (filters by ownership)
//! ```
//!
//! Delivery is best-effort: a subscriber that falls more than the channel
//! capacity behind skips the missed events and keeps going.

use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::config::ORDER_EVENTS_CAPACITY;
use domain::{Actor, Order};

/// What happened to the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OrderEventKind {
    Created,
    StatusChanged,
    GuestArrived,
}

impl OrderEventKind {
    /// SSE event name, same spelling as the JSON `kind`
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEventKind::Created => "created",
            OrderEventKind::StatusChanged => "statusChanged",
            OrderEventKind::GuestArrived => "guestArrived",
        }
    }
}

/// One change, carrying the order as it is after the write
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderEvent {
    pub kind: OrderEventKind,
    pub order: Order,
}

impl OrderEvent {
    /// Admins see every order, everyone else only their own.
    pub fn visible_to(&self, actor: &Actor) -> bool {
        actor.is_admin() || actor.owns(&self.order)
    }
}

/// Broadcast hub shared by the order service and the event stream
#[derive(Clone)]
pub struct OrderEvents {
    tx: broadcast::Sender<OrderEvent>,
}

impl Default for OrderEvents {
    fn default() -> Self {
        Self::new(ORDER_EVENTS_CAPACITY)
    }
}

impl OrderEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a change. Having no subscribers is not an error.
    pub fn publish(&self, kind: OrderEventKind, order: &Order) {
        let receivers = self
            .tx
            .send(OrderEvent {
                kind,
                order: order.clone(),
            })
            .unwrap_or(0);

        tracing::debug!(order_id = %order.id, ?kind, receivers, "Order event published");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
