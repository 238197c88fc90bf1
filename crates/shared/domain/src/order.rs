//! Order aggregate and its status state machine.
//!
//! `Order::transition` is the only code path that writes `status` and the
//! side-fields that depend on it (`preparation_time`, `rejection_reason`,
//! `cancelled_by`). At most one side-field is set, and which one is decided
//! by the current status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::{
    CANCELLED_BY_ADMIN, CANCELLED_BY_GUEST, STATUS_CANCELLED, STATUS_COMPLETED, STATUS_PENDING,
    STATUS_PREPARING, STATUS_REJECTED,
};
use crate::error::{DomainError, DomainResult};
use crate::user::Actor;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Completed,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => STATUS_PENDING,
            OrderStatus::Preparing => STATUS_PREPARING,
            OrderStatus::Completed => STATUS_COMPLETED,
            OrderStatus::Rejected => STATUS_REJECTED,
            OrderStatus::Cancelled => STATUS_CANCELLED,
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Rejected | OrderStatus::Cancelled
        )
    }

    /// Check if `next` is an edge of the lifecycle:
    /// pending → preparing | rejected | cancelled, preparing → completed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Preparing)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Preparing, OrderStatus::Completed)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(OrderStatus::Pending),
            STATUS_PREPARING => Ok(OrderStatus::Preparing),
            STATUS_COMPLETED => Ok(OrderStatus::Completed),
            STATUS_REJECTED => Ok(OrderStatus::Rejected),
            STATUS_CANCELLED => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "Unknown order status '{}'",
                other
            ))),
        }
    }
}

/// Who cancelled an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
    Guest,
    Admin,
}

impl CancelledBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelledBy::Guest => CANCELLED_BY_GUEST,
            CancelledBy::Admin => CANCELLED_BY_ADMIN,
        }
    }
}

impl fmt::Display for CancelledBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CancelledBy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CANCELLED_BY_GUEST => Ok(CancelledBy::Guest),
            CANCELLED_BY_ADMIN => Ok(CancelledBy::Admin),
            other => Err(DomainError::validation(format!(
                "Unknown cancelledBy value '{}'",
                other
            ))),
        }
    }
}

/// One line of a checked-out cart. Immutable once the order exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    /// Unit price as a decimal string
    pub price: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<i32>,
}

/// Cart snapshot submitted at checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

/// Side-field values accompanying a status change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionPayload {
    pub preparation_time: Option<String>,
    pub rejection_reason: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
}

impl TransitionPayload {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn preparing(preparation_time: impl Into<String>) -> Self {
        Self {
            preparation_time: Some(preparation_time.into()),
            ..Self::default()
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            rejection_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn cancelled(by: CancelledBy) -> Self {
        Self {
            cancelled_by: Some(by),
            ..Self::default()
        }
    }
}

/// Order aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub firebase_uid: String,
    pub user_email: String,
    pub user_name: String,
    pub items: Vec<OrderItem>,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub preparation_time: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub cancelled_by: Option<CancelledBy>,
    #[serde(default)]
    pub guest_arrived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Turn a cart snapshot into a pending order owned by `owner`.
    pub fn place(owner: &Actor, new_order: NewOrder) -> DomainResult<Order> {
        if new_order.items.is_empty() {
            return Err(DomainError::validation(
                "Order must contain at least one item",
            ));
        }

        let now = Utc::now();
        Ok(Order {
            id: Uuid::new_v4(),
            firebase_uid: owner.firebase_uid.clone(),
            user_email: owner.email.clone(),
            user_name: owner.display_name.clone(),
            items: new_order.items,
            subtotal: new_order.subtotal,
            tax: new_order.tax,
            total: new_order.total,
            status: OrderStatus::Pending,
            preparation_time: None,
            rejection_reason: None,
            cancelled_by: None,
            guest_arrived: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Move the order to `target`.
    ///
    /// Fails with `InvalidTransition` when `target` is not reachable from the
    /// current status, and with `Validation` when the side-field the target
    /// needs is missing or blank. On failure the order is left untouched.
    /// Cancelling without a `cancelled_by` records the guest.
    pub fn transition(&mut self, target: OrderStatus, payload: TransitionPayload) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        let (preparation_time, rejection_reason, cancelled_by) = match target {
            OrderStatus::Preparing => (
                Some(required(
                    payload.preparation_time,
                    "Preparation time is required to accept an order",
                )?),
                None,
                None,
            ),
            OrderStatus::Rejected => (
                None,
                Some(required(
                    payload.rejection_reason,
                    "Rejection reason is required to reject an order",
                )?),
                None,
            ),
            OrderStatus::Cancelled => (
                None,
                None,
                Some(payload.cancelled_by.unwrap_or(CancelledBy::Guest)),
            ),
            OrderStatus::Pending | OrderStatus::Completed => (None, None, None),
        };

        self.status = target;
        self.preparation_time = preparation_time;
        self.rejection_reason = rejection_reason;
        self.cancelled_by = cancelled_by;
        if target == OrderStatus::Completed {
            self.guest_arrived = false;
        }
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Record that the guest is at the restaurant.
    ///
    /// Returns `false` when the flag was already set (nothing changed).
    pub fn mark_guest_arrived(&mut self) -> bool {
        if self.guest_arrived {
            return false;
        }
        self.guest_arrived = true;
        self.updated_at = Utc::now();
        true
    }

    /// Check the one-active-side-field invariant against the status.
    pub fn side_fields_consistent(&self) -> bool {
        let set = (
            self.preparation_time.is_some(),
            self.rejection_reason.is_some(),
            self.cancelled_by.is_some(),
        );
        match self.status {
            OrderStatus::Preparing => set == (true, false, false),
            OrderStatus::Rejected => set == (false, true, false),
            OrderStatus::Cancelled => set == (false, false, true),
            OrderStatus::Pending | OrderStatus::Completed => set == (false, false, false),
        }
    }

    /// Preparation time in whole minutes, read from the leading digits.
    pub fn preparation_minutes(&self) -> Option<u64> {
        let value = self.preparation_time.as_deref()?;
        let digits: String = value
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

fn required(value: Option<String>, message: &str) -> DomainResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(message)),
    }
}
