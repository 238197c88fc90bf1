//! Order handlers.
//!
//! Every route here runs behind the identity middleware, so handlers receive
//! the resolved caller as `Extension<CurrentUser>`. Ownership and role checks
//! are made by the order service.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Extension, Path, Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
    routing::{get, patch, post},
    Router,
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use domain::{Actor, NewOrder, Order, OrderItem, OrderStatus, TransitionPayload};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{
    DEFAULT_ORDER_LIMIT, ORDER_EVENTS_CALLER_REFRESH_SECONDS, ORDER_EVENTS_KEEP_ALIVE_SECONDS,
};
use crate::errors::{AppError, AppResult};
use crate::services::{OrderEvent, UserService};
use crate::types::Created;
use crate::utils::{validate_amount, validate_not_blank};

/// One cart line
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderItemRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Chicken Karahi")]
    pub name: String,
    #[validate(custom(function = "validate_amount"))]
    #[schema(example = "24.99")]
    pub price: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    #[schema(example = 1)]
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub calories: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub protein: Option<i32>,
}

impl From<OrderItemRequest> for OrderItem {
    fn from(req: OrderItemRequest) -> Self {
        OrderItem {
            name: req.name.trim().to_string(),
            price: req.price,
            quantity: req.quantity,
            image: req.image,
            calories: req.calories,
            protein: req.protein,
        }
    }
}

/// Checkout request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PlaceOrderRequest {
    #[validate(length(min = 1, message = "must contain at least one item"), nested)]
    pub items: Vec<OrderItemRequest>,
    #[validate(custom(function = "validate_amount"))]
    #[schema(example = "24.99")]
    pub subtotal: String,
    #[validate(custom(function = "validate_amount"))]
    #[schema(example = "2.00")]
    pub tax: String,
    #[validate(custom(function = "validate_amount"))]
    #[schema(example = "26.99")]
    pub total: String,
}

impl From<PlaceOrderRequest> for NewOrder {
    fn from(req: PlaceOrderRequest) -> Self {
        NewOrder {
            items: req.items.into_iter().map(OrderItem::from).collect(),
            subtotal: req.subtotal,
            tax: req.tax,
            total: req.total,
        }
    }
}

/// Status change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    /// Required when moving to `preparing`
    #[schema(example = "30")]
    pub preparation_time: Option<String>,
    /// Required when moving to `rejected`
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub rejection_reason: Option<String>,
}

impl UpdateStatusRequest {
    fn into_parts(self) -> (OrderStatus, TransitionPayload) {
        (
            self.status,
            TransitionPayload {
                preparation_time: self.preparation_time,
                rejection_reason: self.rejection_reason,
                cancelled_by: None,
            },
        )
    }
}

/// Query parameters for the admin order list
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    /// Number of orders to return (default 50, max 200)
    pub limit: Option<u64>,
}

/// Order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(place_order).get(list_orders))
        .route("/events", get(order_events))
        .route("/user/:uid", get(list_user_orders))
        .route("/:id", get(get_order))
        .route("/:id/status", patch(update_order_status))
        .route("/:id/arrived", patch(mark_guest_arrived))
        .route("/:id/cancel", patch(cancel_order))
}

/// Place an order from the caller's cart
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    security(("user_id" = [])),
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unknown caller"),
        (status = 429, description = "Too many checkouts")
    )
)]
pub async fn place_order(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PlaceOrderRequest>,
) -> AppResult<Created<Order>> {
    let order = state
        .services
        .orders()
        .place_order(&current_user, payload.into())
        .await?;

    Ok(Created(order))
}

/// List recent orders, newest first (admin only)
#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    security(("user_id" = [])),
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Recent orders", body = Vec<Order>),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_orders(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let limit = query.limit.unwrap_or(DEFAULT_ORDER_LIMIT);
    let orders = state
        .services
        .orders()
        .list_orders(&current_user, limit)
        .await?;

    Ok(Json(orders))
}

/// List one user's orders, newest first
#[utoipa::path(
    get,
    path = "/orders/user/{uid}",
    tag = "Orders",
    security(("user_id" = [])),
    params(
        ("uid" = String, Path, description = "Firebase UID of the order owner")
    ),
    responses(
        (status = 200, description = "The user's orders", body = Vec<Order>),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Not the same user and not an admin")
    )
)]
pub async fn list_user_orders(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state
        .services
        .orders()
        .list_user_orders(&current_user, &uid)
        .await?;

    Ok(Json(orders))
}

/// Get a single order
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "Orders",
    security(("user_id" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Not the owner and not an admin"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let order = state.services.orders().get_order(&current_user, id).await?;
    Ok(Json(order))
}

/// Move an order through its lifecycle
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    tag = "Orders",
    security(("user_id" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Order),
        (status = 400, description = "Validation error or invalid transition"),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Caller may not make this change"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order changed concurrently")
    )
)]
pub async fn update_order_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let (target, transition) = payload.into_parts();
    let order = state
        .services
        .orders()
        .update_status(&current_user, id, target, transition)
        .await?;

    Ok(Json(order))
}

/// Tell the kitchen the guest has arrived (owner only)
#[utoipa::path(
    patch,
    path = "/orders/{id}/arrived",
    tag = "Orders",
    security(("user_id" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Guest marked as arrived", body = Order),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn mark_guest_arrived(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let order = state
        .services
        .orders()
        .mark_guest_arrived(&current_user, id)
        .await?;

    Ok(Json(order))
}

/// Cancel a pending order (owner only)
#[utoipa::path(
    patch,
    path = "/orders/{id}/cancel",
    tag = "Orders",
    security(("user_id" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order cancelled", body = Order),
        (status = 400, description = "Order is no longer pending"),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order changed concurrently")
    )
)]
pub async fn cancel_order(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let order = state
        .services
        .orders()
        .cancel_order(&current_user, id)
        .await?;

    Ok(Json(order))
}

/// Caller of one open event stream.
///
/// The role is re-read from the user store once the last read is older than
/// `ORDER_EVENTS_CALLER_REFRESH_SECONDS`, so a demotion or promotion applies
/// to a stream that is already open.
struct StreamCaller {
    actor: Actor,
    users: Arc<dyn UserService>,
    resolved_at: Instant,
}

impl StreamCaller {
    fn new(actor: Actor, users: Arc<dyn UserService>) -> Self {
        Self {
            actor,
            users,
            resolved_at: Instant::now(),
        }
    }

    /// The caller as currently stored, `None` once they are no longer known.
    async fn current(&mut self) -> Option<&Actor> {
        let refresh_after = Duration::from_secs(ORDER_EVENTS_CALLER_REFRESH_SECONDS);
        if self.resolved_at.elapsed() >= refresh_after {
            match self.users.resolve_actor(&self.actor.firebase_uid).await {
                Ok(actor) => {
                    if actor.role != self.actor.role {
                        tracing::info!(
                            client = %actor.firebase_uid,
                            role = ?actor.role,
                            "Order event stream caller role changed"
                        );
                    }
                    self.actor = actor;
                }
                Err(AppError::Unauthorized) => {
                    tracing::debug!(
                        client = %self.actor.firebase_uid,
                        "Order event stream caller no longer known, closing"
                    );
                    return None;
                }
                // Keep the last known caller and retry after the next window
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        client = %self.actor.firebase_uid,
                        "Failed to refresh order event stream caller"
                    );
                }
            }
            self.resolved_at = Instant::now();
        }

        Some(&self.actor)
    }
}

/// Stream order changes as server-sent events
///
/// Admins receive every order, other callers only their own. The caller's
/// role is re-checked periodically while the stream is open, and the stream
/// ends if the caller disappears.
#[utoipa::path(
    get,
    path = "/orders/events",
    tag = "Orders",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Event stream of order changes",
         content_type = "text/event-stream", body = OrderEvent),
        (status = 401, description = "Unknown caller")
    )
)]
pub async fn order_events(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.services.order_events().subscribe();
    tracing::debug!(client = %current_user.firebase_uid, "Order event stream opened");
    let caller = StreamCaller::new(current_user, state.services.users());

    let stream = stream::unfold((rx, caller), |(mut rx, mut caller)| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let Some(actor) = caller.current().await else {
                        return None;
                    };
                    if !event.visible_to(actor) {
                        continue;
                    }
                    let sse = match Event::default().event(event.kind.as_str()).json_data(&event) {
                        Ok(sse) => sse,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to encode order event");
                            continue;
                        }
                    };
                    return Some((Ok(sse), (rx, caller)));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        client = %caller.actor.firebase_uid,
                        skipped,
                        "Order event stream lagged, events dropped"
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(ORDER_EVENTS_KEEP_ALIVE_SECONDS)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::UserRole;

    fn karahi_line() -> OrderItemRequest {
        OrderItemRequest {
            name: "Chicken Karahi".to_string(),
            price: "24.99".to_string(),
            quantity: 1,
            image: None,
            calories: None,
            protein: None,
        }
    }

    fn checkout(items: Vec<OrderItemRequest>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            items,
            subtotal: "24.99".to_string(),
            tax: "2.00".to_string(),
            total: "26.99".to_string(),
        }
    }

    #[test]
    fn test_valid_checkout_passes() {
        assert!(checkout(vec![karahi_line()]).validate().is_ok());
    }

    #[test]
    fn test_empty_cart_fails() {
        assert!(checkout(vec![]).validate().is_err());
    }

    #[test]
    fn test_zero_quantity_line_fails() {
        let mut line = karahi_line();
        line.quantity = 0;
        assert!(checkout(vec![karahi_line(), line]).validate().is_err());
    }

    #[test]
    fn test_bad_total_fails() {
        let mut request = checkout(vec![karahi_line()]);
        request.total = "26.999".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_status_request_never_carries_cancelled_by() {
        let request: UpdateStatusRequest = serde_json::from_value(serde_json::json!({
            "status": "preparing",
            "preparationTime": "30"
        }))
        .unwrap();

        let (target, payload) = request.into_parts();
        assert_eq!(target, OrderStatus::Preparing);
        assert_eq!(payload.preparation_time.as_deref(), Some("30"));
        assert_eq!(payload.cancelled_by, None);
    }

    /// Resolves every caller to one stored actor, or to nobody
    struct StoredCaller(Option<Actor>);

    #[async_trait::async_trait]
    impl UserService for StoredCaller {
        async fn sync_user(&self, _profile: domain::SyncUser) -> AppResult<domain::User> {
            unreachable!("event stream never syncs users")
        }

        async fn get_by_firebase_uid(&self, _firebase_uid: &str) -> AppResult<domain::User> {
            unreachable!("event stream resolves actors only")
        }

        async fn resolve_actor(&self, _firebase_uid: &str) -> AppResult<Actor> {
            self.0.clone().ok_or(AppError::Unauthorized)
        }
    }

    fn actor(role: UserRole) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            firebase_uid: "staff-1".to_string(),
            email: "staff@example.com".to_string(),
            display_name: "Staff".to_string(),
            role,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_caller_picks_up_demotion_after_refresh_window() {
        let users = Arc::new(StoredCaller(Some(actor(UserRole::User))));
        let mut caller = StreamCaller::new(actor(UserRole::Admin), users);

        assert_eq!(caller.current().await.unwrap().role, UserRole::Admin);

        tokio::time::advance(Duration::from_secs(ORDER_EVENTS_CALLER_REFRESH_SECONDS)).await;
        assert_eq!(caller.current().await.unwrap().role, UserRole::User);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_caller_ends_when_user_is_gone() {
        let users = Arc::new(StoredCaller(None));
        let mut caller = StreamCaller::new(actor(UserRole::Admin), users);

        assert!(caller.current().await.is_some());

        tokio::time::advance(Duration::from_secs(ORDER_EVENTS_CALLER_REFRESH_SECONDS)).await;
        assert!(caller.current().await.is_none());
    }

    #[test]
    fn test_unknown_status_does_not_deserialize() {
        let result: Result<UpdateStatusRequest, _> =
            serde_json::from_value(serde_json::json!({ "status": "shipped" }));
        assert!(result.is_err());
    }
}
