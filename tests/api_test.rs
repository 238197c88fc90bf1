//! Integration tests for API endpoints.
//!
//! These tests drive the full router over in-memory persistence, without
//! requiring an actual database or Redis connection.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::{error_code, karahi_checkout, TestApp, ADMIN_EMAIL};
use domain::{OrderStatus, TransitionPayload};
use restaurant_orders::infra::OrderRepository;

const GUEST: &str = "guest-uid";
const OTHER_GUEST: &str = "other-guest-uid";
const ADMIN: &str = "admin-uid";

async fn app_with_people() -> TestApp {
    let app = TestApp::new();
    app.sign_in(GUEST, "guest@example.com").await;
    app.sign_in(OTHER_GUEST, "other@example.com").await;
    app.sign_in(ADMIN, ADMIN_EMAIL).await;
    app
}

fn order_uri(order: &serde_json::Value, suffix: &str) -> String {
    format!("/orders/{}{}", order["id"].as_str().unwrap(), suffix)
}

// =============================================================================
// Health & identity
// =============================================================================

#[tokio::test]
async fn test_root_endpoint_returns_welcome_message() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Restaurant Orders API"));
}

#[tokio::test]
async fn test_health_reports_redis_disabled_and_database_down() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["services"]["redis"]["status"], "disabled");
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_missing_caller_header_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/users/me", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_caller_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/orders", Some("nobody"), Some(karahi_checkout()))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_sync_assigns_role_from_allow_list_only() {
    let app = TestApp::new();

    let (status, guest) = app
        .send(
            Method::POST,
            "/users/sync",
            Some(GUEST),
            Some(json!({
                "email": "guest@example.com",
                "displayName": "Guest",
                "role": "admin"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(guest["role"], "user");
    assert_eq!(guest["firebaseUid"], GUEST);

    let admin = app.sign_in(ADMIN, "Owner@Restaurant.com").await;
    assert_eq!(admin["role"], "admin");

    let (status, me) = app.send(Method::GET, "/users/me", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "admin");
}

#[tokio::test]
async fn test_sync_rejects_bad_email() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/users/sync",
            Some(GUEST),
            Some(json!({ "email": "not-an-email", "displayName": "Guest" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

// =============================================================================
// Order lifecycle
// =============================================================================

#[tokio::test]
async fn test_checkout_creates_pending_order_without_side_fields() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;

    assert_eq!(order["status"], "pending");
    assert_eq!(order["firebaseUid"], GUEST);
    assert_eq!(order["userEmail"], "guest@example.com");
    assert_eq!(order["total"], "26.99");
    assert_eq!(order["items"][0]["name"], "Chicken Karahi");
    assert!(order["preparationTime"].is_null());
    assert!(order["rejectionReason"].is_null());
    assert!(order["cancelledBy"].is_null());
    assert_eq!(order["guestArrived"], false);
}

#[tokio::test]
async fn test_accept_then_complete_clears_preparation_time() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;

    let (status, accepted) = app
        .send(
            Method::PATCH,
            &order_uri(&order, "/status"),
            Some(ADMIN),
            Some(json!({ "status": "preparing", "preparationTime": "30" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "preparing");
    assert_eq!(accepted["preparationTime"], "30");

    let (status, completed) = app
        .send(
            Method::PATCH,
            &order_uri(&order, "/status"),
            Some(ADMIN),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");
    assert!(completed["preparationTime"].is_null());
}

#[tokio::test]
async fn test_preparing_without_time_is_validation_error() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;

    let (status, body) = app
        .send(
            Method::PATCH,
            &order_uri(&order, "/status"),
            Some(ADMIN),
            Some(json!({ "status": "preparing" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    let (_, stored) = app.send(Method::GET, &order_uri(&order, ""), Some(GUEST), None).await;
    assert_eq!(stored["status"], "pending");
}

#[tokio::test]
async fn test_reject_requires_reason() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;

    let (status, _) = app
        .send(
            Method::PATCH,
            &order_uri(&order, "/status"),
            Some(ADMIN),
            Some(json!({ "status": "rejected", "rejectionReason": "  " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, rejected) = app
        .send(
            Method::PATCH,
            &order_uri(&order, "/status"),
            Some(ADMIN),
            Some(json!({ "status": "rejected", "rejectionReason": "Kitchen closed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["rejectionReason"], "Kitchen closed");
    assert!(rejected["preparationTime"].is_null());
}

#[tokio::test]
async fn test_guest_cannot_accept_own_order() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;

    let (status, body) = app
        .send(
            Method::PATCH,
            &order_uri(&order, "/status"),
            Some(GUEST),
            Some(json!({ "status": "preparing", "preparationTime": "5" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");

    let (_, stored) = app.send(Method::GET, &order_uri(&order, ""), Some(GUEST), None).await;
    assert_eq!(stored["status"], "pending");
    assert!(stored["preparationTime"].is_null());
}

#[tokio::test]
async fn test_owner_cancel_after_preparing_is_invalid_transition() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;

    app.send(
        Method::PATCH,
        &order_uri(&order, "/status"),
        Some(ADMIN),
        Some(json!({ "status": "preparing", "preparationTime": "30" })),
    )
    .await;

    let (status, body) = app
        .send(Method::PATCH, &order_uri(&order, "/cancel"), Some(GUEST), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_TRANSITION");

    let (_, stored) = app.send(Method::GET, &order_uri(&order, ""), Some(GUEST), None).await;
    assert_eq!(stored["status"], "preparing");
    assert_eq!(stored["preparationTime"], "30");
}

#[tokio::test]
async fn test_owner_cancels_pending_order() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;

    let (status, cancelled) = app
        .send(
            Method::PATCH,
            &order_uri(&order, "/status"),
            Some(GUEST),
            Some(json!({ "status": "cancelled" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["cancelledBy"], "guest");
}

#[tokio::test]
async fn test_admin_cannot_cancel_guest_order() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;

    let (status, _) = app
        .send(Method::PATCH, &order_uri(&order, "/cancel"), Some(ADMIN), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_guest_arrived_is_idempotent_and_owner_only() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;
    let uri = order_uri(&order, "/arrived");

    for _ in 0..2 {
        let (status, body) = app.send(Method::PATCH, &uri, Some(GUEST), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["guestArrived"], true);
        assert_eq!(body["status"], "pending");
    }

    let (status, _) = app.send(Method::PATCH, &uri, Some(OTHER_GUEST), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_status_change_after_another_writer_finished_is_refused() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;
    let id: Uuid = order["id"].as_str().unwrap().parse().unwrap();

    app.store.orders.overwrite_status(id, OrderStatus::Rejected);

    let (status, body) = app
        .send(
            Method::PATCH,
            &order_uri(&order, "/status"),
            Some(ADMIN),
            Some(json!({ "status": "preparing", "preparationTime": "10" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_status_write_from_stale_read_keeps_guest_arrived() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;
    let id: Uuid = order["id"].as_str().unwrap().parse().unwrap();

    // Admin side reads the order before the guest checks in
    let mut stale = app.store.orders.find_by_id(id).await.unwrap().unwrap();

    let (status, body) = app
        .send(Method::PATCH, &order_uri(&order, "/arrived"), Some(GUEST), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["guestArrived"], true);

    stale
        .transition(OrderStatus::Preparing, TransitionPayload::preparing("15"))
        .unwrap();
    let written = app
        .store
        .orders
        .update(stale, OrderStatus::Pending)
        .await
        .unwrap();
    assert!(written.guest_arrived);

    let (status, body) = app
        .send(Method::GET, &order_uri(&order, ""), Some(GUEST), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "preparing");
    assert_eq!(body["preparationTime"], "15");
    assert_eq!(body["guestArrived"], true);
}

#[tokio::test]
async fn test_guest_arrival_after_status_change_is_not_a_conflict() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;
    let id: Uuid = order["id"].as_str().unwrap().parse().unwrap();

    let (status, _) = app
        .send(
            Method::PATCH,
            &order_uri(&order, "/status"),
            Some(ADMIN),
            Some(json!({ "status": "preparing", "preparationTime": "25" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let changed = app
        .store
        .orders
        .set_guest_arrived(id, chrono::Utc::now())
        .await
        .unwrap()
        .expect("first arrival flips the flag");
    assert_eq!(changed.status, OrderStatus::Preparing);
    assert_eq!(changed.preparation_time.as_deref(), Some("25"));

    let (status, body) = app
        .send(Method::PATCH, &order_uri(&order, "/arrived"), Some(GUEST), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["guestArrived"], true);
    assert_eq!(body["status"], "preparing");
}

#[tokio::test]
async fn test_completion_clears_guest_arrived() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;
    let status_uri = order_uri(&order, "/status");

    app.send(Method::PATCH, &order_uri(&order, "/arrived"), Some(GUEST), None)
        .await;
    app.send(
        Method::PATCH,
        &status_uri,
        Some(ADMIN),
        Some(json!({ "status": "preparing", "preparationTime": "5" })),
    )
    .await;
    let (status, body) = app
        .send(
            Method::PATCH,
            &status_uri,
            Some(ADMIN),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["guestArrived"], false);
}

// =============================================================================
// Order reads
// =============================================================================

#[tokio::test]
async fn test_order_visibility() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;
    let uri = order_uri(&order, "");

    let (status, _) = app.send(Method::GET, &uri, Some(GUEST), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::GET, &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::GET, &uri, Some(OTHER_GUEST), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");

    let missing = format!("/orders/{}", Uuid::new_v4());
    let (status, body) = app.send(Method::GET, &missing, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_all_orders_is_admin_only_and_newest_first() {
    let app = app_with_people().await;
    let first = app.place_karahi_order(GUEST).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = app.place_karahi_order(OTHER_GUEST).await;

    let (status, _) = app.send(Method::GET, "/orders", Some(GUEST), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, orders) = app.send(Method::GET, "/orders?limit=10", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], second["id"]);
    assert_eq!(orders[1]["id"], first["id"]);

    let (_, limited) = app.send(Method::GET, "/orders?limit=1", Some(ADMIN), None).await;
    assert_eq!(limited.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_orders_for_self_or_admin() {
    let app = app_with_people().await;
    app.place_karahi_order(GUEST).await;
    app.place_karahi_order(OTHER_GUEST).await;
    let uri = format!("/orders/user/{}", GUEST);

    let (status, mine) = app.send(Method::GET, &uri, Some(GUEST), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["firebaseUid"], GUEST);

    let (status, _) = app.send(Method::GET, &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::GET, &uri, Some(OTHER_GUEST), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Checkout validation
// =============================================================================

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let app = app_with_people().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/orders",
            Some(GUEST),
            Some(json!({ "items": [], "subtotal": "0.00", "tax": "0.00", "total": "0.00" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_zero_quantity_is_rejected_with_item_path() {
    let app = app_with_people().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/orders",
            Some(GUEST),
            Some(json!({
                "items": [{ "name": "Chicken Karahi", "price": "24.99", "quantity": 0 }],
                "subtotal": "24.99",
                "tax": "2.00",
                "total": "26.99"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("items[0].quantity"), "{}", message);
}

#[tokio::test]
async fn test_unknown_status_is_rejected() {
    let app = app_with_people().await;
    let order = app.place_karahi_order(GUEST).await;

    let (status, body) = app
        .send(
            Method::PATCH,
            &order_uri(&order, "/status"),
            Some(ADMIN),
            Some(json!({ "status": "shipped" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

// =============================================================================
// Menu
// =============================================================================

fn karahi_menu_item() -> serde_json::Value {
    json!({
        "name": "Chicken Karahi",
        "description": "Wok-cooked chicken in tomato and ginger",
        "price": "24.99",
        "calories": 780,
        "protein": 52,
        "image": "https://img.example.com/karahi.png",
        "category": "Curries"
    })
}

#[tokio::test]
async fn test_menu_reads_are_public() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/menu", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_menu_writes_are_admin_only() {
    let app = app_with_people().await;

    let (status, _) = app
        .send(Method::POST, "/menu", None, Some(karahi_menu_item()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::POST, "/menu", Some(GUEST), Some(karahi_menu_item()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_menu_crud_round() {
    let app = app_with_people().await;

    let (status, created) = app
        .send(Method::POST, "/menu", Some(ADMIN), Some(karahi_menu_item()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/menu/{}", created["id"].as_str().unwrap());

    let (status, updated) = app
        .send(Method::PUT, &uri, Some(ADMIN), Some(json!({ "price": "25.50" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], "25.50");
    assert_eq!(updated["name"], "Chicken Karahi");

    let (status, listed) = app.send(Method::GET, "/menu", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["price"], "25.50");

    let (status, _) = app.send(Method::DELETE, &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_menu_price_must_be_decimal() {
    let app = app_with_people().await;
    let mut item = karahi_menu_item();
    item["price"] = json!("cheap");

    let (status, body) = app.send(Method::POST, "/menu", Some(ADMIN), Some(item)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}
