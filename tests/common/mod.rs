//! Shared fixtures for integration tests.
//!
//! `InMemoryPersistence` implements the repository traits over
//! mutex-guarded maps with the same semantics as the SeaORM stores,
//! including compare-and-swap order writes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use restaurant_orders::api::{create_router, AppState};
use restaurant_orders::config::{Config, USER_ID_HEADER};
use restaurant_orders::errors::{AppError, AppResult};
use restaurant_orders::infra::{
    Database, MenuRepository, OrderRepository, UnitOfWork, UserRepository,
};
use restaurant_orders::services::Services;
use domain::{MenuItem, Order, OrderStatus, SyncUser, User, UserRole};

pub const ADMIN_EMAIL: &str = "owner@restaurant.com";

// =============================================================================
// In-memory repositories
// =============================================================================

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_firebase_uid(&self, firebase_uid: &str) -> AppResult<Option<User>> {
        Ok(self.rows.lock().unwrap().get(firebase_uid).cloned())
    }

    async fn upsert(&self, profile: SyncUser, role: UserRole) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let user = match rows.get(&profile.firebase_uid) {
            Some(existing) => User {
                email: profile.email,
                display_name: profile.display_name,
                photo_url: profile.photo_url,
                role,
                updated_at: now,
                ..existing.clone()
            },
            None => User {
                id: Uuid::new_v4(),
                firebase_uid: profile.firebase_uid.clone(),
                email: profile.email,
                display_name: profile.display_name,
                photo_url: profile.photo_url,
                role,
                created_at: now,
                updated_at: now,
            },
        };
        rows.insert(user.firebase_uid.clone(), user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct InMemoryMenu {
    rows: Mutex<HashMap<Uuid, MenuItem>>,
}

#[async_trait]
impl MenuRepository for InMemoryMenu {
    async fn list(&self) -> AppResult<Vec<MenuItem>> {
        let mut items: Vec<MenuItem> = self.rows.lock().unwrap().values().cloned().collect();
        items.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
        Ok(items)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MenuItem>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, item: MenuItem) -> AppResult<MenuItem> {
        self.rows.lock().unwrap().insert(item.id, item.clone());
        Ok(item)
    }

    async fn update(&self, item: MenuItem) -> AppResult<MenuItem> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&item.id) {
            Some(row) => {
                *row = item.clone();
                Ok(item)
            }
            None => Err(AppError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        match self.rows.lock().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound),
        }
    }
}

#[derive(Default)]
pub struct InMemoryOrders {
    rows: Mutex<HashMap<Uuid, Order>>,
}

impl InMemoryOrders {
    fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Change an order's status as if another writer got there first.
    pub fn overwrite_status(&self, id: Uuid, status: OrderStatus) {
        if let Some(order) = self.rows.lock().unwrap().get_mut(&id) {
            order.status = status;
        }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn create(&self, order: Order) -> AppResult<Order> {
        self.rows.lock().unwrap().insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn list_recent(&self, limit: u64) -> AppResult<Vec<Order>> {
        let orders = self.rows.lock().unwrap().values().cloned().collect();
        let mut orders = Self::newest_first(orders);
        orders.truncate(limit as usize);
        Ok(orders)
    }

    async fn list_by_owner(&self, firebase_uid: &str) -> AppResult<Vec<Order>> {
        let orders = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.firebase_uid == firebase_uid)
            .cloned()
            .collect();
        Ok(Self::newest_first(orders))
    }

    async fn update(&self, order: Order, expected: OrderStatus) -> AppResult<Order> {
        let mut rows = self.rows.lock().unwrap();
        let current = rows.get_mut(&order.id).ok_or(AppError::NotFound)?;
        if current.status != expected {
            return Err(AppError::conflict(format!(
                "Order was changed by someone else, it is now {}",
                current.status
            )));
        }
        let guest_arrived = if order.status == OrderStatus::Completed {
            order.guest_arrived
        } else {
            current.guest_arrived
        };
        *current = Order {
            guest_arrived,
            ..order
        };
        Ok(current.clone())
    }

    async fn set_guest_arrived(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Option<Order>> {
        let mut rows = self.rows.lock().unwrap();
        let current = rows.get_mut(&id).ok_or(AppError::NotFound)?;
        if current.guest_arrived {
            return Ok(None);
        }
        current.guest_arrived = true;
        current.updated_at = at;
        Ok(Some(current.clone()))
    }
}

/// Unit of work over the in-memory repositories
#[derive(Default)]
pub struct InMemoryPersistence {
    pub users: Arc<InMemoryUsers>,
    pub orders: Arc<InMemoryOrders>,
    pub menu: Arc<InMemoryMenu>,
}

impl UnitOfWork for InMemoryPersistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    fn menu_items(&self) -> Arc<dyn MenuRepository> {
        self.menu.clone()
    }
}

// =============================================================================
// Router harness
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryPersistence>,
}

pub fn test_config() -> Config {
    Config::default().with_admin_emails([ADMIN_EMAIL])
}

impl TestApp {
    /// Router over in-memory persistence, no Redis, disconnected database
    pub fn new() -> Self {
        let store = Arc::new(InMemoryPersistence::default());
        let config = test_config();
        let services = Arc::new(Services::from_unit_of_work(store.clone(), config.clone()));
        let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));
        let state = AppState::new(services, None, database);

        Self {
            router: create_router(state, &config),
            store,
        }
    }

    /// Send a request and return the status with the JSON body (`Null` if empty)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        uid: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(uid) = uid {
            builder = builder.header(USER_ID_HEADER, uid);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    /// Sync a user through the API and return their profile
    pub async fn sign_in(&self, uid: &str, email: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/users/sync",
                Some(uid),
                Some(serde_json::json!({
                    "email": email,
                    "displayName": uid,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "sync failed: {}", body);
        body
    }

    /// Place the Chicken Karahi order as `uid`
    pub async fn place_karahi_order(&self, uid: &str) -> Value {
        let (status, body) = self
            .send(Method::POST, "/orders", Some(uid), Some(karahi_checkout()))
            .await;
        assert_eq!(status, StatusCode::CREATED, "checkout failed: {}", body);
        body
    }
}

pub fn karahi_checkout() -> Value {
    serde_json::json!({
        "items": [{ "name": "Chicken Karahi", "price": "24.99", "quantity": 1 }],
        "subtotal": "24.99",
        "tax": "2.00",
        "total": "26.99"
    })
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
