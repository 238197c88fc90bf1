//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories so services depend on one
//! injectable object. Every write in this service touches a single row,
//! so there is no transaction API; order writes rely on compare-and-swap
//! in the order repository instead.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    MenuRepository, MenuStore, OrderRepository, OrderStore, UserRepository, UserStore,
};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get order repository
    fn orders(&self) -> Arc<dyn OrderRepository>;

    /// Get menu item repository
    fn menu_items(&self) -> Arc<dyn MenuRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    order_repo: Arc<OrderStore>,
    menu_repo: Arc<MenuStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db.clone())),
            menu_repo: Arc::new(MenuStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    fn menu_items(&self) -> Arc<dyn MenuRepository> {
        self.menu_repo.clone()
    }
}
