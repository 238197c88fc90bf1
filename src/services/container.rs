//! Service Container - Centralized service access.
//!
//! Handlers reach every service through one `ServiceContainer`, which
//! depends on service traits rather than their implementations.

use std::sync::Arc;

use super::{
    MenuManager, MenuService, OrderEvents, OrderManager, OrderService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get menu service
    fn menu(&self) -> Arc<dyn MenuService>;

    /// Get order service
    fn orders(&self) -> Arc<dyn OrderService>;

    /// Get the order event hub
    fn order_events(&self) -> OrderEvents;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    user_service: Arc<dyn UserService>,
    menu_service: Arc<dyn MenuService>,
    order_service: Arc<dyn OrderService>,
    order_events: OrderEvents,
}

impl Services {
    /// Create a service container from already-built services
    pub fn new(
        user_service: Arc<dyn UserService>,
        menu_service: Arc<dyn MenuService>,
        order_service: Arc<dyn OrderService>,
        order_events: OrderEvents,
    ) -> Self {
        Self {
            user_service,
            menu_service,
            order_service,
            order_events,
        }
    }

    /// Wire every service over one unit of work
    pub fn from_unit_of_work<U: UnitOfWork + 'static>(uow: Arc<U>, config: Config) -> Self {
        let order_events = OrderEvents::default();

        Self {
            user_service: Arc::new(UserManager::new(uow.clone(), config)),
            menu_service: Arc::new(MenuManager::new(uow.clone())),
            order_service: Arc::new(OrderManager::new(uow, order_events.clone())),
            order_events,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        Self::from_unit_of_work(Arc::new(Persistence::new(db)), config)
    }
}

impl ServiceContainer for Services {
    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn menu(&self) -> Arc<dyn MenuService> {
        self.menu_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn order_events(&self) -> OrderEvents {
        self.order_events.clone()
    }
}
