//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, and reach repositories through the Unit of Work.

pub mod container;
mod menu_service;
pub mod order_events;
mod order_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use menu_service::{MenuManager, MenuService};
pub use order_events::{OrderEvent, OrderEventKind, OrderEvents};
pub use order_service::{OrderManager, OrderService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
