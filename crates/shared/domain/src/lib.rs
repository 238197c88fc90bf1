//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! The order status state machine lives here so the server and the client
//! pollers share one definition of an order.

pub mod constants;
pub mod error;
pub mod menu;
pub mod order;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use menu::{CreateMenuItem, MenuItem, UpdateMenuItem};
pub use order::{CancelledBy, NewOrder, Order, OrderItem, OrderStatus, TransitionPayload};
pub use user::{Actor, SyncUser, User, UserRole};
