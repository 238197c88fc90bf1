//! HTTP request handlers.

pub mod menu_handler;
pub mod order_handler;
pub mod user_handler;

pub use menu_handler::{menu_admin_routes, menu_routes};
pub use order_handler::order_routes;
pub use user_handler::{user_routes, user_sync_routes};
