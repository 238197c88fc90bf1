//! Restaurant Orders - ordering backend for a single restaurant
//!
//! Guests browse the menu, check out a cart and follow their order; staff
//! accept, reject and complete orders. The order lifecycle itself lives in
//! the `domain` crate so the server and the pollers share it.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, cache)
//! - **api**: HTTP handlers, middleware, and routes
//! - **client**: Staff and guest order pollers
//! - **types**: Shared response types
//! - **utils**: Validation helpers
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Watch for new orders as staff
//! cargo run -- watch --user-id <uid> admin
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Actor, MenuItem, Order, OrderStatus, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
