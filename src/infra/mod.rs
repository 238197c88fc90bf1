//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Caching and rate limit counters (Redis)
//! - Unit of Work grouping the repositories

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, MigrationState, Migrator};
pub use repositories::{
    MenuRepository, MenuStore, OrderRepository, OrderStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockMenuRepository, MockOrderRepository, MockUserRepository};
