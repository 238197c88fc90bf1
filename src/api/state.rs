//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database};
use crate::services::{ServiceContainer, Services};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// All application services
    pub services: Arc<dyn ServiceContainer>,
    /// Redis cache, absent when Redis is not configured or unreachable
    pub cache: Option<Arc<Cache>>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Build the production state: SeaORM-backed services over `database`.
    pub fn from_config(database: Arc<Database>, cache: Option<Arc<Cache>>, config: Config) -> Self {
        let services = Arc::new(Services::from_connection(database.get_connection(), config));
        Self::new(services, cache, database)
    }

    /// Create state with an injected service container.
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        cache: Option<Arc<Cache>>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            services,
            cache,
            database,
        }
    }
}
