//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database};
use crate::services::{EventDispatcher, ServiceContainer, Services};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Use case services
    pub services: Arc<dyn ServiceContainer>,
    /// Redis cache; rate limits and the checkout lock are skipped without it
    pub cache: Option<Arc<Cache>>,
    /// Database connection
    pub database: Arc<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(
        database: Arc<Database>,
        cache: Option<Arc<Cache>>,
        config: Config,
        dispatcher: EventDispatcher,
    ) -> Self {
        let services = Arc::new(Services::from_connection(
            database.get_connection(),
            &config,
            dispatcher,
        ));

        Self::new(services, cache, database, config)
    }

    /// Create new application state with manually injected services.
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        cache: Option<Arc<Cache>>,
        database: Arc<Database>,
        config: Config,
    ) -> Self {
        Self {
            services,
            cache,
            database,
            config: Arc::new(config),
        }
    }
}
