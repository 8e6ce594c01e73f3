//! Application state - Dependency injection container.
//!
//! Handlers reach every use case through the service container. Health
//! checks go through a probe so the router can be driven without live
//! infrastructure.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, Database, NotificationQueue};
use crate::services::{ServiceContainer, Services};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Connectivity checks behind `GET /health`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn database(&self) -> AppResult<()>;

    /// `None` when Redis is not configured.
    async fn redis(&self) -> Option<AppResult<()>>;
}

/// Probe over the real database and optional cache.
pub struct InfraProbe {
    database: Arc<Database>,
    cache: Option<Arc<Cache>>,
}

impl InfraProbe {
    pub fn new(database: Arc<Database>, cache: Option<Arc<Cache>>) -> Self {
        Self { database, cache }
    }
}

#[async_trait]
impl HealthProbe for InfraProbe {
    async fn database(&self) -> AppResult<()> {
        self.database.ping().await?;
        Ok(())
    }

    async fn redis(&self) -> Option<AppResult<()>> {
        match &self.cache {
            Some(cache) => Some(cache.ping().await),
            None => None,
        }
    }
}

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn ServiceContainer>,
    /// Redis cache; rate limiting is off without it
    pub cache: Option<Arc<Cache>>,
    pub probe: Arc<dyn HealthProbe>,
}

impl AppState {
    /// Wire the real services on top of the database, cache and job queue.
    pub fn from_config(
        database: Arc<Database>,
        cache: Option<Arc<Cache>>,
        queue: Option<Arc<dyn NotificationQueue>>,
        config: &Config,
    ) -> Self {
        let services = Arc::new(Services::from_connection(
            database.get_connection(),
            config,
            queue,
            cache.clone(),
        ));

        Self {
            services,
            probe: Arc::new(InfraProbe::new(database, cache.clone())),
            cache,
        }
    }

    /// Create state with manually injected services.
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        cache: Option<Arc<Cache>>,
        probe: Arc<dyn HealthProbe>,
    ) -> Self {
        Self {
            services,
            cache,
            probe,
        }
    }
}
