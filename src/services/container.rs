//! Service Container - Centralized service access with parallel execution support.
//!
//! Wires every manager onto one `Persistence` unit of work so handlers and
//! CLI commands resolve services through a single trait object.

use std::future::Future;
use std::sync::Arc;

use super::{
    AnalyticsManager, AnalyticsService, AppointmentService, CatalogManager, CatalogService,
    ClientManager, ClientService, CompanyManager, CompanyService, Dispatcher, NotificationManager,
    NotificationService, PaymentManager, PaymentService, ProfessionalManager, ProfessionalService,
    Scheduler,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, LogSender, NotificationQueue, Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn companies(&self) -> Arc<dyn CompanyService>;

    fn clients(&self) -> Arc<dyn ClientService>;

    fn professionals(&self) -> Arc<dyn ProfessionalService>;

    /// Services offered by companies
    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn appointments(&self) -> Arc<dyn AppointmentService>;

    fn payments(&self) -> Arc<dyn PaymentService>;

    fn notifications(&self) -> Arc<dyn NotificationService>;

    fn analytics(&self) -> Arc<dyn AnalyticsService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    companies: Arc<dyn CompanyService>,
    clients: Arc<dyn ClientService>,
    professionals: Arc<dyn ProfessionalService>,
    catalog: Arc<dyn CatalogService>,
    appointments: Arc<dyn AppointmentService>,
    payments: Arc<dyn PaymentService>,
    notifications: Arc<dyn NotificationService>,
    analytics: Arc<dyn AnalyticsService>,
    dispatcher: Arc<Dispatcher>,
}

impl Services {
    /// Build every service on top of one database connection.
    ///
    /// `queue` schedules reminders for the worker; without it pending
    /// reminders wait for `jobs dispatch`. `cache` enables dashboard caching.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: &Config,
        queue: Option<Arc<dyn NotificationQueue>>,
        cache: Option<Arc<Cache>>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let dispatcher = build_dispatcher(uow.as_ref(), config);

        let notifications: Arc<dyn NotificationService> = Arc::new(NotificationManager::new(
            uow.clone(),
            dispatcher.clone(),
            queue,
        ));
        let appointments = Arc::new(
            Scheduler::new(uow.clone()).with_notifications(notifications.clone()),
        );

        Self {
            companies: Arc::new(CompanyManager::new(uow.clone())),
            clients: Arc::new(ClientManager::new(uow.clone())),
            professionals: Arc::new(ProfessionalManager::new(uow.clone())),
            catalog: Arc::new(CatalogManager::new(uow.clone())),
            appointments,
            payments: Arc::new(PaymentManager::new(uow.clone(), notifications.clone())),
            analytics: Arc::new(AnalyticsManager::new(uow, cache, config.analytics_cache_ttl)),
            notifications,
            dispatcher,
        }
    }

    /// The outbox dispatcher shared with the notification service.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }
}

/// Dispatcher over the notification outbox that logs every outgoing message.
pub fn build_dispatcher<U: UnitOfWork>(uow: &U, config: &Config) -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(
        uow.notifications(),
        Arc::new(LogSender::new(config.email_from.clone())),
    ))
}

impl ServiceContainer for Services {
    fn companies(&self) -> Arc<dyn CompanyService> {
        self.companies.clone()
    }

    fn clients(&self) -> Arc<dyn ClientService> {
        self.clients.clone()
    }

    fn professionals(&self) -> Arc<dyn ProfessionalService> {
        self.professionals.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog.clone()
    }

    fn appointments(&self) -> Arc<dyn AppointmentService> {
        self.appointments.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payments.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.notifications.clone()
    }

    fn analytics(&self) -> Arc<dyn AnalyticsService> {
        self.analytics.clone()
    }
}

/// Parallel execution utilities for running independent lookups concurrently.
///
/// The first error wins and the remaining futures are dropped.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// # Example
    /// ```ignore
    /// let (client, company) = parallel::join2(
    ///     uow.clients().find_by_id(client_id),
    ///     uow.companies().find_by_id(company_id),
    /// ).await?;
    /// ```
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute three independent async operations in parallel.
    pub async fn join3<F1, F2, F3, T1, T2, T3>(
        f1: F1,
        f2: F2,
        f3: F3,
    ) -> AppResult<(T1, T2, T3)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
        F3: Future<Output = AppResult<T3>>,
    {
        try_join!(f1, f2, f3)
    }

    /// Execute four independent async operations in parallel.
    pub async fn join4<F1, F2, F3, F4, T1, T2, T3, T4>(
        f1: F1,
        f2: F2,
        f3: F3,
        f4: F4,
    ) -> AppResult<(T1, T2, T3, T4)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
        F3: Future<Output = AppResult<T3>>,
        F4: Future<Output = AppResult<T4>>,
    {
        try_join!(f1, f2, f3, f4)
    }

    /// Run an iterator of operations with at most `limit` in flight.
    ///
    /// Results come back in completion order.
    pub async fn join_all_limited<F, T, I>(futures: I, limit: usize) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
        I: IntoIterator<Item = F>,
    {
        use futures::stream::{self, StreamExt, TryStreamExt};

        stream::iter(futures)
            .buffer_unordered(limit)
            .try_collect()
            .await
    }
}
