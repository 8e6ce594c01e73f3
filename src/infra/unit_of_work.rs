//! Unit of Work pattern implementation.
//!
//! Centralizes access to every repository so services depend on a single
//! abstraction. Writes that need atomicity across a check and a write
//! (appointment booking and rescheduling) open their own serializable
//! transaction inside the appointment repository.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{
    AnalyticsRepository, AnalyticsStore, AppointmentRepository, AppointmentStore,
    ClientRepository, ClientStore, CompanyRepository, CompanyStore, NotificationRepository,
    NotificationStore, PaymentRepository, PaymentStore, ProfessionalRepository,
    ProfessionalStore, ServiceRepository, ServiceStore,
};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    fn companies(&self) -> Arc<dyn CompanyRepository>;

    fn clients(&self) -> Arc<dyn ClientRepository>;

    fn professionals(&self) -> Arc<dyn ProfessionalRepository>;

    /// Services offered by companies and their professional assignments
    fn catalog(&self) -> Arc<dyn ServiceRepository>;

    fn appointments(&self) -> Arc<dyn AppointmentRepository>;

    fn payments(&self) -> Arc<dyn PaymentRepository>;

    fn notifications(&self) -> Arc<dyn NotificationRepository>;

    fn analytics(&self) -> Arc<dyn AnalyticsRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    companies: Arc<CompanyStore>,
    clients: Arc<ClientStore>,
    professionals: Arc<ProfessionalStore>,
    catalog: Arc<ServiceStore>,
    appointments: Arc<AppointmentStore>,
    payments: Arc<PaymentStore>,
    notifications: Arc<NotificationStore>,
    analytics: Arc<AnalyticsStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            companies: Arc::new(CompanyStore::new(db.clone())),
            clients: Arc::new(ClientStore::new(db.clone())),
            professionals: Arc::new(ProfessionalStore::new(db.clone())),
            catalog: Arc::new(ServiceStore::new(db.clone())),
            appointments: Arc::new(AppointmentStore::new(db.clone())),
            payments: Arc::new(PaymentStore::new(db.clone())),
            notifications: Arc::new(NotificationStore::new(db.clone())),
            analytics: Arc::new(AnalyticsStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn companies(&self) -> Arc<dyn CompanyRepository> {
        self.companies.clone()
    }

    fn clients(&self) -> Arc<dyn ClientRepository> {
        self.clients.clone()
    }

    fn professionals(&self) -> Arc<dyn ProfessionalRepository> {
        self.professionals.clone()
    }

    fn catalog(&self) -> Arc<dyn ServiceRepository> {
        self.catalog.clone()
    }

    fn appointments(&self) -> Arc<dyn AppointmentRepository> {
        self.appointments.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentRepository> {
        self.payments.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        self.notifications.clone()
    }

    fn analytics(&self) -> Arc<dyn AnalyticsRepository> {
        self.analytics.clone()
    }
}
