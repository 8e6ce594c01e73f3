//! Repository layer - Data access abstraction
//!
//! Each repository is a trait (mockable under `test`/`test-utils`) plus a
//! SeaORM-backed `*Store` implementation.

mod analytics_repository;
mod appointment_repository;
mod client_repository;
mod company_repository;
pub(crate) mod entities;
mod notification_repository;
mod payment_repository;
mod professional_repository;
mod service_repository;

pub use analytics_repository::{AnalyticsRepository, AnalyticsStore};
pub use appointment_repository::{AppointmentRepository, AppointmentStore};
pub use client_repository::{ClientRepository, ClientStore};
pub use company_repository::{CompanyRepository, CompanyStore};
pub use notification_repository::{NotificationRepository, NotificationStore};
pub use payment_repository::{PaymentRepository, PaymentStore};
pub use professional_repository::{ProfessionalRepository, ProfessionalStore};
pub use service_repository::{ServiceRepository, ServiceStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use analytics_repository::MockAnalyticsRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use appointment_repository::MockAppointmentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use client_repository::MockClientRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use company_repository::MockCompanyRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use notification_repository::MockNotificationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_repository::MockPaymentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use professional_repository::MockProfessionalRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use service_repository::MockServiceRepository;
