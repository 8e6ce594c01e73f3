//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain rules and infrastructure to fulfill the
//! booking use cases. They depend on the `UnitOfWork` abstraction, never on
//! concrete stores, so every manager can be exercised against mocks.

mod analytics_service;
mod appointment_service;
mod catalog_service;
mod client_service;
mod company_service;
pub mod container;
mod dispatcher;
mod notification_service;
mod payment_service;
mod professional_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use analytics_service::{AnalyticsManager, AnalyticsService};
pub use appointment_service::{AppointmentService, Scheduler};
pub use catalog_service::{CatalogManager, CatalogService};
pub use client_service::{ClientManager, ClientService};
pub use company_service::{CompanyManager, CompanyService};
pub use dispatcher::Dispatcher;
pub use notification_service::{NotificationManager, NotificationService};
pub use payment_service::{PaymentManager, PaymentService};
pub use professional_service::{ProfessionalManager, ProfessionalService};

// Parallel execution utilities
pub use container::parallel;

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use analytics_service::MockAnalyticsService;
#[cfg(any(test, feature = "test-utils"))]
pub use appointment_service::MockAppointmentService;
#[cfg(any(test, feature = "test-utils"))]
pub use catalog_service::MockCatalogService;
#[cfg(any(test, feature = "test-utils"))]
pub use client_service::MockClientService;
#[cfg(any(test, feature = "test-utils"))]
pub use company_service::MockCompanyService;
#[cfg(any(test, feature = "test-utils"))]
pub use notification_service::MockNotificationService;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_service::MockPaymentService;
#[cfg(any(test, feature = "test-utils"))]
pub use professional_service::MockProfessionalService;

/// Fixtures shared by the service unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
    use uuid::Uuid;

    use crate::domain::{
        Appointment, AppointmentStatus, Channel, Client, Company, NewNotification, Notification,
        NotificationKind, NotificationPreferences, NotificationStatus, Plan, Professional,
        Service, WorkDays,
    };
    use crate::infra::repositories::{
        AnalyticsRepository, AppointmentRepository, ClientRepository, CompanyRepository,
        MockAnalyticsRepository, MockAppointmentRepository, MockClientRepository,
        MockCompanyRepository, MockNotificationRepository, MockPaymentRepository,
        MockProfessionalRepository, MockServiceRepository, NotificationRepository,
        PaymentRepository, ProfessionalRepository, ServiceRepository,
    };
    use crate::infra::UnitOfWork;

    /// One mock per repository; set expectations, then call `into_uow`.
    #[derive(Default)]
    pub struct Mocks {
        pub companies: MockCompanyRepository,
        pub clients: MockClientRepository,
        pub professionals: MockProfessionalRepository,
        pub catalog: MockServiceRepository,
        pub appointments: MockAppointmentRepository,
        pub payments: MockPaymentRepository,
        pub notifications: MockNotificationRepository,
        pub analytics: MockAnalyticsRepository,
    }

    impl Mocks {
        pub fn into_uow(self) -> Arc<TestUnitOfWork> {
            Arc::new(TestUnitOfWork {
                companies: Arc::new(self.companies),
                clients: Arc::new(self.clients),
                professionals: Arc::new(self.professionals),
                catalog: Arc::new(self.catalog),
                appointments: Arc::new(self.appointments),
                payments: Arc::new(self.payments),
                notifications: Arc::new(self.notifications),
                analytics: Arc::new(self.analytics),
            })
        }
    }

    pub struct TestUnitOfWork {
        companies: Arc<MockCompanyRepository>,
        clients: Arc<MockClientRepository>,
        professionals: Arc<MockProfessionalRepository>,
        catalog: Arc<MockServiceRepository>,
        appointments: Arc<MockAppointmentRepository>,
        payments: Arc<MockPaymentRepository>,
        notifications: Arc<MockNotificationRepository>,
        analytics: Arc<MockAnalyticsRepository>,
    }

    impl UnitOfWork for TestUnitOfWork {
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

    pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
    }

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    pub fn sample_company() -> Company {
        let now = Utc::now();
        Company {
            id: Uuid::new_v4(),
            name: "Studio Bella".to_string(),
            email: "contato@studiobella.com".to_string(),
            phone: Some("11987654321".to_string()),
            address: None,
            logo_url: None,
            primary_color: "#007BFF".to_string(),
            secondary_color: "#6C757D".to_string(),
            accent_color: "#28A745".to_string(),
            opening_time: Some(hm(9, 0)),
            closing_time: Some(hm(18, 0)),
            working_days: WorkDays::default(),
            plan: Plan::Basic,
            whatsapp_enabled: false,
            email_enabled: true,
            whatsapp_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sample_client(company_id: Uuid) -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4(),
            company_id,
            name: "Maria Silva".to_string(),
            phone: "11987654321".to_string(),
            email: Some("maria@example.com".to_string()),
            document: None,
            birth_date: None,
            address: None,
            custom_fields: None,
            preferences: None,
            notes: None,
            active: true,
            notification_preferences: NotificationPreferences::default(),
            created_at: now,
            updated_at: now,
            last_visit_at: None,
        }
    }

    /// Works 09:00-12:00 Monday to Friday in 30-minute steps.
    pub fn sample_professional(company_id: Uuid) -> Professional {
        let now = Utc::now();
        Professional {
            id: Uuid::new_v4(),
            company_id,
            name: "Ana Costa".to_string(),
            email: Some("ana@studiobella.com".to_string()),
            phone: None,
            specialties: vec!["haircut".to_string()],
            bio: None,
            photo_url: None,
            work_start: Some(hm(9, 0)),
            work_end: Some(hm(12, 0)),
            work_days: WorkDays::parse("1111100").unwrap(),
            slot_interval_minutes: 30,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sample_service(company_id: Uuid) -> Service {
        let now = Utc::now();
        Service {
            id: Uuid::new_v4(),
            company_id,
            name: "Corte feminino".to_string(),
            description: None,
            duration_minutes: 45,
            price_cents: 5_000,
            category: Some("Cabelo".to_string()),
            active: true,
            requires_preparation: false,
            preparation_minutes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// A 45-minute scheduled appointment priced at 50.00.
    pub fn sample_appointment(
        company_id: Uuid,
        professional_id: Uuid,
        starts_at: DateTime<Utc>,
    ) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            company_id,
            client_id: Uuid::new_v4(),
            professional_id,
            service_id: Uuid::new_v4(),
            starts_at,
            ends_at: starts_at + Duration::minutes(45),
            status: AppointmentStatus::Scheduled,
            client_notes: None,
            professional_notes: None,
            internal_notes: None,
            service_price_cents: 5_000,
            discount_cents: 0,
            total_cents: 5_000,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            cancelled_at: None,
        }
    }

    pub fn pending_notification() -> Notification {
        stored_notification(NewNotification {
            appointment_id: Some(Uuid::new_v4()),
            kind: NotificationKind::Reminder,
            channel: Channel::Email,
            recipient: "maria@example.com".to_string(),
            subject: Some("Lembrete".to_string()),
            message: "Seu horario e amanha".to_string(),
            send_at: Utc::now(),
        })
    }

    /// What the outbox returns for a freshly inserted row.
    pub fn stored_notification(row: NewNotification) -> Notification {
        let now = Utc::now();
        Notification {
            id: Uuid::new_v4(),
            appointment_id: row.appointment_id,
            kind: row.kind,
            channel: row.channel,
            recipient: row.recipient,
            subject: row.subject,
            message: row.message,
            status: NotificationStatus::Pending,
            attempts: 0,
            error_details: None,
            send_at: row.send_at,
            sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
