//! Domain layer - Core business entities and logic
//!
//! Companies own clients, professionals and services. Appointments tie the
//! three together on a professional's calendar, and payments and
//! notifications hang off appointments.
//!
//! Nothing in here performs I/O: scheduling, fee and analytics rules are
//! plain functions over the entities.

pub mod analytics;
pub mod appointment;
pub mod client;
pub mod company;
pub mod notification;
pub mod patterns;
pub mod payment;
pub mod professional;
pub mod schedule;
pub mod service;

pub use analytics::{AnalyticsReport, AppointmentFact, Dashboard, Period};
pub use appointment::{
    Appointment, AppointmentDetails, AppointmentFilter, AppointmentOwner, AppointmentStatus,
    CancelAppointment, CreateAppointment, RescheduleAppointment, UpdateAppointment,
};
pub use client::{Client, ClientHistory, CreateClient, NotificationPreferences, UpdateClient};
pub use company::{Company, CompanySettings, CreateCompany, Plan, UpdateCompany};
pub use notification::{
    Channel, NewNotification, Notification, NotificationKind, NotificationStatus,
};
pub use payment::{Gateway, Payment, PaymentFilter, PaymentStatus, PaymentSummary};
pub use professional::{AvailableSlots, CreateProfessional, Professional, UpdateProfessional};
pub use schedule::{TimeRange, WorkDays};
pub use service::{
    AssignProfessional, AssignedProfessional, BookingTerms, CreateService, Service,
    ServiceAssignment, UpdateService,
};
