//! OpenAPI documentation configuration.
//!
//! Served as JSON at `/api-docs/openapi.json` and browsable through Swagger
//! UI at `/swagger-ui`.

use utoipa::OpenApi;

use crate::api::handlers::{
    analytics_handler, appointment_handler, client_handler, company_handler,
    notification_handler, payment_handler, professional_handler, service_handler,
};
use crate::domain::analytics::{
    AppointmentStats, ClientStats, FrequentClient, OccupancyStats, PeakHour, PeriodBucket,
    ProfessionalPerformance, RevenueStats, ServicePopularity,
};
use crate::domain::company::{NotificationSettings, OperationSettings, StyleSettings};
use crate::domain::notification::{
    AutoReminders, DispatchReport, EmailRequest, NotificationBatch, NotificationCounts,
    ScheduleReminder, ScheduledReminders, SendReminder, TestNotification, WhatsAppRequest,
};
use crate::domain::payment::{CreatePayment, FeeQuote, FeeRequest, GatewayInfo, PaymentWebhook};
use crate::domain::{
    AnalyticsReport, Appointment, AppointmentDetails, AppointmentStatus, AssignProfessional,
    AssignedProfessional, AvailableSlots, CancelAppointment, Channel, Client, ClientHistory,
    Company, CompanySettings, CreateAppointment, CreateClient, CreateCompany, CreateProfessional,
    CreateService, Dashboard, Gateway, Notification, NotificationKind, NotificationPreferences,
    NotificationStatus, Payment, PaymentStatus, PaymentSummary, Period, Plan, Professional,
    RescheduleAppointment, Service, ServiceAssignment, UpdateAppointment, UpdateClient,
    UpdateCompany, UpdateProfessional, UpdateService,
};
use crate::types::{
    MessageResponse, PaginatedAppointments, PaginatedClients, PaginatedPayments, PaginationMeta,
};

/// OpenAPI documentation for the Agenda API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agenda API",
        version = "0.1.0",
        description = "Multi-tenant scheduling backend for service businesses: companies, clients, professionals, services, appointments, simulated payments, notifications and analytics",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        company_handler::list_companies,
        company_handler::create_company,
        company_handler::get_company,
        company_handler::update_company,
        company_handler::delete_company,
        company_handler::company_settings,
        client_handler::list_clients,
        client_handler::create_client,
        client_handler::search_clients,
        client_handler::get_client,
        client_handler::update_client,
        client_handler::delete_client,
        client_handler::client_history,
        client_handler::get_preferences,
        client_handler::update_preferences,
        professional_handler::list_professionals,
        professional_handler::create_professional,
        professional_handler::get_professional,
        professional_handler::update_professional,
        professional_handler::delete_professional,
        professional_handler::agenda,
        professional_handler::available_slots,
        service_handler::list_services,
        service_handler::create_service,
        service_handler::categories,
        service_handler::get_service,
        service_handler::update_service,
        service_handler::delete_service,
        service_handler::assigned_professionals,
        service_handler::assign_professional,
        service_handler::unassign_professional,
        appointment_handler::list_appointments,
        appointment_handler::book_appointment,
        appointment_handler::today,
        appointment_handler::get_appointment,
        appointment_handler::update_appointment,
        appointment_handler::reschedule_appointment,
        appointment_handler::cancel_appointment,
        payment_handler::create_payment,
        payment_handler::get_payment,
        payment_handler::check_status,
        payment_handler::webhook,
        payment_handler::gateways,
        payment_handler::calculate_fees,
        payment_handler::list_company_payments,
        notification_handler::send_confirmation,
        notification_handler::send_reminder,
        notification_handler::send_email,
        notification_handler::send_whatsapp,
        notification_handler::schedule_reminder,
        notification_handler::schedule_auto_reminders,
        notification_handler::send_test,
        notification_handler::appointment_log,
        analytics_handler::dashboard,
        analytics_handler::appointments_by_period,
        analytics_handler::popular_services,
        analytics_handler::professional_performance,
        analytics_handler::peak_hours,
        analytics_handler::status_distribution,
        analytics_handler::frequent_clients,
        analytics_handler::report,
    ),
    components(
        schemas(
            // Companies
            Plan,
            Company,
            CreateCompany,
            UpdateCompany,
            CompanySettings,
            StyleSettings,
            OperationSettings,
            NotificationSettings,
            // Clients
            Client,
            CreateClient,
            UpdateClient,
            ClientHistory,
            NotificationPreferences,
            PaginatedClients,
            // Professionals and services
            Professional,
            CreateProfessional,
            UpdateProfessional,
            AvailableSlots,
            Service,
            CreateService,
            UpdateService,
            AssignProfessional,
            AssignedProfessional,
            ServiceAssignment,
            // Appointments
            AppointmentStatus,
            Appointment,
            AppointmentDetails,
            CreateAppointment,
            UpdateAppointment,
            RescheduleAppointment,
            CancelAppointment,
            PaginatedAppointments,
            // Payments
            Gateway,
            PaymentStatus,
            Payment,
            PaymentSummary,
            CreatePayment,
            FeeRequest,
            FeeQuote,
            GatewayInfo,
            PaymentWebhook,
            PaginatedPayments,
            // Notifications
            NotificationKind,
            Channel,
            NotificationStatus,
            Notification,
            NotificationBatch,
            ScheduledReminders,
            NotificationCounts,
            DispatchReport,
            SendReminder,
            EmailRequest,
            WhatsAppRequest,
            ScheduleReminder,
            AutoReminders,
            TestNotification,
            // Analytics
            Period,
            Dashboard,
            AppointmentStats,
            ClientStats,
            RevenueStats,
            OccupancyStats,
            PeriodBucket,
            ServicePopularity,
            ProfessionalPerformance,
            PeakHour,
            FrequentClient,
            AnalyticsReport,
            // Shared
            PaginationMeta,
            MessageResponse,
        )
    ),
    tags(
        (name = "Companies", description = "Tenants and their settings"),
        (name = "Clients", description = "Customers of a company"),
        (name = "Professionals", description = "Staff, agendas and free slots"),
        (name = "Services", description = "Service catalog and professional assignments"),
        (name = "Appointments", description = "Booking and appointment lifecycle"),
        (name = "Payments", description = "Simulated gateway checkouts"),
        (name = "Notifications", description = "Email and WhatsApp messages and reminders"),
        (name = "Analytics", description = "Dashboard and reports")
    )
)]
pub struct ApiDoc;
