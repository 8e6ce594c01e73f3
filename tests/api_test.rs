//! Integration tests for API endpoints.
//!
//! The router is driven through `tower::ServiceExt::oneshot` on top of
//! hand-written service fakes, so no database or Redis is needed.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use agenda_api::api::{create_router, AppState, HealthProbe};
use agenda_api::domain::analytics::{
    FrequentClient, PeakHour, PeriodBucket, ProfessionalPerformance, ServicePopularity,
};
use agenda_api::domain::notification::{
    AutoReminders, DispatchReport, EmailRequest, NotificationBatch, ScheduleReminder,
    ScheduledReminders, TestNotification, WhatsAppRequest,
};
use agenda_api::domain::payment::{CreatePayment, FeeQuote, FeeRequest, GatewayInfo, PaymentWebhook};
use agenda_api::domain::{
    AnalyticsReport, Appointment, AppointmentDetails, AppointmentFilter, AssignProfessional,
    AssignedProfessional, AvailableSlots, BookingTerms, CancelAppointment, Client, ClientHistory,
    Company, CompanySettings, CreateAppointment, CreateClient, CreateCompany, CreateProfessional,
    CreateService, Dashboard, Gateway, Notification, NotificationKind, NotificationPreferences,
    Payment, PaymentFilter, PaymentSummary, Period, Professional, RescheduleAppointment, Service,
    ServiceAssignment, TimeRange, UpdateAppointment, UpdateClient, UpdateCompany,
    UpdateProfessional, UpdateService,
};
use agenda_api::errors::{AppError, AppResult};
use agenda_api::services::{
    AnalyticsService, AppointmentService, CatalogService, ClientService, CompanyService,
    NotificationService, PaymentService, ProfessionalService, ServiceContainer,
};
use agenda_api::types::{Paginated, PaginationParams};

// =============================================================================
// Fakes
// =============================================================================

/// In-memory company registry
#[derive(Default)]
struct FakeCompanies {
    rows: Mutex<HashMap<Uuid, Company>>,
}

#[async_trait]
impl CompanyService for FakeCompanies {
    async fn list_companies(&self) -> AppResult<Vec<Company>> {
        let mut rows: Vec<Company> = self.rows.lock().unwrap().values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn create_company(&self, input: CreateCompany) -> AppResult<Company> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|c| c.email == input.email) {
            return Err(AppError::conflict("Email is already registered"));
        }
        let company = Company::create(input, Utc::now());
        rows.insert(company.id, company.clone());
        Ok(company)
    }

    async fn get_company(&self, id: Uuid) -> AppResult<Company> {
        self.rows
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound("Company"))
    }

    async fn update_company(&self, id: Uuid, input: UpdateCompany) -> AppResult<Company> {
        let mut rows = self.rows.lock().unwrap();
        let company = rows.get_mut(&id).ok_or(AppError::NotFound("Company"))?;
        company.apply(input, Utc::now());
        Ok(company.clone())
    }

    async fn delete_company(&self, id: Uuid) -> AppResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound("Company"))
    }

    async fn company_settings(&self, id: Uuid) -> AppResult<CompanySettings> {
        Ok(self.get_company(id).await?.settings())
    }
}

/// Books against a single busy range and rejects anything overlapping it
struct FakeScheduler {
    busy: TimeRange,
    terms: BookingTerms,
}

#[async_trait]
impl AppointmentService for FakeScheduler {
    async fn book(&self, company_id: Uuid, input: CreateAppointment) -> AppResult<Appointment> {
        let requested = TimeRange::starting_at(input.starts_at, self.terms.duration_minutes)?;
        if requested.overlaps(&self.busy) {
            return Err(AppError::SlotUnavailable);
        }
        Appointment::schedule(company_id, &input, self.terms, Utc::now())
    }

    async fn available_slots(
        &self,
        _professional_id: Uuid,
        _date: NaiveDate,
        _service_id: Option<Uuid>,
    ) -> AppResult<AvailableSlots> {
        Err(unused())
    }

    async fn reschedule(&self, _id: Uuid, _input: RescheduleAppointment) -> AppResult<Appointment> {
        Err(unused())
    }

    async fn cancel(&self, _id: Uuid, _input: CancelAppointment) -> AppResult<Appointment> {
        Err(AppError::NotFound("Appointment"))
    }

    async fn update(&self, _id: Uuid, _input: UpdateAppointment) -> AppResult<Appointment> {
        Err(unused())
    }

    async fn list(
        &self,
        _company_id: Uuid,
        _filter: AppointmentFilter,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<Appointment>> {
        Ok(Paginated::from_page(Vec::new(), 0, pagination))
    }

    async fn today(&self, _company_id: Uuid) -> AppResult<Vec<Appointment>> {
        Ok(Vec::new())
    }

    async fn agenda(
        &self,
        _professional_id: Uuid,
        _from: Option<NaiveDate>,
        _to: Option<NaiveDate>,
    ) -> AppResult<Vec<Appointment>> {
        Err(unused())
    }

    async fn details(&self, _id: Uuid) -> AppResult<AppointmentDetails> {
        Err(unused())
    }
}

/// Simulated gateways without storage
struct FakePayments;

#[async_trait]
impl PaymentService for FakePayments {
    async fn create_payment(&self, _input: CreatePayment) -> AppResult<Payment> {
        Err(AppError::NotFound("Appointment"))
    }

    async fn get_payment(&self, _id: Uuid) -> AppResult<Payment> {
        Err(AppError::NotFound("Payment"))
    }

    async fn check_status(&self, _id: Uuid) -> AppResult<Payment> {
        Err(AppError::NotFound("Payment"))
    }

    async fn handle_webhook(&self, gateway: String, _payload: PaymentWebhook) -> AppResult<Payment> {
        let _gateway: Gateway = gateway.parse()?;
        Err(AppError::NotFound("Payment"))
    }

    fn gateways(&self) -> Vec<GatewayInfo> {
        Gateway::ALL.iter().map(Gateway::info).collect()
    }

    fn quote(&self, request: FeeRequest) -> FeeQuote {
        request.gateway.quote(request.amount_cents)
    }

    async fn list_company_payments(
        &self,
        _company_id: Uuid,
        _filter: PaymentFilter,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<PaymentSummary>> {
        Ok(Paginated::from_page(Vec::new(), 0, pagination))
    }
}

/// Records the analytics period each call asked for
#[derive(Default)]
struct FakeAnalytics {
    periods: Mutex<Vec<Period>>,
}

#[async_trait]
impl AnalyticsService for FakeAnalytics {
    async fn dashboard(&self, _company_id: Uuid, _period: Period) -> AppResult<Dashboard> {
        Err(unused())
    }

    async fn appointments_by_period(&self, _company_id: Uuid, period: Period) -> AppResult<Vec<PeriodBucket>> {
        self.periods.lock().unwrap().push(period);
        Ok(vec![PeriodBucket {
            period: "2024-03-04".to_string(),
            appointments: 3,
            revenue_cents: 15000,
        }])
    }

    async fn popular_services(&self, _company_id: Uuid, _limit: usize) -> AppResult<Vec<ServicePopularity>> {
        Err(unused())
    }

    async fn professional_performance(&self, _company_id: Uuid) -> AppResult<Vec<ProfessionalPerformance>> {
        Err(unused())
    }

    async fn peak_hours(&self, _company_id: Uuid) -> AppResult<Vec<PeakHour>> {
        Err(unused())
    }

    async fn status_distribution(&self, _company_id: Uuid, period: Period) -> AppResult<BTreeMap<String, u64>> {
        self.periods.lock().unwrap().push(period);
        Ok(BTreeMap::from([("completed".to_string(), 2), ("cancelled".to_string(), 1)]))
    }

    async fn frequent_clients(&self, _company_id: Uuid, _limit: usize) -> AppResult<Vec<FrequentClient>> {
        Err(unused())
    }

    async fn report(&self, _company_id: Uuid, _period: Period) -> AppResult<AnalyticsReport> {
        Err(unused())
    }
}

/// Services these tests never reach
struct Unwired;

fn unused() -> AppError {
    AppError::internal("not wired in this test")
}

#[async_trait]
impl ClientService for Unwired {
    async fn list_clients(
        &self,
        _company_id: Uuid,
        _search: Option<String>,
        _pagination: PaginationParams,
    ) -> AppResult<Paginated<Client>> {
        Err(unused())
    }

    async fn create_client(&self, _company_id: Uuid, _input: CreateClient) -> AppResult<Client> {
        Err(unused())
    }

    async fn get_client(&self, _id: Uuid) -> AppResult<Client> {
        Err(unused())
    }

    async fn update_client(&self, _id: Uuid, _input: UpdateClient) -> AppResult<Client> {
        Err(unused())
    }

    async fn delete_client(&self, _id: Uuid) -> AppResult<()> {
        Err(unused())
    }

    async fn client_history(&self, _id: Uuid) -> AppResult<ClientHistory> {
        Err(unused())
    }

    async fn search_clients(&self, _company_id: Uuid, _term: String) -> AppResult<Vec<Client>> {
        Err(unused())
    }

    async fn get_preferences(&self, _id: Uuid) -> AppResult<NotificationPreferences> {
        Err(unused())
    }

    async fn update_preferences(
        &self,
        _id: Uuid,
        _preferences: NotificationPreferences,
    ) -> AppResult<NotificationPreferences> {
        Err(unused())
    }
}

#[async_trait]
impl ProfessionalService for Unwired {
    async fn list_professionals(&self, _company_id: Uuid) -> AppResult<Vec<Professional>> {
        Err(unused())
    }

    async fn create_professional(&self, _company_id: Uuid, _input: CreateProfessional) -> AppResult<Professional> {
        Err(unused())
    }

    async fn get_professional(&self, _id: Uuid) -> AppResult<Professional> {
        Err(unused())
    }

    async fn update_professional(&self, _id: Uuid, _input: UpdateProfessional) -> AppResult<Professional> {
        Err(unused())
    }

    async fn delete_professional(&self, _id: Uuid) -> AppResult<()> {
        Err(unused())
    }
}

#[async_trait]
impl CatalogService for Unwired {
    async fn list_services(&self, _company_id: Uuid) -> AppResult<Vec<Service>> {
        Err(unused())
    }

    async fn create_service(&self, _company_id: Uuid, _input: CreateService) -> AppResult<Service> {
        Err(unused())
    }

    async fn get_service(&self, _id: Uuid) -> AppResult<Service> {
        Err(unused())
    }

    async fn update_service(&self, _id: Uuid, _input: UpdateService) -> AppResult<Service> {
        Err(unused())
    }

    async fn delete_service(&self, _id: Uuid) -> AppResult<()> {
        Err(unused())
    }

    async fn categories(&self, _company_id: Uuid) -> AppResult<Vec<String>> {
        Err(unused())
    }

    async fn assigned_professionals(&self, _service_id: Uuid) -> AppResult<Vec<AssignedProfessional>> {
        Err(unused())
    }

    async fn assign_professional(
        &self,
        _service_id: Uuid,
        _professional_id: Uuid,
        _input: AssignProfessional,
    ) -> AppResult<ServiceAssignment> {
        Err(unused())
    }

    async fn unassign_professional(&self, _service_id: Uuid, _professional_id: Uuid) -> AppResult<()> {
        Err(unused())
    }
}

#[async_trait]
impl NotificationService for Unwired {
    async fn send_confirmation(&self, _appointment_id: Uuid) -> AppResult<NotificationBatch> {
        Err(unused())
    }

    async fn send_reminder(&self, _appointment_id: Uuid, _hours_before: i64) -> AppResult<NotificationBatch> {
        Err(unused())
    }

    async fn notify_appointment(&self, _appointment_id: Uuid, _kind: NotificationKind) -> AppResult<NotificationBatch> {
        Err(unused())
    }

    async fn notify_payment(&self, _payment: Payment) -> AppResult<NotificationBatch> {
        Err(unused())
    }

    async fn send_email(&self, _request: EmailRequest) -> AppResult<Notification> {
        Err(unused())
    }

    async fn send_whatsapp(&self, _request: WhatsAppRequest) -> AppResult<Notification> {
        Err(unused())
    }

    async fn schedule_reminder(&self, _request: ScheduleReminder) -> AppResult<ScheduledReminders> {
        Err(unused())
    }

    async fn schedule_auto_reminders(&self, _request: AutoReminders) -> AppResult<ScheduledReminders> {
        Err(unused())
    }

    async fn send_test(&self, _request: TestNotification) -> AppResult<Notification> {
        Err(unused())
    }

    async fn appointment_log(&self, _appointment_id: Uuid) -> AppResult<Vec<Notification>> {
        Err(unused())
    }

    async fn dispatch_due(&self) -> AppResult<DispatchReport> {
        Err(unused())
    }
}

struct FakeContainer {
    companies: Arc<FakeCompanies>,
    scheduler: Arc<FakeScheduler>,
    analytics: Arc<FakeAnalytics>,
    unwired: Arc<Unwired>,
}

impl ServiceContainer for FakeContainer {
    fn companies(&self) -> Arc<dyn CompanyService> {
        self.companies.clone()
    }

    fn clients(&self) -> Arc<dyn ClientService> {
        self.unwired.clone()
    }

    fn professionals(&self) -> Arc<dyn ProfessionalService> {
        self.unwired.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.unwired.clone()
    }

    fn appointments(&self) -> Arc<dyn AppointmentService> {
        self.scheduler.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        Arc::new(FakePayments)
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.unwired.clone()
    }

    fn analytics(&self) -> Arc<dyn AnalyticsService> {
        self.analytics.clone()
    }
}

struct UpProbe;

#[async_trait]
impl HealthProbe for UpProbe {
    async fn database(&self) -> AppResult<()> {
        Ok(())
    }

    async fn redis(&self) -> Option<AppResult<()>> {
        None
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn busy_from() -> DateTime<Utc> {
    "2024-03-04T14:00:00Z".parse().unwrap()
}

struct TestApp {
    router: Router,
    analytics: Arc<FakeAnalytics>,
}

fn test_app() -> TestApp {
    let terms = BookingTerms {
        duration_minutes: 45,
        price_cents: 5000,
    };
    let analytics = Arc::new(FakeAnalytics::default());
    let container = FakeContainer {
        companies: Arc::new(FakeCompanies::default()),
        scheduler: Arc::new(FakeScheduler {
            busy: TimeRange::starting_at(busy_from(), 45).unwrap(),
            terms,
        }),
        analytics: analytics.clone(),
        unwired: Arc::new(Unwired),
    };

    let state = AppState::new(Arc::new(container), None, Arc::new(UpProbe));
    TestApp {
        router: create_router(state),
        analytics,
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn booking_body(starts_at: &str) -> Value {
    json!({
        "client_id": Uuid::new_v4(),
        "professional_id": Uuid::new_v4(),
        "service_id": Uuid::new_v4(),
        "starts_at": starts_at,
    })
}

// =============================================================================
// Infrastructure endpoints
// =============================================================================

#[tokio::test]
async fn test_health_reports_redis_disabled() {
    let app = test_app();

    let response = send(&app.router, Method::GET, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["services"]["database"]["status"], "healthy");
    assert_eq!(body["services"]["redis"]["status"], "disabled");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app();
    let response = send(&app.router, Method::GET, "/nowhere", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Companies
// =============================================================================

#[tokio::test]
async fn test_company_create_get_and_delete() {
    let app = test_app();

    let response = send(
        &app.router,
        Method::POST,
        "/companies",
        Some(json!({ "name": "Studio Bella", "email": "contact@studiobella.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["primary_color"], "#007BFF");
    assert_eq!(created["working_days"], "1111100");
    assert!(created.get("whatsapp_token").is_none());
    let id = created["id"].as_str().unwrap().to_string();

    let response = send(&app.router, Method::GET, &format!("/companies/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["name"], "Studio Bella");

    let response = send(&app.router, Method::DELETE, &format!("/companies/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["message"].is_string());

    let response = send(&app.router, Method::GET, &format!("/companies/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_company_duplicate_email_conflicts() {
    let app = test_app();
    let body = json!({ "name": "Studio Bella", "email": "contact@studiobella.com" });

    let first = send(&app.router, Method::POST, "/companies", Some(body.clone())).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = send(&app.router, Method::POST, "/companies", Some(body)).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_company_validation_errors() {
    let app = test_app();

    let response = send(
        &app.router,
        Method::POST,
        "/companies",
        Some(json!({ "name": "Studio", "email": "not-an-email", "primary_color": "blue" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/companies")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Appointments
// =============================================================================

#[tokio::test]
async fn test_booking_free_slot_is_created() {
    let app = test_app();
    let company_id = Uuid::new_v4();

    let response = send(
        &app.router,
        Method::POST,
        &format!("/companies/{company_id}/appointments"),
        Some(booking_body("2024-03-04T14:45:00Z")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["status"], "scheduled");
    assert_eq!(body["total_cents"], 5000);
    assert_eq!(body["ends_at"], "2024-03-04T15:30:00Z");
}

#[tokio::test]
async fn test_booking_overlap_is_409() {
    let app = test_app();
    let company_id = Uuid::new_v4();

    let response = send(
        &app.router,
        Method::POST,
        &format!("/companies/{company_id}/appointments"),
        Some(booking_body("2024-03-04T14:30:00Z")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "SLOT_UNAVAILABLE");
}

#[tokio::test]
async fn test_cancel_without_body_reaches_service() {
    let app = test_app();

    let response = send(
        &app.router,
        Method::POST,
        &format!("/appointments/{}/cancel", Uuid::new_v4()),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_appointment_list_uses_larger_default_page() {
    let app = test_app();

    let response = send(
        &app.router,
        Method::GET,
        &format!("/companies/{}/appointments?status=confirmed", Uuid::new_v4()),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["meta"]["per_page"], 50);
    assert_eq!(body["data"], json!([]));
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn test_gateways_and_fees() {
    let app = test_app();

    let response = send(&app.router, Method::GET, "/payments/gateways", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let gateways = json_body(response).await;
    assert_eq!(gateways.as_array().unwrap().len(), 3);
    assert_eq!(gateways[0]["id"], "pix");

    let response = send(
        &app.router,
        Method::POST,
        "/payments/fees",
        Some(json!({ "amount_cents": 10000, "gateway": "pagseguro" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let quote = json_body(response).await;
    assert_eq!(quote["fee_cents"], 399);
    assert_eq!(quote["net_cents"], 9601);
}

#[tokio::test]
async fn test_webhook_for_unknown_gateway_is_400() {
    let app = test_app();

    let response = send(
        &app.router,
        Method::POST,
        "/payments/webhook/paypal",
        Some(json!({ "payment_id": "abc" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Analytics
// =============================================================================

#[tokio::test]
async fn test_analytics_period_falls_back_to_thirty_days() {
    let app = test_app();
    let company_id = Uuid::new_v4();

    let response = send(
        &app.router,
        Method::GET,
        &format!("/companies/{company_id}/analytics/appointments?period=7d"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await[0]["appointments"], 3);

    let response = send(
        &app.router,
        Method::GET,
        &format!("/companies/{company_id}/analytics/status?period=bogus"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["completed"], 2);

    let periods = app.analytics.periods.lock().unwrap().clone();
    assert_eq!(periods, vec![Period::Week, Period::Month]);
}
