//! Payment handlers. Gateways are simulated; nothing leaves the process.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::domain::payment::{CreatePayment, FeeQuote, FeeRequest, GatewayInfo, PaymentWebhook};
use crate::domain::{Gateway, Payment, PaymentFilter, PaymentStatus, PaymentSummary};
use crate::errors::AppResult;
use crate::types::{Paginated, PaginatedPayments, PaginationParams};

/// Company payment listing filters
#[derive(Debug, Deserialize, IntoParams)]
pub struct PaymentListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    #[param(value_type = Option<String>, example = "paid")]
    pub status: Option<PaymentStatus>,
    #[param(value_type = Option<String>, example = "pix")]
    pub gateway: Option<Gateway>,
}

/// Create payment routes
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/gateways", get(gateways))
        .route("/payments/fees", post(calculate_fees))
        .route("/payments/webhook/:gateway", post(webhook))
        .route("/payments/:id", get(get_payment))
        .route("/payments/:id/status", get(check_status))
        .route("/companies/:id/payments", get(list_company_payments))
}

/// Open a checkout for an appointment
#[utoipa::path(
    post,
    path = "/payments",
    tag = "Payments",
    request_body = CreatePayment,
    responses(
        (status = 201, description = "Checkout created", body = Payment),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn create_payment(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePayment>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let payment = state.services.payments().create_payment(payload).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    get,
    path = "/payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment", body = Payment),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Payment>> {
    let payment = state.services.payments().get_payment(id).await?;
    Ok(Json(payment))
}

/// Re-check the status with the gateway
#[utoipa::path(
    get,
    path = "/payments/{id}/status",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Current payment", body = Payment),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn check_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Payment>> {
    let payment = state.services.payments().check_status(id).await?;
    Ok(Json(payment))
}

/// Gateway status notification
#[utoipa::path(
    post,
    path = "/payments/webhook/{gateway}",
    tag = "Payments",
    params(("gateway" = String, Path, description = "pix, pagseguro or mercadopago")),
    request_body = PaymentWebhook,
    responses(
        (status = 200, description = "Payment updated", body = Payment),
        (status = 400, description = "Unknown gateway"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn webhook(
    State(state): State<AppState>,
    Path(gateway): Path<String>,
    ValidatedJson(payload): ValidatedJson<PaymentWebhook>,
) -> AppResult<Json<Payment>> {
    let payment = state
        .services
        .payments()
        .handle_webhook(gateway, payload)
        .await?;
    Ok(Json(payment))
}

#[utoipa::path(
    get,
    path = "/payments/gateways",
    tag = "Payments",
    responses(
        (status = 200, description = "Supported gateways", body = Vec<GatewayInfo>)
    )
)]
pub async fn gateways(State(state): State<AppState>) -> Json<Vec<GatewayInfo>> {
    Json(state.services.payments().gateways())
}

/// Fee breakdown for an amount on a gateway
#[utoipa::path(
    post,
    path = "/payments/fees",
    tag = "Payments",
    request_body = FeeRequest,
    responses(
        (status = 200, description = "Fee quote", body = FeeQuote),
        (status = 400, description = "Validation error")
    )
)]
pub async fn calculate_fees(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<FeeRequest>,
) -> Json<FeeQuote> {
    Json(state.services.payments().quote(payload))
}

#[utoipa::path(
    get,
    path = "/companies/{id}/payments",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Company ID"), PaymentListQuery),
    responses(
        (status = 200, description = "Payments page, newest first", body = PaginatedPayments)
    )
)]
pub async fn list_company_payments(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<PaymentListQuery>,
) -> AppResult<Json<Paginated<PaymentSummary>>> {
    let pagination = PaginationParams::with_defaults(query.page, query.per_page, DEFAULT_PAGE_SIZE);
    let filter = PaymentFilter {
        status: query.status,
        gateway: query.gateway,
    };
    let page = state
        .services
        .payments()
        .list_company_payments(company_id, filter, pagination)
        .await?;
    Ok(Json(page))
}
