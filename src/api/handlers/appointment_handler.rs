//! Appointment handlers: booking, lifecycle changes and listings.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{validation_error, ValidatedJson};
use crate::api::AppState;
use crate::config::DEFAULT_APPOINTMENT_PAGE_SIZE;
use crate::domain::{
    Appointment, AppointmentDetails, AppointmentFilter, AppointmentStatus, CancelAppointment,
    CreateAppointment, RescheduleAppointment, UpdateAppointment,
};
use crate::errors::AppResult;
use crate::types::{Paginated, PaginatedAppointments, PaginationParams};

/// Appointment listing filters
#[derive(Debug, Deserialize, IntoParams)]
pub struct AppointmentListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Inclusive start date
    #[param(value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    /// Inclusive end date
    #[param(value_type = Option<String>)]
    pub to: Option<NaiveDate>,
    pub professional_id: Option<Uuid>,
    #[param(value_type = Option<String>, example = "confirmed")]
    pub status: Option<AppointmentStatus>,
}

impl AppointmentListQuery {
    fn split(self) -> (AppointmentFilter, PaginationParams) {
        let pagination =
            PaginationParams::with_defaults(self.page, self.per_page, DEFAULT_APPOINTMENT_PAGE_SIZE);
        let filter = AppointmentFilter {
            from: self.from,
            to: self.to,
            professional_id: self.professional_id,
            status: self.status,
        };
        (filter, pagination)
    }
}

/// Create appointment routes
pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/:id/appointments",
            get(list_appointments).post(book_appointment),
        )
        .route("/companies/:id/agenda/today", get(today))
        .route(
            "/appointments/:id",
            get(get_appointment).put(update_appointment),
        )
        .route("/appointments/:id/reschedule", post(reschedule_appointment))
        .route("/appointments/:id/cancel", post(cancel_appointment))
}

#[utoipa::path(
    get,
    path = "/companies/{id}/appointments",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "Company ID"), AppointmentListQuery),
    responses(
        (status = 200, description = "Appointments page, newest first", body = PaginatedAppointments)
    )
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<AppointmentListQuery>,
) -> AppResult<Json<Paginated<Appointment>>> {
    let (filter, pagination) = query.split();
    let page = state
        .services
        .appointments()
        .list(company_id, filter, pagination)
        .await?;
    Ok(Json(page))
}

/// Book a slot
#[utoipa::path(
    post,
    path = "/companies/{id}/appointments",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = CreateAppointment,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Validation error or inactive professional/service"),
        (status = 404, description = "Client, professional or service not found"),
        (status = 409, description = "Time slot is not available")
    )
)]
pub async fn book_appointment(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateAppointment>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let appointment = state
        .services
        .appointments()
        .book(company_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Appointments starting today (UTC)
#[utoipa::path(
    get,
    path = "/companies/{id}/agenda/today",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Today's appointments", body = Vec<Appointment>)
    )
)]
pub async fn today(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<Appointment>>> {
    let appointments = state.services.appointments().today(company_id).await?;
    Ok(Json(appointments))
}

/// Appointment with its client, professional and service
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment details", body = AppointmentDetails),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AppointmentDetails>> {
    let details = state.services.appointments().details(id).await?;
    Ok(Json(details))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointment,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Time slot is not available")
    )
)]
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAppointment>,
) -> AppResult<Json<Appointment>> {
    let appointment = state.services.appointments().update(id, payload).await?;
    Ok(Json(appointment))
}

/// Move an appointment, keeping its duration
#[utoipa::path(
    post,
    path = "/appointments/{id}/reschedule",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = RescheduleAppointment,
    responses(
        (status = 200, description = "Appointment rescheduled", body = Appointment),
        (status = 400, description = "Appointment is cancelled or completed"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Time slot is not available")
    )
)]
pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RescheduleAppointment>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .services
        .appointments()
        .reschedule(id, payload)
        .await?;
    Ok(Json(appointment))
}

/// Cancel an appointment; the body is optional
#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = CancelAppointment,
    responses(
        (status = 200, description = "Appointment cancelled", body = Appointment),
        (status = 400, description = "Appointment is cancelled or completed"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<CancelAppointment>>,
) -> AppResult<Json<Appointment>> {
    let input = payload.map(|Json(input)| input).unwrap_or_default();
    input.validate().map_err(|e| validation_error(&e))?;

    let appointment = state.services.appointments().cancel(id, input).await?;
    Ok(Json(appointment))
}
