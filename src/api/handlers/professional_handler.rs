//! Professional handlers, including availability and agenda lookups.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    Appointment, AvailableSlots, CreateProfessional, Professional, UpdateProfessional,
};
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// Available slots query
#[derive(Debug, Deserialize, IntoParams)]
pub struct SlotsQuery {
    /// Day to inspect (`YYYY-MM-DD`)
    #[param(value_type = String, example = "2024-03-04")]
    pub date: NaiveDate,
    /// Use this service's duration instead of the 60-minute default
    pub service_id: Option<Uuid>,
}

/// Agenda date range; defaults to the next seven days
#[derive(Debug, Deserialize, IntoParams)]
pub struct AgendaQuery {
    #[param(value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub to: Option<NaiveDate>,
}

/// Create professional routes
pub fn professional_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/:id/professionals",
            get(list_professionals).post(create_professional),
        )
        .route(
            "/professionals/:id",
            get(get_professional)
                .put(update_professional)
                .delete(delete_professional),
        )
        .route("/professionals/:id/agenda", get(agenda))
        .route("/professionals/:id/available-slots", get(available_slots))
}

/// Active professionals of a company
#[utoipa::path(
    get,
    path = "/companies/{id}/professionals",
    tag = "Professionals",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Professionals", body = Vec<Professional>)
    )
)]
pub async fn list_professionals(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<Professional>>> {
    let professionals = state
        .services
        .professionals()
        .list_professionals(company_id)
        .await?;
    Ok(Json(professionals))
}

#[utoipa::path(
    post,
    path = "/companies/{id}/professionals",
    tag = "Professionals",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = CreateProfessional,
    responses(
        (status = 201, description = "Professional created", body = Professional),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn create_professional(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateProfessional>,
) -> AppResult<(StatusCode, Json<Professional>)> {
    let professional = state
        .services
        .professionals()
        .create_professional(company_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(professional)))
}

#[utoipa::path(
    get,
    path = "/professionals/{id}",
    tag = "Professionals",
    params(("id" = Uuid, Path, description = "Professional ID")),
    responses(
        (status = 200, description = "Professional", body = Professional),
        (status = 404, description = "Professional not found")
    )
)]
pub async fn get_professional(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Professional>> {
    let professional = state.services.professionals().get_professional(id).await?;
    Ok(Json(professional))
}

#[utoipa::path(
    put,
    path = "/professionals/{id}",
    tag = "Professionals",
    params(("id" = Uuid, Path, description = "Professional ID")),
    request_body = UpdateProfessional,
    responses(
        (status = 200, description = "Professional updated", body = Professional),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Professional not found")
    )
)]
pub async fn update_professional(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProfessional>,
) -> AppResult<Json<Professional>> {
    let professional = state
        .services
        .professionals()
        .update_professional(id, payload)
        .await?;
    Ok(Json(professional))
}

#[utoipa::path(
    delete,
    path = "/professionals/{id}",
    tag = "Professionals",
    params(("id" = Uuid, Path, description = "Professional ID")),
    responses(
        (status = 200, description = "Professional deleted", body = MessageResponse),
        (status = 404, description = "Professional not found"),
        (status = 409, description = "Professional has appointments")
    )
)]
pub async fn delete_professional(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.services.professionals().delete_professional(id).await?;
    Ok(Json(MessageResponse::new("Professional deleted")))
}

/// Blocking appointments of a professional in a date range
#[utoipa::path(
    get,
    path = "/professionals/{id}/agenda",
    tag = "Professionals",
    params(("id" = Uuid, Path, description = "Professional ID"), AgendaQuery),
    responses(
        (status = 200, description = "Agenda", body = Vec<Appointment>),
        (status = 404, description = "Professional not found")
    )
)]
pub async fn agenda(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AgendaQuery>,
) -> AppResult<Json<Vec<Appointment>>> {
    let appointments = state
        .services
        .appointments()
        .agenda(id, query.from, query.to)
        .await?;
    Ok(Json(appointments))
}

/// Free start times on a given day
#[utoipa::path(
    get,
    path = "/professionals/{id}/available-slots",
    tag = "Professionals",
    params(("id" = Uuid, Path, description = "Professional ID"), SlotsQuery),
    responses(
        (status = 200, description = "Available slots", body = AvailableSlots),
        (status = 400, description = "Missing or malformed date"),
        (status = 404, description = "Professional not found")
    )
)]
pub async fn available_slots(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> AppResult<Json<AvailableSlots>> {
    let slots = state
        .services
        .appointments()
        .available_slots(id, query.date, query.service_id)
        .await?;
    Ok(Json(slots))
}
