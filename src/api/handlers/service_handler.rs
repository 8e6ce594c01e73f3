//! Service catalog handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    AssignProfessional, AssignedProfessional, CreateService, Service, ServiceAssignment,
    UpdateService,
};
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// Create service catalog routes
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/:id/services",
            get(list_services).post(create_service),
        )
        .route("/companies/:id/services/categories", get(categories))
        .route(
            "/services/:id",
            get(get_service).put(update_service).delete(delete_service),
        )
        .route("/services/:id/professionals", get(assigned_professionals))
        .route(
            "/services/:id/professionals/:professional_id",
            post(assign_professional).delete(unassign_professional),
        )
}

/// Active services of a company
#[utoipa::path(
    get,
    path = "/companies/{id}/services",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Services", body = Vec<Service>)
    )
)]
pub async fn list_services(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<Service>>> {
    let services = state.services.catalog().list_services(company_id).await?;
    Ok(Json(services))
}

#[utoipa::path(
    post,
    path = "/companies/{id}/services",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = CreateService,
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn create_service(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateService>,
) -> AppResult<(StatusCode, Json<Service>)> {
    let service = state
        .services
        .catalog()
        .create_service(company_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// Distinct categories of the company's active services
#[utoipa::path(
    get,
    path = "/companies/{id}/services/categories",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Categories", body = Vec<String>)
    )
)]
pub async fn categories(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<String>>> {
    let categories = state.services.catalog().categories(company_id).await?;
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service", body = Service),
        (status = 404, description = "Service not found")
    )
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Service>> {
    let service = state.services.catalog().get_service(id).await?;
    Ok(Json(service))
}

#[utoipa::path(
    put,
    path = "/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = UpdateService,
    responses(
        (status = 200, description = "Service updated", body = Service),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateService>,
) -> AppResult<Json<Service>> {
    let service = state.services.catalog().update_service(id, payload).await?;
    Ok(Json(service))
}

#[utoipa::path(
    delete,
    path = "/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service deleted", body = MessageResponse),
        (status = 404, description = "Service not found"),
        (status = 409, description = "Service has appointments")
    )
)]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.services.catalog().delete_service(id).await?;
    Ok(Json(MessageResponse::new("Service deleted")))
}

/// Active professionals offering a service, with their overrides
#[utoipa::path(
    get,
    path = "/services/{id}/professionals",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Assigned professionals", body = Vec<AssignedProfessional>),
        (status = 404, description = "Service not found")
    )
)]
pub async fn assigned_professionals(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<AssignedProfessional>>> {
    let assigned = state.services.catalog().assigned_professionals(id).await?;
    Ok(Json(assigned))
}

#[utoipa::path(
    post,
    path = "/services/{id}/professionals/{professional_id}",
    tag = "Services",
    params(
        ("id" = Uuid, Path, description = "Service ID"),
        ("professional_id" = Uuid, Path, description = "Professional ID")
    ),
    request_body = AssignProfessional,
    responses(
        (status = 201, description = "Professional assigned", body = ServiceAssignment),
        (status = 400, description = "Professional belongs to another company"),
        (status = 404, description = "Service or professional not found"),
        (status = 409, description = "Already assigned")
    )
)]
pub async fn assign_professional(
    State(state): State<AppState>,
    Path((service_id, professional_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<AssignProfessional>,
) -> AppResult<(StatusCode, Json<ServiceAssignment>)> {
    let assignment = state
        .services
        .catalog()
        .assign_professional(service_id, professional_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

#[utoipa::path(
    delete,
    path = "/services/{id}/professionals/{professional_id}",
    tag = "Services",
    params(
        ("id" = Uuid, Path, description = "Service ID"),
        ("professional_id" = Uuid, Path, description = "Professional ID")
    ),
    responses(
        (status = 200, description = "Assignment removed", body = MessageResponse),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn unassign_professional(
    State(state): State<AppState>,
    Path((service_id, professional_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .catalog()
        .unassign_professional(service_id, professional_id)
        .await?;
    Ok(Json(MessageResponse::new("Professional unassigned")))
}
