//! Company handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Company, CompanySettings, CreateCompany, UpdateCompany};
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// Create company routes
pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/:id",
            get(get_company).put(update_company).delete(delete_company),
        )
        .route("/companies/:id/settings", get(company_settings))
}

/// List all companies
#[utoipa::path(
    get,
    path = "/companies",
    tag = "Companies",
    responses(
        (status = 200, description = "All companies", body = Vec<Company>)
    )
)]
pub async fn list_companies(State(state): State<AppState>) -> AppResult<Json<Vec<Company>>> {
    let companies = state.services.companies().list_companies().await?;
    Ok(Json(companies))
}

/// Register a company
#[utoipa::path(
    post,
    path = "/companies",
    tag = "Companies",
    request_body = CreateCompany,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_company(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCompany>,
) -> AppResult<(StatusCode, Json<Company>)> {
    let company = state.services.companies().create_company(payload).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// Get a company by ID
#[utoipa::path(
    get,
    path = "/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company", body = Company),
        (status = 404, description = "Company not found")
    )
)]
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Company>> {
    let company = state.services.companies().get_company(id).await?;
    Ok(Json(company))
}

/// Partially update a company
#[utoipa::path(
    put,
    path = "/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = UpdateCompany,
    responses(
        (status = 200, description = "Company updated", body = Company),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Company not found"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCompany>,
) -> AppResult<Json<Company>> {
    let company = state.services.companies().update_company(id, payload).await?;
    Ok(Json(company))
}

/// Delete a company and everything it owns
#[utoipa::path(
    delete,
    path = "/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deleted", body = MessageResponse),
        (status = 404, description = "Company not found")
    )
)]
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.services.companies().delete_company(id).await?;
    Ok(Json(MessageResponse::new("Company deleted")))
}

/// Style, operation and notification settings of a company
#[utoipa::path(
    get,
    path = "/companies/{id}/settings",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company settings", body = CompanySettings),
        (status = 404, description = "Company not found")
    )
)]
pub async fn company_settings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CompanySettings>> {
    let settings = state.services.companies().company_settings(id).await?;
    Ok(Json(settings))
}
