//! Client handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::domain::{Client, ClientHistory, CreateClient, NotificationPreferences, UpdateClient};
use crate::errors::AppResult;
use crate::types::{MessageResponse, Paginated, PaginatedClients, PaginationParams};

/// Client listing query
#[derive(Debug, Deserialize, IntoParams)]
pub struct ClientListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Matches name, phone or email
    pub q: Option<String>,
}

/// Quick search query
#[derive(Debug, Deserialize, IntoParams)]
pub struct ClientSearchQuery {
    #[serde(default)]
    pub term: String,
}

/// Create client routes
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/:id/clients",
            get(list_clients).post(create_client),
        )
        .route("/companies/:id/clients/search", get(search_clients))
        .route(
            "/clients/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
        .route("/clients/:id/history", get(client_history))
        .route(
            "/clients/:id/preferences",
            get(get_preferences).put(update_preferences),
        )
}

/// Page through a company's clients
#[utoipa::path(
    get,
    path = "/companies/{id}/clients",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Company ID"), ClientListQuery),
    responses(
        (status = 200, description = "Clients page", body = PaginatedClients)
    )
)]
pub async fn list_clients(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<ClientListQuery>,
) -> AppResult<Json<Paginated<Client>>> {
    let pagination = PaginationParams::with_defaults(query.page, query.per_page, DEFAULT_PAGE_SIZE);
    let page = state
        .services
        .clients()
        .list_clients(company_id, query.q, pagination)
        .await?;
    Ok(Json(page))
}

/// Register a client
#[utoipa::path(
    post,
    path = "/companies/{id}/clients",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = CreateClient,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Company not found"),
        (status = 409, description = "Phone already registered")
    )
)]
pub async fn create_client(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateClient>,
) -> AppResult<(StatusCode, Json<Client>)> {
    let client = state
        .services
        .clients()
        .create_client(company_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// Quick name or phone lookup
#[utoipa::path(
    get,
    path = "/companies/{id}/clients/search",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Company ID"), ClientSearchQuery),
    responses(
        (status = 200, description = "Up to ten matches", body = Vec<Client>)
    )
)]
pub async fn search_clients(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<ClientSearchQuery>,
) -> AppResult<Json<Vec<Client>>> {
    let clients = state
        .services
        .clients()
        .search_clients(company_id, query.term)
        .await?;
    Ok(Json(clients))
}

#[utoipa::path(
    get,
    path = "/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client", body = Client),
        (status = 404, description = "Client not found")
    )
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Client>> {
    let client = state.services.clients().get_client(id).await?;
    Ok(Json(client))
}

#[utoipa::path(
    put,
    path = "/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client ID")),
    request_body = UpdateClient,
    responses(
        (status = 200, description = "Client updated", body = Client),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Phone already registered")
    )
)]
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateClient>,
) -> AppResult<Json<Client>> {
    let client = state.services.clients().update_client(id, payload).await?;
    Ok(Json(client))
}

#[utoipa::path(
    delete,
    path = "/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client deleted", body = MessageResponse),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Client has appointments")
    )
)]
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.services.clients().delete_client(id).await?;
    Ok(Json(MessageResponse::new("Client deleted")))
}

/// The client with every appointment, newest first
#[utoipa::path(
    get,
    path = "/clients/{id}/history",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client history", body = ClientHistory),
        (status = 404, description = "Client not found")
    )
)]
pub async fn client_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ClientHistory>> {
    let history = state.services.clients().client_history(id).await?;
    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/clients/{id}/preferences",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Notification preferences", body = NotificationPreferences),
        (status = 404, description = "Client not found")
    )
)]
pub async fn get_preferences(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<NotificationPreferences>> {
    let preferences = state.services.clients().get_preferences(id).await?;
    Ok(Json(preferences))
}

#[utoipa::path(
    put,
    path = "/clients/{id}/preferences",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client ID")),
    request_body = NotificationPreferences,
    responses(
        (status = 200, description = "Preferences saved", body = NotificationPreferences),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Client not found")
    )
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<NotificationPreferences>,
) -> AppResult<Json<NotificationPreferences>> {
    let preferences = state
        .services
        .clients()
        .update_preferences(id, payload)
        .await?;
    Ok(Json(preferences))
}
