//! Client service - Client records, history and notification preferences.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::QUICK_SEARCH_LIMIT;
use crate::domain::{
    AppointmentOwner, Client, ClientHistory, CreateClient, NotificationPreferences, UpdateClient,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Client service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ClientService: Send + Sync {
    /// Page through a company's clients, optionally filtered by name, phone or email
    async fn list_clients(
        &self,
        company_id: Uuid,
        search: Option<String>,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<Client>>;

    /// Phone numbers are unique within a company
    async fn create_client(&self, company_id: Uuid, input: CreateClient) -> AppResult<Client>;

    async fn get_client(&self, id: Uuid) -> AppResult<Client>;

    async fn update_client(&self, id: Uuid, input: UpdateClient) -> AppResult<Client>;

    /// Rejected while the client still has appointments
    async fn delete_client(&self, id: Uuid) -> AppResult<()>;

    async fn client_history(&self, id: Uuid) -> AppResult<ClientHistory>;

    /// Name or phone lookup for booking forms
    async fn search_clients(&self, company_id: Uuid, term: String) -> AppResult<Vec<Client>>;

    async fn get_preferences(&self, id: Uuid) -> AppResult<NotificationPreferences>;

    async fn update_preferences(
        &self,
        id: Uuid,
        preferences: NotificationPreferences,
    ) -> AppResult<NotificationPreferences>;
}

/// Concrete implementation of ClientService using Unit of Work.
pub struct ClientManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ClientManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_phone_free(&self, company_id: Uuid, phone: &str, current: Option<Uuid>) -> AppResult<()> {
        if let Some(existing) = self.uow.clients().find_by_phone(company_id, phone.trim()).await? {
            if Some(existing.id) != current {
                return Err(AppError::conflict("A client with this phone already exists"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> ClientService for ClientManager<U> {
    async fn list_clients(
        &self,
        company_id: Uuid,
        search: Option<String>,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<Client>> {
        let search = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let (clients, total) = self.uow.clients().list(company_id, search, pagination).await?;
        Ok(Paginated::from_page(clients, total, pagination))
    }

    async fn create_client(&self, company_id: Uuid, input: CreateClient) -> AppResult<Client> {
        self.uow
            .companies()
            .find_by_id(company_id)
            .await?
            .ok_or_not_found("Company")?;

        self.ensure_phone_free(company_id, &input.phone, None).await?;

        let client = self
            .uow
            .clients()
            .create(Client::create(company_id, input, Utc::now()))
            .await?;

        tracing::info!(client_id = %client.id, %company_id, "Client created");
        Ok(client)
    }

    async fn get_client(&self, id: Uuid) -> AppResult<Client> {
        self.uow.clients().find_by_id(id).await?.ok_or_not_found("Client")
    }

    async fn update_client(&self, id: Uuid, input: UpdateClient) -> AppResult<Client> {
        let mut client = self.get_client(id).await?;

        if let Some(phone) = input.phone.as_deref() {
            self.ensure_phone_free(client.company_id, phone, Some(id)).await?;
        }

        client.apply(input, Utc::now());
        self.uow.clients().update(client).await
    }

    async fn delete_client(&self, id: Uuid) -> AppResult<()> {
        if self
            .uow
            .appointments()
            .exists_for(AppointmentOwner::Client(id))
            .await?
        {
            return Err(AppError::conflict("Client has appointments and cannot be deleted"));
        }

        if !self.uow.clients().delete(id).await? {
            return Err(AppError::NotFound("Client"));
        }
        Ok(())
    }

    async fn client_history(&self, id: Uuid) -> AppResult<ClientHistory> {
        let client = self.get_client(id).await?;
        let appointments = self.uow.appointments().list_for_client(id).await?;
        Ok(ClientHistory { client, appointments })
    }

    async fn search_clients(&self, company_id: Uuid, term: String) -> AppResult<Vec<Client>> {
        let term = term.trim().to_string();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.uow.clients().search(company_id, term, QUICK_SEARCH_LIMIT).await
    }

    async fn get_preferences(&self, id: Uuid) -> AppResult<NotificationPreferences> {
        Ok(self.get_client(id).await?.notification_preferences)
    }

    async fn update_preferences(
        &self,
        id: Uuid,
        preferences: NotificationPreferences,
    ) -> AppResult<NotificationPreferences> {
        let mut client = self.get_client(id).await?;
        client.notification_preferences = preferences;
        client.updated_at = Utc::now();

        let client = self.uow.clients().update(client).await?;
        Ok(client.notification_preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{sample_client, sample_company, Mocks};

    fn new_client(phone: &str) -> CreateClient {
        serde_json::from_value(serde_json::json!({ "name": "Maria Silva", "phone": phone })).unwrap()
    }

    #[tokio::test]
    async fn test_create_client_requires_company() {
        let mut mocks = Mocks::default();
        mocks.companies.expect_find_by_id().returning(|_| Ok(None));

        let manager = ClientManager::new(mocks.into_uow());
        let result = manager.create_client(Uuid::new_v4(), new_client("11988887777")).await;

        assert!(matches!(result, Err(AppError::NotFound("Company"))));
    }

    #[tokio::test]
    async fn test_create_client_rejects_duplicate_phone() {
        let company = sample_company();
        let company_id = company.id;

        let mut mocks = Mocks::default();
        mocks
            .companies
            .expect_find_by_id()
            .returning(move |_| Ok(Some(company.clone())));
        mocks
            .clients
            .expect_find_by_phone()
            .returning(move |_, _| Ok(Some(sample_client(company_id))));
        mocks.clients.expect_create().never();

        let manager = ClientManager::new(mocks.into_uow());
        let result = manager.create_client(company_id, new_client("11988887777")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_client_with_appointments_conflicts() {
        let mut mocks = Mocks::default();
        mocks.appointments.expect_exists_for().returning(|_| Ok(true));
        mocks.clients.expect_delete().never();

        let manager = ClientManager::new(mocks.into_uow());
        let result = manager.delete_client(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_blank_search_skips_repository() {
        let mut mocks = Mocks::default();
        mocks.clients.expect_search().never();

        let manager = ClientManager::new(mocks.into_uow());
        let found = manager.search_clients(Uuid::new_v4(), "   ".to_string()).await.unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_search_is_capped() {
        let mut mocks = Mocks::default();
        mocks
            .clients
            .expect_search()
            .withf(|_, term, limit| term == "mar" && *limit == QUICK_SEARCH_LIMIT)
            .returning(|_, _, _| Ok(vec![]));

        let manager = ClientManager::new(mocks.into_uow());
        manager.search_clients(Uuid::new_v4(), " mar ".to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_preferences_persists() {
        let client = sample_client(Uuid::new_v4());
        let id = client.id;

        let mut mocks = Mocks::default();
        mocks
            .clients
            .expect_find_by_id()
            .returning(move |_| Ok(Some(client.clone())));
        mocks.clients.expect_update().returning(|c| Ok(c));

        let manager = ClientManager::new(mocks.into_uow());
        let prefs = NotificationPreferences {
            whatsapp_enabled: false,
            reminder_hours: vec![48],
            ..Default::default()
        };
        let saved = manager.update_preferences(id, prefs.clone()).await.unwrap();

        assert_eq!(saved, prefs);
    }
}
