//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    analytics_routes, appointment_routes, client_routes, company_routes, notification_routes,
    payment_routes, professional_routes, service_routes,
};
use super::middleware::rate_limit_middleware;
use super::openapi::ApiDoc;
use super::AppState;
use crate::errors::AppResult;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let business = Router::new()
        .merge(company_routes())
        .merge(client_routes())
        .merge(professional_routes())
        .merge(service_routes())
        .merge(appointment_routes())
        .merge(payment_routes())
        .merge(notification_routes())
        .merge(analytics_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(business)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "Agenda API - scheduling for service businesses. Docs at /swagger-ui"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_check(result: AppResult<()>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn disabled() -> Self {
        Self {
            status: "disabled",
            error: None,
        }
    }

    fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Database and Redis connectivity; 503 when either is down
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, redis) = tokio::join!(state.probe.database(), state.probe.redis());

    let database = ServiceStatus::from_check(database);
    let redis = redis.map_or_else(ServiceStatus::disabled, ServiceStatus::from_check);

    let degraded = database.is_unhealthy() || redis.is_unhealthy();
    if degraded {
        tracing::warn!(
            database = database.status,
            redis = redis.status,
            "Health check degraded"
        );
    }

    let response = HealthResponse {
        status: if degraded { "degraded" } else { "healthy" },
        services: ServiceHealth { database, redis },
    };

    let status_code = if degraded {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::api::state::MockHealthProbe;
    use crate::errors::AppError;
    use crate::services::testing::sample_company;
    use crate::services::{MockCompanyService, MockServiceContainer};

    fn probe(database_up: bool, redis: Option<bool>) -> Arc<MockHealthProbe> {
        let mut probe = MockHealthProbe::new();
        probe.expect_database().returning(move || {
            if database_up {
                Ok(())
            } else {
                Err(AppError::internal("connection refused"))
            }
        });
        probe.expect_redis().returning(move || {
            redis.map(|up| {
                if up {
                    Ok(())
                } else {
                    Err(AppError::Cache("timeout".to_string()))
                }
            })
        });
        Arc::new(probe)
    }

    fn router(services: MockServiceContainer, probe: Arc<MockHealthProbe>) -> Router {
        create_router(AppState::new(Arc::new(services), None, probe))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_root_banner() {
        let app = router(MockServiceContainer::new(), probe(true, None));

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_without_redis_is_healthy() {
        let app = router(MockServiceContainer::new(), probe(true, None));

        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["redis"]["status"], "disabled");
    }

    #[tokio::test]
    async fn test_health_degraded_when_database_down() {
        let app = router(MockServiceContainer::new(), probe(false, Some(true)));

        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["services"]["database"]["status"], "unhealthy");
        assert_eq!(body["services"]["redis"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_company_lookup_goes_through_container() {
        let company = sample_company();
        let id = company.id;

        let mut companies = MockCompanyService::new();
        companies
            .expect_get_company()
            .withf(move |requested| *requested == id)
            .returning(move |_| Ok(company.clone()));
        let companies = Arc::new(companies);

        let mut services = MockServiceContainer::new();
        services
            .expect_companies()
            .returning(move || companies.clone());

        let app = router(services, probe(true, None));
        let response = app.oneshot(get(&format!("/companies/{id}"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], id.to_string());
    }

    #[tokio::test]
    async fn test_not_found_uses_error_envelope() {
        let mut companies = MockCompanyService::new();
        companies
            .expect_get_company()
            .returning(|_| Err(AppError::NotFound("Company")));
        let companies = Arc::new(companies);

        let mut services = MockServiceContainer::new();
        services
            .expect_companies()
            .returning(move || companies.clone());

        let app = router(services, probe(true, None));
        let response = app
            .oneshot(get(&format!("/companies/{}", Uuid::new_v4())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = router(MockServiceContainer::new(), probe(true, None));

        let response = app.oneshot(get("/api-docs/openapi.json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"]["/companies/{id}/appointments"].is_object());
    }
}
