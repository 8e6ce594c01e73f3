//! Analytics handlers.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{DEFAULT_RANKING_LIMIT, MAX_PAGE_SIZE};
use crate::domain::analytics::{
    FrequentClient, PeakHour, PeriodBucket, ProfessionalPerformance, ServicePopularity,
};
use crate::domain::{AnalyticsReport, Dashboard, Period};
use crate::errors::AppResult;

/// Reporting period; unknown values fall back to `30d`
#[derive(Debug, Deserialize, IntoParams)]
pub struct PeriodQuery {
    #[param(example = "30d")]
    pub period: Option<String>,
}

impl PeriodQuery {
    fn period(&self) -> Period {
        Period::parse(self.period.as_deref())
    }
}

/// Ranking size
#[derive(Debug, Deserialize, IntoParams)]
pub struct LimitQuery {
    #[param(example = 10)]
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn limit(&self) -> usize {
        self.limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_RANKING_LIMIT as usize)
            .min(MAX_PAGE_SIZE as usize)
    }
}

/// Create analytics routes
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/companies/:id/analytics/dashboard", get(dashboard))
        .route("/companies/:id/analytics/appointments", get(appointments_by_period))
        .route("/companies/:id/analytics/services", get(popular_services))
        .route("/companies/:id/analytics/professionals", get(professional_performance))
        .route("/companies/:id/analytics/peak-hours", get(peak_hours))
        .route("/companies/:id/analytics/status", get(status_distribution))
        .route("/companies/:id/analytics/frequent-clients", get(frequent_clients))
        .route("/companies/:id/analytics/report", get(report))
}

#[utoipa::path(
    get,
    path = "/companies/{id}/analytics/dashboard",
    tag = "Analytics",
    params(("id" = Uuid, Path, description = "Company ID"), PeriodQuery),
    responses(
        (status = 200, description = "Dashboard metrics", body = Dashboard),
        (status = 404, description = "Company not found")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<Dashboard>> {
    let dashboard = state
        .services
        .analytics()
        .dashboard(company_id, query.period())
        .await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/companies/{id}/analytics/appointments",
    tag = "Analytics",
    params(("id" = Uuid, Path, description = "Company ID"), PeriodQuery),
    responses(
        (status = 200, description = "Billable appointments per bucket", body = Vec<PeriodBucket>),
        (status = 404, description = "Company not found")
    )
)]
pub async fn appointments_by_period(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<Vec<PeriodBucket>>> {
    let buckets = state
        .services
        .analytics()
        .appointments_by_period(company_id, query.period())
        .await?;
    Ok(Json(buckets))
}

#[utoipa::path(
    get,
    path = "/companies/{id}/analytics/services",
    tag = "Analytics",
    params(("id" = Uuid, Path, description = "Company ID"), LimitQuery),
    responses(
        (status = 200, description = "Most booked services", body = Vec<ServicePopularity>),
        (status = 404, description = "Company not found")
    )
)]
pub async fn popular_services(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<ServicePopularity>>> {
    let services = state
        .services
        .analytics()
        .popular_services(company_id, query.limit())
        .await?;
    Ok(Json(services))
}

#[utoipa::path(
    get,
    path = "/companies/{id}/analytics/professionals",
    tag = "Analytics",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Revenue per professional", body = Vec<ProfessionalPerformance>),
        (status = 404, description = "Company not found")
    )
)]
pub async fn professional_performance(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProfessionalPerformance>>> {
    let rows = state
        .services
        .analytics()
        .professional_performance(company_id)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/companies/{id}/analytics/peak-hours",
    tag = "Analytics",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Billable appointments per start hour", body = Vec<PeakHour>),
        (status = 404, description = "Company not found")
    )
)]
pub async fn peak_hours(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<PeakHour>>> {
    let hours = state.services.analytics().peak_hours(company_id).await?;
    Ok(Json(hours))
}

#[utoipa::path(
    get,
    path = "/companies/{id}/analytics/status",
    tag = "Analytics",
    params(("id" = Uuid, Path, description = "Company ID"), PeriodQuery),
    responses(
        (status = 200, description = "Appointment count per status", body = Object),
        (status = 404, description = "Company not found")
    )
)]
pub async fn status_distribution(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<BTreeMap<String, u64>>> {
    let counts = state
        .services
        .analytics()
        .status_distribution(company_id, query.period())
        .await?;
    Ok(Json(counts))
}

#[utoipa::path(
    get,
    path = "/companies/{id}/analytics/frequent-clients",
    tag = "Analytics",
    params(("id" = Uuid, Path, description = "Company ID"), LimitQuery),
    responses(
        (status = 200, description = "Clients with the most appointments", body = Vec<FrequentClient>),
        (status = 404, description = "Company not found")
    )
)]
pub async fn frequent_clients(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<FrequentClient>>> {
    let clients = state
        .services
        .analytics()
        .frequent_clients(company_id, query.limit())
        .await?;
    Ok(Json(clients))
}

/// Every breakdown in one document
#[utoipa::path(
    get,
    path = "/companies/{id}/analytics/report",
    tag = "Analytics",
    params(("id" = Uuid, Path, description = "Company ID"), PeriodQuery),
    responses(
        (status = 200, description = "Full report", body = AnalyticsReport),
        (status = 404, description = "Company not found")
    )
)]
pub async fn report(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<AnalyticsReport>> {
    let report = state
        .services
        .analytics()
        .report(company_id, query.period())
        .await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_caps() {
        assert_eq!(LimitQuery { limit: None }.limit(), DEFAULT_RANKING_LIMIT as usize);
        assert_eq!(LimitQuery { limit: Some(0) }.limit(), DEFAULT_RANKING_LIMIT as usize);
        assert_eq!(LimitQuery { limit: Some(5000) }.limit(), MAX_PAGE_SIZE as usize);
    }

    #[test]
    fn test_unknown_period_falls_back() {
        let query = PeriodQuery {
            period: Some("2w".to_string()),
        };
        assert_eq!(query.period(), Period::Month);
    }
}
