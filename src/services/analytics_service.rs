//! Analytics service: dashboard metrics and breakdowns per company.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use uuid::Uuid;

use crate::config::{CACHE_PREFIX_DASHBOARD, REPORT_RANKING_LIMIT};
use crate::domain::analytics::{
    self, DashboardInput, FrequentClient, PeakHour, PeriodBucket, ProfessionalPerformance,
    ServicePopularity,
};
use crate::domain::{AnalyticsReport, AppointmentFact, Dashboard, Period};
use crate::errors::{AppResult, OptionExt};
use crate::infra::{Cache, UnitOfWork};

use super::container::parallel;

/// Read-only aggregations over a company's appointments.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    async fn dashboard(&self, company_id: Uuid, period: Period) -> AppResult<Dashboard>;

    async fn appointments_by_period(
        &self,
        company_id: Uuid,
        period: Period,
    ) -> AppResult<Vec<PeriodBucket>>;

    async fn popular_services(&self, company_id: Uuid, limit: usize)
        -> AppResult<Vec<ServicePopularity>>;

    async fn professional_performance(&self, company_id: Uuid)
        -> AppResult<Vec<ProfessionalPerformance>>;

    async fn peak_hours(&self, company_id: Uuid) -> AppResult<Vec<PeakHour>>;

    async fn status_distribution(
        &self,
        company_id: Uuid,
        period: Period,
    ) -> AppResult<BTreeMap<String, u64>>;

    async fn frequent_clients(&self, company_id: Uuid, limit: usize)
        -> AppResult<Vec<FrequentClient>>;

    /// Everything above in one document, rankings cut to the report size.
    async fn report(&self, company_id: Uuid, period: Period) -> AppResult<AnalyticsReport>;
}

pub struct AnalyticsManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Option<Arc<Cache>>,
    cache_ttl: u64,
}

impl<U: UnitOfWork> AnalyticsManager<U> {
    pub fn new(uow: Arc<U>, cache: Option<Arc<Cache>>, cache_ttl: u64) -> Self {
        Self {
            uow,
            cache,
            cache_ttl,
        }
    }

    async fn ensure_company(&self, company_id: Uuid) -> AppResult<()> {
        self.uow
            .companies()
            .find_by_id(company_id)
            .await?
            .ok_or_not_found("Company")?;
        Ok(())
    }

    /// Every fact of the company, after checking it exists.
    async fn all_facts(&self, company_id: Uuid) -> AppResult<Vec<AppointmentFact>> {
        self.ensure_company(company_id).await?;
        self.uow.analytics().facts(company_id, None).await
    }

    async fn compute_dashboard(
        &self,
        company_id: Uuid,
        period: Period,
        facts: Option<&[AppointmentFact]>,
    ) -> AppResult<Dashboard> {
        let now = Utc::now();
        let window = period.window(now);
        let since = period.previous_window(now).start;

        let analytics = self.uow.analytics();
        let clients = self.uow.clients();
        let professionals = self.uow.professionals();

        let (loaded, active_clients, (new_clients, staff)) = parallel::join3(
            async {
                match facts {
                    Some(_) => Ok(Vec::new()),
                    None => analytics.facts(company_id, Some(since)).await,
                }
            },
            clients.count_active(company_id),
            parallel::join2(
                clients.count_created_since(company_id, window.start),
                professionals.list_by_company(company_id, false),
            ),
        )
        .await?;

        let facts = facts.unwrap_or(&loaded);

        Ok(Dashboard::compute(DashboardInput {
            period,
            now,
            facts,
            professionals: &staff,
            active_clients,
            new_clients,
        }))
    }

    async fn cached_dashboard(&self, key: &str) -> Option<Dashboard> {
        let cache = self.cache.as_ref()?;
        match cache.get::<Dashboard>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key, error = %e, "Dashboard cache read failed");
                None
            }
        }
    }

    async fn store_dashboard(&self, key: &str, dashboard: &Dashboard) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_with_ttl(key, dashboard, self.cache_ttl).await {
                tracing::warn!(key, error = %e, "Dashboard cache write failed");
            }
        }
    }
}

fn dashboard_key(company_id: Uuid, period: Period) -> String {
    format!("{}{}:{}", CACHE_PREFIX_DASHBOARD, company_id, period.as_str())
}

#[async_trait]
impl<U: UnitOfWork + 'static> AnalyticsService for AnalyticsManager<U> {
    async fn dashboard(&self, company_id: Uuid, period: Period) -> AppResult<Dashboard> {
        let key = dashboard_key(company_id, period);
        if let Some(hit) = self.cached_dashboard(&key).await {
            tracing::debug!(%company_id, period = period.as_str(), "Dashboard served from cache");
            return Ok(hit);
        }

        self.ensure_company(company_id).await?;
        let dashboard = self.compute_dashboard(company_id, period, None).await?;
        self.store_dashboard(&key, &dashboard).await;
        Ok(dashboard)
    }

    async fn appointments_by_period(
        &self,
        company_id: Uuid,
        period: Period,
    ) -> AppResult<Vec<PeriodBucket>> {
        self.ensure_company(company_id).await?;
        let now = Utc::now();
        let facts = self
            .uow
            .analytics()
            .facts(company_id, Some(period.window(now).start))
            .await?;
        Ok(analytics::appointments_by_period(&facts, period, now))
    }

    async fn popular_services(
        &self,
        company_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<ServicePopularity>> {
        let facts = self.all_facts(company_id).await?;
        Ok(analytics::popular_services(&facts, limit))
    }

    async fn professional_performance(
        &self,
        company_id: Uuid,
    ) -> AppResult<Vec<ProfessionalPerformance>> {
        let facts = self.all_facts(company_id).await?;
        Ok(analytics::professional_performance(&facts))
    }

    async fn peak_hours(&self, company_id: Uuid) -> AppResult<Vec<PeakHour>> {
        let facts = self.all_facts(company_id).await?;
        Ok(analytics::peak_hours(&facts))
    }

    async fn status_distribution(
        &self,
        company_id: Uuid,
        period: Period,
    ) -> AppResult<BTreeMap<String, u64>> {
        self.ensure_company(company_id).await?;
        let now = Utc::now();
        let facts = self
            .uow
            .analytics()
            .facts(company_id, Some(period.window(now).start))
            .await?;
        Ok(analytics::status_distribution(&facts, period, now))
    }

    async fn frequent_clients(
        &self,
        company_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<FrequentClient>> {
        let facts = self.all_facts(company_id).await?;
        Ok(analytics::frequent_clients(&facts, limit))
    }

    async fn report(&self, company_id: Uuid, period: Period) -> AppResult<AnalyticsReport> {
        let facts = self.all_facts(company_id).await?;
        let dashboard = self
            .compute_dashboard(company_id, period, Some(&facts))
            .await?;
        let now = Utc::now();

        tracing::info!(%company_id, period = period.as_str(), facts = facts.len(), "Analytics report built");

        let mut professional_performance = analytics::professional_performance(&facts);
        professional_performance.truncate(REPORT_RANKING_LIMIT);

        Ok(AnalyticsReport {
            period,
            dashboard,
            appointments_by_period: analytics::appointments_by_period(&facts, period, now),
            popular_services: analytics::popular_services(&facts, REPORT_RANKING_LIMIT),
            professional_performance,
            peak_hours: analytics::peak_hours(&facts),
            status_distribution: analytics::status_distribution(&facts, period, now),
            frequent_clients: analytics::frequent_clients(&facts, REPORT_RANKING_LIMIT),
            generated_at: now,
        })
    }
}
