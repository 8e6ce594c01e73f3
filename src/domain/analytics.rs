//! Analytics aggregation over appointment facts.
//!
//! Repositories load flat [`AppointmentFact`] rows. Every metric here is a
//! pure function of those rows, so the numbers can be checked without a
//! database.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::appointment::AppointmentStatus;
use super::professional::Professional;

/// Reporting period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Period {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl Period {
    /// Unknown values fall back to 30 days.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("7d") => Period::Week,
            Some("90d") => Period::Quarter,
            Some("1y") => Period::Year,
            _ => Period::Month,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "7d",
            Period::Month => "30d",
            Period::Quarter => "90d",
            Period::Year => "1y",
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::Year => 365,
        }
    }

    /// `[now - days, now]`
    pub fn window(&self, now: DateTime<Utc>) -> Window {
        Window {
            start: now - Duration::days(self.days()),
            end: now,
        }
    }

    /// Window of equal length right before [`Period::window`].
    pub fn previous_window(&self, now: DateTime<Utc>) -> Window {
        let current = self.window(now);
        Window {
            start: current.start - Duration::days(self.days()),
            end: current.start,
        }
    }

    /// Bucket label: day for short periods, ISO week for 90d, month for 1y.
    pub fn bucket(&self, at: DateTime<Utc>) -> String {
        match self {
            Period::Week | Period::Month => at.format("%Y-%m-%d").to_string(),
            Period::Quarter => {
                let week = at.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Period::Year => at.format("%Y-%m").to_string(),
        }
    }
}

/// Time window used for filtering facts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    /// Closed-open variant for the comparison window.
    pub fn contains_before_end(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    /// The calendar dates after the start date, up to and including the end
    /// date: a `days`-long window yields `days` dates.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let first = self.start.date_naive();
        let last = self.end.date_naive();
        first.iter_days().skip(1).take_while(|d| *d <= last).collect()
    }
}

/// One appointment with the names analytics reports need
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentFact {
    pub appointment_id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub client_phone: String,
    pub professional_id: Uuid,
    pub professional_name: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub status: AppointmentStatus,
    pub starts_at: DateTime<Utc>,
    pub total_cents: i64,
    pub service_price_cents: i64,
}

impl AppointmentFact {
    fn is_booked(&self) -> bool {
        !matches!(
            self.status,
            AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }
}

/// Percentage change against the previous value.
pub fn growth(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        round2((current - previous) / previous * 100.0)
    } else if current == 0.0 {
        0.0
    } else {
        100.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn average(total: i64, count: u64) -> i64 {
    if count == 0 {
        0
    } else {
        total / count as i64
    }
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentStats {
    pub total: u64,
    pub today: u64,
    pub growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClientStats {
    pub total: u64,
    pub active: u64,
    pub new: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RevenueStats {
    pub total_cents: i64,
    pub today_cents: i64,
    pub growth: f64,
    pub average_ticket_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OccupancyStats {
    pub rate: f64,
    pub available_today: u64,
    pub booked_today: u64,
}

/// Headline metrics for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dashboard {
    pub period: Period,
    pub appointments: AppointmentStats,
    pub clients: ClientStats,
    pub revenue: RevenueStats,
    pub occupancy: OccupancyStats,
}

/// Everything the dashboard is computed from
pub struct DashboardInput<'a> {
    pub period: Period,
    pub now: DateTime<Utc>,
    /// Facts starting at or after the previous window's start
    pub facts: &'a [AppointmentFact],
    pub professionals: &'a [Professional],
    pub active_clients: u64,
    pub new_clients: u64,
}

impl Dashboard {
    pub fn compute(input: DashboardInput<'_>) -> Self {
        let window = input.period.window(input.now);
        let previous = input.period.previous_window(input.now);
        let today = input.now.date_naive();

        let mut billable = 0u64;
        let mut revenue = 0i64;
        let mut previous_billable = 0u64;
        let mut previous_revenue = 0i64;
        let mut today_count = 0u64;
        let mut today_revenue = 0i64;
        let mut booked = 0u64;
        let mut booked_today = 0u64;
        let mut visitors = HashSet::new();

        for fact in input.facts {
            let is_today = fact.starts_at.date_naive() == today;
            if window.contains(fact.starts_at) {
                visitors.insert(fact.client_id);
                if fact.status.is_billable() {
                    billable += 1;
                    revenue += fact.total_cents;
                }
                if fact.is_booked() {
                    booked += 1;
                }
            } else if previous.contains_before_end(fact.starts_at) && fact.status.is_billable() {
                previous_billable += 1;
                previous_revenue += fact.total_cents;
            }
            if is_today {
                today_count += 1;
                if fact.status.is_billable() {
                    today_revenue += fact.total_cents;
                }
                if fact.is_booked() {
                    booked_today += 1;
                }
            }
        }

        let active: Vec<&Professional> = input.professionals.iter().filter(|p| p.active).collect();
        let capacity: u64 = window
            .dates()
            .into_iter()
            .map(|date| active.iter().map(|p| p.daily_capacity(date)).sum::<u64>())
            .sum();
        let capacity_today: u64 = active.iter().map(|p| p.daily_capacity(today)).sum();

        let rate = if capacity == 0 {
            0.0
        } else {
            round2(booked as f64 / capacity as f64 * 100.0)
        };

        Self {
            period: input.period,
            appointments: AppointmentStats {
                total: billable,
                today: today_count,
                growth: growth(billable as f64, previous_billable as f64),
            },
            clients: ClientStats {
                total: input.active_clients,
                active: visitors.len() as u64,
                new: input.new_clients,
            },
            revenue: RevenueStats {
                total_cents: revenue,
                today_cents: today_revenue,
                growth: growth(revenue as f64, previous_revenue as f64),
                average_ticket_cents: average(revenue, billable),
            },
            occupancy: OccupancyStats {
                rate,
                available_today: capacity_today.saturating_sub(booked_today),
                booked_today,
            },
        }
    }
}

// =============================================================================
// Breakdowns
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PeriodBucket {
    #[schema(example = "2024-03-04")]
    pub period: String,
    pub appointments: u64,
    pub revenue_cents: i64,
}

/// Billable appointments in the window, bucketed and ascending.
pub fn appointments_by_period(facts: &[AppointmentFact], period: Period, now: DateTime<Utc>) -> Vec<PeriodBucket> {
    let window = period.window(now);
    let mut buckets: BTreeMap<String, (u64, i64)> = BTreeMap::new();

    for fact in facts
        .iter()
        .filter(|f| f.status.is_billable() && window.contains(f.starts_at))
    {
        let entry = buckets.entry(period.bucket(fact.starts_at)).or_default();
        entry.0 += 1;
        entry.1 += fact.total_cents;
    }

    buckets
        .into_iter()
        .map(|(period, (appointments, revenue_cents))| PeriodBucket {
            period,
            appointments,
            revenue_cents,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ServicePopularity {
    pub service_id: Uuid,
    pub name: String,
    pub appointments: u64,
    pub revenue_cents: i64,
    pub average_price_cents: i64,
}

/// Billable appointments per service, most booked first.
pub fn popular_services(facts: &[AppointmentFact], limit: usize) -> Vec<ServicePopularity> {
    let mut by_service: HashMap<Uuid, ServicePopularity> = HashMap::new();
    let mut price_sums: HashMap<Uuid, i64> = HashMap::new();

    for fact in facts.iter().filter(|f| f.status.is_billable()) {
        let row = by_service.entry(fact.service_id).or_insert_with(|| ServicePopularity {
            service_id: fact.service_id,
            name: fact.service_name.clone(),
            appointments: 0,
            revenue_cents: 0,
            average_price_cents: 0,
        });
        row.appointments += 1;
        row.revenue_cents += fact.total_cents;
        *price_sums.entry(fact.service_id).or_default() += fact.service_price_cents;
    }

    let mut rows: Vec<ServicePopularity> = by_service
        .into_values()
        .map(|mut row| {
            let prices = price_sums.get(&row.service_id).copied().unwrap_or(0);
            row.average_price_cents = average(prices, row.appointments);
            row
        })
        .collect();
    rows.sort_by(|a, b| b.appointments.cmp(&a.appointments).then_with(|| a.name.cmp(&b.name)));
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProfessionalPerformance {
    pub professional_id: Uuid,
    pub name: String,
    pub appointments: u64,
    pub revenue_cents: i64,
    pub average_ticket_cents: i64,
}

/// Billable appointments per professional, highest revenue first.
pub fn professional_performance(facts: &[AppointmentFact]) -> Vec<ProfessionalPerformance> {
    let mut by_professional: HashMap<Uuid, ProfessionalPerformance> = HashMap::new();

    for fact in facts.iter().filter(|f| f.status.is_billable()) {
        let row = by_professional
            .entry(fact.professional_id)
            .or_insert_with(|| ProfessionalPerformance {
                professional_id: fact.professional_id,
                name: fact.professional_name.clone(),
                appointments: 0,
                revenue_cents: 0,
                average_ticket_cents: 0,
            });
        row.appointments += 1;
        row.revenue_cents += fact.total_cents;
    }

    let mut rows: Vec<ProfessionalPerformance> = by_professional
        .into_values()
        .map(|mut row| {
            row.average_ticket_cents = average(row.revenue_cents, row.appointments);
            row
        })
        .collect();
    rows.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents).then_with(|| a.name.cmp(&b.name)));
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PeakHour {
    #[schema(example = "14:00")]
    pub hour: String,
    pub appointments: u64,
}

/// Billable appointments per start hour, ascending by hour.
pub fn peak_hours(facts: &[AppointmentFact]) -> Vec<PeakHour> {
    let mut by_hour: BTreeMap<u32, u64> = BTreeMap::new();
    for fact in facts.iter().filter(|f| f.status.is_billable()) {
        *by_hour.entry(fact.starts_at.hour()).or_default() += 1;
    }
    by_hour
        .into_iter()
        .map(|(hour, appointments)| PeakHour {
            hour: format!("{:02}:00", hour),
            appointments,
        })
        .collect()
}

/// Appointment count per status within the period window.
pub fn status_distribution(
    facts: &[AppointmentFact],
    period: Period,
    now: DateTime<Utc>,
) -> BTreeMap<String, u64> {
    let window = period.window(now);
    let mut counts = BTreeMap::new();
    for fact in facts.iter().filter(|f| window.contains(f.starts_at)) {
        *counts.entry(fact.status.as_str().to_string()).or_default() += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FrequentClient {
    pub client_id: Uuid,
    pub name: String,
    pub phone: String,
    pub appointments: u64,
    pub total_cents: i64,
    pub last_appointment_at: DateTime<Utc>,
}

/// Clients with the most appointments of any status.
pub fn frequent_clients(facts: &[AppointmentFact], limit: usize) -> Vec<FrequentClient> {
    let mut by_client: HashMap<Uuid, FrequentClient> = HashMap::new();

    for fact in facts {
        let row = by_client.entry(fact.client_id).or_insert_with(|| FrequentClient {
            client_id: fact.client_id,
            name: fact.client_name.clone(),
            phone: fact.client_phone.clone(),
            appointments: 0,
            total_cents: 0,
            last_appointment_at: fact.starts_at,
        });
        row.appointments += 1;
        row.total_cents += fact.total_cents;
        if fact.starts_at > row.last_appointment_at {
            row.last_appointment_at = fact.starts_at;
        }
    }

    let mut rows: Vec<FrequentClient> = by_client.into_values().collect();
    rows.sort_by(|a, b| {
        b.appointments
            .cmp(&a.appointments)
            .then_with(|| b.last_appointment_at.cmp(&a.last_appointment_at))
    });
    rows.truncate(limit);
    rows
}

/// Full analytics report
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalyticsReport {
    pub period: Period,
    pub dashboard: Dashboard,
    pub appointments_by_period: Vec<PeriodBucket>,
    pub popular_services: Vec<ServicePopularity>,
    pub professional_performance: Vec<ProfessionalPerformance>,
    pub peak_hours: Vec<PeakHour>,
    #[schema(value_type = Object)]
    pub status_distribution: BTreeMap<String, u64>,
    pub frequent_clients: Vec<FrequentClient>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::WorkDays;
    use chrono::{NaiveTime, TimeZone};

    fn fact(client: Uuid, service: Uuid, status: AppointmentStatus, at: DateTime<Utc>, total: i64) -> AppointmentFact {
        AppointmentFact {
            appointment_id: Uuid::new_v4(),
            client_id: client,
            client_name: "Maria".to_string(),
            client_phone: "11999999999".to_string(),
            professional_id: Uuid::nil(),
            professional_name: "Ana".to_string(),
            service_id: service,
            service_name: "Haircut".to_string(),
            status,
            starts_at: at,
            total_cents: total,
            service_price_cents: total,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_period_parse_falls_back_to_month() {
        assert_eq!(Period::parse(Some("7d")), Period::Week);
        assert_eq!(Period::parse(Some("1y")), Period::Year);
        assert_eq!(Period::parse(Some("banana")), Period::Month);
        assert_eq!(Period::parse(None), Period::Month);
        assert_eq!(Period::Quarter.days(), 90);
    }

    #[test]
    fn test_window_dates_match_period_length() {
        for period in [Period::Week, Period::Month, Period::Quarter, Period::Year] {
            let dates = period.window(now()).dates();
            assert_eq!(dates.len() as i64, period.days());
            assert_eq!(dates.last(), Some(&now().date_naive()));
        }

        let month = Period::Month.window(now()).dates();
        assert_eq!(month[0], NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
    }

    #[test]
    fn test_growth() {
        assert_eq!(growth(150.0, 100.0), 50.0);
        assert_eq!(growth(50.0, 100.0), -50.0);
        assert_eq!(growth(0.0, 0.0), 0.0);
        assert_eq!(growth(3.0, 0.0), 100.0);
    }

    #[test]
    fn test_buckets() {
        let at = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();
        assert_eq!(Period::Week.bucket(at), "2024-01-03");
        assert_eq!(Period::Quarter.bucket(at), "2024-W01");
        assert_eq!(Period::Year.bucket(at), "2024-01");
    }

    #[test]
    fn test_appointments_by_period_counts_billable_only() {
        let client = Uuid::new_v4();
        let service = Uuid::new_v4();
        let facts = vec![
            fact(client, service, AppointmentStatus::Completed, now() - Duration::days(1), 5000),
            fact(client, service, AppointmentStatus::Confirmed, now() - Duration::days(1), 3000),
            fact(client, service, AppointmentStatus::Cancelled, now() - Duration::days(1), 9000),
            fact(client, service, AppointmentStatus::Completed, now() - Duration::days(40), 1000),
        ];

        let buckets = appointments_by_period(&facts, Period::Week, now());
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].period, "2024-03-14");
        assert_eq!(buckets[0].appointments, 2);
        assert_eq!(buckets[0].revenue_cents, 8000);
    }

    #[test]
    fn test_popular_services_and_peak_hours() {
        let client = Uuid::new_v4();
        let cut = Uuid::new_v4();
        let color = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        let mut facts = vec![
            fact(client, cut, AppointmentStatus::Completed, at, 5000),
            fact(client, cut, AppointmentStatus::Completed, at, 3000),
            fact(client, color, AppointmentStatus::Confirmed, at + Duration::hours(2), 9000),
        ];
        facts[2].service_name = "Coloring".to_string();

        let services = popular_services(&facts, 1);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].service_id, cut);
        assert_eq!(services[0].appointments, 2);
        assert_eq!(services[0].average_price_cents, 4000);

        let hours = peak_hours(&facts);
        assert_eq!(hours[0].hour, "14:00");
        assert_eq!(hours[0].appointments, 2);
        assert_eq!(hours[1].hour, "16:00");
    }

    #[test]
    fn test_frequent_clients_include_all_statuses() {
        let regular = Uuid::new_v4();
        let once = Uuid::new_v4();
        let service = Uuid::new_v4();
        let facts = vec![
            fact(regular, service, AppointmentStatus::Cancelled, now() - Duration::days(3), 1000),
            fact(regular, service, AppointmentStatus::Completed, now() - Duration::days(1), 2000),
            fact(once, service, AppointmentStatus::Completed, now(), 5000),
        ];

        let clients = frequent_clients(&facts, 10);
        assert_eq!(clients[0].client_id, regular);
        assert_eq!(clients[0].appointments, 2);
        assert_eq!(clients[0].total_cents, 3000);
        assert_eq!(clients[0].last_appointment_at, now() - Duration::days(1));
    }

    #[test]
    fn test_dashboard_occupancy_and_growth() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let professional = Professional {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: None,
            phone: None,
            specialties: vec![],
            bio: None,
            photo_url: None,
            work_start: Some(start),
            work_end: Some(end),
            work_days: WorkDays::parse("1111111").unwrap(),
            slot_interval_minutes: 60,
            active: true,
            created_at: now(),
            updated_at: now(),
        };

        let client = Uuid::new_v4();
        let service = Uuid::new_v4();
        let today_morning = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        let facts = vec![
            fact(client, service, AppointmentStatus::Confirmed, today_morning, 4000),
            fact(client, service, AppointmentStatus::Scheduled, now() - Duration::days(2), 2000),
            fact(client, service, AppointmentStatus::Completed, now() - Duration::days(10), 2000),
        ];

        let dashboard = Dashboard::compute(DashboardInput {
            period: Period::Week,
            now: now(),
            facts: &facts,
            professionals: &[professional],
            active_clients: 4,
            new_clients: 1,
        });

        assert_eq!(dashboard.appointments.total, 1);
        assert_eq!(dashboard.appointments.today, 1);
        assert_eq!(dashboard.appointments.growth, 0.0);
        assert_eq!(dashboard.revenue.total_cents, 4000);
        assert_eq!(dashboard.revenue.today_cents, 4000);
        assert_eq!(dashboard.revenue.growth, 100.0);
        assert_eq!(dashboard.revenue.average_ticket_cents, 4000);
        assert_eq!(dashboard.clients.active, 1);
        assert_eq!(dashboard.clients.total, 4);

        // 7 window days x 3 slots, 2 booked
        assert_eq!(dashboard.occupancy.rate, 9.52);
        assert_eq!(dashboard.occupancy.booked_today, 1);
        assert_eq!(dashboard.occupancy.available_today, 2);
    }
}
