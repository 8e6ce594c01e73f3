//! Appointment service - Booking, availability and the appointment lifecycle.
//!
//! Conflict detection happens in two places: slot generation filters
//! candidates against the professional's blocking appointments, and every
//! write that occupies calendar time goes through the repository's
//! check-and-write so concurrent bookings cannot overlap.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::container::parallel;
use super::notification_service::NotificationService;
use crate::config::{DEFAULT_AGENDA_DAYS, DEFAULT_SLOT_DURATION_MINUTES};
use crate::domain::schedule::{available_slots, date_span, day_range, format_hhmm};
use crate::domain::{
    Appointment, AppointmentDetails, AppointmentFilter, AvailableSlots, CancelAppointment,
    CreateAppointment, NotificationKind, RescheduleAppointment, TimeRange, UpdateAppointment,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Appointment service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AppointmentService: Send + Sync {
    /// Book a slot. Fails with `SlotUnavailable` when the professional is busy.
    async fn book(&self, company_id: Uuid, input: CreateAppointment) -> AppResult<Appointment>;

    /// Free start times for a professional on `date`
    async fn available_slots(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        service_id: Option<Uuid>,
    ) -> AppResult<AvailableSlots>;

    async fn reschedule(&self, id: Uuid, input: RescheduleAppointment) -> AppResult<Appointment>;

    async fn cancel(&self, id: Uuid, input: CancelAppointment) -> AppResult<Appointment>;

    async fn update(&self, id: Uuid, input: UpdateAppointment) -> AppResult<Appointment>;

    async fn list(
        &self,
        company_id: Uuid,
        filter: AppointmentFilter,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<Appointment>>;

    /// Appointments starting on the current UTC date
    async fn today(&self, company_id: Uuid) -> AppResult<Vec<Appointment>>;

    /// Blocking appointments of a professional between two dates (inclusive)
    async fn agenda(
        &self,
        professional_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<Appointment>>;

    async fn details(&self, id: Uuid) -> AppResult<AppointmentDetails>;
}

/// Concrete implementation of AppointmentService using Unit of Work.
pub struct Scheduler<U: UnitOfWork> {
    uow: Arc<U>,
    notifications: Option<Arc<dyn NotificationService>>,
}

impl<U: UnitOfWork> Scheduler<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self {
            uow,
            notifications: None,
        }
    }

    /// Tell clients about cancellations and reschedules.
    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationService>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    /// Best effort: the appointment change already happened.
    async fn notify(&self, appointment_id: Uuid, kind: NotificationKind) {
        let Some(notifications) = &self.notifications else {
            return;
        };
        if let Err(e) = notifications.notify_appointment(appointment_id, kind).await {
            tracing::warn!(%appointment_id, kind = kind.as_str(), error = %e, "Appointment notification failed");
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<Appointment> {
        self.uow
            .appointments()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Appointment")
    }

    /// Effective slot length for a professional and an optional service.
    async fn slot_duration(&self, professional_id: Uuid, service_id: Option<Uuid>) -> AppResult<i32> {
        let Some(service_id) = service_id else {
            return Ok(DEFAULT_SLOT_DURATION_MINUTES);
        };
        let Some(service) = self.uow.catalog().find_by_id(service_id).await? else {
            return Ok(DEFAULT_SLOT_DURATION_MINUTES);
        };

        let assignment = self
            .uow
            .catalog()
            .find_assignment(service_id, professional_id)
            .await?;
        Ok(service.terms_for(assignment.as_ref()).duration_minutes)
    }
}

#[async_trait]
impl<U: UnitOfWork> AppointmentService for Scheduler<U> {
    async fn book(&self, company_id: Uuid, input: CreateAppointment) -> AppResult<Appointment> {
        let (client, professional, service) = parallel::join3(
            self.uow.clients().find_by_id(input.client_id),
            self.uow.professionals().find_by_id(input.professional_id),
            self.uow.catalog().find_by_id(input.service_id),
        )
        .await?;

        let client = client
            .filter(|c| c.company_id == company_id)
            .ok_or_not_found("Client")?;
        let professional = professional
            .filter(|p| p.company_id == company_id)
            .ok_or_not_found("Professional")?;
        let service = service
            .filter(|s| s.company_id == company_id)
            .ok_or_not_found("Service")?;

        if !professional.active {
            return Err(AppError::bad_request("Professional is not active"));
        }
        if !service.active {
            return Err(AppError::bad_request("Service is not active"));
        }

        let assignment = self
            .uow
            .catalog()
            .find_assignment(service.id, professional.id)
            .await?;
        let terms = service.terms_for(assignment.as_ref());

        let appointment = Appointment::schedule(company_id, &input, terms, Utc::now())?;
        let appointment = self.uow.appointments().insert_if_available(appointment).await?;

        tracing::info!(
            appointment_id = %appointment.id,
            %company_id,
            client_id = %client.id,
            professional_id = %professional.id,
            starts_at = %appointment.starts_at,
            "Appointment booked"
        );
        Ok(appointment)
    }

    async fn available_slots(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        service_id: Option<Uuid>,
    ) -> AppResult<AvailableSlots> {
        let professional = self
            .uow
            .professionals()
            .find_by_id(professional_id)
            .await?
            .ok_or_not_found("Professional")?;

        let mut slots = Vec::new();
        if let Some((work_start, work_end)) = professional.working_window(date) {
            let duration = self.slot_duration(professional_id, service_id).await?;
            let day = day_range(date);
            let busy: Vec<TimeRange> = self
                .uow
                .appointments()
                .list_blocking(professional_id, day.start, day.end)
                .await?
                .iter()
                .map(Appointment::range)
                .collect();

            slots = available_slots(
                date,
                work_start,
                work_end,
                professional.slot_interval_minutes,
                duration,
                &busy,
            )
            .into_iter()
            .map(format_hhmm)
            .collect();
        }

        Ok(AvailableSlots {
            date,
            professional_id,
            slots,
        })
    }

    async fn reschedule(&self, id: Uuid, input: RescheduleAppointment) -> AppResult<Appointment> {
        let mut appointment = self.find(id).await?;
        let previous = appointment.starts_at;
        appointment.reschedule(input.starts_at, Utc::now())?;

        let appointment = self.uow.appointments().update_if_available(appointment).await?;
        tracing::info!(
            appointment_id = %id,
            from = %previous,
            to = %appointment.starts_at,
            "Appointment rescheduled"
        );
        self.notify(id, NotificationKind::Reschedule).await;
        Ok(appointment)
    }

    async fn cancel(&self, id: Uuid, input: CancelAppointment) -> AppResult<Appointment> {
        let mut appointment = self.find(id).await?;
        appointment.cancel(input.reason, Utc::now())?;

        let appointment = self.uow.appointments().update(appointment).await?;
        tracing::info!(appointment_id = %id, "Appointment cancelled");
        self.notify(id, NotificationKind::Cancellation).await;
        Ok(appointment)
    }

    async fn update(&self, id: Uuid, input: UpdateAppointment) -> AppResult<Appointment> {
        let mut appointment = self.find(id).await?;
        let was_blocking = appointment.status.is_blocking();
        appointment.apply(input, Utc::now())?;

        // Reopening a released slot must not double-book it
        if !was_blocking && appointment.status.is_blocking() {
            self.uow.appointments().update_if_available(appointment).await
        } else {
            self.uow.appointments().update(appointment).await
        }
    }

    async fn list(
        &self,
        company_id: Uuid,
        filter: AppointmentFilter,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<Appointment>> {
        let (appointments, total) = self
            .uow
            .appointments()
            .list(company_id, filter, pagination)
            .await?;
        Ok(Paginated::from_page(appointments, total, pagination))
    }

    async fn today(&self, company_id: Uuid) -> AppResult<Vec<Appointment>> {
        let today = day_range(Utc::now().date_naive());
        self.uow
            .appointments()
            .list_between(company_id, today.start, today.end)
            .await
    }

    async fn agenda(
        &self,
        professional_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<Appointment>> {
        self.uow
            .professionals()
            .find_by_id(professional_id)
            .await?
            .ok_or_not_found("Professional")?;

        let from = from.unwrap_or_else(|| Utc::now().date_naive());
        let to = to.unwrap_or(from + Duration::days(DEFAULT_AGENDA_DAYS));
        if to < from {
            return Err(AppError::bad_request("'to' must not be before 'from'"));
        }

        let span = date_span(from, to);
        self.uow
            .appointments()
            .list_blocking(professional_id, span.start, span.end)
            .await
    }

    async fn details(&self, id: Uuid) -> AppResult<AppointmentDetails> {
        let appointment = self.find(id).await?;

        let (client, professional, service) = parallel::join3(
            self.uow.clients().find_by_id(appointment.client_id),
            self.uow.professionals().find_by_id(appointment.professional_id),
            self.uow.catalog().find_by_id(appointment.service_id),
        )
        .await?;

        Ok(AppointmentDetails {
            appointment,
            client: client.ok_or_not_found("Client")?,
            professional: professional.ok_or_not_found("Professional")?,
            service: service.ok_or_not_found("Service")?,
        })
    }
}
