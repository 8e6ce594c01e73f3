//! Notification service - Appointment messages, ad-hoc sends and reminders.
//!
//! Messages for an appointment go to every channel the company and client
//! allow. Immediate sends are written to the outbox and delivered in the same
//! request; reminders stay pending until the job worker (or a dispatch
//! sweep) picks them up at `send_at`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::container::parallel;
use super::dispatcher::Dispatcher;
use crate::config::{MAX_REMINDER_HOURS, MIN_REMINDER_HOURS};
use crate::domain::notification::{
    channels_for, normalize_phone, AutoReminders, ChannelTarget, DispatchReport, EmailRequest,
    MessageContext, NotificationBatch, ScheduleReminder, ScheduledReminders, TestNotification,
    WhatsAppRequest,
};
use crate::domain::{
    Appointment, Channel, Client, Company, NewNotification, Notification, NotificationKind, Payment,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{NotificationQueue, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Notification service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_confirmation(&self, appointment_id: Uuid) -> AppResult<NotificationBatch>;

    async fn send_reminder(&self, appointment_id: Uuid, hours_before: i64) -> AppResult<NotificationBatch>;

    /// Tell the client an appointment changed (cancelled, rescheduled)
    async fn notify_appointment(&self, appointment_id: Uuid, kind: NotificationKind) -> AppResult<NotificationBatch>;

    /// Receipt for a payment that became `paid`
    async fn notify_payment(&self, payment: Payment) -> AppResult<NotificationBatch>;

    async fn send_email(&self, request: EmailRequest) -> AppResult<Notification>;

    async fn send_whatsapp(&self, request: WhatsAppRequest) -> AppResult<Notification>;

    /// Queue reminders for one appointment at `send_at`
    async fn schedule_reminder(&self, request: ScheduleReminder) -> AppResult<ScheduledReminders>;

    /// Queue reminders for every upcoming appointment of a company
    async fn schedule_auto_reminders(&self, request: AutoReminders) -> AppResult<ScheduledReminders>;

    async fn send_test(&self, request: TestNotification) -> AppResult<Notification>;

    /// Notification log of an appointment, newest first
    async fn appointment_log(&self, appointment_id: Uuid) -> AppResult<Vec<Notification>>;

    /// Deliver every pending notification that is due
    async fn dispatch_due(&self) -> AppResult<DispatchReport>;
}

/// Appointment plus everything its messages mention
struct AppointmentMessage {
    appointment: Appointment,
    company: Company,
    client: Client,
    context: MessageContext,
}

/// Concrete implementation of NotificationService using Unit of Work.
pub struct NotificationManager<U: UnitOfWork> {
    uow: Arc<U>,
    dispatcher: Arc<Dispatcher>,
    queue: Option<Arc<dyn NotificationQueue>>,
}

impl<U: UnitOfWork> NotificationManager<U> {
    pub fn new(uow: Arc<U>, dispatcher: Arc<Dispatcher>, queue: Option<Arc<dyn NotificationQueue>>) -> Self {
        Self { uow, dispatcher, queue }
    }

    async fn load(&self, appointment_id: Uuid) -> AppResult<AppointmentMessage> {
        let appointment = self
            .uow
            .appointments()
            .find_by_id(appointment_id)
            .await?
            .ok_or_not_found("Appointment")?;

        let (company, client, professional, service) = parallel::join4(
            self.uow.companies().find_by_id(appointment.company_id),
            self.uow.clients().find_by_id(appointment.client_id),
            self.uow.professionals().find_by_id(appointment.professional_id),
            self.uow.catalog().find_by_id(appointment.service_id),
        )
        .await?;

        let company = company.ok_or_not_found("Company")?;
        let client = client.ok_or_not_found("Client")?;
        let professional = professional.ok_or_not_found("Professional")?;
        let service = service.ok_or_not_found("Service")?;

        let context = MessageContext {
            company_name: company.name.clone(),
            company_address: company.address.clone(),
            client_name: client.name.clone(),
            professional_name: professional.name,
            service_name: service.name,
            starts_at: appointment.starts_at,
            total_cents: appointment.total_cents,
        };

        Ok(AppointmentMessage {
            appointment,
            company,
            client,
            context,
        })
    }

    /// Render, store and deliver on every eligible channel.
    async fn send_now(
        &self,
        message: AppointmentMessage,
        kind: NotificationKind,
        hours_before: Option<i64>,
    ) -> AppResult<NotificationBatch> {
        let appointment_id = message.appointment.id;
        let rendered = message.context.render(kind, hours_before);
        let now = Utc::now();

        let mut notifications = Vec::new();
        for target in channels_for(&message.company, &message.client) {
            let row = NewNotification::for_channel(Some(appointment_id), kind, &target, &rendered, now);
            let stored = self.uow.notifications().create(row).await?;
            notifications.push(self.dispatcher.deliver(stored).await?);
        }

        if notifications.is_empty() {
            tracing::info!(%appointment_id, kind = kind.as_str(), "No channel enabled for client");
        }

        let batch = NotificationBatch::new(appointment_id, notifications);
        tracing::info!(
            %appointment_id,
            kind = kind.as_str(),
            total_sent = batch.total_sent,
            "Appointment notification sent"
        );
        Ok(batch)
    }

    /// Store pending reminder rows for `send_at` and put them on the queue.
    async fn queue_reminders(
        &self,
        message: &AppointmentMessage,
        send_at: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>> {
        let hours_before = (message.appointment.starts_at - send_at).num_hours();
        let rendered = message.context.render(NotificationKind::Reminder, Some(hours_before));

        let mut reminders = Vec::new();
        for target in channels_for(&message.company, &message.client) {
            let row = NewNotification::for_channel(
                Some(message.appointment.id),
                NotificationKind::Reminder,
                &target,
                &rendered,
                send_at,
            );
            let stored = self.uow.notifications().create(row).await?;
            self.enqueue(&stored).await;
            reminders.push(stored);
        }
        Ok(reminders)
    }

    /// Rows that fail to enqueue stay pending for the dispatch sweep.
    async fn enqueue(&self, notification: &Notification) {
        let Some(queue) = &self.queue else {
            return;
        };
        if let Err(e) = queue.schedule(notification.id, notification.send_at).await {
            tracing::warn!(
                notification_id = %notification.id,
                error = %e,
                "Could not enqueue notification; it will be picked up by the dispatch sweep"
            );
        }
    }

    async fn send_adhoc(
        &self,
        target: ChannelTarget,
        subject: Option<String>,
        body: String,
        html_body: Option<String>,
    ) -> AppResult<Notification> {
        let row = NewNotification {
            appointment_id: None,
            kind: NotificationKind::Custom,
            channel: target.channel,
            recipient: target.recipient,
            subject,
            message: body,
            send_at: Utc::now(),
        };
        let stored = self.uow.notifications().create(row).await?;
        self.dispatcher.deliver_html(stored, html_body).await
    }
}

#[async_trait]
impl<U: UnitOfWork> NotificationService for NotificationManager<U> {
    async fn send_confirmation(&self, appointment_id: Uuid) -> AppResult<NotificationBatch> {
        let message = self.load(appointment_id).await?;
        self.send_now(message, NotificationKind::Confirmation, None).await
    }

    async fn send_reminder(&self, appointment_id: Uuid, hours_before: i64) -> AppResult<NotificationBatch> {
        let message = self.load(appointment_id).await?;
        self.send_now(message, NotificationKind::Reminder, Some(hours_before)).await
    }

    async fn notify_appointment(&self, appointment_id: Uuid, kind: NotificationKind) -> AppResult<NotificationBatch> {
        let message = self.load(appointment_id).await?;
        self.send_now(message, kind, None).await
    }

    async fn notify_payment(&self, payment: Payment) -> AppResult<NotificationBatch> {
        let mut message = self.load(payment.appointment_id).await?;
        message.context.total_cents = payment.amount_cents;
        self.send_now(message, NotificationKind::Payment, None).await
    }

    async fn send_email(&self, request: EmailRequest) -> AppResult<Notification> {
        let target = ChannelTarget {
            channel: Channel::Email,
            recipient: request.to,
        };
        self.send_adhoc(target, Some(request.subject), request.body, request.html_body)
            .await
    }

    async fn send_whatsapp(&self, request: WhatsAppRequest) -> AppResult<Notification> {
        let target = ChannelTarget {
            channel: Channel::WhatsApp,
            recipient: normalize_phone(&request.phone),
        };
        self.send_adhoc(target, None, request.message, None).await
    }

    async fn schedule_reminder(&self, request: ScheduleReminder) -> AppResult<ScheduledReminders> {
        if request.send_at <= Utc::now() {
            return Err(AppError::bad_request("send_at must be in the future"));
        }

        let message = self.load(request.appointment_id).await?;
        if request.send_at >= message.appointment.starts_at {
            return Err(AppError::bad_request("send_at must be before the appointment starts"));
        }

        let reminders = self.queue_reminders(&message, request.send_at).await?;
        Ok(ScheduledReminders {
            total_appointments: 1,
            total_reminders: reminders.len(),
            reminders,
        })
    }

    async fn schedule_auto_reminders(&self, request: AutoReminders) -> AppResult<ScheduledReminders> {
        let company_id = request.company_id;
        let company = self
            .uow
            .companies()
            .find_by_id(company_id)
            .await?
            .ok_or_not_found("Company")?;

        let now = Utc::now();
        let upcoming = self.uow.appointments().list_upcoming(company_id, now).await?;

        let (professionals, services) = parallel::join2(
            self.uow.professionals().list_by_company(company_id, false),
            self.uow.catalog().list_by_company(company_id, false),
        )
        .await?;
        let professionals: HashMap<Uuid, String> =
            professionals.into_iter().map(|p| (p.id, p.name)).collect();
        let services: HashMap<Uuid, String> = services.into_iter().map(|s| (s.id, s.name)).collect();
        let mut clients: HashMap<Uuid, Client> = HashMap::new();

        let mut reminders = Vec::new();
        let total_appointments = upcoming.len();

        for appointment in upcoming {
            let client = match clients.get(&appointment.client_id) {
                Some(client) => client.clone(),
                None => {
                    let Some(client) = self.uow.clients().find_by_id(appointment.client_id).await? else {
                        continue;
                    };
                    clients.insert(client.id, client.clone());
                    client
                }
            };

            let context = MessageContext {
                company_name: company.name.clone(),
                company_address: company.address.clone(),
                client_name: client.name.clone(),
                professional_name: professionals
                    .get(&appointment.professional_id)
                    .cloned()
                    .unwrap_or_default(),
                service_name: services.get(&appointment.service_id).cloned().unwrap_or_default(),
                starts_at: appointment.starts_at,
                total_cents: appointment.total_cents,
            };
            let message = AppointmentMessage {
                appointment,
                company: company.clone(),
                client,
                context,
            };

            let offsets = request
                .hours_before
                .iter()
                .copied()
                .filter(|h| (MIN_REMINDER_HOURS..=MAX_REMINDER_HOURS).contains(h));
            for hours in offsets {
                let Some(send_at) = Duration::try_hours(hours)
                    .and_then(|offset| message.appointment.starts_at.checked_sub_signed(offset))
                else {
                    continue;
                };
                if send_at > now {
                    reminders.extend(self.queue_reminders(&message, send_at).await?);
                }
            }
        }

        tracing::info!(
            %company_id,
            total_appointments,
            total_reminders = reminders.len(),
            "Automatic reminders scheduled"
        );

        Ok(ScheduledReminders {
            total_appointments,
            total_reminders: reminders.len(),
            reminders,
        })
    }

    async fn send_test(&self, request: TestNotification) -> AppResult<Notification> {
        let body = "This is a test notification from Agenda API.".to_string();
        match request.kind {
            Channel::Email => {
                let to = request
                    .email
                    .ok_or_else(|| AppError::validation("email is required for an email test"))?;
                let target = ChannelTarget {
                    channel: Channel::Email,
                    recipient: to,
                };
                self.send_adhoc(target, Some("Test notification".to_string()), body, None)
                    .await
            }
            Channel::WhatsApp => {
                let phone = request
                    .phone
                    .ok_or_else(|| AppError::validation("phone is required for a WhatsApp test"))?;
                let target = ChannelTarget {
                    channel: Channel::WhatsApp,
                    recipient: normalize_phone(&phone),
                };
                self.send_adhoc(target, None, body, None).await
            }
        }
    }

    async fn appointment_log(&self, appointment_id: Uuid) -> AppResult<Vec<Notification>> {
        self.uow
            .appointments()
            .find_by_id(appointment_id)
            .await?
            .ok_or_not_found("Appointment")?;

        self.uow.notifications().list_for_appointment(appointment_id).await
    }

    async fn dispatch_due(&self) -> AppResult<DispatchReport> {
        self.dispatcher.deliver_due(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationStatus;
    use crate::infra::repositories::MockNotificationRepository;
    use crate::infra::{MockNotificationQueue, MockNotificationSender};
    use crate::services::testing::{
        sample_appointment, sample_client, sample_company, sample_professional, sample_service,
        pending_notification, stored_notification, Mocks, TestUnitOfWork,
    };

    fn accepting_sender() -> Arc<MockNotificationSender> {
        let mut sender = MockNotificationSender::new();
        sender.expect_send().returning(|_| Ok(()));
        Arc::new(sender)
    }

    /// Outbox mock that stores rows as given and marks them sent.
    fn outbox() -> MockNotificationRepository {
        let mut repo = MockNotificationRepository::new();
        repo.expect_create().returning(|row| Ok(stored_notification(row)));
        repo.expect_claim().returning(|_, _| Ok(true));
        repo.expect_mark_sent().returning(|id, at| {
            let mut n = pending_notification();
            n.id = id;
            n.status = NotificationStatus::Sent;
            n.sent_at = Some(at);
            Ok(n)
        });
        repo
    }

    /// Mocks for one appointment whose company has both channels on.
    fn appointment_mocks(starts_in: Duration) -> (Mocks, Uuid) {
        let mut company = sample_company();
        company.whatsapp_enabled = true;
        let company_id = company.id;
        let mut client = sample_client(company_id);
        client.email = Some("maria@example.com".to_string());
        let professional = sample_professional(company_id);
        let service = sample_service(company_id);
        let mut appointment = sample_appointment(company_id, professional.id, Utc::now() + starts_in);
        appointment.client_id = client.id;
        appointment.service_id = service.id;
        let appointment_id = appointment.id;

        let mut mocks = Mocks::default();
        mocks
            .appointments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(appointment.clone())));
        mocks
            .companies
            .expect_find_by_id()
            .returning(move |_| Ok(Some(company.clone())));
        mocks
            .clients
            .expect_find_by_id()
            .returning(move |_| Ok(Some(client.clone())));
        mocks
            .professionals
            .expect_find_by_id()
            .returning(move |_| Ok(Some(professional.clone())));
        mocks
            .catalog
            .expect_find_by_id()
            .returning(move |_| Ok(Some(service.clone())));
        (mocks, appointment_id)
    }

    fn manager(mocks: Mocks, queue: Option<Arc<dyn NotificationQueue>>) -> NotificationManager<TestUnitOfWork> {
        let uow = mocks.into_uow();
        let dispatcher = Arc::new(Dispatcher::new(uow.notifications(), accepting_sender()));
        NotificationManager::new(uow, dispatcher, queue)
    }

    #[tokio::test]
    async fn test_confirmation_goes_to_both_channels() {
        let (mut mocks, appointment_id) = appointment_mocks(Duration::days(2));
        mocks.notifications = outbox();

        let service = manager(mocks, None);
        let batch = service.send_confirmation(appointment_id).await.unwrap();

        assert_eq!(batch.appointment_id, appointment_id);
        assert_eq!(batch.notifications.len(), 2);
        assert_eq!(batch.total_sent, 2);
    }

    #[tokio::test]
    async fn test_schedule_reminder_enqueues_each_row() {
        let (mut mocks, appointment_id) = appointment_mocks(Duration::days(2));
        mocks.notifications = outbox();

        let mut queue = MockNotificationQueue::new();
        queue.expect_schedule().times(2).returning(|_, _| Ok(()));

        let service = manager(mocks, Some(Arc::new(queue)));
        let scheduled = service
            .schedule_reminder(ScheduleReminder {
                appointment_id,
                send_at: Utc::now() + Duration::days(1),
            })
            .await
            .unwrap();

        assert_eq!(scheduled.total_appointments, 1);
        assert_eq!(scheduled.total_reminders, 2);
        assert!(scheduled.reminders.iter().all(|r| r.kind == NotificationKind::Reminder));
    }

    #[tokio::test]
    async fn test_schedule_reminder_in_the_past_is_rejected() {
        let service = manager(Mocks::default(), None);
        let result = service
            .schedule_reminder(ScheduleReminder {
                appointment_id: Uuid::new_v4(),
                send_at: Utc::now() - Duration::hours(1),
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_enqueue_failure_keeps_row_pending() {
        let (mut mocks, appointment_id) = appointment_mocks(Duration::days(2));
        mocks.notifications = outbox();

        let mut queue = MockNotificationQueue::new();
        queue
            .expect_schedule()
            .returning(|_, _| Err(AppError::internal("queue down")));

        let service = manager(mocks, Some(Arc::new(queue)));
        let scheduled = service
            .schedule_reminder(ScheduleReminder {
                appointment_id,
                send_at: Utc::now() + Duration::hours(3),
            })
            .await
            .unwrap();

        assert!(scheduled.reminders.iter().all(|r| r.is_pending()));
    }

    #[tokio::test]
    async fn test_auto_reminders_skip_past_offsets() {
        let mut company = sample_company();
        company.whatsapp_enabled = false;
        let company_id = company.id;
        let client = sample_client(company_id);
        let client_id = client.id;
        let mut soon = sample_appointment(company_id, Uuid::new_v4(), Utc::now() + Duration::hours(5));
        soon.client_id = client_id;
        let mut later = sample_appointment(company_id, Uuid::new_v4(), Utc::now() + Duration::days(3));
        later.client_id = client_id;

        let mut mocks = Mocks::default();
        mocks
            .companies
            .expect_find_by_id()
            .returning(move |_| Ok(Some(company.clone())));
        mocks
            .appointments
            .expect_list_upcoming()
            .returning(move |_, _| Ok(vec![soon.clone(), later.clone()]));
        mocks.professionals.expect_list_by_company().returning(|_, _| Ok(vec![]));
        mocks.catalog.expect_list_by_company().returning(|_, _| Ok(vec![]));
        mocks
            .clients
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(client.clone())));
        mocks.notifications = outbox();

        let service = manager(mocks, None);
        let scheduled = service
            .schedule_auto_reminders(AutoReminders {
                company_id,
                hours_before: vec![24, 2],
            })
            .await
            .unwrap();

        // Email only: 2h for the first appointment, 24h and 2h for the second
        assert_eq!(scheduled.total_appointments, 2);
        assert_eq!(scheduled.total_reminders, 3);
    }

    #[tokio::test]
    async fn test_auto_reminders_ignore_out_of_range_offsets() {
        let mut company = sample_company();
        company.whatsapp_enabled = false;
        let company_id = company.id;
        let client = sample_client(company_id);
        let mut later = sample_appointment(company_id, Uuid::new_v4(), Utc::now() + Duration::days(3));
        later.client_id = client.id;

        let mut mocks = Mocks::default();
        mocks
            .companies
            .expect_find_by_id()
            .returning(move |_| Ok(Some(company.clone())));
        mocks
            .appointments
            .expect_list_upcoming()
            .returning(move |_, _| Ok(vec![later.clone()]));
        mocks.professionals.expect_list_by_company().returning(|_, _| Ok(vec![]));
        mocks.catalog.expect_list_by_company().returning(|_, _| Ok(vec![]));
        mocks
            .clients
            .expect_find_by_id()
            .returning(move |_| Ok(Some(client.clone())));
        mocks.notifications = outbox();

        // Called directly, so the request never went through validation
        let service = manager(mocks, None);
        let scheduled = service
            .schedule_auto_reminders(AutoReminders {
                company_id,
                hours_before: vec![i64::MAX, i64::MIN, 0, 721, 24],
            })
            .await
            .unwrap();

        assert_eq!(scheduled.total_appointments, 1);
        assert_eq!(scheduled.total_reminders, 1);
    }

    #[tokio::test]
    async fn test_whatsapp_test_requires_phone() {
        let service = manager(Mocks::default(), None);
        let result = service
            .send_test(TestNotification {
                kind: Channel::WhatsApp,
                email: None,
                phone: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_whatsapp_normalizes_phone() {
        let mut mocks = Mocks::default();
        let mut repo = MockNotificationRepository::new();
        repo.expect_create()
            .withf(|row| row.recipient == "+5511988887777" && row.channel == Channel::WhatsApp)
            .returning(|row| Ok(stored_notification(row)));
        repo.expect_claim().returning(|_, _| Ok(true));
        repo.expect_mark_sent().returning(|id, _| {
            let mut n = pending_notification();
            n.id = id;
            n.status = NotificationStatus::Sent;
            Ok(n)
        });
        mocks.notifications = repo;

        let service = manager(mocks, None);
        let sent = service
            .send_whatsapp(WhatsAppRequest {
                phone: "(11) 98888-7777".to_string(),
                message: "Hello".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(sent.status, NotificationStatus::Sent);
    }
}
