//! Notification handlers.

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
use crate::domain::notification::{
    AutoReminders, EmailRequest, NotificationBatch, ScheduleReminder, ScheduledReminders,
    SendReminder, TestNotification, WhatsAppRequest,
};
use crate::domain::Notification;
use crate::errors::AppResult;

/// Create notification routes
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications/appointments/:id/confirmation",
            post(send_confirmation),
        )
        .route("/notifications/appointments/:id/reminder", post(send_reminder))
        .route("/notifications/email", post(send_email))
        .route("/notifications/whatsapp", post(send_whatsapp))
        .route("/notifications/reminders", post(schedule_reminder))
        .route("/notifications/reminders/auto", post(schedule_auto_reminders))
        .route("/notifications/test", post(send_test))
        .route("/appointments/:id/notifications", get(appointment_log))
}

/// Confirm an appointment on every eligible channel
#[utoipa::path(
    post,
    path = "/notifications/appointments/{id}/confirmation",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Notifications sent", body = NotificationBatch),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn send_confirmation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<NotificationBatch>> {
    let batch = state.services.notifications().send_confirmation(id).await?;
    Ok(Json(batch))
}

/// Send a reminder now; `hours_before` defaults to 24
#[utoipa::path(
    post,
    path = "/notifications/appointments/{id}/reminder",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = SendReminder,
    responses(
        (status = 200, description = "Notifications sent", body = NotificationBatch),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn send_reminder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<ValidatedJson<SendReminder>>,
) -> AppResult<Json<NotificationBatch>> {
    let request = payload.map(|ValidatedJson(r)| r).unwrap_or_default();
    let batch = state
        .services
        .notifications()
        .send_reminder(id, request.hours_before)
        .await?;
    Ok(Json(batch))
}

#[utoipa::path(
    post,
    path = "/notifications/email",
    tag = "Notifications",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Email delivered or recorded as failed", body = Notification),
        (status = 400, description = "Validation error")
    )
)]
pub async fn send_email(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailRequest>,
) -> AppResult<Json<Notification>> {
    let notification = state.services.notifications().send_email(payload).await?;
    Ok(Json(notification))
}

#[utoipa::path(
    post,
    path = "/notifications/whatsapp",
    tag = "Notifications",
    request_body = WhatsAppRequest,
    responses(
        (status = 200, description = "Message delivered or recorded as failed", body = Notification),
        (status = 400, description = "Validation error")
    )
)]
pub async fn send_whatsapp(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<WhatsAppRequest>,
) -> AppResult<Json<Notification>> {
    let notification = state.services.notifications().send_whatsapp(payload).await?;
    Ok(Json(notification))
}

/// Queue reminders for one appointment
#[utoipa::path(
    post,
    path = "/notifications/reminders",
    tag = "Notifications",
    request_body = ScheduleReminder,
    responses(
        (status = 201, description = "Reminders scheduled", body = ScheduledReminders),
        (status = 400, description = "Send time is in the past or after the appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn schedule_reminder(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ScheduleReminder>,
) -> AppResult<(StatusCode, Json<ScheduledReminders>)> {
    let scheduled = state
        .services
        .notifications()
        .schedule_reminder(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(scheduled)))
}

/// Queue reminders for every upcoming appointment of a company
#[utoipa::path(
    post,
    path = "/notifications/reminders/auto",
    tag = "Notifications",
    request_body = AutoReminders,
    responses(
        (status = 201, description = "Reminders scheduled", body = ScheduledReminders),
        (status = 404, description = "Company not found")
    )
)]
pub async fn schedule_auto_reminders(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AutoReminders>,
) -> AppResult<(StatusCode, Json<ScheduledReminders>)> {
    let scheduled = state
        .services
        .notifications()
        .schedule_auto_reminders(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(scheduled)))
}

#[utoipa::path(
    post,
    path = "/notifications/test",
    tag = "Notifications",
    request_body = TestNotification,
    responses(
        (status = 200, description = "Test message handled", body = Notification),
        (status = 400, description = "Missing recipient for the channel")
    )
)]
pub async fn send_test(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TestNotification>,
) -> AppResult<Json<Notification>> {
    let notification = state.services.notifications().send_test(payload).await?;
    Ok(Json(notification))
}

/// Notification log of an appointment, newest first
#[utoipa::path(
    get,
    path = "/appointments/{id}/notifications",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Notification log", body = Vec<Notification>),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn appointment_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Notification>>> {
    let log = state.services.notifications().appointment_log(id).await?;
    Ok(Json(log))
}
