//! Payment service - Checkouts on the simulated gateways.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::notification_service::NotificationService;
use crate::domain::payment::{
    CheckoutRequest, CreatePayment, FeeQuote, FeeRequest, GatewayInfo, PaymentWebhook,
};
use crate::domain::{Gateway, Payment, PaymentFilter, PaymentStatus, PaymentSummary};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Payment service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Open a checkout for an appointment
    async fn create_payment(&self, input: CreatePayment) -> AppResult<Payment>;

    async fn get_payment(&self, id: Uuid) -> AppResult<Payment>;

    /// Ask the gateway for the current status and persist any change
    async fn check_status(&self, id: Uuid) -> AppResult<Payment>;

    /// Apply a gateway notification. `gateway` comes from the URL.
    async fn handle_webhook(&self, gateway: String, payload: PaymentWebhook) -> AppResult<Payment>;

    fn gateways(&self) -> Vec<GatewayInfo>;

    fn quote(&self, request: FeeRequest) -> FeeQuote;

    async fn list_company_payments(
        &self,
        company_id: Uuid,
        filter: PaymentFilter,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<PaymentSummary>>;
}

/// Concrete implementation of PaymentService using Unit of Work.
pub struct PaymentManager<U: UnitOfWork> {
    uow: Arc<U>,
    notifications: Arc<dyn NotificationService>,
}

impl<U: UnitOfWork> PaymentManager<U> {
    pub fn new(uow: Arc<U>, notifications: Arc<dyn NotificationService>) -> Self {
        Self { uow, notifications }
    }

    /// Persist `status` and send the receipt if the payment just became paid.
    async fn record_status(&self, mut payment: Payment, status: PaymentStatus) -> AppResult<Payment> {
        let became_paid = payment.transition(status, Utc::now());
        let payment = self.uow.payments().update(payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            status = payment.status.as_str(),
            "Payment status updated"
        );

        if became_paid {
            // Receipt failures never undo the payment
            if let Err(e) = self.notifications.notify_payment(payment.clone()).await {
                tracing::warn!(payment_id = %payment.id, error = %e, "Payment notification failed");
            }
        }
        Ok(payment)
    }
}

#[async_trait]
impl<U: UnitOfWork> PaymentService for PaymentManager<U> {
    async fn create_payment(&self, input: CreatePayment) -> AppResult<Payment> {
        let appointment = self
            .uow
            .appointments()
            .find_by_id(input.appointment_id)
            .await?
            .ok_or_not_found("Appointment")?;
        let client = self
            .uow
            .clients()
            .find_by_id(appointment.client_id)
            .await?
            .ok_or_not_found("Client")?;

        let now = Utc::now();
        let checkout = input.gateway.create_checkout(&CheckoutRequest {
            amount_cents: input.amount_cents,
            payer_name: &client.name,
            now,
        });

        let payment = Payment::from_checkout(appointment.id, input.gateway, input.amount_cents, checkout, now);
        let payment = self.uow.payments().create(payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            appointment_id = %appointment.id,
            gateway = payment.gateway.as_str(),
            amount_cents = payment.amount_cents,
            "Payment created"
        );
        Ok(payment)
    }

    async fn get_payment(&self, id: Uuid) -> AppResult<Payment> {
        self.uow.payments().find_by_id(id).await?.ok_or_not_found("Payment")
    }

    async fn check_status(&self, id: Uuid) -> AppResult<Payment> {
        let payment = self.get_payment(id).await?;
        let observed = payment.observed_status(Utc::now());

        if observed == payment.status {
            return Ok(payment);
        }
        self.record_status(payment, observed).await
    }

    async fn handle_webhook(&self, gateway: String, payload: PaymentWebhook) -> AppResult<Payment> {
        let gateway: Gateway = gateway.parse()?;

        let mut payment = self
            .uow
            .payments()
            .find_by_external_id(&payload.payment_id)
            .await?
            .ok_or_not_found("Payment")?;

        tracing::info!(
            gateway = gateway.as_str(),
            external_id = %payload.payment_id,
            "Payment webhook received"
        );

        let status = payload.status.unwrap_or(PaymentStatus::Paid);
        payment.merge_gateway_data(serde_json::json!({
            "webhook": payload,
            "webhook_gateway": gateway.as_str(),
        }));

        self.record_status(payment, status).await
    }

    fn gateways(&self) -> Vec<GatewayInfo> {
        Gateway::ALL.iter().map(Gateway::info).collect()
    }

    fn quote(&self, request: FeeRequest) -> FeeQuote {
        request.gateway.quote(request.amount_cents)
    }

    async fn list_company_payments(
        &self,
        company_id: Uuid,
        filter: PaymentFilter,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<PaymentSummary>> {
        let (rows, total) = self
            .uow
            .payments()
            .list_by_company(company_id, filter, pagination)
            .await?;
        Ok(Paginated::from_page(rows, total, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::services::notification_service::MockNotificationService;
    use crate::services::testing::{sample_appointment, sample_client, Mocks};
    use chrono::Duration;

    fn pending_payment(gateway: Gateway, expires_in: Duration) -> Payment {
        let now = Utc::now();
        let checkout = gateway.create_checkout(&CheckoutRequest {
            amount_cents: 5_000,
            payer_name: "Maria Silva",
            now,
        });
        let mut payment = Payment::from_checkout(Uuid::new_v4(), gateway, 5_000, checkout, now);
        payment.expires_at = now + expires_in;
        payment
    }

    fn silent_notifications() -> Arc<MockNotificationService> {
        let mut notifications = MockNotificationService::new();
        notifications.expect_notify_payment().never();
        Arc::new(notifications)
    }

    #[tokio::test]
    async fn test_create_payment_opens_pending_checkout() {
        let company_id = Uuid::new_v4();
        let client = sample_client(company_id);
        let mut appointment = sample_appointment(company_id, Uuid::new_v4(), Utc::now());
        appointment.client_id = client.id;
        let appointment_id = appointment.id;

        let mut mocks = Mocks::default();
        mocks
            .appointments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(appointment.clone())));
        mocks
            .clients
            .expect_find_by_id()
            .returning(move |_| Ok(Some(client.clone())));
        mocks.payments.expect_create().returning(|p| Ok(p));

        let manager = PaymentManager::new(mocks.into_uow(), silent_notifications());
        let payment = manager
            .create_payment(CreatePayment {
                appointment_id,
                gateway: Gateway::Pix,
                amount_cents: 5_000,
            })
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.gateway_data.get("pix_code").is_some());
        assert!(payment.expires_at - payment.created_at <= Duration::minutes(30));
    }

    #[tokio::test]
    async fn test_check_status_expires_stale_checkout() {
        let payment = pending_payment(Gateway::PagSeguro, Duration::minutes(-5));
        let id = payment.id;

        let mut mocks = Mocks::default();
        mocks
            .payments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(payment.clone())));
        mocks.payments.expect_update().times(1).returning(|p| Ok(p));

        let manager = PaymentManager::new(mocks.into_uow(), silent_notifications());
        let checked = manager.check_status(id).await.unwrap();

        assert_eq!(checked.status, PaymentStatus::Expired);
    }

    #[tokio::test]
    async fn test_check_status_without_change_skips_write() {
        let payment = pending_payment(Gateway::MercadoPago, Duration::hours(2));
        let id = payment.id;

        let mut mocks = Mocks::default();
        mocks
            .payments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(payment.clone())));
        mocks.payments.expect_update().never();

        let manager = PaymentManager::new(mocks.into_uow(), silent_notifications());
        assert_eq!(manager.check_status(id).await.unwrap().status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_webhook_defaults_to_paid_and_notifies() {
        let payment = pending_payment(Gateway::Pix, Duration::minutes(30));
        let external_id = payment.external_id.clone();

        let mut mocks = Mocks::default();
        mocks
            .payments
            .expect_find_by_external_id()
            .returning(move |_| Ok(Some(payment.clone())));
        mocks.payments.expect_update().returning(|p| Ok(p));

        let mut notifications = MockNotificationService::new();
        notifications
            .expect_notify_payment()
            .times(1)
            .returning(|p| Ok(crate::domain::notification::NotificationBatch::new(p.appointment_id, vec![])));

        let manager = PaymentManager::new(mocks.into_uow(), Arc::new(notifications));
        let paid = manager
            .handle_webhook(
                "pix".to_string(),
                PaymentWebhook {
                    payment_id: external_id,
                    status: None,
                    amount_cents: Some(5_000),
                },
            )
            .await
            .unwrap();

        assert_eq!(paid.status, PaymentStatus::Paid);
        assert!(paid.processed_at.is_some());
        assert!(paid.gateway_data.get("webhook").is_some());
        assert!(paid.gateway_data.get("pix_code").is_some());
    }

    #[tokio::test]
    async fn test_webhook_for_unknown_gateway_is_bad_request() {
        let manager = PaymentManager::new(Mocks::default().into_uow(), silent_notifications());
        let result = manager
            .handle_webhook(
                "paypal".to_string(),
                PaymentWebhook {
                    payment_id: "abc".to_string(),
                    status: None,
                    amount_cents: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_quote_rounds_fee() {
        let manager = PaymentManager::new(Mocks::default().into_uow(), silent_notifications());
        let quote = manager.quote(FeeRequest {
            amount_cents: 10_000,
            gateway: Gateway::PagSeguro,
        });

        assert_eq!(quote.fee_cents, 399);
        assert_eq!(quote.net_cents, 9_601);
        assert_eq!(manager.gateways().len(), 3);
    }
}
