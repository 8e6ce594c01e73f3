//! Payments and the simulated gateways.
//!
//! Gateways never contact a provider: checkouts are fabricated locally with a
//! fresh external id, and status checks are derived from the stored row.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::{
    CHECKOUT_EXPIRATION_HOURS, CURRENCY_BRL, MAX_AMOUNT_CENTS, MERCADOPAGO_FEE_BPS,
    PAGSEGURO_FEE_BPS, PIX_EXPIRATION_MINUTES, PIX_FEE_BPS,
};
use crate::errors::AppError;

/// Supported payment gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    Pix,
    PagSeguro,
    MercadoPago,
}

impl Gateway {
    pub const ALL: [Gateway; 3] = [Gateway::Pix, Gateway::PagSeguro, Gateway::MercadoPago];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gateway::Pix => "pix",
            Gateway::PagSeguro => "pagseguro",
            Gateway::MercadoPago => "mercadopago",
        }
    }

    /// Fee in basis points
    pub fn fee_bps(&self) -> i64 {
        match self {
            Gateway::Pix => PIX_FEE_BPS,
            Gateway::PagSeguro => PAGSEGURO_FEE_BPS,
            Gateway::MercadoPago => MERCADOPAGO_FEE_BPS,
        }
    }

    pub fn checkout_ttl(&self) -> Duration {
        match self {
            Gateway::Pix => Duration::minutes(PIX_EXPIRATION_MINUTES),
            Gateway::PagSeguro | Gateway::MercadoPago => Duration::hours(CHECKOUT_EXPIRATION_HOURS),
        }
    }

    pub fn info(&self) -> GatewayInfo {
        let (name, description, processing_time) = match self {
            Gateway::Pix => ("PIX", "Instant payment via PIX", "Instant"),
            Gateway::PagSeguro => ("PagSeguro", "Credit card, debit card and boleto", "Up to 2 business days"),
            Gateway::MercadoPago => ("Mercado Pago", "Card, PIX and other methods", "Up to 1 business day"),
        };
        GatewayInfo {
            id: *self,
            name: name.to_string(),
            description: description.to_string(),
            processing_time: processing_time.to_string(),
        }
    }

    /// Fee quote, rounded half-up to the cent.
    ///
    /// Computed in `i128`; the fee never exceeds the amount, so it fits back
    /// into `i64`.
    pub fn quote(&self, amount_cents: i64) -> FeeQuote {
        let bps = self.fee_bps();
        let fee = (i128::from(amount_cents) * i128::from(bps) + 5_000) / 10_000;
        let fee_cents = i64::try_from(fee).unwrap_or(i64::MAX);
        FeeQuote {
            gateway: *self,
            gross_cents: amount_cents,
            fee_cents,
            net_cents: amount_cents - fee_cents,
            fee_percentage: bps as f64 / 100.0,
        }
    }

    /// Fabricate a provider checkout for a new payment.
    pub fn create_checkout(&self, request: &CheckoutRequest<'_>) -> Checkout {
        let external_id = Uuid::new_v4().to_string();
        let expires_at = request.now + self.checkout_ttl();
        let amount = format_amount(request.amount_cents);

        let gateway_data = match self {
            Gateway::Pix => {
                let payer: String = request.payer_name.chars().take(25).collect();
                let pix_code = format!(
                    "00020126580014BR.GOV.BCB.PIX0136{}520400005303986540{}5802BR5925{}6009SAO PAULO62070503***6304",
                    external_id, amount, payer
                );
                json!({
                    "currency": CURRENCY_BRL,
                    "pix_code": pix_code,
                    "qr_code_url": format!(
                        "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data={}",
                        pix_code
                    ),
                })
            }
            Gateway::PagSeguro => json!({
                "currency": CURRENCY_BRL,
                "payment_url": format!("https://pagseguro.uol.com.br/checkout/payment/eft/{}", external_id),
            }),
            Gateway::MercadoPago => json!({
                "currency": CURRENCY_BRL,
                "checkout_url": format!(
                    "https://www.mercadopago.com.br/checkout/v1/redirect?pref_id={}",
                    external_id
                ),
            }),
        };

        Checkout {
            external_id,
            gateway_data,
            expires_at,
        }
    }
}

impl FromStr for Gateway {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pix" => Ok(Gateway::Pix),
            "pagseguro" => Ok(Gateway::PagSeguro),
            "mercadopago" => Ok(Gateway::MercadoPago),
            other => Err(AppError::bad_request(format!("Unsupported gateway: {}", other))),
        }
    }
}

/// `1234` cents -> `"12.34"`
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
    Expired,
    Refunded,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Rejected => "rejected",
        }
    }
}

impl From<&str> for PaymentStatus {
    fn from(s: &str) -> Self {
        match s {
            "paid" => PaymentStatus::Paid,
            "cancelled" => PaymentStatus::Cancelled,
            "expired" => PaymentStatus::Expired,
            "refunded" => PaymentStatus::Refunded,
            "rejected" => PaymentStatus::Rejected,
            _ => PaymentStatus::Pending,
        }
    }
}

/// Input to a gateway checkout
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    pub amount_cents: i64,
    pub payer_name: &'a str,
    pub now: DateTime<Utc>,
}

/// What a gateway hands back for a new payment
#[derive(Debug, Clone)]
pub struct Checkout {
    pub external_id: String,
    pub gateway_data: JsonValue,
    pub expires_at: DateTime<Utc>,
}

/// Payment domain entity
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub gateway: Gateway,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    /// Gateway transaction id
    pub external_id: String,
    #[schema(value_type = Object)]
    pub gateway_data: JsonValue,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn from_checkout(
        appointment_id: Uuid,
        gateway: Gateway,
        amount_cents: i64,
        checkout: Checkout,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            appointment_id,
            gateway,
            amount_cents,
            status: PaymentStatus::Pending,
            external_id: checkout.external_id,
            gateway_data: checkout.gateway_data,
            expires_at: checkout.expires_at,
            created_at: now,
            processed_at: None,
            updated_at: now,
        }
    }

    /// Status the simulated gateway reports right now.
    pub fn observed_status(&self, now: DateTime<Utc>) -> PaymentStatus {
        if self.status == PaymentStatus::Pending && now > self.expires_at {
            PaymentStatus::Expired
        } else {
            self.status
        }
    }

    /// Apply a status change. Returns `true` when this transitions into `paid`.
    pub fn transition(&mut self, status: PaymentStatus, now: DateTime<Utc>) -> bool {
        let became_paid = status == PaymentStatus::Paid && self.status != PaymentStatus::Paid;
        if became_paid {
            self.processed_at = Some(now);
        }
        self.status = status;
        self.updated_at = now;
        became_paid
    }

    /// Shallow-merge `extra` into the stored gateway data.
    pub fn merge_gateway_data(&mut self, extra: JsonValue) {
        match (&mut self.gateway_data, extra) {
            (JsonValue::Object(current), JsonValue::Object(incoming)) => {
                for (key, value) in incoming {
                    current.insert(key, value);
                }
            }
            (current, incoming) if current.is_null() => *current = incoming,
            (current, incoming) => {
                *current = json!({ "previous": current.clone(), "update": incoming });
            }
        }
    }
}

/// Payment row with the names a listing needs
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentSummary {
    #[serde(flatten)]
    pub payment: Payment,
    pub client_name: Option<String>,
    pub service_name: Option<String>,
}

/// Public gateway description
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GatewayInfo {
    pub id: Gateway,
    pub name: String,
    pub description: String,
    pub processing_time: String,
}

/// Fee breakdown for an amount
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeeQuote {
    pub gateway: Gateway,
    pub gross_cents: i64,
    pub fee_cents: i64,
    pub net_cents: i64,
    #[schema(example = 3.99)]
    pub fee_percentage: f64,
}

/// Payment creation payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePayment {
    pub appointment_id: Uuid,
    pub gateway: Gateway,
    #[validate(range(
        min = 1,
        max = MAX_AMOUNT_CENTS,
        message = "Amount must be between 1 and 1000000000000 cents"
    ))]
    #[schema(example = 5000)]
    pub amount_cents: i64,
}

/// Fee calculation payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct FeeRequest {
    #[validate(range(
        min = 0,
        max = MAX_AMOUNT_CENTS,
        message = "Amount must be between 0 and 1000000000000 cents"
    ))]
    #[schema(example = 10000)]
    pub amount_cents: i64,
    pub gateway: Gateway,
}

/// Gateway notification payload
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct PaymentWebhook {
    /// Gateway transaction id
    #[validate(length(min = 1, message = "payment_id is required"))]
    pub payment_id: String,
    /// Defaults to `paid`
    pub status: Option<PaymentStatus>,
    pub amount_cents: Option<i64>,
}

/// Payment listing filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub gateway: Option<Gateway>,
}
