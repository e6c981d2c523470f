//! Payment domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use lotkeeper_core::{PaymentId, PaymentMethod, PaymentStatus, SessionId, UserId};

/// Payment provider tag recorded on every payment.
pub const PAYMENT_PROVIDER: &str = "openpayments";

/// An immutable payment record.
///
/// Created exactly once per successful payment attempt, inside the same
/// transaction that moves the session to `paid`. Never updated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub session_id: SessionId,
    pub user_id: UserId,
    /// External reference, e.g. `TXN-1712345678-1a2b3c4d`.
    pub transaction_ref: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub method: PaymentMethod,
    pub provider: String,
    pub status: PaymentStatus,
    /// Hours billed, snapshot at payment time.
    pub billed_hours: i64,
    /// Hourly rate, snapshot at payment time.
    pub hourly_rate: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// A payment joined with session and lot context, for the receipt view.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentDetail {
    #[serde(flatten)]
    pub payment: Payment,
    pub lot_name: String,
    pub user_name: String,
    pub plate: String,
}
