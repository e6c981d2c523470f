//! Payment repository (read side).
//!
//! Payments are written exclusively by
//! [`SessionRepository::complete_payment`](super::SessionRepository::complete_payment)
//! and are immutable afterwards; this repository only reads them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use lotkeeper_core::{PaymentId, SessionId, UserId};

use super::{RepositoryError, parse_stored};
use crate::models::Payment;
use crate::models::payment::PaymentDetail;

pub(crate) const PAYMENT_COLUMNS: &str =
    "id, session_id, user_id, transaction_ref, subtotal, tax, discount, total, \
     method, provider, status, billed_hours, hourly_rate, paid_at";

#[derive(sqlx::FromRow)]
pub(crate) struct PaymentRow {
    pub(crate) id: i64,
    session_id: i64,
    user_id: i64,
    transaction_ref: String,
    subtotal: Decimal,
    tax: Decimal,
    discount: Decimal,
    total: Decimal,
    method: String,
    provider: String,
    status: String,
    billed_hours: i64,
    hourly_rate: Decimal,
    paid_at: DateTime<Utc>,
}

impl PaymentRow {
    pub(crate) fn into_domain(self) -> Result<Payment, RepositoryError> {
        Ok(Payment {
            id: PaymentId::new(self.id),
            session_id: SessionId::new(self.session_id),
            user_id: UserId::new(self.user_id),
            transaction_ref: self.transaction_ref,
            subtotal: self.subtotal,
            tax: self.tax,
            discount: self.discount,
            total: self.total,
            method: parse_stored(&self.method, "payment method")?,
            provider: self.provider,
            status: parse_stored(&self.status, "payment status")?,
            billed_hours: self.billed_hours,
            hourly_rate: self.hourly_rate,
            paid_at: self.paid_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PaymentDetailRow {
    #[sqlx(flatten)]
    payment: PaymentRow,
    lot_name: String,
    user_name: String,
    plate: String,
}

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's payments, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Payment>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE user_id = $1 ORDER BY paid_at DESC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_domain).collect()
    }

    /// Payments recorded against one session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<Payment>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE session_id = $1 ORDER BY paid_at DESC"
        ))
        .bind(session_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_domain).collect()
    }

    /// A payment joined with its session's lot and owner, for the receipt
    /// view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_detail(
        &self,
        id: PaymentId,
    ) -> Result<Option<PaymentDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentDetailRow>(
            "SELECT p.id, p.session_id, p.user_id, p.transaction_ref, p.subtotal, p.tax, \
                    p.discount, p.total, p.method, p.provider, p.status, p.billed_hours, \
                    p.hourly_rate, p.paid_at, \
                    l.name AS lot_name, u.full_name AS user_name, s.plate \
             FROM payments p \
             JOIN parking_sessions s ON s.id = p.session_id \
             JOIN parking_lots l ON l.id = s.lot_id \
             JOIN users u ON u.id = p.user_id \
             WHERE p.id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| {
            Ok(PaymentDetail {
                payment: row.payment.into_domain()?,
                lot_name: row.lot_name,
                user_name: row.user_name,
                plate: row.plate,
            })
        })
        .transpose()
    }
}
