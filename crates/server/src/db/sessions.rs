//! Parking session repository.
//!
//! Implements the session lifecycle and the occupancy counter. Every
//! lifecycle transition is a conditional UPDATE gated on the expected
//! current status, so two concurrent transition attempts on the same
//! session cannot both succeed; the loser gets `RepositoryError::Conflict`.
//! Occupancy moves in the same transaction as the session row it reflects.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use lotkeeper_core::billing::FeeBreakdown;
use lotkeeper_core::{
    LotId, PaymentId, PaymentMethod, PlateNumber, SessionId, SessionStatus, UserId,
};

use super::payments::PaymentRow;
use super::{RepositoryError, parse_stored};
use crate::models::payment::PAYMENT_PROVIDER;
use crate::models::{ParkingSession, Payment, SessionOverview, SessionWithLot};

const SESSION_COLUMNS: &str = "id, user_id, lot_id, entry_code, plate, entry_time, exit_time, \
     status, amount, payment_id, created_at";

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: i64,
    user_id: i64,
    lot_id: i64,
    entry_code: Uuid,
    plate: String,
    entry_time: DateTime<Utc>,
    exit_time: Option<DateTime<Utc>>,
    status: String,
    amount: Option<Decimal>,
    payment_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_domain(self) -> Result<ParkingSession, RepositoryError> {
        let plate = PlateNumber::parse(&self.plate).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid plate in database: {e}"))
        })?;

        Ok(ParkingSession {
            id: SessionId::new(self.id),
            user_id: UserId::new(self.user_id),
            lot_id: LotId::new(self.lot_id),
            entry_code: self.entry_code,
            plate,
            entry_time: self.entry_time,
            exit_time: self.exit_time,
            status: parse_stored(&self.status, "session status")?,
            amount: self.amount,
            payment_id: self.payment_id.map(PaymentId::new),
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionWithLotRow {
    #[sqlx(flatten)]
    session: SessionRow,
    lot_name: String,
    hourly_rate: Decimal,
}

#[derive(sqlx::FromRow)]
struct SessionOverviewRow {
    #[sqlx(flatten)]
    session: SessionRow,
    user_name: String,
    user_email: String,
    lot_name: String,
    hourly_rate: Decimal,
}

/// Everything needed to record a payment against an active session.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: UserId,
    pub transaction_ref: String,
    /// Already rounded to 2 decimal places.
    pub fee: FeeBreakdown,
    pub method: PaymentMethod,
    pub billed_hours: i64,
    pub hourly_rate: Decimal,
}

/// Repository for parking session database operations.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's sessions, newest first, with lot display fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SessionWithLot>, RepositoryError> {
        let rows = sqlx::query_as::<_, SessionWithLotRow>(
            "SELECT s.id, s.user_id, s.lot_id, s.entry_code, s.plate, s.entry_time, \
                    s.exit_time, s.status, s.amount, s.payment_id, s.created_at, \
                    l.name AS lot_name, l.hourly_rate \
             FROM parking_sessions s \
             JOIN parking_lots l ON l.id = s.lot_id \
             WHERE s.user_id = $1 \
             ORDER BY s.entry_time DESC",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SessionWithLot {
                    session: row.session.into_domain()?,
                    lot_name: row.lot_name,
                    hourly_rate: row.hourly_rate,
                })
            })
            .collect()
    }

    /// A user's most recent sessions (profile history).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_for_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<ParkingSession>, RepositoryError> {
        let rows = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM parking_sessions \
             WHERE user_id = $1 ORDER BY entry_time DESC LIMIT $2"
        ))
        .bind(user_id.as_i64())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SessionRow::into_domain).collect()
    }

    /// Get a session by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: SessionId) -> Result<Option<ParkingSession>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM parking_sessions WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(SessionRow::into_domain).transpose()
    }

    /// Get a session with its lot's name and rate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_lot(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionWithLot>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionWithLotRow>(
            "SELECT s.id, s.user_id, s.lot_id, s.entry_code, s.plate, s.entry_time, \
                    s.exit_time, s.status, s.amount, s.payment_id, s.created_at, \
                    l.name AS lot_name, l.hourly_rate \
             FROM parking_sessions s \
             JOIN parking_lots l ON l.id = s.lot_id \
             WHERE s.id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| {
            Ok(SessionWithLot {
                session: row.session.into_domain()?,
                lot_name: row.lot_name,
                hourly_rate: row.hourly_rate,
            })
        })
        .transpose()
    }

    /// Open a new session against a lot.
    ///
    /// The capacity-gated occupancy increment and the session insert share
    /// one transaction: of two concurrent attempts at the last free space,
    /// exactly one commits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::LotFull` if the lot has no free spaces or
    /// is not active, `RepositoryError::Database` on other failures.
    pub async fn create(
        &self,
        user_id: UserId,
        lot_id: LotId,
        plate: &PlateNumber,
        entry_code: Uuid,
    ) -> Result<ParkingSession, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        occupy_space(&mut tx, lot_id).await?;

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "INSERT INTO parking_sessions (user_id, lot_id, entry_code, plate) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(user_id.as_i64())
        .bind(lot_id.as_i64())
        .bind(entry_code)
        .bind(plate.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.into_domain()
    }

    /// Record a payment and move the session `active -> paid`.
    ///
    /// The payment insert and the gated session update share one
    /// transaction: if the session is no longer `active` (already paid,
    /// finalized, or cancelled), nothing is written and the caller observes
    /// a conflict. `amount` is therefore set exactly once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the session is not `active`,
    /// `RepositoryError::Database` on other failures.
    pub async fn complete_payment(
        &self,
        session_id: SessionId,
        payment: &NewPayment,
    ) -> Result<Payment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let payment_row = sqlx::query_as::<_, PaymentRow>(
            "INSERT INTO payments \
             (session_id, user_id, transaction_ref, subtotal, tax, discount, total, \
              method, provider, billed_hours, hourly_rate) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING id, session_id, user_id, transaction_ref, subtotal, tax, discount, \
                       total, method, provider, status, billed_hours, hourly_rate, paid_at",
        )
        .bind(session_id.as_i64())
        .bind(payment.user_id.as_i64())
        .bind(&payment.transaction_ref)
        .bind(payment.fee.subtotal)
        .bind(payment.fee.tax)
        .bind(payment.fee.discount)
        .bind(payment.fee.total)
        .bind(payment.method.to_string())
        .bind(PAYMENT_PROVIDER)
        .bind(payment.billed_hours)
        .bind(payment.hourly_rate)
        .fetch_one(&mut *tx)
        .await?;

        let updated = sqlx::query(
            "UPDATE parking_sessions SET status = $3, amount = $4, payment_id = $5 \
             WHERE id = $1 AND status = $2",
        )
        .bind(session_id.as_i64())
        .bind(SessionStatus::Active.to_string())
        .bind(SessionStatus::Paid.to_string())
        .bind(payment.fee.total)
        .bind(payment_row.id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(RepositoryError::Conflict(
                "session is not active".to_owned(),
            ));
        }

        tx.commit().await?;
        payment_row.into_domain()
    }

    /// Validate the exit: move the session `paid -> finalized`, stamp the
    /// exit time, and free the space.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the session is not `paid`,
    /// `RepositoryError::Database` on other failures.
    pub async fn finalize(&self, id: SessionId) -> Result<ParkingSession, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "UPDATE parking_sessions SET status = $3, exit_time = now() \
             WHERE id = $1 AND status = $2 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(SessionStatus::Paid.to_string())
        .bind(SessionStatus::Finalized.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Err(RepositoryError::Conflict("session is not paid".to_owned()));
        };

        release_space(&mut tx, LotId::new(row.lot_id)).await?;
        tx.commit().await?;
        row.into_domain()
    }

    /// Admin override: move the session `active -> cancelled` and free the
    /// space. No payment is involved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the session is not `active`,
    /// `RepositoryError::Database` on other failures.
    pub async fn cancel(&self, id: SessionId) -> Result<ParkingSession, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "UPDATE parking_sessions SET status = $3, exit_time = now() \
             WHERE id = $1 AND status = $2 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(SessionStatus::Active.to_string())
        .bind(SessionStatus::Cancelled.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Err(RepositoryError::Conflict(
                "session is not active".to_owned(),
            ));
        };

        release_space(&mut tx, LotId::new(row.lot_id)).await?;
        tx.commit().await?;
        row.into_domain()
    }

    /// All open (`active`/`paid`) sessions with owner and lot details, for
    /// the admin board.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_open_with_details(&self) -> Result<Vec<SessionOverview>, RepositoryError> {
        let rows = sqlx::query_as::<_, SessionOverviewRow>(
            "SELECT s.id, s.user_id, s.lot_id, s.entry_code, s.plate, s.entry_time, \
                    s.exit_time, s.status, s.amount, s.payment_id, s.created_at, \
                    u.full_name AS user_name, u.email AS user_email, \
                    l.name AS lot_name, l.hourly_rate \
             FROM parking_sessions s \
             JOIN users u ON u.id = s.user_id \
             JOIN parking_lots l ON l.id = s.lot_id \
             WHERE s.status IN ('active', 'paid') \
             ORDER BY s.entry_time DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SessionOverview {
                    session: row.session.into_domain()?,
                    user_name: row.user_name,
                    user_email: row.user_email,
                    lot_name: row.lot_name,
                    hourly_rate: row.hourly_rate,
                })
            })
            .collect()
    }
}

/// Occupy one space in a lot, failing when the lot is full or inactive.
///
/// The capacity check and the increment are a single atomic statement; this
/// is what makes concurrent create-session requests against a nearly-full
/// lot safe.
async fn occupy_space(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    lot_id: LotId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE parking_lots \
         SET occupied_spots = occupied_spots + 1, updated_at = now() \
         WHERE id = $1 AND status = 'active' AND occupied_spots < total_spots",
    )
    .bind(lot_id.as_i64())
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::LotFull);
    }
    Ok(())
}

/// Free one space in a lot, floored at zero.
async fn release_space(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    lot_id: LotId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE parking_lots \
         SET occupied_spots = GREATEST(occupied_spots - 1, 0), updated_at = now() \
         WHERE id = $1",
    )
    .bind(lot_id.as_i64())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
